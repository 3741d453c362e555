//! Allocating lost utility profit across cost-recovery policies.
use crate::region::Region;
use crate::units::{Dimensionless, Energy, Money, MoneyPerEnergy};
use serde::Serialize;
use std::ops::Div;

/// Annual totals for a single simulated year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualSummary {
    /// Year index, starting from 0
    pub year: u32,
    /// Fraction of households with solar panels
    pub solar_penetration: Dimensionless,
    /// The utility's profit over the year
    pub profit: Money,
    /// Total number of households
    pub households: u32,
    /// Number of households with solar panels (not rounded)
    pub solar_households: f64,
    /// Net demand over the year across all households
    pub demand: Energy,
    /// Retail price per unit of energy
    pub utility_price: MoneyPerEnergy,
}

impl AnnualSummary {
    /// Summarise an evaluated region
    pub fn from_region(year: u32, region: &Region) -> Self {
        Self {
            year,
            solar_penetration: region.solar_penetration,
            profit: region.annual_profit(),
            households: region.num_houses,
            solar_households: region.num_houses as f64 * region.solar_penetration.0,
            demand: region.annual_demand(),
            utility_price: region.utility_price(),
        }
    }
}

/// The increases in charges needed to recover the profit lost in one year.
///
/// Each increase is `None` when it would require dividing by zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostImpact {
    /// Profit in the first year minus profit in this year
    pub profit_loss: Money,
    /// Extra fixed charge per household per year if all households pay
    pub fixed_increase_all_houses: Option<Money>,
    /// Extra fixed charge per household per year if only households with solar panels pay
    pub fixed_increase_solar_houses: Option<Money>,
    /// Fractional increase in the retail price per unit of energy
    pub variable_increase: Option<Dimensionless>,
}

/// Divide, unless the denominator is zero
fn ratio<N, D>(numerator: N, denominator: D) -> Option<N::Output>
where
    N: Div<D>,
    D: PartialEq + Default + Copy,
{
    (denominator != D::default()).then(|| numerator / denominator)
}

/// Calculate the cost impact for each year relative to the first.
///
/// The result has one entry per summary. The first entry always has zero profit loss.
pub fn calculate_impact(summaries: &[AnnualSummary]) -> Vec<CostImpact> {
    let Some(baseline) = summaries.first() else {
        return Vec::new();
    };

    summaries
        .iter()
        .map(|summary| {
            let profit_loss = baseline.profit - summary.profit;
            CostImpact {
                profit_loss,
                fixed_increase_all_houses: ratio(
                    profit_loss,
                    Dimensionless(summary.households as f64),
                ),
                fixed_increase_solar_houses: ratio(
                    profit_loss,
                    Dimensionless(summary.solar_households),
                ),
                variable_increase: ratio(profit_loss, summary.demand)
                    .and_then(|loss_per_energy| ratio(loss_per_energy, summary.utility_price)),
            }
        })
        .collect()
}
