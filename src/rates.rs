use crate::params::RateIndexing;

/// Rate bumps accumulated from refinance events so far.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct RefinanceState {
    pub events: u32,
    /// total percentage points added to the scheduled rate
    pub rate_increase: f64,
}

impl RefinanceState {
    pub fn apply(&mut self, rate_increase_points: f64) {
        self.events += 1;
        self.rate_increase += rate_increase_points;
    }
}

/// Annual rate in percent to apply for `month_index` (0-based).
///
/// Indices past the end of `annual_rates` use the final rate. An empty list
/// resolves to the accumulated refinance increase alone; callers validate the
/// list before simulating.
pub fn resolve(
    month_index: u32,
    annual_rates: &[f64],
    indexing: RateIndexing,
    refinance: &RefinanceState,
) -> f64 {
    let idx = match indexing {
        RateIndexing::Yearly => month_index / 12,
        RateIndexing::Monthly => month_index,
    };

    let scheduled = annual_rates
        .get(idx as usize)
        .or_else(|| annual_rates.last())
        .copied()
        .unwrap_or(0.);

    scheduled + refinance.rate_increase
}
