//! Month-by-month loan amortization under a yearly rate schedule, with an
//! optional payment floor, fixed extra payment and automatic refinancing.
//!
//! ```
//! use amortize::{simulate, LoanParameters, ScheduleSummary};
//!
//! let params = LoanParameters::new(100_000., 1, vec![12.]);
//! let schedule = simulate(&params).unwrap();
//! let summary = ScheduleSummary::from_schedule(&schedule);
//! assert_eq!(summary.payoff_label(), "1Y 0M");
//! ```

pub mod error;
pub mod loan;
pub mod params;
pub mod rates;
pub mod summary;

pub use error::LoanError;
pub use loan::{level_payment, simulate, simulate_with, Schedule, ScheduleEntry};
pub use params::{
    parse_rates, LoanParameters, PaymentReset, RateIndexing, RefinancePolicy, RefinanceTrigger,
    SimulationOptions, TopupPolicy, MAX_TERM_YEARS,
};
pub use summary::{annual_summary, compare, AnnualSummary, Comparison, ScheduleSummary};
