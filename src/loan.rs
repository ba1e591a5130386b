use crate::error::LoanError;
use crate::params::{LoanParameters, PaymentReset, RefinanceTrigger, SimulationOptions};
use crate::rates::{resolve, RefinanceState};
use log::{debug, info, trace};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScheduleEntry {
    pub loan_start: f64,
    pub total_payment: f64,
    pub principal_portion: f64,
    pub interest_portion: f64,
    pub loan_end: f64,
    /// annual rate in percent
    pub annual_rate_applied: f64,
}

impl fmt::Display for ScheduleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rate {:.4}%, start balance ${:.2}, payment ${:.2}, principal paid ${:.2}, interest paid ${:.2}, ending balance ${:.2}",
            self.annual_rate_applied,
            self.loan_start,
            self.total_payment,
            self.principal_portion,
            self.interest_portion,
            self.loan_end
        )
    }
}

#[derive(Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Schedule {
    entries: Vec<ScheduleEntry>,
}

impl Schedule {
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScheduleEntry> {
        self.entries.iter()
    }

    pub fn get_pmt_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Payment detail by 1-based payment number.
    pub fn get_pmt_detail(&self, pmt_number: usize) -> Option<&ScheduleEntry> {
        pmt_number
            .checked_sub(1)
            .and_then(|idx| self.entries.get(idx))
    }

    pub fn get_pmt_info(&self, pmt_number: usize) -> String {
        match self.get_pmt_detail(pmt_number) {
            Some(entry) => format!("pmt number {}, {}", pmt_number, entry),
            None => "No payment information.".to_string(),
        }
    }

    pub fn show_amortization(&self) {
        for pmt_number in 1..=self.get_pmt_count() {
            println!("{}", self.get_pmt_info(pmt_number));
        }
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a ScheduleEntry;
    type IntoIter = std::slice::Iter<'a, ScheduleEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Schedule {
    type Item = ScheduleEntry;
    type IntoIter = std::vec::IntoIter<ScheduleEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Level payment that amortizes `principal` over `months` at `monthly_rate`
/// (as a decimal, i.e. 0.01 for 1% a month).
pub fn level_payment(principal: f64, monthly_rate: f64, months: u32) -> f64 {
    let months = months.max(1);
    if monthly_rate == 0. {
        principal / f64::from(months)
    } else {
        let exp = i32::try_from(months).unwrap_or(i32::MAX);
        principal * monthly_rate / (1. - (1. + monthly_rate).powi(-exp))
    }
}

/// Balances within this distance of zero count as paid off.
fn payoff_tolerance(principal: f64) -> f64 {
    (principal * 1e-9).max(1e-6)
}

#[derive(Debug)]
struct SimulationState {
    remaining_principal: f64,
    current_month_index: u32,
    current_annual_rate: f64,
    months_since_last_refinance: u32,
    refinance: RefinanceState,
    threshold_reached: bool,
    standing_payment: f64,
    // annual rate the standing payment was last computed at
    standing_rate: f64,
}

impl SimulationState {
    fn new(principal: f64) -> Self {
        Self {
            remaining_principal: principal,
            current_month_index: 0,
            current_annual_rate: 0.,
            months_since_last_refinance: 0,
            refinance: RefinanceState::default(),
            threshold_reached: false,
            standing_payment: 0.,
            standing_rate: 0.,
        }
    }

    /// Evaluates the refinance policy for the current month. Returns true if a
    /// refinance event fired.
    fn check_refinance(&mut self, params: &LoanParameters, trigger: RefinanceTrigger) -> bool {
        let Some(policy) = params.active_refinance() else {
            return false;
        };

        let interval_due = self.months_since_last_refinance >= policy.interval_months();
        let below_threshold = self.remaining_principal <= policy.principal_threshold;

        let fire = match trigger {
            RefinanceTrigger::Either => {
                let threshold_hit = below_threshold && !self.threshold_reached;
                if below_threshold {
                    self.threshold_reached = true;
                }
                interval_due || threshold_hit
            }
            RefinanceTrigger::Both => {
                if interval_due {
                    // the cycle restarts at every boundary
                    self.months_since_last_refinance = 0;
                }
                interval_due && below_threshold
            }
        };

        if fire {
            self.refinance.apply(policy.rate_increase_points);
            self.months_since_last_refinance = 0;
            info!(
                "refinance #{} at month {}, balance {:.2}, rate increase now {} points",
                self.refinance.events,
                self.current_month_index,
                self.remaining_principal,
                self.refinance.rate_increase
            );
        }
        fire
    }

    fn reamortize(&mut self, term_months: u32, monthly_rate: f64) {
        let months_left = term_months.saturating_sub(self.current_month_index).max(1);
        self.standing_payment = level_payment(self.remaining_principal, monthly_rate, months_left);
        self.standing_rate = self.current_annual_rate;
        debug!(
            "month {}: standing payment {:.4} over {} months at {}%",
            self.current_month_index, self.standing_payment, months_left, self.current_annual_rate
        );
    }
}

const INITIAL_CAPACITY: u32 = 1_200;

/// Computes the full amortization schedule using the default policies.
pub fn simulate(params: &LoanParameters) -> Result<Schedule, LoanError> {
    simulate_with(params, &SimulationOptions::default())
}

/// Computes the full amortization schedule.
///
/// Each month the refinance policy is evaluated first, then the annual rate is
/// resolved and interest accrues on the opening balance. A refinance that fires
/// in a month therefore raises the rate charged for that same month: with a
/// one-year cycle the first bumped entry is month index 12, and its interest is
/// already at the new rate. A simulation that accrues before refinancing would
/// show the bump one month later.
///
/// The standing payment is re-amortized over the remaining term at month 0 and
/// after a refinance. With [`PaymentReset::OnRateChange`] it is also
/// re-amortized whenever the applied rate moves. The payment is the larger of
/// the standing payment and the minimum payment, plus the additional payment,
/// capped at the balance plus interest.
pub fn simulate_with(
    params: &LoanParameters,
    options: &SimulationOptions,
) -> Result<Schedule, LoanError> {
    params.validate()?;

    let term_months = params.term_months();
    let safety_cap = term_months.saturating_mul(options.safety_cap_multiple.max(1));
    let tolerance = payoff_tolerance(params.principal);

    let mut state = SimulationState::new(params.principal);
    // a prepaid loan can stop far short of the term
    let mut entries: Vec<ScheduleEntry> =
        Vec::with_capacity(term_months.min(INITIAL_CAPACITY) as usize);

    loop {
        if state.current_month_index >= safety_cap {
            return Err(LoanError::SafetyCapExceeded {
                months: state.current_month_index,
            });
        }

        let refinanced = state.check_refinance(params, options.refinance_trigger);

        state.current_annual_rate = resolve(
            state.current_month_index,
            &params.annual_rates,
            options.rate_indexing,
            &state.refinance,
        );
        let monthly_rate = state.current_annual_rate / 100. / 12.;
        let interest_due = state.remaining_principal * monthly_rate;

        let rate_changed = options.payment_reset == PaymentReset::OnRateChange
            && state.current_annual_rate != state.standing_rate;
        if state.current_month_index == 0 || refinanced || rate_changed {
            state.reamortize(term_months, monthly_rate);
        }

        let mut payment =
            params.minimum_monthly_payment.max(state.standing_payment) + params.additional_payment;

        if interest_due >= payment {
            return Err(LoanError::NonAmortizingLoan {
                month: state.current_month_index,
                interest_due,
                payment,
            });
        }

        let loan_start = state.remaining_principal;
        let mut principal_portion = payment - interest_due;
        let mut loan_end = loan_start - principal_portion;

        // final payment
        if loan_end <= tolerance {
            payment = loan_start + interest_due;
            principal_portion = loan_start;
            loan_end = 0.;
        }

        trace!(
            "month {}, rate {}%, start {:.4}, interest {:.4}, payment {:.4}, end {:.4}",
            state.current_month_index,
            state.current_annual_rate,
            loan_start,
            interest_due,
            payment,
            loan_end
        );

        entries.push(ScheduleEntry {
            loan_start,
            total_payment: payment,
            principal_portion,
            interest_portion: interest_due,
            loan_end,
            annual_rate_applied: state.current_annual_rate,
        });

        state.remaining_principal = loan_end;
        state.current_month_index += 1;
        state.months_since_last_refinance += 1;

        if state.remaining_principal <= tolerance {
            break;
        }
    }

    info!(
        "loan of {:.2} paid off in {} months after {} refinance(s)",
        params.principal,
        entries.len(),
        state.refinance.events
    );
    Ok(Schedule { entries })
}

#[cfg(test)]
mod tests {
    use super::{level_payment, simulate, simulate_with, Schedule};
    use crate::error::LoanError;
    use crate::params::{
        LoanParameters, PaymentReset, RateIndexing, RefinancePolicy, RefinanceTrigger,
        SimulationOptions, TopupPolicy,
    };
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use test_log::test;

    fn total_interest(schedule: &Schedule) -> f64 {
        schedule.iter().map(|e| e.interest_portion).sum()
    }

    fn total_paid(schedule: &Schedule) -> f64 {
        schedule.iter().map(|e| e.total_payment).sum()
    }

    fn assert_invariants(params: &LoanParameters, schedule: &Schedule) {
        let entries = schedule.entries();
        assert!(!entries.is_empty());
        assert_eq!(entries[0].loan_start, params.principal);

        for (i, e) in entries.iter().enumerate() {
            if i > 0 {
                assert_eq!(e.loan_start, entries[i - 1].loan_end);
            }
            assert_abs_diff_eq!(
                e.principal_portion + e.interest_portion,
                e.total_payment,
                epsilon = 1e-6
            );
            assert_abs_diff_eq!(e.loan_start - e.principal_portion, e.loan_end, epsilon = 1e-6);
            assert!(e.interest_portion >= 0.);
            if i + 1 < entries.len() {
                assert!(e.loan_end > 0., "entry {} ended at {}", i, e.loan_end);
            }
        }

        assert_abs_diff_eq!(entries[entries.len() - 1].loan_end, 0., epsilon = 1e-6);
        let principal_paid: f64 = entries.iter().map(|e| e.principal_portion).sum();
        assert_relative_eq!(principal_paid, params.principal, max_relative = 1e-9);
    }

    #[test]
    fn test_level_payment() {
        assert_abs_diff_eq!(level_payment(100_000., 0.01, 12), 8884.8788, epsilon = 1e-4);
        assert_abs_diff_eq!(
            level_payment(200_000., 0.07 / 12., 180),
            1797.6565,
            epsilon = 1e-4
        );
        assert_eq!(level_payment(120_000., 0., 120), 1000.);
        // zero months is treated as a single remaining payment
        assert_abs_diff_eq!(level_payment(1_000., 0.01, 0), 1010., epsilon = 1e-9);
    }

    #[test]
    fn test_closed_form_schedule() {
        let params = LoanParameters::new(100_000., 1, vec![12.]);
        let schedule = simulate(&params).unwrap();

        assert_eq!(schedule.get_pmt_count(), 12);
        for e in schedule.iter() {
            assert_abs_diff_eq!(e.total_payment, 8884.88, epsilon = 0.005);
            assert_eq!(e.annual_rate_applied, 12.);
        }
        assert_abs_diff_eq!(total_interest(&schedule), 6618.56, epsilon = 0.02);
        assert_abs_diff_eq!(total_paid(&schedule), 106_618.56, epsilon = 0.02);
        assert_eq!(
            schedule.get_pmt_info(1),
            "pmt number 1, rate 12.0000%, start balance $100000.00, payment $8884.88, principal paid $7884.88, interest paid $1000.00, ending balance $92115.12"
        );
        assert_eq!(schedule.get_pmt_info(13), "No payment information.");
        assert_eq!(schedule.get_pmt_info(0), "No payment information.");
        assert_invariants(&params, &schedule);
    }

    #[test]
    fn test_fifteen_year_loan() {
        let params = LoanParameters::new(200_000., 15, vec![7.]);
        let schedule = simulate(&params).unwrap();

        assert_eq!(schedule.get_pmt_count(), 180);
        let first = schedule.get_pmt_detail(1).unwrap();
        assert_abs_diff_eq!(first.total_payment, 1797.6565, epsilon = 1e-3);
        assert_abs_diff_eq!(first.interest_portion, 1166.6667, epsilon = 1e-3);
        assert_abs_diff_eq!(first.loan_end, 199_369.0102, epsilon = 1e-3);
        assert_invariants(&params, &schedule);
    }

    #[test]
    fn test_zero_rate() {
        let params = LoanParameters::new(120_000., 10, vec![0.]);
        let schedule = simulate(&params).unwrap();

        assert_eq!(schedule.get_pmt_count(), 120);
        for e in schedule.iter() {
            assert_eq!(e.total_payment, 1000.);
            assert_eq!(e.interest_portion, 0.);
        }
        assert_invariants(&params, &schedule);
    }

    #[test]
    fn test_conservation() {
        let rising = vec![2.3, 2.9, 3.5, 4.495, 4.495, 5.495];
        let cases = vec![
            (
                LoanParameters::new(4_300_000., 40, rising.clone()),
                PaymentReset::OnRateChange,
            ),
            (
                LoanParameters::new(4_300_000., 40, vec![4.])
                    .with_minimum_payment(15_000.)
                    .with_additional_payment(5_000.),
                PaymentReset::OnRefinance,
            ),
            (
                LoanParameters::new(4_300_000., 40, rising)
                    .with_refinance(RefinancePolicy::new(3, 3_000_000., 1.)),
                PaymentReset::OnRateChange,
            ),
            (
                LoanParameters::new(250_000., 30, vec![6.5, 3.]).with_minimum_payment(2_000.),
                PaymentReset::OnRefinance,
            ),
            (
                LoanParameters::new(9_999.99, 3, vec![0., 18.]).with_additional_payment(123.45),
                PaymentReset::OnRefinance,
            ),
        ];

        for (params, payment_reset) in cases {
            let options = SimulationOptions {
                payment_reset,
                ..SimulationOptions::default()
            };
            let schedule = simulate_with(&params, &options).unwrap();
            assert!(schedule.get_pmt_count() <= params.term_months() as usize);
            assert_invariants(&params, &schedule);
        }
    }

    #[test]
    fn test_additional_payment_shortens_loan() {
        let mut last_len = usize::MAX;
        let mut last_interest = f64::MAX;

        for extra in [0., 250., 1_000., 5_000.] {
            let params = LoanParameters::new(200_000., 15, vec![7.]).with_additional_payment(extra);
            let schedule = simulate(&params).unwrap();
            let interest = total_interest(&schedule);

            assert!(schedule.get_pmt_count() < last_len);
            assert!(interest < last_interest);
            assert_invariants(&params, &schedule);

            last_len = schedule.get_pmt_count();
            last_interest = interest;
        }
    }

    #[test]
    fn test_minimum_payment_floor() {
        let params = LoanParameters::new(200_000., 15, vec![7.]).with_minimum_payment(3_000.);
        let schedule = simulate(&params).unwrap();

        let entries = schedule.entries();
        for e in &entries[..entries.len() - 1] {
            assert_eq!(e.total_payment, 3_000.);
        }
        assert!(entries[entries.len() - 1].total_payment <= 3_000. + 1e-3);
        assert!(schedule.get_pmt_count() < 180);
        assert_invariants(&params, &schedule);
    }

    #[test]
    fn test_rates_clamp_to_last_year() {
        let params = LoanParameters::new(30_000., 3, vec![10., 20.]);
        let schedule = simulate(&params).unwrap();
        let entries = schedule.entries();

        // the payment set at 10% runs past the term once the rate doubles
        assert!(entries.len() > 36);
        for e in &entries[..12] {
            assert_eq!(e.annual_rate_applied, 10.);
        }
        // months 13-36 and everything after
        for e in &entries[12..] {
            assert_eq!(e.annual_rate_applied, 20.);
        }
        assert_invariants(&params, &schedule);
    }

    #[test]
    fn test_scheduled_rate_change_keeps_payment() {
        let params = LoanParameters::new(30_000., 3, vec![10., 20.]);
        let schedule = simulate(&params).unwrap();
        let entries = schedule.entries();

        let standing = level_payment(30_000., 0.10 / 12., 36);
        for e in &entries[..entries.len() - 1] {
            assert_abs_diff_eq!(e.total_payment, standing, epsilon = 1e-9);
        }
        assert_eq!(entries[12].total_payment, entries[11].total_payment);
    }

    #[test]
    fn test_rate_change_reamortizes() {
        let params = LoanParameters::new(30_000., 3, vec![10., 20.]);
        let options = SimulationOptions {
            payment_reset: PaymentReset::OnRateChange,
            ..SimulationOptions::default()
        };
        let schedule = simulate_with(&params, &options).unwrap();
        let entries = schedule.entries();

        // payment steps up once the rate does
        assert_eq!(entries.len(), 36);
        assert_eq!(entries[0].total_payment, entries[11].total_payment);
        assert!(entries[12].total_payment > entries[11].total_payment);
        assert_abs_diff_eq!(entries[12].total_payment, entries[30].total_payment, epsilon = 1e-9);
        assert_invariants(&params, &schedule);
    }

    #[test]
    fn test_monthly_rate_indexing() {
        let params = LoanParameters::new(10_000., 1, vec![6., 12., 24.]);
        let options = SimulationOptions {
            rate_indexing: RateIndexing::Monthly,
            payment_reset: PaymentReset::OnRateChange,
            ..SimulationOptions::default()
        };
        let schedule = simulate_with(&params, &options).unwrap();
        let rates: Vec<f64> = schedule.iter().map(|e| e.annual_rate_applied).collect();

        assert_eq!(rates.len(), 12);
        assert_eq!(rates[0], 6.);
        assert_eq!(rates[1], 12.);
        assert!(rates[2..].iter().all(|r| *r == 24.));
        assert_invariants(&params, &schedule);
    }

    #[test]
    fn test_refinance_every_year() {
        let params = LoanParameters::new(100_000., 5, vec![5.])
            .with_refinance(RefinancePolicy::new(1, 0., 2.));
        let schedule = simulate(&params).unwrap();
        let entries = schedule.entries();

        assert_eq!(entries.len(), 60);
        for e in &entries[..12] {
            assert_eq!(e.annual_rate_applied, 5.);
        }
        for e in &entries[12..24] {
            assert_eq!(e.annual_rate_applied, 7.);
        }
        for e in &entries[24..36] {
            assert_eq!(e.annual_rate_applied, 9.);
        }
        assert_eq!(entries[48].annual_rate_applied, 13.);
        assert_invariants(&params, &schedule);
    }

    #[test]
    fn test_refinance_month_accrues_at_new_rate() {
        let params = LoanParameters::new(100_000., 5, vec![5.])
            .with_refinance(RefinancePolicy::new(1, 0., 2.));
        let schedule = simulate(&params).unwrap();
        let entries = schedule.entries();

        assert_abs_diff_eq!(
            entries[11].interest_portion,
            entries[11].loan_start * 0.05 / 12.,
            epsilon = 1e-9
        );
        // the month the refinance fires is charged at the raised rate
        assert_eq!(entries[12].annual_rate_applied, 7.);
        assert_abs_diff_eq!(
            entries[12].interest_portion,
            entries[12].loan_start * 0.07 / 12.,
            epsilon = 1e-9
        );
        assert_eq!(entries[12].loan_start, entries[11].loan_end);
    }

    #[test]
    fn test_refinance_disabled() {
        let mut policy = RefinancePolicy::new(1, 0., 2.);
        policy.enabled = false;
        let params = LoanParameters::new(100_000., 5, vec![5.]).with_refinance(policy);
        let schedule = simulate(&params).unwrap();

        assert!(schedule.iter().all(|e| e.annual_rate_applied == 5.));
    }

    #[test]
    fn test_refinance_on_threshold_fires_once() {
        // interval far beyond the term, so only the balance threshold can fire
        let params = LoanParameters::new(100_000., 10, vec![5.])
            .with_refinance(RefinancePolicy::new(50, 50_000., 1.));
        let schedule = simulate(&params).unwrap();
        let entries = schedule.entries();

        let first_bumped = entries
            .iter()
            .position(|e| e.annual_rate_applied == 6.)
            .unwrap();
        assert!(entries[first_bumped].loan_start <= 50_000.);
        assert!(entries[first_bumped - 1].loan_start > 50_000.);
        assert!(entries[first_bumped..]
            .iter()
            .all(|e| e.annual_rate_applied == 6.));
        assert_invariants(&params, &schedule);
    }

    #[test]
    fn test_refinance_requires_both_arms() {
        let params = LoanParameters::new(100_000., 10, vec![5.])
            .with_refinance(RefinancePolicy::new(2, 50_000., 1.));
        let options = SimulationOptions {
            refinance_trigger: RefinanceTrigger::Both,
            ..SimulationOptions::default()
        };
        let schedule = simulate_with(&params, &options).unwrap();
        let entries = schedule.entries();

        // only boundaries at multiples of 24 months can refinance
        let first_bumped = entries
            .iter()
            .position(|e| e.annual_rate_applied > 5.)
            .unwrap();
        assert_eq!(first_bumped % 24, 0);
        assert!(entries[first_bumped].loan_start <= 50_000.);
        assert!(entries[first_bumped - 24].loan_start > 50_000.);
        assert_eq!(entries[first_bumped].annual_rate_applied, 6.);
        assert_invariants(&params, &schedule);
    }

    #[test]
    fn test_refinance_reamortizes_over_remaining_term() {
        let params = LoanParameters::new(100_000., 5, vec![5.])
            .with_refinance(RefinancePolicy::new(1, 0., 2.));
        let options = SimulationOptions {
            payment_reset: PaymentReset::OnRefinance,
            ..SimulationOptions::default()
        };
        let schedule = simulate_with(&params, &options).unwrap();
        let entries = schedule.entries();

        let expected = super::level_payment(entries[12].loan_start, 0.07 / 12., 48);
        assert_abs_diff_eq!(entries[12].total_payment, expected, epsilon = 1e-9);
        assert_eq!(entries.len(), 60);
        assert_invariants(&params, &schedule);
    }

    #[test]
    fn test_non_amortizing_loan() {
        let params = LoanParameters::new(1_000_000., 40, vec![100.]);
        match simulate(&params) {
            Err(LoanError::NonAmortizingLoan {
                month,
                interest_due,
                payment,
            }) => {
                assert_eq!(month, 0);
                assert!(interest_due >= payment);
            }
            other => panic!("expected NonAmortizingLoan, got {:?}", other),
        }
    }

    #[test]
    fn test_non_amortizing_after_rate_jump() {
        let params = LoanParameters::new(100_000., 10, vec![1., 100.]);
        match simulate(&params) {
            Err(LoanError::NonAmortizingLoan { month, .. }) => assert_eq!(month, 12),
            other => panic!("expected NonAmortizingLoan, got {:?}", other),
        }

        // re-amortizing at the new rate pays off on time
        let options = SimulationOptions {
            payment_reset: PaymentReset::OnRateChange,
            ..SimulationOptions::default()
        };
        let schedule = simulate_with(&params, &options).unwrap();
        assert_eq!(schedule.get_pmt_count(), 120);
        assert_invariants(&params, &schedule);
    }

    #[test]
    fn test_safety_cap() {
        let params = LoanParameters::new(24_000., 2, vec![0., 50.]);
        let options = SimulationOptions {
            safety_cap_multiple: 1,
            ..SimulationOptions::default()
        };
        assert_eq!(
            simulate_with(&params, &options),
            Err(LoanError::SafetyCapExceeded { months: 24 })
        );

        // with room to run past the term the same loan pays off late
        let schedule = simulate(&params).unwrap();
        assert!(schedule.get_pmt_count() > 24);
        assert_invariants(&params, &schedule);
    }

    #[test]
    fn test_invalid_input_is_rejected() {
        let params = LoanParameters::new(100_000., 10, vec![]);
        assert!(matches!(
            simulate(&params),
            Err(LoanError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_huge_term_is_rejected() {
        let params = LoanParameters::new(100_000., 200_000_000, vec![5.]);
        match simulate(&params) {
            Err(LoanError::InvalidInput { field, .. }) => assert_eq!(field, "term_years"),
            other => panic!("expected InvalidInput, got {:?}", other),
        }

        // the longest accepted term still simulates
        let params = LoanParameters::new(100_000., crate::params::MAX_TERM_YEARS, vec![5.]);
        let schedule = simulate(&params).unwrap();
        assert_eq!(schedule.get_pmt_count(), params.term_months() as usize);
        assert_invariants(&params, &schedule);
    }

    #[test]
    fn test_topup_is_inert() {
        let plain = LoanParameters::new(200_000., 15, vec![7.]);
        let with_topup = plain.clone().with_topup(TopupPolicy {
            every_x_months: 12,
            amount: 50_000.,
        });

        assert_eq!(simulate(&plain).unwrap(), simulate(&with_topup).unwrap());
    }
}
