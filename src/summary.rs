use crate::loan::Schedule;
use chrono::{Months, NaiveDate};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScheduleSummary {
    pub total_months: usize,
    pub years: usize,
    pub months: usize,
    pub total_interest: f64,
    pub total_paid: f64,
    pub total_principal: f64,
    pub avg_monthly: f64,
    /// interest as a percent of everything paid
    pub interest_percentage: f64,
}

impl ScheduleSummary {
    pub fn from_schedule(schedule: &Schedule) -> Self {
        let total_months = schedule.get_pmt_count();
        let (total_interest, total_paid, total_principal) =
            schedule.iter().fold((0., 0., 0.), |(i, t, p), e| {
                (
                    i + e.interest_portion,
                    t + e.total_payment,
                    p + e.principal_portion,
                )
            });

        Self {
            total_months,
            years: total_months / 12,
            months: total_months % 12,
            total_interest,
            total_paid,
            total_principal,
            avg_monthly: if total_months > 0 {
                total_paid / total_months as f64
            } else {
                0.
            },
            interest_percentage: if total_paid > 0. {
                total_interest / total_paid * 100.
            } else {
                0.
            },
        }
    }

    pub fn payoff_label(&self) -> String {
        format!("{}Y {}M", self.years, self.months)
    }

    /// Date of the final payment, given the date of the first one.
    pub fn payoff_date(&self, first_pmt_date: NaiveDate) -> Option<NaiveDate> {
        let offset = u32::try_from(self.total_months.checked_sub(1)?).ok()?;
        first_pmt_date.checked_add_months(Months::new(offset))
    }
}

impl fmt::Display for ScheduleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "payoff {}, total paid ${:.2}, total interest ${:.2} ({:.1}%), average monthly ${:.2}",
            self.payoff_label(),
            self.total_paid,
            self.total_interest,
            self.interest_percentage,
            self.avg_monthly
        )
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnnualSummary {
    /// 1-based loan year
    pub year: usize,
    pub principal: f64,
    pub interest: f64,
    pub total: f64,
    pub loan_end: f64,
    pub cumulative_interest: f64,
    pub cumulative_principal: f64,
}

/// Rolls the schedule up into loan years of 12 payments. A partial final year
/// is kept.
pub fn annual_summary(schedule: &Schedule) -> Vec<AnnualSummary> {
    let mut cumulative_interest = 0.;
    let mut cumulative_principal = 0.;

    schedule
        .entries()
        .chunks(12)
        .enumerate()
        .map(|(idx, year)| {
            let principal: f64 = year.iter().map(|e| e.principal_portion).sum();
            let interest: f64 = year.iter().map(|e| e.interest_portion).sum();
            let total: f64 = year.iter().map(|e| e.total_payment).sum();
            cumulative_interest += interest;
            cumulative_principal += principal;

            AnnualSummary {
                year: idx + 1,
                principal,
                interest,
                total,
                loan_end: year.last().map_or(0., |e| e.loan_end),
                cumulative_interest,
                cumulative_principal,
            }
        })
        .collect()
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Comparison {
    pub lowest_interest: String,
    pub fastest_payoff: String,
    /// total interest of the most expensive scenario minus the cheapest
    pub interest_spread: f64,
    /// payoff months of the slowest scenario minus the fastest
    pub months_spread: usize,
}

/// Picks the cheapest and fastest of several independently computed
/// scenarios. Ties go to the first scenario listed.
pub fn compare(scenarios: &[(String, ScheduleSummary)]) -> Option<Comparison> {
    let (first_name, first) = scenarios.first()?;

    let mut cheapest = (first_name, first.total_interest);
    let mut fastest = (first_name, first.total_months);
    let mut max_interest = first.total_interest;
    let mut max_months = first.total_months;

    for (name, summary) in &scenarios[1..] {
        if summary.total_interest < cheapest.1 {
            cheapest = (name, summary.total_interest);
        }
        if summary.total_months < fastest.1 {
            fastest = (name, summary.total_months);
        }
        max_interest = max_interest.max(summary.total_interest);
        max_months = max_months.max(summary.total_months);
    }

    Some(Comparison {
        lowest_interest: cheapest.0.clone(),
        fastest_payoff: fastest.0.clone(),
        interest_spread: max_interest - cheapest.1,
        months_spread: max_months - fastest.1,
    })
}
