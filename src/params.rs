use crate::error::LoanError;
use log::warn;
use std::str::FromStr;

/// Longest loan term accepted, in years.
pub const MAX_TERM_YEARS: u32 = 100;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a month index is mapped onto the `annual_rates` list.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RateIndexing {
    /// one rate per loan year, `annual_rates[month / 12]`
    #[default]
    Yearly,
    /// one rate per month, `annual_rates[month]`
    Monthly,
}

/// How the interval and balance-threshold arms of a refinance policy combine.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RefinanceTrigger {
    /// interval elapsed, or the balance reached the threshold for the first time
    #[default]
    Either,
    /// at each interval boundary, only if the balance is at or below the threshold
    Both,
}

/// When the standing payment is re-amortized over the remaining term.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PaymentReset {
    /// on refinance events only
    #[default]
    OnRefinance,
    /// on refinance events and whenever the applied annual rate changes
    OnRateChange,
}

impl FromStr for RateIndexing {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yearly" => Ok(RateIndexing::Yearly),
            "monthly" => Ok(RateIndexing::Monthly),
            other => Err(LoanError::invalid(
                "rate_indexing",
                format!("'{}' is not one of yearly, monthly", other),
            )),
        }
    }
}

impl FromStr for RefinanceTrigger {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "either" => Ok(RefinanceTrigger::Either),
            "both" => Ok(RefinanceTrigger::Both),
            other => Err(LoanError::invalid(
                "refinance_trigger",
                format!("'{}' is not one of either, both", other),
            )),
        }
    }
}

impl FromStr for PaymentReset {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "on_rate_change" => Ok(PaymentReset::OnRateChange),
            "on_refinance" => Ok(PaymentReset::OnRefinance),
            other => Err(LoanError::invalid(
                "payment_reset",
                format!("'{}' is not one of on-rate-change, on-refinance", other),
            )),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulationOptions {
    pub rate_indexing: RateIndexing,
    pub refinance_trigger: RefinanceTrigger,
    pub payment_reset: PaymentReset,
    /// the simulation aborts after `safety_cap_multiple * term_years * 12` months
    pub safety_cap_multiple: u32,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            rate_indexing: RateIndexing::default(),
            refinance_trigger: RefinanceTrigger::default(),
            payment_reset: PaymentReset::default(),
            safety_cap_multiple: 10,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RefinancePolicy {
    pub enabled: bool,
    pub every_x_years: u32,
    pub principal_threshold: f64,
    /// percentage points added to the current annual rate on each refinance
    pub rate_increase_points: f64,
}

impl RefinancePolicy {
    pub fn new(every_x_years: u32, principal_threshold: f64, rate_increase_points: f64) -> Self {
        Self {
            enabled: true,
            every_x_years,
            principal_threshold,
            rate_increase_points,
        }
    }

    pub fn interval_months(&self) -> u32 {
        self.every_x_years.saturating_mul(12)
    }
}

/// Periodic lump-sum top-up. Accepted and validated, but not applied to the
/// schedule.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TopupPolicy {
    pub every_x_months: u32,
    pub amount: f64,
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoanParameters {
    pub principal: f64,
    pub term_years: u32,
    /// annual rates in percent (i.e., 2.5, 7.0)
    pub annual_rates: Vec<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub minimum_monthly_payment: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub additional_payment: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub refinance_policy: Option<RefinancePolicy>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub topup_policy: Option<TopupPolicy>,
}

impl LoanParameters {
    pub fn new(principal: f64, term_years: u32, annual_rates: Vec<f64>) -> Self {
        Self {
            principal,
            term_years,
            annual_rates,
            minimum_monthly_payment: 0.,
            additional_payment: 0.,
            refinance_policy: None,
            topup_policy: None,
        }
    }

    pub fn with_minimum_payment(mut self, minimum_monthly_payment: f64) -> Self {
        self.minimum_monthly_payment = minimum_monthly_payment;
        self
    }

    pub fn with_additional_payment(mut self, additional_payment: f64) -> Self {
        self.additional_payment = additional_payment;
        self
    }

    pub fn with_refinance(mut self, policy: RefinancePolicy) -> Self {
        self.refinance_policy = Some(policy);
        self
    }

    pub fn with_topup(mut self, policy: TopupPolicy) -> Self {
        self.topup_policy = Some(policy);
        self
    }

    pub fn term_months(&self) -> u32 {
        self.term_years.saturating_mul(12)
    }

    /// Refinance policy, if one is present and enabled.
    pub fn active_refinance(&self) -> Option<&RefinancePolicy> {
        self.refinance_policy.as_ref().filter(|p| p.enabled)
    }

    /// Rejects any input the simulator cannot run on.
    pub fn validate(&self) -> Result<(), LoanError> {
        if !self.principal.is_finite() || self.principal <= 0. {
            return Err(LoanError::invalid("principal", "must be greater than 0"));
        }
        if self.term_years == 0 {
            return Err(LoanError::invalid("term_years", "must be greater than 0"));
        }
        if self.term_years > MAX_TERM_YEARS {
            return Err(LoanError::invalid(
                "term_years",
                format!("cannot exceed {} years", MAX_TERM_YEARS),
            ));
        }
        if self.annual_rates.is_empty() {
            return Err(LoanError::invalid(
                "annual_rates",
                "at least one interest rate must be provided",
            ));
        }
        if let Some(rate) = self
            .annual_rates
            .iter()
            .find(|r| !r.is_finite() || **r < 0.)
        {
            return Err(LoanError::invalid(
                "annual_rates",
                format!("{} is not a valid rate", rate),
            ));
        }
        non_negative("minimum_monthly_payment", self.minimum_monthly_payment)?;
        non_negative("additional_payment", self.additional_payment)?;

        if let Some(policy) = self.active_refinance() {
            if policy.every_x_years == 0 {
                return Err(LoanError::invalid(
                    "refinance_policy.every_x_years",
                    "refinance cycle must be greater than 0",
                ));
            }
            non_negative(
                "refinance_policy.principal_threshold",
                policy.principal_threshold,
            )?;
            non_negative(
                "refinance_policy.rate_increase_points",
                policy.rate_increase_points,
            )?;
        }

        if let Some(topup) = &self.topup_policy {
            if topup.every_x_months == 0 {
                return Err(LoanError::invalid(
                    "topup_policy.every_x_months",
                    "topup cycle must be greater than 0",
                ));
            }
            if !topup.amount.is_finite() || topup.amount <= 0. {
                return Err(LoanError::invalid(
                    "topup_policy.amount",
                    "topup amount must be greater than 0",
                ));
            }
            warn!("topup policy is accepted but not applied to the schedule");
        }
        Ok(())
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), LoanError> {
    if !value.is_finite() || value < 0. {
        return Err(LoanError::invalid(field, "cannot be negative"));
    }
    Ok(())
}

/// Parses a comma separated list of percentages, i.e. "2.3, 2.9, 3.5".
pub fn parse_rates(input: &str) -> Result<Vec<f64>, LoanError> {
    let rates = input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>().map_err(|_| {
                LoanError::invalid("annual_rates", format!("'{}' is not a number", s))
            })
        })
        .collect::<Result<Vec<f64>, LoanError>>()?;

    if rates.is_empty() {
        return Err(LoanError::invalid(
            "annual_rates",
            "at least one interest rate must be provided",
        ));
    }
    Ok(rates)
}
