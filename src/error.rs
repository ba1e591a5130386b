use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoanError {
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Loan does not amortize: at month {month} the payment ${payment:.2} does not cover interest due ${interest_due:.2}")]
    NonAmortizingLoan {
        month: u32,
        interest_due: f64,
        payment: f64,
    },

    #[error("Safety cap exceeded: loan still outstanding after {months} months")]
    SafetyCapExceeded { months: u32 },
}

impl LoanError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        LoanError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for LoanError {
    fn from(e: serde_json::Error) -> Self {
        LoanError::invalid("scenario", e.to_string())
    }
}
