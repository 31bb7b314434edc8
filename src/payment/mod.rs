//! Payment submission and loan application
//!
//! Turns what a user typed into requests for the lending API. A payment is
//! checked locally (amount, then eligibility against a freshly fetched
//! ledger) before it is sent, and the ledger is re-fetched afterwards: the
//! balance shown is always the backend's record, never a local increment.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use crate::access::Actor;
use crate::client::LoanDataSource;
use crate::error::{PortalError, PortalResult};
use crate::ledger::{payment_eligibility, summarize};
use crate::models::{CreateLoanRequest, Loan, LoanId, LoanTerm, PaymentRequest};
use crate::views::LoanLedgerView;

/// Smallest loan the platform grants
pub const MIN_LOAN_AMOUNT: Decimal = dec!(1000000);

/// Largest loan the platform grants
pub const MAX_LOAN_AMOUNT: Decimal = dec!(50000000);

/// Strips everything but digits from a typed amount.
///
/// `"1.500.000"`, `"Rp 1,500,000"` and `"1500000"` all become `1500000`.
/// Empty or zero input is a validation error on `field`.
pub fn normalize_amount(raw: &str, field: &str) -> PortalResult<Decimal> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(PortalError::invalid_field(field, "Amount is required"));
    }

    let amount = Decimal::from_str(&digits)
        .map_err(|_| PortalError::invalid_field(field, "Amount is too large"))?;
    if amount <= Decimal::ZERO {
        return Err(PortalError::invalid_field(
            field,
            "Amount must be greater than zero",
        ));
    }
    Ok(amount)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Payment form as posted to the portal
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentForm {
    #[serde(alias = "nominal")]
    pub amount: String,
    #[serde(default, alias = "metode")]
    pub method: Option<String>,
    #[serde(default, alias = "keterangan")]
    pub note: Option<String>,
}

impl PaymentForm {
    pub fn into_request(self) -> PortalResult<PaymentRequest> {
        let amount = normalize_amount(&self.amount, "amount")?;
        Ok(PaymentRequest {
            amount: amount.to_string(),
            method: non_blank(self.method),
            note: non_blank(self.note),
        })
    }
}

/// Loan application form as posted to the portal
#[derive(Debug, Clone, Deserialize)]
pub struct LoanApplicationForm {
    #[serde(alias = "nominal")]
    pub amount: String,
    #[serde(alias = "rentang")]
    pub term: LoanTerm,
}

impl LoanApplicationForm {
    pub fn into_request(self) -> PortalResult<CreateLoanRequest> {
        let amount = normalize_amount(&self.amount, "amount")?;
        if amount < MIN_LOAN_AMOUNT {
            return Err(PortalError::invalid_field(
                "amount",
                "Minimum loan is Rp 1.000.000",
            ));
        }
        if amount > MAX_LOAN_AMOUNT {
            return Err(PortalError::invalid_field(
                "amount",
                "Maximum loan is Rp 50.000.000",
            ));
        }
        if matches!(self.term, LoanTerm::Unknown) {
            return Err(PortalError::invalid_field(
                "term",
                "Choose a term of 3, 6 or 12 months",
            ));
        }

        Ok(CreateLoanRequest {
            principal: amount.to_string(),
            term: self.term,
        })
    }
}

/// Records a repayment and returns the re-fetched ledger.
///
/// The eligibility guard runs here as well as in the view, against the
/// current ledger rather than whatever the page showed. A failure before the
/// backend accepts the payment is returned as is and nothing is patched.
/// Once it is accepted the call succeeds; if the refresh then fails, the
/// pre-payment ledger comes back marked stale.
pub async fn submit_payment(
    loans: &dyn LoanDataSource,
    actor: &Actor,
    loan_id: LoanId,
    form: PaymentForm,
) -> PortalResult<LoanLedgerView> {
    let request = form.into_request()?;

    let ledger = loans.loan_with_payments(loan_id).await?;
    let summary = summarize(&ledger.loan, &ledger.payments);
    payment_eligibility(&ledger.loan, &summary, actor.role).map_err(|block| {
        tracing::info!(loan_id, reason = block.code(), "Payment blocked");
        PortalError::Forbidden(block.to_string())
    })?;

    let receipt = loans.submit_payment(loan_id, &request).await?;
    tracing::info!(
        loan_id,
        amount = %request.amount,
        message = receipt.message.as_deref().unwrap_or(""),
        "Payment recorded"
    );

    // The payment is on the books from here on; a failed refresh must not
    // read as a failed payment.
    match loans.loan_with_payments(loan_id).await {
        Ok(refreshed) => Ok(LoanLedgerView::build(&refreshed, actor)),
        Err(e) => {
            tracing::warn!(loan_id, error = %e, "Payment recorded but ledger refresh failed");
            let mut previous = ledger;
            if let Some(loan) = receipt.loan {
                previous.loan = loan;
            }
            Ok(LoanLedgerView::build(&previous, actor).into_stale())
        }
    }
}

/// Sends a validated loan application
pub async fn apply_for_loan(
    loans: &dyn LoanDataSource,
    form: LoanApplicationForm,
) -> PortalResult<Loan> {
    let request = form.into_request()?;
    let loan = loans.create_loan(&request).await?;
    tracing::info!(loan_id = loan.id, principal = %request.principal, "Loan application submitted");
    Ok(loan)
}
