//! Loan repayment ledger reconciliation
//!
//! Derives a loan's balance from its payment history and decides whether a
//! payment may be taken. Everything here is a pure function of its inputs:
//! no I/O, no hidden state, safe to recompute from any view at any time.
//! Every balance or progress figure the portal shows comes from
//! [`summarize`], so two views of the same ledger never disagree.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Loan, LoanStatus, Payment, RemoteSummary, Role};

mod amount;

pub use amount::parse_or_zero;

// ============================================================================
// Constants
// ============================================================================

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Decimal places kept for the progress percentage
const PERCENT_SCALE: u32 = 2;

// ============================================================================
// Summary
// ============================================================================

/// Repayment figures for one loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    /// Parsed principal (zero when the backend sent garbage)
    pub principal: Decimal,

    /// Sum of every payment amount
    pub total_paid: Decimal,

    /// `max(0, principal - total_paid)`; overpayment is absorbed
    pub remaining: Decimal,

    /// Progress in `[0, 100]`, zero when the principal is zero
    pub percent_complete: Decimal,
}

impl LedgerSummary {
    /// Nothing left to pay
    pub fn is_settled(&self) -> bool {
        self.remaining.is_zero()
    }
}

/// Reconciles a loan against its payment history.
///
/// Never fails: unparsable amounts count as zero.
pub fn summarize(loan: &Loan, payments: &[Payment]) -> LedgerSummary {
    reconcile(
        loan.principal.value(),
        payments.iter().map(|payment| payment.amount.value()),
    )
}

/// The arithmetic behind [`summarize`], on already parsed amounts.
///
/// Negative inputs are treated as zero.
pub fn reconcile(principal: Decimal, amounts: impl IntoIterator<Item = Decimal>) -> LedgerSummary {
    let principal = principal.max(Decimal::ZERO);
    let total_paid = amounts
        .into_iter()
        .map(|amount| amount.max(Decimal::ZERO))
        .fold(Decimal::ZERO, |total, amount| total.saturating_add(amount));

    let remaining = (principal - total_paid).max(Decimal::ZERO);

    let percent_complete = if principal > Decimal::ZERO {
        let ratio = total_paid
            .checked_div(principal)
            .unwrap_or(Decimal::ZERO)
            .min(Decimal::ONE);
        (ratio * HUNDRED)
            .round_dp_with_strategy(PERCENT_SCALE, RoundingStrategy::MidpointAwayFromZero)
            .normalize()
    } else {
        Decimal::ZERO
    };

    LedgerSummary {
        principal,
        total_paid,
        remaining,
        percent_complete,
    }
}

// ============================================================================
// Payment eligibility
// ============================================================================

/// Why a payment cannot be taken on a loan
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentBlock {
    #[error("Only customers can make payments")]
    NotCustomer,

    #[error("Loan is awaiting approval")]
    AwaitingApproval,

    #[error("Loan was rejected")]
    Rejected,

    #[error("Loan is closed")]
    Closed,

    #[error("Loan is fully paid")]
    FullyPaid,

    #[error("Loan status is not recognised")]
    UnknownStatus,
}

impl PaymentBlock {
    pub fn code(&self) -> &'static str {
        match self {
            PaymentBlock::NotCustomer => "NOT_CUSTOMER",
            PaymentBlock::AwaitingApproval => "AWAITING_APPROVAL",
            PaymentBlock::Rejected => "REJECTED",
            PaymentBlock::Closed => "CLOSED",
            PaymentBlock::FullyPaid => "FULLY_PAID",
            PaymentBlock::UnknownStatus => "UNKNOWN_STATUS",
        }
    }
}

/// Decides whether `role` may pay on `loan`, and if not, why.
///
/// Role is checked first, then lifecycle status, then the balance.
pub fn payment_eligibility(
    loan: &Loan,
    summary: &LedgerSummary,
    role: Option<Role>,
) -> Result<(), PaymentBlock> {
    if role != Some(Role::Customer) {
        return Err(PaymentBlock::NotCustomer);
    }

    if !loan.status.accepts_payments() {
        return Err(match loan.status {
            LoanStatus::Pending => PaymentBlock::AwaitingApproval,
            LoanStatus::Rejected => PaymentBlock::Rejected,
            LoanStatus::Closed => PaymentBlock::Closed,
            _ => PaymentBlock::UnknownStatus,
        });
    }

    if summary.is_settled() {
        return Err(PaymentBlock::FullyPaid);
    }

    Ok(())
}

pub fn can_accept_payment(loan: &Loan, summary: &LedgerSummary, role: Option<Role>) -> bool {
    payment_eligibility(loan, summary, role).is_ok()
}

/// Status to display for a loan once its ledger is known.
///
/// An approved loan whose balance is fully paid is shown as closed even if
/// the backend has not flipped the status yet.
pub fn reconciled_status(loan: &Loan, summary: &LedgerSummary) -> LoanStatus {
    if loan.status == LoanStatus::Approved && summary.is_settled() {
        LoanStatus::Closed
    } else {
        loan.status
    }
}

/// Difference between the backend's reported balance and the local one, if any.
pub fn remote_drift(local: &LedgerSummary, remote: &RemoteSummary) -> Option<Decimal> {
    let remote_remaining = remote.remaining.value();
    if remote.remaining.as_str().trim().is_empty() || remote_remaining == local.remaining {
        None
    } else {
        Some(remote_remaining - local.remaining)
    }
}
