use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{Money, StatusBadge};
use crate::access::Actor;
use crate::ledger::{payment_eligibility, reconciled_status, remote_drift, summarize};
use crate::models::{Loan, LoanId, LoanLedger, LoanTerm, Payment, PaymentId};

/// Why the pay button is hidden
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentBlockView {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentRow {
    pub id: PaymentId,
    pub amount: Money,
    pub method: Option<String>,
    pub note: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl From<&Payment> for PaymentRow {
    fn from(payment: &Payment) -> Self {
        Self {
            id: payment.id,
            amount: Money::from(payment.amount.value()),
            method: payment.method.clone(),
            note: payment.note.clone(),
            paid_at: payment.paid_at,
        }
    }
}

/// Loan detail page: balance, progress, history and whether the actor may pay
#[derive(Debug, Clone, Serialize)]
pub struct LoanLedgerView {
    pub loan_id: LoanId,
    pub borrower_name: Option<String>,
    pub term: LoanTerm,
    pub term_months: Option<u32>,
    pub status: StatusBadge,
    pub principal: Money,
    pub total_paid: Money,
    pub remaining: Money,
    pub percent_complete: Decimal,
    pub payments: Vec<PaymentRow>,
    pub can_pay: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_block: Option<PaymentBlockView>,
    pub created_at: Option<DateTime<Utc>>,
    /// Built from data fetched before the last payment; reload to see it
    pub stale: bool,
}

impl LoanLedgerView {
    pub fn build(ledger: &LoanLedger, actor: &Actor) -> Self {
        let loan = &ledger.loan;
        let summary = summarize(loan, &ledger.payments);

        if let Some(drift) = ledger
            .summary
            .as_ref()
            .and_then(|remote| remote_drift(&summary, remote))
        {
            tracing::warn!(
                loan_id = loan.id,
                local_remaining = %summary.remaining,
                drift = %drift,
                "Backend balance disagrees with payment history"
            );
        }

        let eligibility = payment_eligibility(loan, &summary, actor.role);

        Self {
            loan_id: loan.id,
            borrower_name: loan.borrower.as_ref().map(|user| user.name.clone()),
            term: loan.term,
            term_months: loan.term.months(),
            status: StatusBadge::from(reconciled_status(loan, &summary)),
            principal: Money::from(summary.principal),
            total_paid: Money::from(summary.total_paid),
            remaining: Money::from(summary.remaining),
            percent_complete: summary.percent_complete,
            payments: ledger.payments.iter().map(PaymentRow::from).collect(),
            can_pay: eligibility.is_ok(),
            payment_block: eligibility.err().map(|block| PaymentBlockView {
                code: block.code(),
                message: block.to_string(),
            }),
            created_at: loan.created_at,
            stale: false,
        }
    }

    /// Marks a view whose refresh failed after a payment went through.
    ///
    /// Paying again is blocked until the page is reloaded, since the balance
    /// shown does not include the payment just made.
    pub fn into_stale(mut self) -> Self {
        self.stale = true;
        self.can_pay = false;
        self.payment_block = Some(PaymentBlockView {
            code: "REFRESH_NEEDED",
            message: "Payment recorded. Reload the page to see the updated balance".to_string(),
        });
        self
    }
}

/// One line of a loan listing
#[derive(Debug, Clone, Serialize)]
pub struct LoanRow {
    pub id: LoanId,
    pub principal: Money,
    pub term: LoanTerm,
    pub status: StatusBadge,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&Loan> for LoanRow {
    fn from(loan: &Loan) -> Self {
        Self {
            id: loan.id,
            principal: Money::from(loan.principal.value()),
            term: loan.term,
            status: StatusBadge::from(loan.status),
            created_at: loan.created_at,
        }
    }
}

/// The customer's own loans
#[derive(Debug, Clone, Serialize)]
pub struct LoanListView {
    pub loans: Vec<LoanRow>,
}

impl LoanListView {
    pub fn build(loans: &[Loan]) -> Self {
        Self {
            loans: loans.iter().map(LoanRow::from).collect(),
        }
    }
}

/// One line of the admin review table. Only pending loans carry actions.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewRow {
    #[serde(flatten)]
    pub loan: LoanRow,
    pub borrower_name: Option<String>,
    pub borrower_email: Option<String>,
    pub actions: Vec<&'static str>,
}

impl From<&Loan> for ReviewRow {
    fn from(loan: &Loan) -> Self {
        let actions = if loan.status.is_reviewable() {
            vec!["approve", "reject"]
        } else {
            Vec::new()
        };
        Self {
            loan: LoanRow::from(loan),
            borrower_name: loan.borrower.as_ref().map(|user| user.name.clone()),
            borrower_email: loan.borrower.as_ref().map(|user| user.email.clone()),
            actions,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewListView {
    pub loans: Vec<ReviewRow>,
    pub pending: usize,
}

impl ReviewListView {
    pub fn build(loans: &[Loan]) -> Self {
        Self {
            loans: loans.iter().map(ReviewRow::from).collect(),
            pending: loans.iter().filter(|loan| loan.status.is_reviewable()).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LoanStatus, RawAmount, Role};
    use rust_decimal_macros::dec;

    fn ledger(status: LoanStatus, principal: &str, payments: &[&str]) -> LoanLedger {
        LoanLedger {
            loan: Loan {
                id: 9,
                borrower_id: 4,
                principal: RawAmount::new(principal),
                term: LoanTerm::ThreeMonths,
                status,
                created_at: None,
                borrower: None,
            },
            payments: payments
                .iter()
                .enumerate()
                .map(|(i, amount)| Payment {
                    id: i as u64 + 1,
                    loan_id: 9,
                    amount: RawAmount::new(*amount),
                    method: Some("Transfer".to_string()),
                    note: None,
                    paid_at: None,
                })
                .collect(),
            summary: None,
        }
    }

    #[test]
    fn test_customer_can_pay_open_loan() {
        let view = LoanLedgerView::build(
            &ledger(LoanStatus::Approved, "3000000", &["1000000"]),
            &Actor::signed_in(Role::Customer),
        );
        assert!(view.can_pay);
        assert!(view.payment_block.is_none());
        assert_eq!(view.remaining.display, "Rp 2.000.000");
        assert_eq!(view.percent_complete, dec!(33.33));
        assert_eq!(view.payments.len(), 1);
        assert_eq!(view.term_months, Some(3));
    }

    #[test]
    fn test_stale_view_blocks_another_payment() {
        let view = LoanLedgerView::build(
            &ledger(LoanStatus::Approved, "3000000", &[]),
            &Actor::signed_in(Role::Customer),
        )
        .into_stale();
        assert!(view.stale);
        assert!(!view.can_pay);
        assert_eq!(view.payment_block.unwrap().code, "REFRESH_NEEDED");
        assert_eq!(view.remaining.display, "Rp 3.000.000");
    }

    #[test]
    fn test_admin_sees_block_reason() {
        let view = LoanLedgerView::build(
            &ledger(LoanStatus::Approved, "3000000", &[]),
            &Actor::signed_in(Role::Admin),
        );
        assert!(!view.can_pay);
        assert_eq!(view.payment_block.unwrap().code, "NOT_CUSTOMER");
    }

    #[test]
    fn test_paid_off_loan_is_shown_closed() {
        let view = LoanLedgerView::build(
            &ledger(LoanStatus::Approved, "3000000", &["1000000", "2000000"]),
            &Actor::signed_in(Role::Customer),
        );
        assert!(!view.can_pay);
        assert_eq!(view.status.code, "closed");
        assert_eq!(view.payment_block.unwrap().code, "FULLY_PAID");
    }

    #[test]
    fn test_review_actions_only_on_pending() {
        let pending = ledger(LoanStatus::Pending, "2000000", &[]).loan;
        let lunas = ledger(LoanStatus::Closed, "2000000", &[]).loan;
        let view = ReviewListView::build(&[pending, lunas]);
        assert_eq!(view.pending, 1);
        assert_eq!(view.loans[0].actions, vec!["approve", "reject"]);
        assert!(view.loans[1].actions.is_empty());
        assert_eq!(view.loans[1].loan.status.label, "Selesai");
    }
}
