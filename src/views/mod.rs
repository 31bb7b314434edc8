//! View models rendered by the portal's pages
//!
//! Handlers never serialize backend records directly; they go through these
//! types so amounts, statuses and permissions are derived in one place.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::models::LoanStatus;

mod admin;
mod dashboard;
mod loans;

pub use admin::{AuditLogView, BankListView, UserListView, UserRow};
pub use dashboard::{DashboardView, MenuEntry, ProfileView};
pub use loans::{
    LoanLedgerView, LoanListView, LoanRow, PaymentBlockView, PaymentRow, ReviewListView, ReviewRow,
};

/// Formats an amount as Rupiah: whole units, dot as thousands separator.
///
/// `format_rupiah(dec!(1500000))` is `"Rp 1.500.000"`.
pub fn format_rupiah(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    if negative {
        format!("-Rp {}", grouped)
    } else {
        format!("Rp {}", grouped)
    }
}

/// An amount with its display form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Money {
    pub amount: Decimal,
    pub display: String,
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self {
            amount,
            display: format_rupiah(amount),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Warning,
    Success,
    Danger,
    Info,
    Neutral,
}

/// How a loan status is shown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub code: &'static str,
    pub label: &'static str,
    pub tone: Tone,
}

impl From<LoanStatus> for StatusBadge {
    fn from(status: LoanStatus) -> Self {
        let (label, tone) = match status {
            LoanStatus::Pending => ("Menunggu", Tone::Warning),
            LoanStatus::Approved => ("Disetujui", Tone::Success),
            LoanStatus::Rejected => ("Ditolak", Tone::Danger),
            LoanStatus::Closed => ("Selesai", Tone::Info),
            LoanStatus::Unknown => ("Tidak diketahui", Tone::Neutral),
        };
        Self {
            code: status.code(),
            label,
            tone,
        }
    }
}
