//! Data models for the loan portal
//!
//! Wire names follow the remote lending API (Indonesian column names); the
//! Rust names describe the domain. Deserialization is lenient wherever the
//! backend is known to send dirty data: amounts stay raw until the ledger
//! parses them, and unreadable timestamps become `None`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::ledger::parse_or_zero;

pub mod audit;
pub mod auth;

pub use audit::*;
pub use auth::*;

pub type LoanId = u64;
pub type PaymentId = u64;
pub type UserId = u64;

/// Monetary amount exactly as the backend sent it.
///
/// The backend sends decimals as strings (`"5000000.00"`) or bare numbers
/// depending on the endpoint. Nothing is parsed at deserialization time;
/// [`RawAmount::value`] goes through [`parse_or_zero`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RawAmount(String);

impl RawAmount {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn value(&self) -> Decimal {
        parse_or_zero(&self.0)
    }
}

impl<'de> Deserialize<'de> for RawAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => s,
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        };
        Ok(RawAmount(raw))
    }
}

/// Reads an enum field that the backend sometimes sends as `null` or as a
/// value this build does not know; both fall back to `T::default()`.
pub(crate) fn lenient_enum<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DD`; anything else is `None`.
pub(crate) fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(parse_timestamp))
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// User roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
    Owner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
            Role::Owner => "owner",
        }
    }
}

/// Loan status as stored by the backend.
///
/// `selesai` and `lunas` both map to [`LoanStatus::Closed`]: every view and
/// every guard in the portal treats them as the same terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "disetujui", alias = "approved")]
    Approved,
    #[serde(rename = "ditolak", alias = "rejected")]
    Rejected,
    #[serde(rename = "selesai", alias = "lunas", alias = "closed")]
    Closed,
    #[serde(rename = "unknown", other)]
    Unknown,
}

impl Default for LoanStatus {
    fn default() -> Self {
        LoanStatus::Unknown
    }
}

impl LoanStatus {
    /// Canonical English code used by the portal's views
    pub fn code(&self) -> &'static str {
        match self {
            LoanStatus::Pending => "pending",
            LoanStatus::Approved => "approved",
            LoanStatus::Rejected => "rejected",
            LoanStatus::Closed => "closed",
            LoanStatus::Unknown => "unknown",
        }
    }

    /// Only approved loans take repayments.
    pub fn accepts_payments(&self) -> bool {
        matches!(self, LoanStatus::Approved)
    }

    /// Admin review is a one-shot decision on a pending loan.
    pub fn is_reviewable(&self) -> bool {
        matches!(self, LoanStatus::Pending)
    }

    pub fn can_transition_to(&self, next: LoanStatus) -> bool {
        matches!(
            (self, next),
            (LoanStatus::Pending, LoanStatus::Approved)
                | (LoanStatus::Pending, LoanStatus::Rejected)
                | (LoanStatus::Approved, LoanStatus::Closed)
        )
    }
}

/// Loan tenor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanTerm {
    #[serde(rename = "3 Bulan")]
    ThreeMonths,
    #[serde(rename = "6 Bulan")]
    SixMonths,
    #[serde(rename = "12 Bulan")]
    TwelveMonths,
    #[serde(rename = "unknown", other)]
    Unknown,
}

impl Default for LoanTerm {
    fn default() -> Self {
        LoanTerm::Unknown
    }
}

impl LoanTerm {
    pub fn months(&self) -> Option<u32> {
        match self {
            LoanTerm::ThreeMonths => Some(3),
            LoanTerm::SixMonths => Some(6),
            LoanTerm::TwelveMonths => Some(12),
            LoanTerm::Unknown => None,
        }
    }
}

/// Loan model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    #[serde(rename = "user_id", default)]
    pub borrower_id: UserId,
    #[serde(rename = "nominal", default)]
    pub principal: RawAmount,
    #[serde(rename = "rentang", default, deserialize_with = "lenient_enum")]
    pub term: LoanTerm,
    #[serde(default, deserialize_with = "lenient_enum")]
    pub status: LoanStatus,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "user", default, skip_serializing_if = "Option::is_none")]
    pub borrower: Option<User>,
}

/// Repayment record. Append-only: the portal never edits or deletes one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    #[serde(default)]
    pub id: PaymentId,
    #[serde(rename = "peminjaman_id", default)]
    pub loan_id: LoanId,
    #[serde(rename = "nominal", default)]
    pub amount: RawAmount,
    #[serde(rename = "metode", default)]
    pub method: Option<String>,
    #[serde(rename = "keterangan", default)]
    pub note: Option<String>,
    #[serde(rename = "tanggal_bayar", default, deserialize_with = "lenient_timestamp")]
    pub paid_at: Option<DateTime<Utc>>,
}

/// User model, including the KYC fields collected at registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub username: Option<String>,
    pub email: String,
    pub role: Role,
    #[serde(rename = "no_hp", default)]
    pub phone: Option<String>,
    #[serde(rename = "no_hp2", default)]
    pub emergency_phone: Option<String>,
    #[serde(rename = "nama_no_hp2", default)]
    pub emergency_contact_name: Option<String>,
    #[serde(rename = "relasi_no_hp2", default)]
    pub emergency_contact_relation: Option<String>,
    #[serde(rename = "NIK", default)]
    pub national_id: Option<String>,
    #[serde(rename = "Norek", default)]
    pub account_number: Option<String>,
    #[serde(rename = "Nama_Ibu", default)]
    pub mother_name: Option<String>,
    #[serde(rename = "Pekerjaan", default)]
    pub occupation: Option<String>,
    #[serde(rename = "Gaji", default)]
    pub salary: Option<String>,
    #[serde(rename = "alamat", default)]
    pub address: Option<String>,
    #[serde(rename = "kode_bank", default)]
    pub bank_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank: Option<Bank>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub email_verified_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Bank reference entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bank {
    #[serde(rename = "kode_bank")]
    pub code: String,
    #[serde(rename = "nama_bank")]
    pub name: String,
    #[serde(rename = "alamat", default)]
    pub address: Option<String>,
    #[serde(rename = "kota", default)]
    pub city: Option<String>,
    #[serde(rename = "provinsi", default)]
    pub province: Option<String>,
}

/// Balance figures the backend reports next to a ledger.
///
/// Kept for drift logging only; the portal's own reconciliation is what
/// views display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteSummary {
    #[serde(rename = "total_pinjam", default)]
    pub principal: RawAmount,
    #[serde(rename = "total_bayar", default)]
    pub total_paid: RawAmount,
    #[serde(rename = "sisa", default)]
    pub remaining: RawAmount,
}

/// A loan together with its full payment history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanLedger {
    pub loan: Loan,
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub summary: Option<RemoteSummary>,
}

/// Backend acknowledgement of a payment
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentReceipt {
    #[serde(default)]
    pub loan: Option<Loan>,
    #[serde(default)]
    pub summary: Option<RemoteSummary>,
    #[serde(default)]
    pub message: Option<String>,
}

// ============================================================================
// Request DTOs sent to the lending API
// ============================================================================

/// Request to apply for a loan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateLoanRequest {
    #[serde(rename = "nominal")]
    pub principal: String,
    #[serde(rename = "rentang")]
    pub term: LoanTerm,
}

/// Request to record a repayment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRequest {
    #[serde(rename = "nominal")]
    pub amount: String,
    #[serde(rename = "metode", skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(rename = "keterangan", skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Paginated response as produced by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub last_page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total: u64,
}
