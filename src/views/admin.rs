use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{AuditLog, AuditQuery, Bank, Role, User, UserId};

#[derive(Debug, Clone, Serialize)]
pub struct BankListView {
    pub banks: Vec<Bank>,
    pub total: usize,
}

impl BankListView {
    pub fn build(mut banks: Vec<Bank>) -> Self {
        banks.sort_by(|a, b| a.code.cmp(&b.code));
        Self {
            total: banks.len(),
            banks,
        }
    }
}

/// User administration row. KYC fields stay out of the listing.
#[derive(Debug, Clone, Serialize)]
pub struct UserRow {
    pub id: UserId,
    pub name: String,
    pub username: Option<String>,
    pub email: String,
    pub role: Role,
    pub bank_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            bank_name: user.bank.as_ref().map(|bank| bank.name.clone()),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserListView {
    pub users: Vec<UserRow>,
    pub customers: usize,
    pub staff: usize,
}

impl UserListView {
    pub fn build(users: &[User]) -> Self {
        let customers = users.iter().filter(|u| u.role == Role::Customer).count();
        Self {
            users: users.iter().map(UserRow::from).collect(),
            customers,
            staff: users.len() - customers,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditLogView {
    pub filters: AuditQuery,
    pub entries: Vec<AuditLog>,
}

impl AuditLogView {
    /// Newest entries first
    pub fn build(filters: AuditQuery, mut entries: Vec<AuditLog>) -> Self {
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Self { filters, entries }
    }
}
