//! Loan Portal Library
//!
//! Local, single-user front-end for a remote lending API: sign-in and
//! registration, loan application and review, repayment with a reconciled
//! ledger, bank reference data, user administration and the audit log.

pub mod access;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod ledger;
pub mod middleware;
pub mod models;
pub mod payment;
pub mod routes;
pub mod session;
pub mod state;
pub mod validation;
pub mod views;
