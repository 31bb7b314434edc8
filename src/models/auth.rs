//! Authentication and account-maintenance payloads

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use super::{Role, User};
use crate::validation::{
    validate_account_number, validate_nik, validate_password_strength, validate_phone,
    validate_required, validate_username,
};

/// Credentials submitted on the sign-in page
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(custom = "validate_required")]
    pub password: String,
}

/// Registration form. Field names are the ones the backend expects.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(custom = "validate_required")]
    pub name: String,
    #[validate(custom = "validate_username")]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(custom = "validate_password_strength")]
    pub password: String,
    pub password_confirmation: String,

    #[serde(rename = "no_hp")]
    #[validate(custom = "validate_phone")]
    pub phone: String,
    #[serde(rename = "no_hp2")]
    #[validate(custom = "validate_phone")]
    pub emergency_phone: String,
    #[serde(rename = "nama_no_hp2")]
    #[validate(custom = "validate_required")]
    pub emergency_contact_name: String,
    #[serde(rename = "relasi_no_hp2")]
    #[validate(custom = "validate_required")]
    pub emergency_contact_relation: String,
    #[serde(rename = "NIK")]
    #[validate(custom = "validate_nik")]
    pub national_id: String,
    #[serde(rename = "Norek")]
    #[validate(custom = "validate_account_number")]
    pub account_number: String,
    #[serde(rename = "Nama_Ibu")]
    #[validate(custom = "validate_required")]
    pub mother_name: String,
    #[serde(rename = "Pekerjaan")]
    #[validate(custom = "validate_required")]
    pub occupation: String,
    #[serde(rename = "Gaji")]
    #[validate(custom = "validate_required")]
    pub salary: String,
    #[serde(rename = "alamat")]
    #[validate(custom = "validate_required")]
    pub address: String,

    #[serde(rename = "kode_bank")]
    #[validate(custom = "validate_required")]
    pub bank_code: String,
}

impl RegisterRequest {
    /// Field rules plus the password confirmation, which spans two fields.
    pub fn check(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if self.password != self.password_confirmation {
            let mut error = ValidationError::new("mismatch");
            error.message = Some("Password confirmation does not match".into());
            errors.add("password_confirmation", error);
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Response from `/auth/login` and `/auth/register`.
///
/// Depending on the backend build the token arrives as `token`,
/// `accessToken` or `access_token`, and `user` may be missing.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default, alias = "accessToken", alias = "access_token")]
    pub token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Result of a successful sign-in: who the actor is and the bearer token
#[derive(Debug, Clone)]
pub struct SignIn {
    pub user: User,
    pub token: String,
}

/// Owner-side edit of an account
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(custom = "validate_required")]
    pub name: String,
    #[validate(custom = "validate_username")]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub role: Role,
    /// Sent only when the owner typed a new one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom = "validate_password_strength")]
    pub password: Option<String>,
}

impl UserUpdate {
    /// Drops a blank password so the backend keeps the current one.
    pub fn normalized(mut self) -> Self {
        if self
            .password
            .as_deref()
            .map(|p| p.trim().is_empty())
            .unwrap_or(false)
        {
            self.password = None;
        }
        self
    }
}

/// Bank create/update form
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BankForm {
    #[serde(rename = "kode_bank")]
    #[validate(custom = "validate_required")]
    pub code: String,
    #[serde(rename = "nama_bank")]
    #[validate(custom = "validate_required")]
    pub name: String,
    #[serde(rename = "alamat", default)]
    pub address: String,
    #[serde(rename = "kota", default)]
    pub city: String,
    #[serde(rename = "provinsi", default)]
    pub province: String,
}
