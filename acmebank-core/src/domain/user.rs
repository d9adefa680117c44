//! User domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// A registered bank customer
///
/// Keyed by `(id_type, id_number)`. The password is stored as entered;
/// this is a demonstration bank and credentials are not protected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "UserRecord")]
pub struct User {
    pub id_type: String,
    pub id_number: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub password: String,
    /// Account numbers owned by this user, primary account first
    pub accounts: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// The account the dashboard operates on
    pub fn primary_account(&self) -> Option<&str> {
        self.accounts.first().map(String::as_str)
    }

    pub fn matches_id(&self, id_type: &str, id_number: &str) -> bool {
        self.id_type == id_type && self.id_number == id_number
    }
}

/// Registration form data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub id_type: String,
    pub id_number: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub password: String,
    pub confirm_password: String,
    pub accept_terms: bool,
}

impl NewUser {
    /// Validate the form before it reaches storage
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("id type", &self.id_type),
            ("id number", &self.id_number),
            ("first name", &self.first_name),
            ("last name", &self.last_name),
            ("email", &self.email),
            ("password", &self.password),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::validation(format!("{} is required", field)));
            }
        }
        if !is_plausible_email(&self.email) {
            return Err(Error::validation("email address is not valid"));
        }
        if self.password != self.confirm_password {
            return Err(Error::validation("passwords do not match"));
        }
        if !self.accept_terms {
            return Err(Error::validation("terms and conditions must be accepted"));
        }
        Ok(())
    }

    /// Build the stored user owning a single new account
    pub fn into_user(self, account_number: String, created_at: DateTime<Utc>) -> User {
        User {
            id_type: self.id_type.trim().to_string(),
            id_number: self.id_number.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            gender: self.gender,
            phone: self.phone,
            email: self.email.trim().to_string(),
            address: self.address,
            city: self.city,
            password: self.password,
            accounts: vec![account_number],
            created_at,
        }
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.trim().split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

/// Raw persisted shape of a user, before validation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id_type: String,
    pub id_number: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub email: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    pub password: String,
    #[serde(default)]
    pub accounts: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRecord> for User {
    type Error = Error;

    fn try_from(raw: UserRecord) -> Result<Self> {
        if raw.id_type.trim().is_empty() || raw.id_number.trim().is_empty() {
            return Err(Error::malformed("user is missing its identification"));
        }
        if raw.email.trim().is_empty() {
            return Err(Error::malformed(format!(
                "user {} {} has no email",
                raw.id_type, raw.id_number
            )));
        }
        Ok(Self {
            id_type: raw.id_type,
            id_number: raw.id_number,
            first_name: raw.first_name,
            last_name: raw.last_name,
            gender: raw.gender,
            phone: raw.phone,
            email: raw.email,
            address: raw.address,
            city: raw.city,
            password: raw.password,
            accounts: raw.accounts,
            created_at: raw.created_at,
        })
    }
}
