//! User service - registration, login and password recovery

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use crate::config::Config;
use crate::domain::result::{Error, Result};
use crate::domain::{Account, NewUser, User, ACCOUNT_NUMBER_MAX, ACCOUNT_NUMBER_MIN};
use crate::ports::Store;

/// An authenticated user and the account being operated on
///
/// Sessions are plain values handed to each operation; nothing about the
/// logged-in user is kept globally.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub user: User,
    /// The user's primary account
    pub account_number: String,
    pub started_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user: User) -> Result<Self> {
        let account_number = user
            .primary_account()
            .ok_or_else(|| {
                Error::not_found(format!(
                    "no account for user {} {}",
                    user.id_type, user.id_number
                ))
            })?
            .to_string();
        Ok(Self {
            id: Uuid::new_v4(),
            user,
            account_number,
            started_at: Utc::now(),
        })
    }
}

/// Outcome of a successful registration
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub user: User,
    pub account: Account,
}

/// User service for account holders
pub struct UserService {
    store: Arc<dyn Store>,
    min_password_length: usize,
    default_id_type: String,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, config: &Config) -> Self {
        Self {
            store,
            min_password_length: config.min_password_length,
            default_id_type: config.default_id_type.clone(),
        }
    }

    /// Register a user together with a new empty savings account
    pub fn register_user(&self, form: NewUser) -> Result<Registration> {
        form.validate()?;

        let _lock = self.store.lock()?;
        let mut users = self.store.get_users()?;
        let id_type = form.id_type.trim();
        let id_number = form.id_number.trim();
        if users.iter().any(|u| u.matches_id(id_type, id_number)) {
            return Err(Error::AlreadyExists(format!(
                "user {} {}",
                id_type, id_number
            )));
        }
        let email = form.email.trim();
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(email)) {
            return Err(Error::AlreadyExists(format!("email {}", email)));
        }

        let mut accounts = self.store.get_accounts()?;
        let taken: HashSet<&str> = accounts.iter().map(|a| a.account_number.as_str()).collect();
        let account_number = unused_account_number(&taken);

        let now = Utc::now();
        let user = form.into_user(account_number.clone(), now);
        let mut account = Account::new(account_number, user.id_number.clone());
        account.created_at = now;

        users.push(user.clone());
        accounts.push(account.clone());
        self.store.save_registration(&users, &accounts)?;

        Ok(Registration { user, account })
    }

    /// Look up a user by identification and password
    pub fn authenticate(&self, id_type: &str, id_number: &str, password: &str) -> Result<User> {
        self.store
            .get_users()?
            .into_iter()
            .find(|u| u.matches_id(id_type, id_number.trim()) && u.password == password)
            .ok_or(Error::InvalidCredentials)
    }

    /// Start a session from the login form
    ///
    /// A username containing `@` is an email address; anything else is an
    /// id number of the configured default id type.
    pub fn login(&self, username: &str, password: &str) -> Result<Session> {
        let username = username.trim();
        let user = if username.contains('@') {
            self.store
                .get_users()?
                .into_iter()
                .find(|u| u.email.eq_ignore_ascii_case(username) && u.password == password)
                .ok_or(Error::InvalidCredentials)?
        } else {
            self.authenticate(&self.default_id_type, username, password)?
        };
        Session::new(user)
    }

    /// Find the user a password reset is for
    pub fn find_for_recovery(&self, id_type: &str, id_number: &str, email: &str) -> Result<User> {
        if id_type.trim().is_empty() || id_number.trim().is_empty() || email.trim().is_empty() {
            return Err(Error::validation("id type, id number and email are required"));
        }
        self.store
            .get_users()?
            .into_iter()
            .find(|u| recovery_match(u, id_type, id_number, email))
            .ok_or_else(|| Error::not_found("no user matches the given identification"))
    }

    pub fn reset_password(
        &self,
        id_type: &str,
        id_number: &str,
        email: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<()> {
        if new_password.is_empty() || confirm_password.is_empty() {
            return Err(Error::validation("both password fields are required"));
        }
        if new_password != confirm_password {
            return Err(Error::validation("passwords do not match"));
        }
        if new_password.chars().count() < self.min_password_length {
            return Err(Error::validation(format!(
                "password must be at least {} characters",
                self.min_password_length
            )));
        }

        let _lock = self.store.lock()?;
        let mut users = self.store.get_users()?;
        let user = users
            .iter_mut()
            .find(|u| recovery_match(u, id_type, id_number, email))
            .ok_or_else(|| Error::not_found("no user matches the given identification"))?;
        user.password = new_password.to_string();
        self.store.save_users(&users)
    }

    /// Reload a session's user, failing if it no longer exists
    pub fn refresh_session(&self, session: &Session) -> Result<Session> {
        let user = self
            .store
            .get_users()?
            .into_iter()
            .find(|u| u.matches_id(&session.user.id_type, &session.user.id_number))
            .ok_or_else(|| Error::not_found("session user no longer exists"))?;
        let mut refreshed = Session::new(user)?;
        refreshed.id = session.id;
        refreshed.started_at = session.started_at;
        Ok(refreshed)
    }
}

fn recovery_match(user: &User, id_type: &str, id_number: &str, email: &str) -> bool {
    user.matches_id(id_type.trim(), id_number.trim()) && user.email.eq_ignore_ascii_case(email.trim())
}

fn unused_account_number(taken: &HashSet<&str>) -> String {
    let mut rng = rand::thread_rng();
    loop {
        let candidate = rng.gen_range(ACCOUNT_NUMBER_MIN..=ACCOUNT_NUMBER_MAX).to_string();
        if !taken.contains(candidate.as_str()) {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;

    fn form(id_number: &str, email: &str) -> NewUser {
        NewUser {
            id_type: "cc".to_string(),
            id_number: id_number.to_string(),
            first_name: "Ana".to_string(),
            last_name: "Pérez".to_string(),
            email: email.to_string(),
            password: "secret123".to_string(),
            confirm_password: "secret123".to_string(),
            accept_terms: true,
            ..Default::default()
        }
    }

    fn service() -> (UserService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (UserService::new(store.clone(), &Config::default()), store)
    }

    #[test]
    fn test_register_creates_empty_account() {
        let (service, store) = service();
        let registration = service.register_user(form("1020304050", "ana@example.com")).unwrap();

        let number: u32 = registration.account.account_number.parse().unwrap();
        assert!((ACCOUNT_NUMBER_MIN..=ACCOUNT_NUMBER_MAX).contains(&number));
        assert_eq!(registration.account.balance, 0);
        assert_eq!(registration.account.user_id, "1020304050");
        assert_eq!(
            registration.user.primary_account(),
            Some(registration.account.account_number.as_str())
        );
        assert_eq!(store.get_users().unwrap().len(), 1);
        assert_eq!(store.get_accounts().unwrap().len(), 1);
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let (service, store) = service();
        service.register_user(form("1020304050", "ana@example.com")).unwrap();

        let same_id = service.register_user(form("1020304050", "other@example.com"));
        assert!(matches!(same_id, Err(Error::AlreadyExists(_))));

        let same_email = service.register_user(form("999", "ANA@example.com"));
        assert!(matches!(same_email, Err(Error::AlreadyExists(_))));

        assert_eq!(store.get_users().unwrap().len(), 1);
        assert_eq!(store.get_accounts().unwrap().len(), 1);
    }

    #[test]
    fn test_register_validates_form() {
        let (service, _store) = service();
        let mut bad = form("1", "ana@example.com");
        bad.confirm_password = "different".to_string();
        assert!(matches!(service.register_user(bad), Err(Error::Validation(_))));
    }

    #[test]
    fn test_login_by_id_and_email() {
        let (service, _store) = service();
        service.register_user(form("1020304050", "ana@example.com")).unwrap();

        let by_id = service.login("1020304050", "secret123").unwrap();
        let by_email = service.login("ana@example.com", "secret123").unwrap();
        assert_eq!(by_id.account_number, by_email.account_number);
        assert_ne!(by_id.id, by_email.id);

        assert!(matches!(
            service.login("1020304050", "wrong"),
            Err(Error::InvalidCredentials)
        ));
        assert!(matches!(
            service.authenticate("ce", "1020304050", "secret123"),
            Err(Error::InvalidCredentials)
        ));
    }

    #[test]
    fn test_password_recovery() {
        let (service, _store) = service();
        service.register_user(form("1020304050", "ana@example.com")).unwrap();

        assert!(service
            .find_for_recovery("cc", "1020304050", "ana@example.com")
            .is_ok());
        assert!(matches!(
            service.find_for_recovery("cc", "1020304050", "else@example.com"),
            Err(Error::NotFound(_))
        ));

        let short = service.reset_password("cc", "1020304050", "ana@example.com", "short", "short");
        assert!(matches!(short, Err(Error::Validation(_))));
        let mismatch =
            service.reset_password("cc", "1020304050", "ana@example.com", "newpass123", "newpass124");
        assert!(matches!(mismatch, Err(Error::Validation(_))));

        service
            .reset_password("cc", "1020304050", "ana@example.com", "newpass123", "newpass123")
            .unwrap();
        assert!(service.login("1020304050", "newpass123").is_ok());
        assert!(service.login("1020304050", "secret123").is_err());
    }

    #[test]
    fn test_refresh_session_keeps_identity() {
        let (service, store) = service();
        service.register_user(form("1020304050", "ana@example.com")).unwrap();
        let session = service.login("1020304050", "secret123").unwrap();

        let refreshed = service.refresh_session(&session).unwrap();
        assert_eq!(refreshed.id, session.id);

        store.save_users(&[]).unwrap();
        assert!(matches!(
            service.refresh_session(&session),
            Err(Error::NotFound(_))
        ));
    }
}
