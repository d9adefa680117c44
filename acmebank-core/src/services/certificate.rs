//! Certificate service - account holder certificates

use std::sync::Arc;

use chrono::Utc;

use crate::domain::result::{Error, Result};
use crate::domain::Certificate;
use crate::ports::Store;
use crate::services::users::Session;

pub struct CertificateService {
    store: Arc<dyn Store>,
    currency: String,
}

impl CertificateService {
    pub fn new(store: Arc<dyn Store>, currency: impl Into<String>) -> Self {
        Self {
            store,
            currency: currency.into(),
        }
    }

    /// Issue a certificate for the session's account with its current balance
    pub fn generate(&self, session: &Session) -> Result<Certificate> {
        let account = self
            .store
            .get_accounts()?
            .into_iter()
            .find(|a| a.account_number == session.account_number)
            .ok_or_else(|| Error::AccountNotFound(session.account_number.clone()))?;

        Ok(Certificate {
            holder_name: session.user.full_name(),
            id_type: session.user.id_type.clone(),
            id_number: session.user.id_number.clone(),
            account_number: account.account_number.clone(),
            account_type: account.type_label().to_string(),
            opened_at: account.created_at,
            balance: account.balance,
            currency: self.currency.clone(),
            issued_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::demo::{generate_demo_account, generate_demo_user};
    use crate::adapters::memory::MemoryStore;

    #[test]
    fn test_generate_uses_current_balance() {
        let mut account = generate_demo_account();
        account.balance = 42_000;
        let store = Arc::new(MemoryStore::with_accounts(vec![account]));
        let service = CertificateService::new(store, "COP");

        let session = Session::new(generate_demo_user()).unwrap();
        let cert = service.generate(&session).unwrap();
        assert_eq!(cert.holder_name, "Admin Demo");
        assert_eq!(cert.account_type, "Savings");
        assert_eq!(cert.balance, 42_000);
        assert!(cert.to_string().contains("$ 42.000"));
    }

    #[test]
    fn test_generate_missing_account() {
        let service = CertificateService::new(Arc::new(MemoryStore::new()), "COP");
        let session = Session::new(generate_demo_user()).unwrap();
        assert!(matches!(
            service.generate(&session),
            Err(Error::AccountNotFound(_))
        ));
    }
}
