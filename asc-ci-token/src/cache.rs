use core::time::Duration;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};

use crate::{Credential, IssueError, Issuer};

// reissue once less than this is left before exp
pub const REUSE_MARGIN: Duration = Duration::from_secs(60 * 5);

/// Holds the last issued credential and hands it out again until it is close to expiry.
#[derive(Debug, Default)]
pub struct CredentialCache {
    slot: ArcSwapOption<Credential>,
}

impl CredentialCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_issue(&self, issuer: &Issuer) -> Result<Arc<Credential>, IssueError> {
        self.get_or_issue_at(issuer, Utc::now())
    }

    pub fn get_or_issue_at(
        &self,
        issuer: &Issuer,
        now: DateTime<Utc>,
    ) -> Result<Arc<Credential>, IssueError> {
        if let Some(credential) = self.get_not_expired(now) {
            return Ok(credential);
        }

        let credential = Arc::new(issuer.issue_at(now)?);
        self.slot.store(Some(credential.clone()));
        Ok(credential)
    }

    pub fn clear(&self) {
        self.slot.store(None);
    }

    fn get_not_expired(&self, now: DateTime<Utc>) -> Option<Arc<Credential>> {
        let guard = self.slot.load();
        let credential = (*guard).as_ref()?;
        if now >= credential.issued_at() && credential.remaining_at(now) > REUSE_MARGIN {
            Some(credential.clone())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{
        tests::{ISSUER_ID, KEY_ID, P8_PRIVATE_KEY},
        SigningKey,
    };

    fn t(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_reuse_until_margin() {
        let issuer = Issuer::new(KEY_ID, ISSUER_ID, SigningKey::from_pem(P8_PRIVATE_KEY).unwrap());
        let cache = CredentialCache::new();

        let first = cache.get_or_issue_at(&issuer, t("2024-03-01T10:00:00Z")).unwrap();
        let again = cache.get_or_issue_at(&issuer, t("2024-03-01T10:14:59Z")).unwrap();
        assert_eq!(first.as_str(), again.as_str());

        // 5 minutes left
        let renewed = cache.get_or_issue_at(&issuer, t("2024-03-01T10:15:00Z")).unwrap();
        assert_ne!(first.as_str(), renewed.as_str());
        assert_eq!(renewed.issued_at(), t("2024-03-01T10:15:00Z"));
    }

    #[test]
    fn test_clear() {
        let issuer = Issuer::new(KEY_ID, ISSUER_ID, SigningKey::from_pem(P8_PRIVATE_KEY).unwrap());
        let cache = CredentialCache::new();

        let first = cache.get_or_issue_at(&issuer, t("2024-03-01T10:00:00Z")).unwrap();
        cache.clear();
        let second = cache.get_or_issue_at(&issuer, t("2024-03-01T10:00:01Z")).unwrap();
        assert_ne!(first.as_str(), second.as_str());
    }

    #[test]
    fn test_clock_moved_backwards() {
        let issuer = Issuer::new(KEY_ID, ISSUER_ID, SigningKey::from_pem(P8_PRIVATE_KEY).unwrap());
        let cache = CredentialCache::new();

        let first = cache.get_or_issue_at(&issuer, t("2024-03-01T10:00:00Z")).unwrap();
        let second = cache.get_or_issue_at(&issuer, t("2024-03-01T09:59:00Z")).unwrap();
        assert_ne!(first.as_str(), second.as_str());
    }
}
