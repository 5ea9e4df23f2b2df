//! In-memory store of signup one-time passcodes.
//!
//! Codes live only in this process. Nothing sweeps the map: an expired code
//! is dropped the next time someone tries to verify it.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

pub const OTP_TTL_SECS: i64 = 5 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OtpError {
    #[error("No OTP found. Please request again.")]
    Missing,
    #[error("OTP expired")]
    Expired,
    #[error("Invalid OTP")]
    Mismatch,
}

#[derive(Debug)]
struct Entry {
    code: String,
    issued_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct OtpStore {
    entries: Mutex<HashMap<String, Entry>>,
    ttl: Duration,
}

impl Default for OtpStore {
    fn default() -> Self {
        OtpStore::new(Duration::seconds(OTP_TTL_SECS))
    }
}

pub fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

impl OtpStore {
    pub fn new(ttl: Duration) -> OtpStore {
        OtpStore {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issues a fresh code for `email`, replacing any previous one.
    pub fn issue(&self, email: &str) -> String {
        let code = generate_code();
        self.insert_at(email, &code, Utc::now());
        code
    }

    pub fn insert_at(&self, email: &str, code: &str, issued_at: DateTime<Utc>) {
        self.entries().insert(
            email.to_string(),
            Entry {
                code: code.to_string(),
                issued_at,
            },
        );
    }

    pub fn check(&self, email: &str, code: &str) -> Result<(), OtpError> {
        self.check_at(email, code, Utc::now())
    }

    /// Checks `code` without consuming it. An expired entry is removed.
    pub fn check_at(&self, email: &str, code: &str, now: DateTime<Utc>) -> Result<(), OtpError> {
        let mut entries = self.entries();
        let entry = entries.get(email).ok_or(OtpError::Missing)?;

        if now - entry.issued_at > self.ttl {
            entries.remove(email);
            return Err(OtpError::Expired);
        }
        if entry.code != code {
            return Err(OtpError::Mismatch);
        }
        Ok(())
    }

    pub fn consume(&self, email: &str) {
        self.entries().remove(email);
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMAIL: &str = "alex@example.com";

    #[test]
    fn codes_have_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn valid_until_five_minutes() {
        let store = OtpStore::default();
        let issued = Utc::now();
        store.insert_at(EMAIL, "123456", issued);

        let at_limit = issued + Duration::seconds(OTP_TTL_SECS);
        assert_eq!(store.check_at(EMAIL, "123456", at_limit), Ok(()));

        let past_limit = at_limit + Duration::seconds(1);
        assert_eq!(
            store.check_at(EMAIL, "123456", past_limit),
            Err(OtpError::Expired)
        );
        // purged on the failed attempt
        assert_eq!(
            store.check_at(EMAIL, "123456", issued),
            Err(OtpError::Missing)
        );
        assert!(store.is_empty());
    }

    #[test]
    fn expired_entries_stay_until_checked() {
        let store = OtpStore::default();
        store.insert_at(EMAIL, "123456", Utc::now() - Duration::hours(1));
        store.insert_at("sam@example.com", "654321", Utc::now() - Duration::hours(1));
        assert_eq!(store.len(), 2);

        assert_eq!(store.check(EMAIL, "123456"), Err(OtpError::Expired));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn mismatch_keeps_the_code() {
        let store = OtpStore::default();
        let code = store.issue(EMAIL);
        let wrong = if code == "111111" { "222222" } else { "111111" };

        assert_eq!(store.check(EMAIL, wrong), Err(OtpError::Mismatch));
        assert_eq!(store.check(EMAIL, &code), Ok(()));

        store.consume(EMAIL);
        assert_eq!(store.check(EMAIL, &code), Err(OtpError::Missing));
    }

    #[test]
    fn reissue_replaces_previous_code() {
        let store = OtpStore::default();
        store.insert_at(EMAIL, "111111", Utc::now());
        store.insert_at(EMAIL, "222222", Utc::now());

        assert_eq!(store.check(EMAIL, "111111"), Err(OtpError::Mismatch));
        assert_eq!(store.check(EMAIL, "222222"), Ok(()));
        assert_eq!(store.len(), 1);
    }
}
