//! Single-slot one-time code storage.
//!
//! Each subject has at most one live code per ledger; the engine keeps one
//! ledger per flow (KYC, contact update, transfer authorization). A code is
//! consumed only by a matching verify. Codes expire after the policy TTL and
//! lock after too many mismatches; requesting a new code clears both.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use super::{MemoryRepository, Repository};
use crate::error::{Error, Result};
use crate::ids::UserId;

#[derive(Debug, Clone)]
pub struct OtpPolicy {
    /// When set, every issued code is this value (mock/test deployments).
    pub fixed_code: Option<String>,
    pub length: u32,
    pub ttl: Duration,
    pub max_attempts: u32,
}

impl Default for OtpPolicy {
    fn default() -> Self {
        Self {
            fixed_code: Some("123456".to_string()),
            length: 6,
            ttl: Duration::minutes(10),
            max_attempts: 5,
        }
    }
}

impl OtpPolicy {
    fn generate_code(&self) -> String {
        if let Some(code) = &self.fixed_code {
            return code.clone();
        }
        let length = self.length.clamp(4, 9);
        let upper = 10u32.pow(length);
        let value = rand::thread_rng().gen_range(0..upper);
        format!("{:0width$}", value, width = length as usize)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OtpEntry<P> {
    pub code: String,
    pub payload: P,
    pub issued_at: DateTime<Utc>,
    pub attempts: u32,
}

pub struct OtpLedger<P, R = MemoryRepository<UserId, OtpEntry<P>>> {
    entries: R,
    policy: OtpPolicy,
    _payload: std::marker::PhantomData<P>,
}

impl<P: Clone> OtpLedger<P> {
    pub fn new(policy: OtpPolicy) -> Self {
        Self::with_repository(policy, MemoryRepository::new())
    }
}

impl<P, R> OtpLedger<P, R>
where
    P: Clone,
    R: Repository<UserId, OtpEntry<P>>,
{
    pub fn with_repository(policy: OtpPolicy, entries: R) -> Self {
        Self {
            entries,
            policy,
            _payload: std::marker::PhantomData,
        }
    }

    /// Issues a new code for `subject`, replacing any outstanding one.
    /// Returns the code for delivery to the user.
    pub fn request(&mut self, subject: UserId, payload: P, now: DateTime<Utc>) -> String {
        let code = self.policy.generate_code();
        self.entries.put(
            subject,
            OtpEntry {
                code: code.clone(),
                payload,
                issued_at: now,
                attempts: 0,
            },
        );
        code
    }

    /// Checks `supplied` against the outstanding code for `subject`.
    /// On a match the entry is consumed and its payload returned. A mismatch
    /// keeps the entry so the user can retry, up to the attempt limit.
    pub fn verify(&mut self, subject: UserId, supplied: &str, now: DateTime<Utc>) -> Result<P> {
        let mut entry = self.entries.get(&subject).ok_or(Error::OtpNotFound)?;

        if now - entry.issued_at > self.policy.ttl {
            self.entries.delete(&subject);
            return Err(Error::OtpExpired);
        }
        if entry.attempts >= self.policy.max_attempts {
            return Err(Error::OtpLocked);
        }
        if entry.code != supplied.trim() {
            entry.attempts += 1;
            tracing::warn!(%subject, attempts = entry.attempts, "OTP mismatch");
            self.entries.put(subject, entry);
            return Err(Error::InvalidOtp);
        }

        self.entries.delete(&subject);
        Ok(entry.payload)
    }

    /// Payload of the outstanding code, if any, without consuming it.
    pub fn pending_payload(&self, subject: UserId) -> Option<P> {
        self.entries.get(&subject).map(|entry| entry.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> OtpLedger<&'static str> {
        OtpLedger::new(OtpPolicy::default())
    }

    #[test]
    fn test_verify_consumes_on_match() {
        let mut ledger = ledger();
        let user = UserId::new();
        let now = Utc::now();

        let code = ledger.request(user, "bvn", now);
        assert_eq!(code, "123456");
        assert_eq!(ledger.verify(user, &code, now), Ok("bvn"));

        // Single use: the same code can't be replayed
        assert_eq!(ledger.verify(user, &code, now), Err(Error::OtpNotFound));
    }

    #[test]
    fn test_mismatch_keeps_entry_for_retry() {
        let mut ledger = ledger();
        let user = UserId::new();
        let now = Utc::now();

        ledger.request(user, "nin", now);
        assert_eq!(ledger.verify(user, "000000", now), Err(Error::InvalidOtp));
        assert!(ledger.pending_payload(user).is_some());
        assert_eq!(ledger.verify(user, "123456", now), Ok("nin"));
    }

    #[test]
    fn test_request_overwrites_previous_entry() {
        let mut ledger = ledger();
        let user = UserId::new();
        let now = Utc::now();

        ledger.request(user, "bvn", now);
        ledger.request(user, "nin", now);
        assert_eq!(ledger.verify(user, "123456", now), Ok("nin"));
    }

    #[test]
    fn test_expired_code_is_rejected_and_removed() {
        let mut ledger = ledger();
        let user = UserId::new();
        let issued = Utc::now();

        ledger.request(user, "bvn", issued);
        let later = issued + Duration::minutes(11);
        assert_eq!(ledger.verify(user, "123456", later), Err(Error::OtpExpired));
        assert!(ledger.pending_payload(user).is_none());
    }

    #[test]
    fn test_code_at_ttl_boundary_is_still_valid() {
        let mut ledger = ledger();
        let user = UserId::new();
        let issued = Utc::now();

        ledger.request(user, "bvn", issued);
        let boundary = issued + Duration::minutes(10);
        assert_eq!(ledger.verify(user, "123456", boundary), Ok("bvn"));
    }

    #[test]
    fn test_lockout_after_max_attempts() {
        let mut ledger = ledger();
        let user = UserId::new();
        let now = Utc::now();

        ledger.request(user, "bvn", now);
        for _ in 0..5 {
            assert_eq!(ledger.verify(user, "999999", now), Err(Error::InvalidOtp));
        }
        // Even the right code is refused once locked
        assert_eq!(ledger.verify(user, "123456", now), Err(Error::OtpLocked));

        // A fresh request clears the lock
        ledger.request(user, "bvn", now);
        assert_eq!(ledger.verify(user, "123456", now), Ok("bvn"));
    }

    #[test]
    fn test_subjects_are_independent() {
        let mut ledger = ledger();
        let alice = UserId::new();
        let bob = UserId::new();
        let now = Utc::now();

        ledger.request(alice, "bvn", now);
        assert_eq!(ledger.verify(bob, "123456", now), Err(Error::OtpNotFound));
        assert!(ledger.pending_payload(alice).is_some());
    }

    #[test]
    fn test_generated_codes_have_configured_length() {
        let policy = OtpPolicy {
            fixed_code: None,
            length: 6,
            ..OtpPolicy::default()
        };
        for _ in 0..50 {
            let code = policy.generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
