use chrono::{DateTime, Utc};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Number of random bytes behind an invite token (256 bits)
pub const INVITE_TOKEN_BYTES: usize = 32;

/// Single-use, time-bounded permission to self-register with one email
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invite {
    pub id: Uuid,
    pub token: String,
    pub email: String,
    pub invited_by: Uuid,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Invite {
    /// An invite is redeemable iff it was never used and `now` is before expiry
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.used_at.is_none() && now < self.expires_at
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }
}

/// Data needed to insert an invite
#[derive(Debug, Clone)]
pub struct NewInvite {
    pub token: String,
    pub email: String,
    pub invited_by: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Admin form for issuing an invite
#[derive(Debug, Default, Deserialize)]
pub struct CreateInviteForm {
    #[serde(default)]
    pub email: String,
}

/// Generate an unguessable hex-encoded invite token from the OS entropy source
pub fn generate_invite_token() -> String {
    let mut bytes = [0u8; INVITE_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn invite(expires_at: DateTime<Utc>, used_at: Option<DateTime<Utc>>) -> Invite {
        Invite {
            id: Uuid::new_v4(),
            token: generate_invite_token(),
            email: "a@x.com".to_string(),
            invited_by: Uuid::new_v4(),
            expires_at,
            used_at,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_token_is_64_hex_chars() {
        let token = generate_invite_token();
        assert_eq!(token.len(), INVITE_TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_tokens_do_not_repeat() {
        let tokens: HashSet<String> = (0..1000).map(|_| generate_invite_token()).collect();
        assert_eq!(tokens.len(), 1000);
    }

    #[test]
    fn test_unused_unexpired_invite_is_valid() {
        let now = Utc::now();
        assert!(invite(now + Duration::days(7), None).is_valid_at(now));
    }

    #[test]
    fn test_used_invite_is_invalid() {
        let now = Utc::now();
        assert!(!invite(now + Duration::days(7), Some(now)).is_valid_at(now));
    }

    #[test]
    fn test_invite_is_invalid_at_exact_expiry() {
        let now = Utc::now();
        assert!(!invite(now, None).is_valid_at(now));
    }

    proptest! {
        #[test]
        fn prop_validity_is_unused_and_before_expiry(
            expires_in in -100_000i64..100_000,
            used in any::<bool>(),
        ) {
            let now = Utc::now();
            let used_at = if used { Some(now) } else { None };
            let candidate = invite(now + Duration::seconds(expires_in), used_at);

            prop_assert_eq!(candidate.is_valid_at(now), !used && expires_in > 0);
        }
    }
}
