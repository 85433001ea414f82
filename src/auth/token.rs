// JWT session token generation and validation service

use crate::auth::error::AuthError;
use crate::auth::models::Role;
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // user id
    pub email: String,
    pub role: Role,
    pub iat: i64, // issued at, unix seconds
    pub exp: i64, // expiry, unix seconds
}

/// Signs and verifies HS256 session tokens with a single shared secret
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_seconds: i64,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_seconds: ttl.as_secs() as i64,
        }
    }

    /// Session lifetime in seconds, also used as the cookie Max-Age
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Issue a token valid from now until now + TTL
    pub fn issue(&self, user_id: Uuid, email: &str, role: Role) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            role,
            iat: now,
            exp: now + self.ttl_seconds,
        };

        self.encode_claims(&claims)
    }

    /// Sign arbitrary claims
    pub fn encode_claims(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGenerationError(e.to_string()))
    }

    /// Validate signature and expiry and return the embedded claims
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SECRET: &str = "test_secret_key_for_testing_only";

    fn service() -> TokenService {
        TokenService::new(SECRET, Duration::from_secs(24 * 3600))
    }

    #[test]
    fn test_issue_and_validate_round_trip() {
        let service = service();
        let user_id = Uuid::new_v4();

        let token = service.issue(user_id, "admin@example.com", Role::Admin).unwrap();
        let claims = service.validate(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "admin@example.com");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = service();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            role: Role::User,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = service.encode_claims(&claims).unwrap();

        assert!(matches!(service.validate(&token), Err(AuthError::ExpiredToken)));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let other = TokenService::new("a-completely-different-secret", Duration::from_secs(3600));
        let token = other.issue(Uuid::new_v4(), "user@example.com", Role::User).unwrap();

        assert!(matches!(service().validate(&token), Err(AuthError::InvalidSignature)));
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let service = service();
        let token = service.issue(Uuid::new_v4(), "user@example.com", Role::User).unwrap();

        // Swap the payload for one claiming the admin role, keep the old signature
        let forged = service
            .issue(Uuid::new_v4(), "user@example.com", Role::Admin)
            .unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let tampered = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        assert!(matches!(service.validate(&tampered), Err(AuthError::InvalidSignature)));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let service = service();

        for garbage in ["", "not-a-jwt", "a.b", "a.b.c"] {
            let result = service.validate(garbage);
            assert!(
                matches!(result, Err(AuthError::MalformedToken)),
                "{:?} should be malformed, got {:?}",
                garbage,
                result
            );
        }
    }

    proptest! {
        #[test]
        fn prop_issued_tokens_carry_identity(
            email in "[a-z]{3,10}@[a-z]{3,10}\\.com",
            admin in any::<bool>(),
        ) {
            let service = service();
            let user_id = Uuid::new_v4();
            let role = if admin { Role::Admin } else { Role::User };

            let token = service.issue(user_id, &email, role)?;
            let claims = service.validate(&token)?;

            prop_assert_eq!(claims.sub, user_id);
            prop_assert_eq!(claims.email, email);
            prop_assert_eq!(claims.role, role);
            prop_assert!(claims.exp > claims.iat);
        }
    }
}
