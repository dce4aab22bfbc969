//! Session authentication: third-party identity first, local JWT fallback,
//! rate-limited anonymous accounts last.

use crate::security::rate_limiter::RateLimiter;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

const JWT_TTL_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("anonymous account creation rate limited for this address")]
    RateLimited,
    #[error("token invalid or expired")]
    InvalidToken,
    #[error("jwt signing failed: {0}")]
    Internal(String),
}

/// An identity resolved by a third-party provider (wallet signature, OAuth, …).
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    pub account_id: String,
    pub provider: String,
    pub roles: Vec<String>,
}

/// Pluggable third-party verification. Production wiring checks a wallet
/// signature or social OAuth token; tests and the anonymous-only deployment
/// use `NoThirdPartyVerifier`.
pub trait ThirdPartyVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Option<VerifiedIdentity>;
}

pub struct NoThirdPartyVerifier;

impl ThirdPartyVerifier for NoThirdPartyVerifier {
    fn verify(&self, _token: &str) -> Option<VerifiedIdentity> {
        None
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    sub: String,
    roles: Vec<String>,
    iat: u64,
    exp: u64,
}

/// Result of a successful authentication attempt.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub account_id: String,
    pub roles: Vec<String>,
    /// A freshly-minted local JWT, issued on every successful auth (including
    /// third-party and anonymous paths) so the client can reconnect with it.
    pub jwt: String,
    pub anonymous: bool,
}

/// Authentication chain owned by the connection handler.
pub struct Authenticator {
    jwt_secret: String,
    admin_code: Option<String>,
    dev_mode: bool,
    anonymous_rate_limiter: Arc<RateLimiter>,
    third_party: Arc<dyn ThirdPartyVerifier>,
}

impl Authenticator {
    pub fn new(
        jwt_secret: String,
        admin_code: Option<String>,
        dev_mode: bool,
        anonymous_rate_limiter: Arc<RateLimiter>,
        third_party: Arc<dyn ThirdPartyVerifier>,
    ) -> Self {
        Self { jwt_secret, admin_code, dev_mode, anonymous_rate_limiter, third_party }
    }

    fn now_secs() -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
    }

    /// Splits a stored comma-separated roles string into an array. `~admin`
    /// is only honored in development with no admin code configured;
    /// otherwise it is stripped rather than granted.
    fn expand_roles(&self, roles_csv: &str) -> Vec<String> {
        roles_csv
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .filter(|role| {
                if role == "~admin" {
                    self.dev_mode && self.admin_code.is_none()
                } else {
                    true
                }
            })
            .collect()
    }

    fn mint_jwt(&self, account_id: &str, roles: &[String]) -> Result<String, AuthError> {
        let iat = Self::now_secs();
        let claims = Claims { sub: account_id.to_string(), roles: roles.to_vec(), iat, exp: iat + JWT_TTL_SECS };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(self.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    fn decode_jwt(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &DecodingKey::from_secret(self.jwt_secret.as_bytes()), &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }

    /// Runs the full authentication chain for one connecting socket.
    pub async fn authenticate(&self, token: Option<&str>, remote_ip: IpAddr) -> Result<AuthOutcome, AuthError> {
        if let Some(token) = token {
            if let Some(identity) = self.third_party.verify(token) {
                let roles = self.expand_roles(&identity.roles.join(","));
                let jwt = self.mint_jwt(&identity.account_id, &roles)?;
                return Ok(AuthOutcome { account_id: identity.account_id, roles, jwt, anonymous: false });
            }

            if let Ok(claims) = self.decode_jwt(token) {
                let roles = self.expand_roles(&claims.roles.join(","));
                let jwt = self.mint_jwt(&claims.sub, &roles)?;
                return Ok(AuthOutcome { account_id: claims.sub, roles, jwt, anonymous: false });
            }
        }

        if !self.anonymous_rate_limiter.check_rate_limit(remote_ip).await {
            return Err(AuthError::RateLimited);
        }

        let account_id = format!("anon-{}", Uuid::new_v4());
        let roles = vec!["player".to_string()];
        let jwt = self.mint_jwt(&account_id, &roles)?;
        Ok(AuthOutcome { account_id, roles, jwt, anonymous: true })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::time::Duration;

    fn authenticator(dev_mode: bool, admin_code: Option<&str>) -> Authenticator {
        Authenticator::new(
            "test-secret".into(),
            admin_code.map(str::to_string),
            dev_mode,
            Arc::new(RateLimiter::new(5, Duration::from_secs(3600))),
            Arc::new(NoThirdPartyVerifier),
        )
    }

    fn ip() -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
    }

    #[tokio::test]
    async fn no_token_mints_anonymous_account() {
        let auth = authenticator(false, None);
        let outcome = auth.authenticate(None, ip()).await.unwrap();
        assert!(outcome.anonymous);
        assert!(outcome.account_id.starts_with("anon-"));
        assert_eq!(outcome.roles, vec!["player".to_string()]);
    }

    #[tokio::test]
    async fn anonymous_creation_is_rate_limited_per_ip() {
        let auth = authenticator(false, None);
        for _ in 0..5 {
            assert!(auth.authenticate(None, ip()).await.is_ok());
        }
        assert!(matches!(auth.authenticate(None, ip()).await, Err(AuthError::RateLimited)));
    }

    #[tokio::test]
    async fn valid_local_jwt_round_trips_to_same_account_id() {
        let auth = authenticator(false, None);
        let first = auth.authenticate(None, ip()).await.unwrap();

        let second = auth.authenticate(Some(&first.jwt), ip()).await.unwrap();
        assert_eq!(second.account_id, first.account_id);
        assert!(!second.anonymous);
    }

    #[tokio::test]
    async fn invalid_token_falls_back_to_anonymous() {
        let auth = authenticator(false, None);
        let outcome = auth.authenticate(Some("not-a-real-jwt"), ip()).await.unwrap();
        assert!(outcome.anonymous);
    }

    #[test]
    fn admin_role_stripped_outside_dev_mode() {
        let auth = authenticator(false, None);
        let roles = auth.expand_roles("player,~admin");
        assert_eq!(roles, vec!["player".to_string()]);
    }

    #[test]
    fn admin_role_stripped_when_admin_code_configured() {
        let auth = authenticator(true, Some("secret-code"));
        let roles = auth.expand_roles("player,~admin");
        assert_eq!(roles, vec!["player".to_string()]);
    }

    #[test]
    fn admin_role_granted_in_dev_mode_without_admin_code() {
        let auth = authenticator(true, None);
        let roles = auth.expand_roles("player,~admin");
        assert_eq!(roles, vec!["player".to_string(), "~admin".to_string()]);
    }
}
