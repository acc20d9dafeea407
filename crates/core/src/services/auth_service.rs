use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use chrono::{Duration, Utc};
use std::fmt::Write as _;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::user::{AuthToken, Credentials, Session, TokenPurpose, User};
use crate::storage::traits::{TokenStore, UserStore};

/// Shortest password accepted on registration and reset.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Reset tokens expire after one hour.
const RESET_TOKEN_LIFETIME_HOURS: i64 = 1;

/// Argon2id cost parameters used for password hashes.
#[derive(Debug, Clone, Copy)]
pub struct PasswordParams {
    /// Memory cost in KiB (default: 19456 = 19 MiB)
    pub memory_cost: u32,
    /// Number of iterations (default: 2)
    pub time_cost: u32,
    /// Degree of parallelism (default: 1)
    pub parallelism: u32,
}

impl Default for PasswordParams {
    fn default() -> Self {
        Self {
            memory_cost: 19_456,
            time_cost: 2,
            parallelism: 1,
        }
    }
}

impl PasswordParams {
    /// Minimal cost, for tests only.
    pub fn insecure_fast() -> Self {
        Self {
            memory_cost: 256,
            time_cost: 1,
            parallelism: 1,
        }
    }

    fn hasher(&self) -> Result<Argon2<'static>, CoreError> {
        let params = Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
            .map_err(|e| CoreError::Internal(format!("Invalid Argon2 params: {e}")))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Registration, login, bearer token resolution and password reset.
///
/// Session and reset tokens are opaque random hex strings kept in the
/// [`TokenStore`]; only their expiry decides validity.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn TokenStore>,
    session_lifetime: Duration,
    params: PasswordParams,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn TokenStore>,
        session_lifetime: Duration,
        params: PasswordParams,
    ) -> Self {
        Self {
            users,
            tokens,
            session_lifetime,
            params,
        }
    }

    pub fn register(&self, credentials: &Credentials) -> Result<Session, CoreError> {
        let email = require_email(&credentials.email)?;
        if credentials.password.trim().is_empty() {
            return Err(CoreError::InvalidInput("Password is required".into()));
        }
        check_password_strength(&credentials.password)?;

        if self.users.find_by_email(&email)?.is_some() {
            return Err(CoreError::InvalidInput("Email already registered".into()));
        }

        let user = User {
            id: Uuid::new_v4(),
            email,
            password_hash: self.hash_password(&credentials.password)?,
            created_at: Utc::now(),
        };
        let user = self.users.save(user)?;
        tracing::info!(user = %user.id, "User registered");

        self.open_session(&user)
    }

    /// Unknown email and wrong password fail identically.
    pub fn login(&self, credentials: &Credentials) -> Result<Session, CoreError> {
        let email = require_email(&credentials.email)?;
        if credentials.password.trim().is_empty() {
            return Err(CoreError::InvalidInput("Password is required".into()));
        }

        let user = match self.users.find_by_email(&email)? {
            Some(user) if verify_password(&credentials.password, &user.password_hash) => user,
            _ => {
                tracing::info!("Failed login attempt");
                return Err(CoreError::Unauthenticated("Invalid credentials".into()));
            }
        };

        tracing::info!(user = %user.id, "User logged in");
        self.open_session(&user)
    }

    /// Map a bearer token to its owner. Missing, expired and reset tokens
    /// are all rejected.
    pub fn resolve_owner(&self, token: &str) -> Result<Uuid, CoreError> {
        self.valid_token(token, TokenPurpose::Session)?
            .map(|t| t.user_id)
            .ok_or_else(|| CoreError::Unauthenticated("Invalid or expired token".into()))
    }

    pub fn logout(&self, token: &str) -> Result<(), CoreError> {
        self.tokens.remove(token.trim())
    }

    /// Issue a reset token when the email is known. Callers must answer
    /// the same way whether or not a token came back.
    pub fn forgot_password(&self, email: &str) -> Result<Option<String>, CoreError> {
        let email = require_email(email)?;
        let Some(user) = self.users.find_by_email(&email)? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(None);
        };

        let token = self.issue_token(
            user.id,
            TokenPurpose::PasswordReset,
            Duration::hours(RESET_TOKEN_LIFETIME_HOURS),
        )?;
        tracing::info!(user = %user.id, "Password reset token issued");
        Ok(Some(token.token))
    }

    pub fn validate_reset_token(&self, token: &str) -> Result<bool, CoreError> {
        Ok(self.valid_token(token, TokenPurpose::PasswordReset)?.is_some())
    }

    /// Set a new password and consume the reset token.
    pub fn reset_password(&self, token: &str, new_password: &str) -> Result<(), CoreError> {
        if token.trim().is_empty() {
            return Err(CoreError::InvalidInput("Token is required".into()));
        }
        check_password_strength(new_password)?;

        let invalid = || CoreError::InvalidInput("Invalid or expired token".into());
        let reset = self
            .valid_token(token, TokenPurpose::PasswordReset)?
            .ok_or_else(invalid)?;
        let mut user = self.users.find_by_id(reset.user_id)?.ok_or_else(invalid)?;

        user.password_hash = self.hash_password(new_password)?;
        self.users.save(user)?;
        self.tokens.remove(&reset.token)?;
        tracing::info!(user = %reset.user_id, "Password reset");
        Ok(())
    }

    // ── Internals ───────────────────────────────────────────────────

    fn open_session(&self, user: &User) -> Result<Session, CoreError> {
        let token = self.issue_token(user.id, TokenPurpose::Session, self.session_lifetime)?;
        Ok(Session {
            token: token.token,
            user_id: user.id,
            email: user.email.clone(),
            expires_at: token.expires_at,
        })
    }

    /// Expired tokens of every user are swept before the new one is stored.
    fn issue_token(&self, user_id: Uuid, purpose: TokenPurpose, lifetime: Duration) -> Result<AuthToken, CoreError> {
        let now = Utc::now();
        let purged = self.tokens.purge_expired(now)?;
        if purged > 0 {
            tracing::debug!(purged, "Expired tokens removed");
        }

        let token = AuthToken {
            token: random_token()?,
            user_id,
            purpose,
            expires_at: now + lifetime,
        };
        self.tokens.save(token.clone())?;
        Ok(token)
    }

    /// Expired tokens are dropped from the store on sight.
    fn valid_token(&self, token: &str, purpose: TokenPurpose) -> Result<Option<AuthToken>, CoreError> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(None);
        }
        let Some(found) = self.tokens.find(token)? else {
            return Ok(None);
        };
        if found.is_expired_at(Utc::now()) {
            self.tokens.remove(token)?;
            return Ok(None);
        }
        Ok((found.purpose == purpose).then_some(found))
    }

    fn hash_password(&self, password: &str) -> Result<String, CoreError> {
        let mut salt = [0u8; 16];
        getrandom::getrandom(&mut salt)
            .map_err(|e| CoreError::Internal(format!("Failed to generate random salt: {e}")))?;
        let salt = SaltString::encode_b64(&salt)
            .map_err(|e| CoreError::Internal(format!("Failed to encode salt: {e}")))?;

        self.params
            .hasher()?
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| CoreError::Internal(format!("Password hashing failed: {e}")))
    }
}

/// Verification reads the parameters from the PHC string itself.
fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

fn require_email(raw: &str) -> Result<String, CoreError> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(CoreError::InvalidInput("Email is required".into()));
    }
    Ok(email.to_lowercase())
}

fn check_password_strength(password: &str) -> Result<(), CoreError> {
    if password.trim().is_empty() || password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CoreError::InvalidInput(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// 256 random bits, hex encoded.
fn random_token() -> Result<String, CoreError> {
    let mut bytes = [0u8; 32];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| CoreError::Internal(format!("Failed to generate token: {e}")))?;
    let mut out = String::with_capacity(64);
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    Ok(out)
}
