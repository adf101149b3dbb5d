// storefront-api/src/services/auth_service.rs

//! Registration, login, password hashing/verification and session tokens.

use crate::errors::{AppError, Result};
use crate::models::{PublicUser, Role, User};
use argon2::{
  password_hash::{
    rand_core::OsRng, // For generating random salts
    PasswordHash,
    PasswordHasher,
    PasswordVerifier,
    SaltString,
  },
  Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Session tokens are valid for 7 days.
const TOKEN_VALIDITY_DAYS: i64 = 7;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
  pub name: String,
  pub email: String,
  pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
  pub email: String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthOutcome {
  pub user: PublicUser,
  pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
  pub sub: Uuid,
  pub iat: i64,
  pub exp: i64,
}

/// Hashes a plain-text password using Argon2 with a fresh random salt.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String> {
  if password.is_empty() {
    return Err(AppError::Validation("Password cannot be empty.".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  let argon2_hasher = Argon2::default();

  match argon2_hasher.hash_password(password.as_bytes(), &salt) {
    Ok(password_hash_obj) => Ok(password_hash_obj.to_string()),
    Err(argon_err) => {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      Err(AppError::Internal(format!("Password hashing process failed: {}", argon_err)))
    }
  }
}

/// Verifies a plain-text password against a stored Argon2 hash.
///
/// Returns `Ok(false)` on a mismatch; only hash-format or internal failures
/// are surfaced as errors.
#[instrument(name = "auth_service::verify_password", skip_all, err(Display))]
pub fn verify_password(hashed_password_str: &str, provided_password: &str) -> Result<bool> {
  let parsed_hash = match PasswordHash::new(hashed_password_str) {
    Ok(ph) => ph,
    Err(parse_err) => {
      error!(error = %parse_err, "Failed to parse stored password hash string.");
      return Err(AppError::Internal(format!("Invalid stored password hash format: {}", parse_err)));
    }
  };

  let argon2_verifier = Argon2::default();
  match argon2_verifier.verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => Ok(false),
    Err(other_argon_err) => {
      error!(error = %other_argon_err, "Argon2 password verification process encountered an error.");
      Err(AppError::Internal(format!(
        "Password verification process failed: {}",
        other_argon_err
      )))
    }
  }
}

/// Issues a signed session token encoding the user id, expiring in 7 days.
pub fn issue_token(user_id: Uuid, secret: &str) -> Result<String> {
  let now = Utc::now();
  let claims = Claims {
    sub: user_id,
    iat: now.timestamp(),
    exp: (now + Duration::days(TOKEN_VALIDITY_DAYS)).timestamp(),
  };
  encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).map_err(|e| {
    error!(error = %e, "Failed to sign session token.");
    AppError::Internal(format!("Token signing failed: {}", e))
  })
}

/// Verifies a token's signature and expiry and returns the user id it names.
pub fn decode_token(token: &str, secret: &str) -> Result<Uuid> {
  decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &Validation::default())
    .map(|data| data.claims.sub)
    .map_err(|e| {
      debug!(error = %e, "Session token verification failed.");
      AppError::Unauthorized("Invalid or expired token".to_string())
    })
}

fn validate_registration(payload: &RegisterPayload) -> Result<()> {
  if payload.name.trim().is_empty() {
    return Err(AppError::Validation("Name is required.".to_string()));
  }
  if payload.email.is_empty() || !payload.email.contains('@') {
    return Err(AppError::Validation("Valid email is required.".to_string()));
  }
  if payload.password.len() < 6 {
    return Err(AppError::Validation(
      "Password must be at least 6 characters long.".to_string(),
    ));
  }
  Ok(())
}

/// Registers a new user account and issues a session token.
///
/// Fails with Conflict if the email is already registered (case-insensitive).
#[instrument(name = "auth_service::register", skip(pool, payload, jwt_secret), fields(email = %payload.email))]
pub async fn register(pool: &PgPool, payload: RegisterPayload, jwt_secret: &str) -> Result<AuthOutcome> {
  validate_registration(&payload)?;
  let email = payload.email.trim().to_lowercase();

  let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
    .bind(&email)
    .fetch_one(pool)
    .await?;
  if exists {
    warn!("Attempt to register with existing email.");
    return Err(AppError::Conflict("Email already registered".to_string()));
  }

  let password_hash = hash_password(&payload.password)?;

  let user: User = sqlx::query_as(
    "INSERT INTO users (name, email, password_hash, role) VALUES ($1, $2, $3, $4) \
     RETURNING id, name, email, password_hash, role, created_at, updated_at",
  )
  .bind(payload.name.trim())
  .bind(&email)
  .bind(&password_hash)
  .bind(Role::User)
  .fetch_one(pool)
  .await?;

  info!(user_id = %user.id, "User registered.");
  let token = issue_token(user.id, jwt_secret)?;
  Ok(AuthOutcome { user: user.into(), token })
}

/// Authenticates a login attempt.
///
/// Unknown email and wrong password both produce the same Unauthorized
/// message, so callers cannot enumerate accounts.
#[instrument(name = "auth_service::login", skip(pool, payload, jwt_secret), fields(email = %payload.email))]
pub async fn login(pool: &PgPool, payload: LoginPayload, jwt_secret: &str) -> Result<AuthOutcome> {
  let email = payload.email.trim().to_lowercase();

  let user: Option<User> = sqlx::query_as(
    "SELECT id, name, email, password_hash, role, created_at, updated_at FROM users WHERE email = $1",
  )
  .bind(&email)
  .fetch_optional(pool)
  .await?;

  let user = match user {
    Some(u) => u,
    None => {
      warn!("Login attempt for unknown email.");
      return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }
  };

  if !verify_password(&user.password_hash, &payload.password)? {
    warn!(user_id = %user.id, "Login attempt with wrong password.");
    return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
  }

  info!(user_id = %user.id, "Login successful.");
  let token = issue_token(user.id, jwt_secret)?;
  Ok(AuthOutcome { user: user.into(), token })
}

/// Resolves an authenticated user id to its account record.
pub async fn fetch_user(pool: &PgPool, user_id: Uuid) -> Result<User> {
  sqlx::query_as("SELECT id, name, email, password_hash, role, created_at, updated_at FROM users WHERE id = $1")
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hash_then_verify_round_trip() {
    let hash = hash_password("correct horse battery staple").unwrap();
    assert!(verify_password(&hash, "correct horse battery staple").unwrap());
    assert!(!verify_password(&hash, "wrong password").unwrap());
  }

  #[test]
  fn empty_password_is_rejected() {
    assert!(matches!(hash_password(""), Err(AppError::Validation(_))));
  }

  #[test]
  fn issued_token_round_trips() {
    let user_id = Uuid::new_v4();
    let token = issue_token(user_id, "test-secret").unwrap();
    assert_eq!(decode_token(&token, "test-secret").unwrap(), user_id);
  }

  #[test]
  fn token_with_wrong_secret_is_rejected() {
    let token = issue_token(Uuid::new_v4(), "secret-a").unwrap();
    assert!(matches!(
      decode_token(&token, "secret-b"),
      Err(AppError::Unauthorized(_))
    ));
  }

  #[test]
  fn garbage_token_is_rejected() {
    assert!(matches!(
      decode_token("not.a.token", "test-secret"),
      Err(AppError::Unauthorized(_))
    ));
  }

  #[test]
  fn registration_payload_validation() {
    let valid = RegisterPayload {
      name: "Ada".to_string(),
      email: "ada@example.com".to_string(),
      password: "hunter22".to_string(),
    };
    assert!(validate_registration(&valid).is_ok());

    let no_at = RegisterPayload {
      name: "Ada".to_string(),
      email: "ada.example.com".to_string(),
      password: "hunter22".to_string(),
    };
    assert!(validate_registration(&no_at).is_err());

    let short_password = RegisterPayload {
      name: "Ada".to_string(),
      email: "ada@example.com".to_string(),
      password: "abc".to_string(),
    };
    assert!(validate_registration(&short_password).is_err());
  }
}
