use std::sync::Arc;

use anyhow::{Context, Result};
use argon2::PasswordVerifier;
use argon2::{password_hash::SaltString, Argon2, PasswordHash};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use time::OffsetDateTime;

use crate::{
    db_helpers::{get_user_by_email, get_user_by_id, insert_user},
    errors::{AuthError, RequestError},
    models::User,
    AppState, LoginForm, RegisterForm,
};

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Serialize, Deserialize)]
struct AuthClaim {
    id: i64,
    exp: i64,
}

/// The party behind the current request, resolved once from the session
/// cookie and re-checked against the users table.
#[derive(Debug, Clone)]
pub enum Caller {
    Anonymous,
    User(User),
}

impl Caller {
    pub fn user(&self) -> Option<&User> {
        match self {
            Caller::Anonymous => None,
            Caller::User(user) => Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user().map_or(false, User::is_admin)
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync + 'static,
{
    type Rejection = RequestError;
    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let app = match parts.extensions.get::<Arc<AppState>>() {
            Some(app) => app.clone(),
            None => {
                tracing::error!("application state missing from request extensions");
                return Err(RequestError::ServerError);
            }
        };
        let jar = match CookieJar::from_request_parts(parts, state).await {
            Ok(jar) => jar,
            Err(never) => match never {},
        };
        let token = match jar.get(SESSION_COOKIE) {
            Some(cookie) => cookie.value().to_owned(),
            None => return Ok(Caller::Anonymous),
        };
        let id = match verify_jwt_token(&token, &app.config.secret_key) {
            Ok(id) => id,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring invalid session token");
                return Ok(Caller::Anonymous);
            }
        };
        match get_user_by_id(&app.pool, id).await? {
            Some(user) => Ok(Caller::User(user)),
            None => {
                tracing::debug!(user_id = id, "session refers to a missing user");
                Ok(Caller::Anonymous)
            }
        }
    }
}

// ----------------- Authorization -----------------

#[derive(Debug)]
pub enum Access<'a> {
    Allowed(&'a User),
    Forbidden,
    RequiresAuthentication,
}

/// Only the admin account may manage posts. Anonymous callers are asked to
/// authenticate before their role is considered.
pub fn authorize_admin(caller: &Caller) -> Access<'_> {
    match caller {
        Caller::Anonymous => Access::RequiresAuthentication,
        Caller::User(user) if user.is_admin() => Access::Allowed(user),
        Caller::User(_) => Access::Forbidden,
    }
}

pub fn require_admin(caller: &Caller) -> std::result::Result<&User, RequestError> {
    match authorize_admin(caller) {
        Access::Allowed(user) => Ok(user),
        Access::Forbidden => Err(RequestError::Forbidden),
        Access::RequiresAuthentication => Err(RequestError::LoginRequired),
    }
}

// ----------------- Account Flows -----------------

pub async fn register(pool: &SqlitePool, form: &RegisterForm) -> Result<User, AuthError> {
    let hash = hash_password_argon2(form.password.clone())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "password hashing failed");
            RequestError::RunTimeError("Could not register user, please try again")
        })?;
    let user = insert_user(pool, form.email.trim(), &hash, form.name.trim())
        .await
        .map_err(|e| match e {
            RequestError::Duplicate(_) => AuthError::DuplicateEmail,
            e => AuthError::Request(e),
        })?;
    tracing::info!(user_id = user.id, role = ?user.role, "registered user");
    Ok(user)
}

pub async fn login(pool: &SqlitePool, form: &LoginForm) -> Result<User, AuthError> {
    let user = match get_user_by_email(pool, form.email.trim()).await? {
        Some(user) => user,
        None => return Err(AuthError::EmailNotFound),
    };
    let is_password_correct = verify_password_argon2(form.password.clone(), &user.password)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "password verification failed");
            RequestError::RunTimeError("Could not login user, please try again")
        })?;
    if !is_password_correct {
        tracing::info!(user_id = user.id, "rejected login with wrong password");
        return Err(AuthError::InvalidPassword);
    }
    Ok(user)
}

/// Starts a session for `user` by adding a signed token cookie to the jar.
pub fn start_session(
    jar: CookieJar,
    user: &User,
    secret: &str,
    days: i64,
) -> std::result::Result<CookieJar, RequestError> {
    let token = get_jwt_token(user.id, secret, days).map_err(|e| {
        tracing::error!(error = %e, "could not sign session token");
        RequestError::ServerError
    })?;
    let cookie = Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish();
    Ok(jar.add(cookie))
}

pub fn end_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE, "").path("/").finish())
}

// ----------------- Tokens and Hashes -----------------

pub fn get_jwt_token(id: i64, secret: &str, days: i64) -> Result<String> {
    let expiry_date = OffsetDateTime::now_utc() + time::Duration::days(days);
    let claim = AuthClaim {
        id,
        exp: expiry_date.unix_timestamp(),
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claim,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_ref()),
    )
    .context("Failed to generate jwt token")
}

pub fn verify_jwt_token(token: &str, secret: &str) -> Result<i64> {
    let token_data = jsonwebtoken::decode::<AuthClaim>(
        token,
        &jsonwebtoken::DecodingKey::from_secret(secret.as_ref()),
        &jsonwebtoken::Validation::default(),
    )
    .context("Invalid token")?;
    let claim = token_data.claims;
    if claim.exp < OffsetDateTime::now_utc().unix_timestamp() {
        anyhow::bail!("Token expired");
    }
    Ok(claim.id)
}

pub async fn verify_password_argon2(password: String, hash: &str) -> Result<bool> {
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || {
        let hash = PasswordHash::new(hash.as_str())
            .map_err(|_| anyhow::anyhow!("Stored password hash is malformed"))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok())
    })
    .await
    .context("Failed to verify password")?
}

pub async fn hash_password_argon2(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(rand::thread_rng());
        let hash = PasswordHash::generate(Argon2::default(), password, salt.as_salt())
            .map_err(|_| anyhow::anyhow!("Failed to hash password"))?;
        Ok(hash.to_string())
    })
    .await
    .context("Failed to hash password")?
}
