use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};
use chrono::{Duration, Local};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use poem::Request;
use poem_openapi::{auth::Bearer, SecurityScheme};
use redis::ConnectionLike;
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{model::user::User, repository::user::get_user_by_id, settings::Config};

use super::session::get_session;

/// password hashing
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);

    // Argon2 with default params (Argon2id v19)
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)?
        .to_string();

    Ok(password_hash)
}

/// password hash verification
pub fn verify_hash_password(
    password: &str,
    password_hash: &str,
) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(password_hash)?;
    let verify = Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok();
    Ok(verify)
}

#[cfg(test)]
mod test_hash_password {
    use super::*;

    #[test]
    fn test_hashing_password() {
        let password = "secretpassword";
        let hash = hash_password(password);
        assert!(hash.is_ok());
        let hash = hash.unwrap();
        let verify = verify_hash_password(password, &hash);
        assert!(verify.is_ok());
        assert!(verify.unwrap());
        let verify_false = verify_hash_password("wrongpassword", &hash);
        assert!(verify_false.is_ok());
        assert!(!verify_false.unwrap());
    }
}

pub struct Keys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
}

impl Keys {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub id: String,
    pub email: String,
    pub role: String,
    pub exp: i64,
    /// Unique per issued token.
    pub jti: String,
}

impl Claims {
    pub fn new(user: &User, config: &Config) -> Self {
        let exp = (Local::now() + Duration::minutes(config.jwt_exp as i64)).timestamp();
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.clone(),
            exp,
            jti: Uuid::now_v7().to_string(),
        }
    }
}

pub fn encode_token(claims: &Claims, jwt_secret: &str) -> anyhow::Result<String> {
    let keys = Keys::new(jwt_secret.as_bytes());
    let token = encode(&Header::default(), &claims, &keys.encoding)?;
    Ok(token)
}

/// Extract payload and Validate token
pub fn decode_token(token: &str, jwt_secret: &str) -> anyhow::Result<Claims> {
    let keys = Keys::new(jwt_secret.as_bytes());
    let token_data = decode::<Claims>(token, &keys.decoding, &Validation::default())?;
    Ok(token_data.claims)
}

pub fn generate_token_from_user(user: &User, config: &Config) -> anyhow::Result<String> {
    let claims = Claims::new(user, config);
    encode_token(&claims, &config.jwt_secret)
}

/// Resolves the bearer token through the session store. Tokens without a
/// live session, or whose user is gone, give `None`.
pub async fn get_user_from_token<C: ConnectionLike>(
    tx: &mut Transaction<'_, Postgres>,
    redis_conn: &mut C,
    jwt_token: Option<String>,
) -> anyhow::Result<Option<User>> {
    let Some(jwt_token) = jwt_token else {
        return Ok(None);
    };
    let Some(session) = get_session(redis_conn, jwt_token)? else {
        return Ok(None);
    };
    let user_id = Uuid::parse_str(&session.user_id)?;
    let user = get_user_by_id(tx, &user_id).await?;
    Ok(user)
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClaimsRefresh {
    pub id: String,
    pub email: String,
    pub exp: i64,
    pub jti: String,
    pub type_key: String,
}

impl ClaimsRefresh {
    pub fn new(user: &User, config: &Config) -> Self {
        let exp = (Local::now() + Duration::minutes(config.jwt_refresh_exp as i64)).timestamp();
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            exp,
            jti: Uuid::now_v7().to_string(),
            type_key: "refresh".to_string(),
        }
    }
}

pub fn encode_refresh_token(claims: &ClaimsRefresh, jwt_secret: &str) -> anyhow::Result<String> {
    let keys = Keys::new(jwt_secret.as_bytes());
    let token = encode(&Header::default(), &claims, &keys.encoding)?;
    Ok(token)
}

/// Extract payload and Validate referesh token
pub fn decode_refresh_token(token: &str, jwt_secret: &str) -> anyhow::Result<ClaimsRefresh> {
    let keys = Keys::new(jwt_secret.as_bytes());
    let token_data = decode::<ClaimsRefresh>(token, &keys.decoding, &Validation::default())?;
    if token_data.claims.type_key != "refresh" {
        anyhow::bail!("not a refresh token");
    }
    Ok(token_data.claims)
}

pub fn generate_refresh_token_from_user(user: &User, config: &Config) -> anyhow::Result<String> {
    let claims = ClaimsRefresh::new(user, config);
    encode_refresh_token(&claims, &config.jwt_secret)
}

/// Invalid or expired refresh tokens give `None`.
pub async fn get_user_from_refresh_token(
    tx: &mut Transaction<'_, Postgres>,
    refresh_token: Option<String>,
    config: &Config,
) -> anyhow::Result<Option<User>> {
    let Some(refresh_token) = refresh_token else {
        return Ok(None);
    };
    let claims = match decode_refresh_token(&refresh_token, &config.jwt_secret) {
        Ok(val) => val,
        Err(err) => {
            tracing::debug!("rejected refresh token: {err}");
            return Ok(None);
        }
    };
    let user_id = Uuid::parse_str(&claims.id)?;
    let user = get_user_by_id(tx, &user_id).await?;
    Ok(user)
}

#[cfg(test)]
mod test_tokens {
    use chrono::Local;
    use uuid::Uuid;

    use super::*;

    fn config() -> Config {
        Config {
            env: "server".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8000,
            prefix: None,
            database_url: "postgres://localhost/bioloop_hub".to_string(),
            jwt_secret: "secret".to_string(),
            jwt_exp: 10,
            jwt_refresh_exp: 60,
            redis_url: "redis://localhost".to_string(),
            otp_exp: 60,
            storage_path: "./storage".to_string(),
            storage_public_url: "/storage".to_string(),
        }
    }

    fn user() -> User {
        let now = Local::now().fixed_offset();
        User {
            id: Uuid::now_v7(),
            email: "jane@example.com".to_string(),
            password: "hash".to_string(),
            role: "user".to_string(),
            is_verified: true,
            created_date: Some(now),
            updated_date: Some(now),
            deleted_date: None,
        }
    }

    #[test]
    fn test_token_round_trip() -> anyhow::Result<()> {
        let config = config();
        let user = user();
        let token = generate_token_from_user(&user, &config)?;
        let claims = decode_token(&token, &config.jwt_secret)?;
        assert_eq!(claims.id, user.id.to_string());
        assert_eq!(claims.email, user.email);
        assert!(decode_token(&token, "other secret").is_err());
        assert_ne!(token, generate_token_from_user(&user, &config)?);
        Ok(())
    }

    #[test]
    fn test_access_token_is_not_a_refresh_token() -> anyhow::Result<()> {
        let config = config();
        let user = user();
        let refresh_token = generate_refresh_token_from_user(&user, &config)?;
        assert!(decode_refresh_token(&refresh_token, &config.jwt_secret).is_ok());
        let token = generate_token_from_user(&user, &config)?;
        assert!(decode_refresh_token(&token, &config.jwt_secret).is_err());
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserApiKey {
    pub token: Option<String>,
}

/// ApiKey authorization
#[derive(SecurityScheme)]
#[oai(ty = "bearer", checker = "bearer_checker")]
pub struct BearerAuthorization(pub UserApiKey);

pub async fn bearer_checker(_req: &Request, api_key: Bearer) -> Option<UserApiKey> {
    Some(UserApiKey {
        token: Some(api_key.token),
    })
}
