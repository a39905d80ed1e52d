use redis::ConnectionLike;
use serde::{Deserialize, Serialize};

use crate::{model::user::User, settings::Config};

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: String,
    pub refresh_token: String,
}

fn session_key(token: &str) -> String {
    format!("session:{token}")
}

fn refresh_key(refresh_token: &str) -> String {
    format!("refresh:{refresh_token}")
}

/// Registers an access token session and its refresh token. Both expire
/// with their JWTs.
pub fn add_session<C: ConnectionLike>(
    redis_conn: &mut C,
    user: &User,
    config: &Config,
    token: &str,
    refresh_token: &str,
) -> anyhow::Result<()> {
    let session_data = SessionData {
        user_id: user.id.to_string(),
        refresh_token: refresh_token.to_string(),
    };
    let session_json = serde_json::to_string(&session_data)?;
    redis::Cmd::set_ex(
        session_key(token),
        session_json,
        config.jwt_exp as u64 * 60,
    )
    .exec(redis_conn)?;
    redis::Cmd::set_ex(
        refresh_key(refresh_token),
        user.id.to_string(),
        config.jwt_refresh_exp as u64 * 60,
    )
    .exec(redis_conn)?;
    Ok(())
}

pub fn get_session<C: ConnectionLike>(
    redis_conn: &mut C,
    token: String,
) -> anyhow::Result<Option<SessionData>> {
    let res: Option<String> = redis::cmd("get")
        .arg(session_key(&token))
        .query(redis_conn)?;
    let Some(res) = res else {
        return Ok(None);
    };
    let session_data: SessionData = serde_json::from_str(res.as_str())?;
    Ok(Some(session_data))
}

/// User id the refresh token was issued to, while it has not been revoked.
pub fn get_refresh_owner<C: ConnectionLike>(
    redis_conn: &mut C,
    refresh_token: &str,
) -> anyhow::Result<Option<String>> {
    let res: Option<String> = redis::cmd("get")
        .arg(refresh_key(refresh_token))
        .query(redis_conn)?;
    Ok(res)
}

pub fn revoke_refresh_token<C: ConnectionLike>(
    redis_conn: &mut C,
    refresh_token: &str,
) -> anyhow::Result<()> {
    redis::cmd("del")
        .arg(refresh_key(refresh_token))
        .exec(redis_conn)?;
    Ok(())
}

/// Drops the session and the refresh token bound to it.
pub fn remove_session<C: ConnectionLike>(
    redis_conn: &mut C,
    token: String,
) -> anyhow::Result<bool> {
    let Some(session_data) = get_session(redis_conn, token.clone())? else {
        return Ok(false);
    };
    revoke_refresh_token(redis_conn, &session_data.refresh_token)?;
    redis::cmd("del").arg(session_key(&token)).exec(redis_conn)?;
    Ok(true)
}
