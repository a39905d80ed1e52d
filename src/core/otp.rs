use argon2::password_hash::rand_core::{OsRng, RngCore};
use redis::ConnectionLike;

use crate::settings::Config;

/// Wrong guesses allowed before the stored code is discarded.
pub const MAX_ATTEMPTS: i64 = 5;

fn otp_key(email: &str) -> String {
    format!("otp:{}", email.trim().to_lowercase())
}

fn attempts_key(email: &str) -> String {
    format!("otp_attempts:{}", email.trim().to_lowercase())
}

pub fn generate_code() -> String {
    format!("{:06}", OsRng.next_u32() % 1_000_000)
}

/// Stores a fresh verification code for the email, replacing any previous one.
pub fn issue_code<C: ConnectionLike>(
    redis_conn: &mut C,
    config: &Config,
    email: &str,
) -> anyhow::Result<String> {
    let code = generate_code();
    redis::Cmd::set_ex(otp_key(email), &code, config.otp_exp).exec(redis_conn)?;
    redis::cmd("del").arg(attempts_key(email)).exec(redis_conn)?;
    deliver_code(email, &code);
    Ok(code)
}

// Mail delivery is not wired in; the code goes to the log sink.
fn deliver_code(email: &str, code: &str) {
    tracing::info!("verification code for {email}: {code}");
}

/// Consumes the code when it matches. Each miss is counted and the code is
/// dropped once `MAX_ATTEMPTS` misses have been made against it.
pub fn verify_code<C: ConnectionLike>(
    redis_conn: &mut C,
    config: &Config,
    email: &str,
    code: &str,
) -> anyhow::Result<bool> {
    let key = otp_key(email);
    let attempts = attempts_key(email);
    let stored: Option<String> = redis::cmd("get").arg(&key).query(redis_conn)?;
    let Some(stored) = stored else {
        return Ok(false);
    };
    if stored == code.trim() {
        redis::cmd("del").arg(&key).arg(&attempts).exec(redis_conn)?;
        return Ok(true);
    }

    let misses: i64 = redis::cmd("incr").arg(&attempts).query(redis_conn)?;
    if misses == 1 {
        redis::cmd("expire")
            .arg(&attempts)
            .arg(config.otp_exp)
            .exec(redis_conn)?;
    }
    if misses >= MAX_ATTEMPTS {
        tracing::warn!("too many verification attempts for {email}, code discarded");
        redis::cmd("del").arg(&key).arg(&attempts).exec(redis_conn)?;
    }
    Ok(false)
}

pub fn get_code<C: ConnectionLike>(
    redis_conn: &mut C,
    email: &str,
) -> anyhow::Result<Option<String>> {
    let res: Option<String> = redis::cmd("get").arg(otp_key(email)).query(redis_conn)?;
    Ok(res)
}
