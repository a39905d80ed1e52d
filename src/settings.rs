use std::env;

use serde::Deserialize;
use tracing::info;

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    pub env: String, // file / server
    pub host: String,
    pub port: u16,
    pub prefix: Option<String>,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_exp: u16,
    pub jwt_refresh_exp: u16,
    pub redis_url: String,
    #[serde(default = "default_otp_exp")]
    pub otp_exp: u64, // seconds
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    #[serde(default = "default_storage_public_url")]
    pub storage_public_url: String,
}

fn default_otp_exp() -> u64 {
    900
}

fn default_storage_path() -> String {
    "./storage".to_string()
}

fn default_storage_public_url() -> String {
    "/storage".to_string()
}

pub fn get_config() -> Config {
    let env_var = env::var("env").unwrap_or("file".to_string());
    if env_var == "file" {
        info!("using .env file as environtment variable");
        let _ = dotenvy::dotenv();
    } else {
        info!("using server environtment as environtment variable");
    }
    match envy::from_env::<Config>() {
        Ok(config) => config,
        Err(err) => panic!("invalid environment configuration: {err}"),
    }
}
