pub mod db;
pub mod history;
pub mod otp;
pub mod pickup;
pub mod points;
pub mod realtime;
pub mod security;
pub mod session;
pub mod sqlx_utils;
pub mod storage;
pub mod test_utils;
pub mod utils;
pub mod validation;
