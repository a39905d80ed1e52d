pub mod auth;
pub mod common;
pub mod contact;
pub mod dashboard;
pub mod notification;
pub mod pickup;
pub mod profile;
pub mod reward;
pub mod service_area;
pub mod staff;
pub mod waste_log;
pub mod waste_type;
