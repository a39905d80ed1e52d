pub mod contact_message;
pub mod notification;
pub mod pickup;
pub mod profile;
pub mod reward;
pub mod service_area;
pub mod staff;
pub mod user;
pub mod waste_log;
pub mod waste_type;
