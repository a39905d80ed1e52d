pub mod notification;
pub mod pickup;
pub mod reward;
pub mod waste_log;
pub mod waste_type;
