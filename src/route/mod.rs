pub mod auth;
#[cfg(test)]
mod auth_test;
pub mod contact;
#[cfg(test)]
mod contact_test;
pub mod dashboard;
pub mod notification;
#[cfg(test)]
mod notification_test;
pub mod pickup;
pub mod profile;
#[cfg(test)]
mod profile_test;
pub mod reward;
pub mod service_area;
pub mod staff;
pub mod waste_log;
#[cfg(test)]
mod waste_log_test;
pub mod waste_type;
