use poem_openapi::Object;
use serde::{Deserialize, Serialize};

#[derive(Object, Deserialize, Serialize, Debug)]
pub struct BadRequestResponse {
    pub message: String,
}

impl BadRequestResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(Object, Deserialize, Serialize, Debug)]
pub struct UnauthorizedResponse {
    pub message: String,
}

impl Default for UnauthorizedResponse {
    fn default() -> Self {
        Self {
            message: "Unauthorized".to_string(),
        }
    }
}

#[derive(Object, Deserialize, Serialize, Debug)]
pub struct ForbiddenResponse {
    pub message: String,
}

impl Default for ForbiddenResponse {
    fn default() -> Self {
        Self {
            message: "Forbidden".to_string(),
        }
    }
}

#[derive(Object, Deserialize, Serialize, Debug)]
pub struct NotFoundResponse {
    pub message: String,
}

impl Default for NotFoundResponse {
    fn default() -> Self {
        Self {
            message: "Not found".to_string(),
        }
    }
}

#[derive(Object, Deserialize, Serialize, Debug)]
pub struct InternalServerErrorResponse {
    pub location: String,
    pub function: String,
    pub step: String,
    pub message: String,
}

impl InternalServerErrorResponse {
    /// Logs the failure; the response carries where it happened.
    pub fn new(location: &str, function: &str, step: &str, message: &str) -> Self {
        tracing::error!("{location}::{function} failed at {step}: {message}");
        Self {
            location: location.to_string(),
            function: function.to_string(),
            step: step.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Object, Deserialize, Serialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
