use futures_util::stream::BoxStream;
use poem_openapi::{
    payload::{EventStream, Json},
    types::multipart::Upload,
    ApiResponse, Multipart, Object,
};
use serde::{Deserialize, Serialize};

use crate::{
    core::utils::datetime_to_string_opt,
    model::profile::Profile,
    schema::common::{
        BadRequestResponse, InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};

#[derive(Object, Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ProfileResponse {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub profile_pic: Option<String>,
    pub total_points: i32,
    pub created_date: Option<String>,
    pub updated_date: Option<String>,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id.to_string(),
            first_name: profile.first_name,
            last_name: profile.last_name,
            nickname: profile.nickname,
            email: None,
            address: profile.address,
            phone: profile.phone,
            avatar_url: profile.avatar_url,
            profile_pic: profile.profile_pic,
            total_points: profile.total_points,
            created_date: datetime_to_string_opt(profile.created_date),
            updated_date: datetime_to_string_opt(profile.updated_date),
        }
    }
}

impl ProfileResponse {
    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }
}

#[derive(ApiResponse)]
pub enum ProfileDetailResponses {
    #[oai(status = 200)]
    Ok(Json<ProfileResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize)]
pub struct ProfileUpdateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

#[derive(ApiResponse)]
pub enum ProfileUpdateResponses {
    #[oai(status = 200)]
    Ok(Json<ProfileResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Multipart)]
pub struct OnboardingRequest {
    pub first_name: String,
    pub last_name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<Upload>,
}

#[derive(ApiResponse)]
pub enum OnboardingResponses {
    #[oai(status = 200)]
    Ok(Json<ProfileResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Multipart)]
pub struct ProfilePictureRequest {
    pub file: Upload,
}

#[derive(ApiResponse)]
pub enum ProfilePictureResponses {
    #[oai(status = 200)]
    Ok(Json<ProfileResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum ProfileChangesResponses {
    #[oai(status = 200)]
    Ok(EventStream<BoxStream<'static, ProfileResponse>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
