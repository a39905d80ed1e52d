use std::sync::Arc;

use chrono::Local;
use futures_util::StreamExt;
use poem::web::Data;
use poem_openapi::{
    payload::{EventStream, Json},
    OpenApi, Tags,
};

use crate::{
    core::{
        security::{get_user_from_token, BearerAuthorization},
        storage::{file_extension, sanitize_file_name, Bucket},
    },
    model::profile::Profile,
    repository::profile::{get_profile, update_profile, upsert_profile, ProfileChanges},
    schema::{
        common::{
            BadRequestResponse, InternalServerErrorResponse, NotFoundResponse,
            UnauthorizedResponse,
        },
        profile::{
            OnboardingRequest, OnboardingResponses, ProfileChangesResponses,
            ProfileDetailResponses, ProfilePictureRequest, ProfilePictureResponses,
            ProfileResponse, ProfileUpdateRequest, ProfileUpdateResponses,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiProfileTags {
    Profile,
}

pub struct ApiProfile;

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
}

#[OpenApi]
impl ApiProfile {
    #[oai(path = "/profile/", method = "get", tag = "ApiProfileTags::Profile")]
    async fn profile_detail_api(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ProfileDetailResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ProfileDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "profile_detail_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return ProfileDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "profile_detail_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let jwt_token = auth.0.token;
        let user = match get_user_from_token(&mut tx, &mut redis_conn, jwt_token.clone()).await {
            Ok(val) => val,
            Err(err) => {
                return ProfileDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "profile_detail_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return ProfileDetailResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let profile = match get_profile(&mut tx, &user.id).await {
            Ok(val) => val,
            Err(err) => {
                return ProfileDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "profile_detail_api",
                        "get_profile",
                        &err.to_string(),
                    ),
                ))
            }
        };
        match profile {
            Some(profile) => ProfileDetailResponses::Ok(Json(
                ProfileResponse::from(profile).with_email(&user.email),
            )),
            None => ProfileDetailResponses::NotFound(Json(NotFoundResponse::default())),
        }
    }

    #[oai(path = "/profile/", method = "put", tag = "ApiProfileTags::Profile")]
    async fn profile_update_api(
        &self,
        Json(json): Json<ProfileUpdateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ProfileUpdateResponses {
        let changes = ProfileChanges {
            first_name: non_blank(json.first_name),
            last_name: non_blank(json.last_name),
            nickname: non_blank(json.nickname),
            address: non_blank(json.address),
            phone: non_blank(json.phone),
            avatar_url: None,
            profile_pic: None,
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ProfileUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "profile_update_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return ProfileUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "profile_update_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let jwt_token = auth.0.token;
        let user = match get_user_from_token(&mut tx, &mut redis_conn, jwt_token.clone()).await {
            Ok(val) => val,
            Err(err) => {
                return ProfileUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "profile_update_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return ProfileUpdateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let profile = match get_profile(&mut tx, &user.id).await {
            Ok(val) => val,
            Err(err) => {
                return ProfileUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "profile_update_api",
                        "get_profile",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(mut profile) = profile else {
            return ProfileUpdateResponses::NotFound(Json(NotFoundResponse::default()));
        };

        if let Err(err) = update_profile(&mut tx, &mut profile, changes, None).await {
            return ProfileUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.profile",
                    "profile_update_api",
                    "update_profile",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = tx.commit().await {
            return ProfileUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.profile",
                    "profile_update_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        state.profile_feed.publish(&profile);
        ProfileUpdateResponses::Ok(Json(
            ProfileResponse::from(profile).with_email(&user.email),
        ))
    }

    #[oai(
        path = "/profile/onboarding",
        method = "post",
        tag = "ApiProfileTags::Profile"
    )]
    async fn profile_onboarding_api(
        &self,
        form: OnboardingRequest,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> OnboardingResponses {
        let (Some(first_name), Some(last_name)) =
            (non_blank(Some(form.first_name)), non_blank(Some(form.last_name)))
        else {
            return OnboardingResponses::BadRequest(Json(BadRequestResponse::new(
                "First name and last name are required",
            )));
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return OnboardingResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "profile_onboarding_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return OnboardingResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "profile_onboarding_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let jwt_token = auth.0.token;
        let user = match get_user_from_token(&mut tx, &mut redis_conn, jwt_token.clone()).await {
            Ok(val) => val,
            Err(err) => {
                return OnboardingResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "profile_onboarding_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return OnboardingResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let now = Local::now().fixed_offset();
        let profile = match get_profile(&mut tx, &user.id).await {
            Ok(val) => val,
            Err(err) => {
                return OnboardingResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "profile_onboarding_api",
                        "get_profile",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let mut profile = profile.unwrap_or_else(|| Profile::new(user.id, now));
        profile.first_name = Some(first_name);
        profile.last_name = Some(last_name);
        if let Some(address) = non_blank(form.address) {
            profile.address = Some(address);
        }
        if let Some(phone) = non_blank(form.phone) {
            profile.phone = Some(phone);
        }
        profile.updated_date = Some(now);

        if let Some(avatar) = form.avatar {
            let file_name = sanitize_file_name(avatar.file_name().unwrap_or("avatar"));
            let path = format!("public/{}_{}", now.timestamp_millis(), file_name);
            let data = match avatar.into_vec().await {
                Ok(val) => val,
                Err(err) => {
                    return OnboardingResponses::BadRequest(Json(BadRequestResponse {
                        message: err.to_string(),
                    }))
                }
            };
            let path = match state
                .storage
                .upload(Bucket::Avatars, &path, &data, false)
                .await
            {
                Ok(val) => val,
                Err(err) => {
                    return OnboardingResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.profile",
                            "profile_onboarding_api",
                            "upload avatar",
                            &err.to_string(),
                        ),
                    ))
                }
            };
            profile.avatar_url = Some(state.storage.public_url(Bucket::Avatars, &path));
        }

        let profile = match upsert_profile(&mut tx, &profile).await {
            Ok(val) => val,
            Err(err) => {
                return OnboardingResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "profile_onboarding_api",
                        "upsert_profile",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if let Err(err) = tx.commit().await {
            return OnboardingResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.profile",
                    "profile_onboarding_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        state.profile_feed.publish(&profile);
        OnboardingResponses::Ok(Json(
            ProfileResponse::from(profile).with_email(&user.email),
        ))
    }

    #[oai(
        path = "/profile/picture",
        method = "post",
        tag = "ApiProfileTags::Profile"
    )]
    async fn profile_picture_upload_api(
        &self,
        form: ProfilePictureRequest,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ProfilePictureResponses {
        let is_image = form
            .file
            .content_type()
            .map(|item| item.starts_with("image/"))
            .unwrap_or(false);
        if !is_image {
            return ProfilePictureResponses::BadRequest(Json(BadRequestResponse::new(
                "Profile picture must be an image",
            )));
        }
        let ext = form
            .file
            .file_name()
            .and_then(file_extension)
            .unwrap_or("png".to_string());

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ProfilePictureResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "profile_picture_upload_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return ProfilePictureResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "profile_picture_upload_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let jwt_token = auth.0.token;
        let user = match get_user_from_token(&mut tx, &mut redis_conn, jwt_token.clone()).await {
            Ok(val) => val,
            Err(err) => {
                return ProfilePictureResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "profile_picture_upload_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return ProfilePictureResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let profile = match get_profile(&mut tx, &user.id).await {
            Ok(val) => val,
            Err(err) => {
                return ProfilePictureResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "profile_picture_upload_api",
                        "get_profile",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(mut profile) = profile else {
            return ProfilePictureResponses::NotFound(Json(NotFoundResponse::default()));
        };

        let data = match form.file.into_vec().await {
            Ok(val) => val,
            Err(err) => {
                return ProfilePictureResponses::BadRequest(Json(BadRequestResponse {
                    message: err.to_string(),
                }))
            }
        };
        let path = format!("{}.{}", user.id, ext);
        let path = match state
            .storage
            .upload(Bucket::ProfilePics, &path, &data, true)
            .await
        {
            Ok(val) => val,
            Err(err) => {
                return ProfilePictureResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "profile_picture_upload_api",
                        "upload profile picture",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // a picture with another extension would be left behind
        let previous = profile
            .profile_pic
            .as_deref()
            .and_then(|url| state.storage.path_from_public_url(Bucket::ProfilePics, url))
            .filter(|item| *item != path);

        let changes = ProfileChanges {
            profile_pic: Some(Some(state.storage.public_url(Bucket::ProfilePics, &path))),
            ..Default::default()
        };
        if let Err(err) = update_profile(&mut tx, &mut profile, changes, None).await {
            return ProfilePictureResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.profile",
                    "profile_picture_upload_api",
                    "update_profile",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = tx.commit().await {
            return ProfilePictureResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.profile",
                    "profile_picture_upload_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        if let Some(previous) = previous {
            if let Err(err) = state.storage.remove(Bucket::ProfilePics, &previous).await {
                tracing::warn!("failed to remove old profile picture {previous}: {err}");
            }
        }
        state.profile_feed.publish(&profile);
        ProfilePictureResponses::Ok(Json(
            ProfileResponse::from(profile).with_email(&user.email),
        ))
    }

    #[oai(
        path = "/profile/picture",
        method = "delete",
        tag = "ApiProfileTags::Profile"
    )]
    async fn profile_picture_delete_api(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ProfilePictureResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ProfilePictureResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "profile_picture_delete_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return ProfilePictureResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "profile_picture_delete_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let jwt_token = auth.0.token;
        let user = match get_user_from_token(&mut tx, &mut redis_conn, jwt_token.clone()).await {
            Ok(val) => val,
            Err(err) => {
                return ProfilePictureResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "profile_picture_delete_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return ProfilePictureResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let profile = match get_profile(&mut tx, &user.id).await {
            Ok(val) => val,
            Err(err) => {
                return ProfilePictureResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "profile_picture_delete_api",
                        "get_profile",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(mut profile) = profile else {
            return ProfilePictureResponses::NotFound(Json(NotFoundResponse::default()));
        };
        let Some(url) = profile.profile_pic.clone() else {
            return ProfilePictureResponses::NotFound(Json(NotFoundResponse::default()));
        };

        let changes = ProfileChanges {
            profile_pic: Some(None),
            ..Default::default()
        };
        if let Err(err) = update_profile(&mut tx, &mut profile, changes, None).await {
            return ProfilePictureResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.profile",
                    "profile_picture_delete_api",
                    "update_profile",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = tx.commit().await {
            return ProfilePictureResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.profile",
                    "profile_picture_delete_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        // the row no longer points at the file, so a failed removal only leaves an orphan
        if let Some(path) = state.storage.path_from_public_url(Bucket::ProfilePics, &url) {
            if let Err(err) = state.storage.remove(Bucket::ProfilePics, &path).await {
                tracing::warn!("failed to remove profile picture {path}: {err}");
            }
        }
        state.profile_feed.publish(&profile);
        ProfilePictureResponses::Ok(Json(
            ProfileResponse::from(profile).with_email(&user.email),
        ))
    }

    /// Server-sent events carrying the caller's profile row after each change.
    #[oai(
        path = "/profile/changes",
        method = "get",
        tag = "ApiProfileTags::Profile"
    )]
    async fn profile_changes_api(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ProfileChangesResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ProfileChangesResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "profile_changes_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return ProfileChangesResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "profile_changes_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let jwt_token = auth.0.token;
        let user = match get_user_from_token(&mut tx, &mut redis_conn, jwt_token.clone()).await {
            Ok(val) => val,
            Err(err) => {
                return ProfileChangesResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "profile_changes_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return ProfileChangesResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let stream = state
            .profile_feed
            .watch(user.id)
            .map(ProfileResponse::from)
            .boxed();
        ProfileChangesResponses::Ok(EventStream::new(stream))
    }
}
