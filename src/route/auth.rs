use std::sync::Arc;

use chrono::{Duration, Local};
use poem::web::Data;
use poem_openapi::{payload::Json, OpenApi, Tags};
use redis::ConnectionLike;

use crate::{
    core::{
        otp::{issue_code, verify_code},
        security::{
            generate_refresh_token_from_user, generate_token_from_user,
            get_user_from_refresh_token, get_user_from_token, hash_password,
            verify_hash_password, BearerAuthorization,
        },
        session::{add_session, get_refresh_owner, remove_session, revoke_refresh_token},
        utils::datetime_to_string,
        validation::{validate_email, validate_signup, validate_verification_code},
    },
    model::{
        profile::Profile,
        user::{User, ROLE_USER},
    },
    repository::{
        profile::upsert_profile,
        user::{create_user, get_user_by_email, mark_user_verified},
    },
    schema::{
        auth::{
            LoginRequest, LoginResponse, LoginResponses, LogoutResponses, RefreshTokenRequest,
            RefreshTokenResponses, ResendRequest, ResendResponses, SignupRequest,
            SignupResponse, SignupResponses, VerifyRequest, VerifyResponses,
        },
        common::{
            BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, MessageResponse,
            UnauthorizedResponse,
        },
    },
    settings::Config,
    AppState,
};

#[derive(Tags)]
enum ApiAuthTags {
    Auth,
}

pub struct ApiAuth;

/// Creates a session for the user and describes it.
fn issue_tokens<C: ConnectionLike>(
    redis_conn: &mut C,
    user: &User,
    config: &Config,
) -> anyhow::Result<LoginResponse> {
    let token = generate_token_from_user(user, config)?;
    let refresh_token = generate_refresh_token_from_user(user, config)?;
    add_session(redis_conn, user, config, &token, &refresh_token)?;
    let now = Local::now().fixed_offset();
    let exp = now + Duration::minutes(config.jwt_exp as i64);
    let exp_refresh_token = now + Duration::minutes(config.jwt_refresh_exp as i64);
    Ok(LoginResponse {
        exp: datetime_to_string(exp),
        exp_in: config.jwt_exp as i64 * 60,
        exp_refresh_token: datetime_to_string(exp_refresh_token),
        refresh_token,
        token,
        token_type: "Bearer".to_string(),
        role: user.role.clone(),
    })
}

#[OpenApi]
impl ApiAuth {
    #[oai(path = "/auth/signup", method = "post", tag = "ApiAuthTags::Auth")]
    async fn auth_signup(
        &self,
        Json(json): Json<SignupRequest>,
        state: Data<&Arc<AppState>>,
    ) -> SignupResponses {
        // Form checks happen before touching the database
        if let Err(message) = validate_signup(&json.email, &json.password, &json.confirm_password)
        {
            return SignupResponses::BadRequest(Json(BadRequestResponse { message }));
        }

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return SignupResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_signup",
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
                return SignupResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_signup",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let existing = match get_user_by_email(&mut tx, &json.email).await {
            Ok(val) => val,
            Err(err) => {
                return SignupResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_signup",
                        "check user on database",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if existing.is_some() {
            return SignupResponses::BadRequest(Json(BadRequestResponse::new(
                "User already registered",
            )));
        }

        let hashed_password = match hash_password(&json.password) {
            Ok(val) => val,
            Err(err) => {
                return SignupResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_signup",
                        "hash password",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let now = Local::now().fixed_offset();
        let user = match create_user(
            &mut tx,
            &json.email,
            hashed_password,
            ROLE_USER,
            false,
            Some(now),
        )
        .await
        {
            Ok(val) => val,
            Err(err) => {
                return SignupResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_signup",
                        "create_user",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let mut profile = Profile::new(user.id, now);
        profile.first_name = json.first_name;
        profile.last_name = json.last_name;
        profile.address = json.address;
        if let Err(err) = upsert_profile(&mut tx, &profile).await {
            return SignupResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                "route.auth",
                "auth_signup",
                "upsert_profile",
                &err.to_string(),
            )));
        }

        if let Err(err) = tx.commit().await {
            return SignupResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                "route.auth",
                "auth_signup",
                "commit transaction",
                &err.to_string(),
            )));
        }

        if let Err(err) = issue_code(&mut redis_conn, &state.config, &user.email) {
            return SignupResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                "route.auth",
                "auth_signup",
                "issue verification code",
                &err.to_string(),
            )));
        }
        tracing::info!("user {} signed up", user.id);

        SignupResponses::Created(Json(SignupResponse {
            id: user.id.to_string(),
            email: user.email,
            message: "Check your email for the verification code".to_string(),
        }))
    }

    #[oai(path = "/auth/verify", method = "post", tag = "ApiAuthTags::Auth")]
    async fn auth_verify(
        &self,
        Json(json): Json<VerifyRequest>,
        state: Data<&Arc<AppState>>,
    ) -> VerifyResponses {
        if let Err(message) = validate_verification_code(&json.email, &json.code) {
            return VerifyResponses::BadRequest(Json(BadRequestResponse { message }));
        }

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return VerifyResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_verify",
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
                return VerifyResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_verify",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let user = match get_user_by_email(&mut tx, &json.email).await {
            Ok(val) => val,
            Err(err) => {
                return VerifyResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_verify",
                        "check user on database",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(mut user) = user else {
            return VerifyResponses::BadRequest(Json(BadRequestResponse::new(
                "Invalid or expired verification code",
            )));
        };
        if user.is_verified {
            return VerifyResponses::Ok(Json(MessageResponse::new("Email already verified")));
        }

        let is_valid = match verify_code(&mut redis_conn, &state.config, &user.email, &json.code) {
            Ok(val) => val,
            Err(err) => {
                return VerifyResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_verify",
                        "verify code",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !is_valid {
            return VerifyResponses::BadRequest(Json(BadRequestResponse::new(
                "Invalid or expired verification code",
            )));
        }

        if let Err(err) = mark_user_verified(&mut tx, &mut user, None).await {
            return VerifyResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                "route.auth",
                "auth_verify",
                "mark_user_verified",
                &err.to_string(),
            )));
        }
        if let Err(err) = tx.commit().await {
            return VerifyResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                "route.auth",
                "auth_verify",
                "commit transaction",
                &err.to_string(),
            )));
        }
        VerifyResponses::Ok(Json(MessageResponse::new("Verification successful")))
    }

    #[oai(path = "/auth/resend", method = "post", tag = "ApiAuthTags::Auth")]
    async fn auth_resend(
        &self,
        Json(json): Json<ResendRequest>,
        state: Data<&Arc<AppState>>,
    ) -> ResendResponses {
        if let Err(message) = validate_email(&json.email) {
            return ResendResponses::BadRequest(Json(BadRequestResponse { message }));
        }

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ResendResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_resend",
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
                return ResendResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_resend",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let user = match get_user_by_email(&mut tx, &json.email).await {
            Ok(val) => val,
            Err(err) => {
                return ResendResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_resend",
                        "check user on database",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let message = "If the account exists, a new verification code has been sent";
        let Some(user) = user else {
            return ResendResponses::Ok(Json(MessageResponse::new(message)));
        };
        if user.is_verified {
            return ResendResponses::BadRequest(Json(BadRequestResponse::new(
                "Email already verified",
            )));
        }
        if let Err(err) = issue_code(&mut redis_conn, &state.config, &user.email) {
            return ResendResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                "route.auth",
                "auth_resend",
                "issue verification code",
                &err.to_string(),
            )));
        }
        ResendResponses::Ok(Json(MessageResponse::new(message)))
    }

    #[oai(path = "/auth/login", method = "post", tag = "ApiAuthTags::Auth")]
    async fn auth_login(
        &self,
        Json(json): Json<LoginRequest>,
        state: Data<&Arc<AppState>>,
    ) -> LoginResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_login",
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
                return LoginResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                    "route.auth",
                    "auth_login",
                    "get redis pool connection",
                    &err.to_string(),
                )))
            }
        };

        let user = match get_user_by_email(&mut tx, &json.email).await {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_login",
                        "check user on database",
                        &err.to_string(),
                    ),
                ));
            }
        };
        let Some(user) = user else {
            return LoginResponses::BadRequest(Json(BadRequestResponse::new(
                "Invalid credentials",
            )));
        };

        // validate user password
        let is_valid = match verify_hash_password(&json.password, &user.password) {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                    "route.auth",
                    "auth_login",
                    "validate user password",
                    &err.to_string(),
                )))
            }
        };
        if !is_valid {
            return LoginResponses::BadRequest(Json(BadRequestResponse::new(
                "Invalid credentials",
            )));
        }
        if !user.is_verified {
            return LoginResponses::Forbidden(Json(ForbiddenResponse {
                message: "Email not confirmed".to_string(),
            }));
        }

        match issue_tokens(&mut redis_conn, &user, &state.config) {
            Ok(val) => LoginResponses::Ok(Json(val)),
            Err(err) => LoginResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                "route.auth",
                "auth_login",
                "issue tokens",
                &err.to_string(),
            ))),
        }
    }

    #[oai(
        path = "/auth/refresh-token",
        method = "post",
        tag = "ApiAuthTags::Auth"
    )]
    async fn auth_refresh_token(
        &self,
        Json(json): Json<RefreshTokenRequest>,
        state: Data<&Arc<AppState>>,
    ) -> RefreshTokenResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RefreshTokenResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_refresh_token",
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
                return RefreshTokenResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_refresh_token",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let refresh_token_user = match get_user_from_refresh_token(
            &mut tx,
            Some(json.refresh_token.clone()),
            &state.config,
        )
        .await
        {
            Ok(val) => val,
            Err(err) => {
                return RefreshTokenResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_refresh_token",
                        "get user from refresh token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(refresh_token_user) = refresh_token_user else {
            return RefreshTokenResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        // revoked refresh tokens are gone from redis
        let owner = match get_refresh_owner(&mut redis_conn, &json.refresh_token) {
            Ok(val) => val,
            Err(err) => {
                return RefreshTokenResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_refresh_token",
                        "get refresh token owner",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if owner != Some(refresh_token_user.id.to_string()) {
            return RefreshTokenResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        if let Err(err) = revoke_refresh_token(&mut redis_conn, &json.refresh_token) {
            return RefreshTokenResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.auth",
                    "auth_refresh_token",
                    "revoke refresh token",
                    &err.to_string(),
                ),
            ));
        }

        match issue_tokens(&mut redis_conn, &refresh_token_user, &state.config) {
            Ok(val) => RefreshTokenResponses::Ok(Json(val)),
            Err(err) => RefreshTokenResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.auth",
                    "auth_refresh_token",
                    "issue tokens",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(path = "/auth/logout", method = "post", tag = "ApiAuthTags::Auth")]
    async fn auth_logout(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> LogoutResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return LogoutResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_logout",
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
                return LogoutResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_logout",
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
                return LogoutResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_logout",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let (Some(_), Some(jwt_token)) = (user, jwt_token) else {
            return LogoutResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };
        if let Err(err) = remove_session(&mut redis_conn, jwt_token) {
            return LogoutResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                "route.auth",
                "auth_logout",
                "remove session",
                &err.to_string(),
            )));
        }
        LogoutResponses::NoContent
    }
}
