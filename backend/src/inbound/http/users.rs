//! Account API handlers.
//!
//! ```text
//! POST /api/register {"username":"ada","email":"ada@example.com","password":"analytical"}
//! POST /api/login {"username":"ada","password":"analytical"}
//! POST /api/logout
//! GET /api/user
//! PUT /api/user {"locale":"pt-BR"}
//! GET /api/admin/users
//! ```

use actix_web::{HttpRequest, HttpResponse, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    EmailAddress, Error, Locale, LoginCredentials, LoginValidationError, Plan, Registration,
    RegistrationValidationError, User, UserChanges, UserId, UserRole,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, field_error};

const USERNAME: FieldName = FieldName::new("username");
const EMAIL: FieldName = FieldName::new("email");
const PASSWORD: FieldName = FieldName::new("password");
const LOCALE: FieldName = FieldName::new("locale");

/// Registration request body for `POST /api/register`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub password: String,
    #[serde(default)]
    #[schema(example = "en")]
    pub locale: Option<String>,
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = RegistrationValidationError;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            &value.username,
            &value.email,
            &value.password,
            value.locale.as_deref(),
        )
    }
}

/// Login request body for `POST /api/login`.
///
/// Example JSON:
/// `{"username":"ada","password":"analytical"}`
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

/// Profile changes for `PUT /api/user`; absent fields stay unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
}

impl TryFrom<UpdateUserRequest> for UserChanges {
    type Error = Error;

    fn try_from(value: UpdateUserRequest) -> Result<Self, Self::Error> {
        let email = value
            .email
            .map(EmailAddress::new)
            .transpose()
            .map_err(|err| field_error(EMAIL, "invalid_email", err))?;
        let locale = value
            .locale
            .map(Locale::new)
            .transpose()
            .map_err(|err| field_error(LOCALE, "invalid_locale", err))?;
        Ok(Self { email, locale })
    }
}

/// Public projection of an account; the password hash never leaves the
/// server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub plan: Plan,
    pub role: UserRole,
    #[schema(example = "en")]
    pub locale: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            username: user.username().as_str().to_owned(),
            email: user.email().as_str().to_owned(),
            plan: user.plan(),
            role: user.role(),
            locale: user.locale().as_str().to_owned(),
            created_at: user.created_at(),
        }
    }
}

/// Body returned by registration and login.
///
/// `token` is present only when the server authenticates with bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserResponse,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

fn map_registration_error(err: RegistrationValidationError) -> Error {
    match err {
        RegistrationValidationError::Username(inner) => {
            field_error(USERNAME, "invalid_username", inner)
        }
        RegistrationValidationError::Email(inner) => field_error(EMAIL, "invalid_email", inner),
        err @ RegistrationValidationError::PasswordTooShort { .. } => {
            field_error(PASSWORD, "password_too_short", err)
        }
        RegistrationValidationError::Locale(inner) => field_error(LOCALE, "invalid_locale", inner),
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyUsername => field_error(USERNAME, "empty_username", err),
        LoginValidationError::EmptyPassword => field_error(PASSWORD, "empty_password", err),
    }
}

/// Create an account and sign the new user in.
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse,
            headers(("Set-Cookie" = String, description = "Session cookie in session mode"))),
        (status = 400, description = "Invalid request or duplicate account", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    req: HttpRequest,
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration =
        Registration::try_from(payload.into_inner()).map_err(map_registration_error)?;
    let user = state.accounts.register(registration).await?;
    let token = state.auth.sign_in(&req, user.id())?;
    Ok(HttpResponse::Created().json(AuthResponse {
        user: UserResponse::from(&user),
        token,
    }))
}

/// Verify credentials and sign the user in.
///
/// Unknown usernames and wrong passwords are indistinguishable to callers.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AuthResponse,
            headers(("Set-Cookie" = String, description = "Session cookie in session mode"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    req: HttpRequest,
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<AuthResponse>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let user = state.accounts.authenticate(&credentials).await?;
    let token = state.auth.sign_in(&req, user.id())?;
    Ok(web::Json(AuthResponse {
        user: UserResponse::from(&user),
        token,
    }))
}

/// End the current session. Bearer tokens stay valid until they expire.
#[utoipa::path(
    post,
    path = "/api/logout",
    responses((status = 200, description = "Logged out")),
    tags = ["users"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(req: HttpRequest, state: web::Data<HttpState>) -> HttpResponse {
    state.auth.sign_out(&req);
    HttpResponse::Ok().finish()
}

/// Return the signed-in user.
#[utoipa::path(
    get,
    path = "/api/user",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Login required", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/user")]
pub async fn current_user(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<UserResponse>> {
    let current = state.accounts.current_user(user.id()).await?;
    Ok(web::Json(UserResponse::from(&current)))
}

/// Update the signed-in user's email or locale.
#[utoipa::path(
    put,
    path = "/api/user",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateCurrentUser"
)]
#[put("/user")]
pub async fn update_current_user(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let changes = UserChanges::try_from(payload.into_inner())?;
    let updated = state.accounts.update_profile(user.id(), changes).await?;
    Ok(web::Json(UserResponse::from(&updated)))
}

/// List every account. Requires the admin role.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/admin/users")]
pub async fn list_users(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let users = state.accounts.list_users(user.id()).await?;
    Ok(web::Json(users.iter().map(UserResponse::from).collect()))
}
