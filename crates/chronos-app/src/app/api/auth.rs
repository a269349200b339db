//! Registration, login, logout and email confirmation.

use salvo::http::StatusCode;
use salvo::http::cookie::Cookie;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, Router, handler};
use serde::Deserialize;
use serde_json::json;

use chronos_core::constants::SESSION_COOKIE;
use chronos_service::user::Registration;

use crate::app::api::users::user_view;
use crate::error::{AppError, AppResult};
use crate::middleware::validate::{
    validate_email, validate_login, validate_password, validate_username,
};
use crate::state::get_state_from_depot;

/// Registration request payload
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    login: String,
    username: String,
    email: String,
    password: String,
    region: Option<String>,
}

/// Login request payload
#[derive(Debug, Deserialize)]
struct LoginRequest {
    /// Login or email address.
    identifier: String,
    password: String,
}

/// ## Summary
/// POST /api/auth/register - Create an account with its default calendar.
///
/// ## Errors
/// Returns HTTP 400 for shape violations, 409 for a taken login or email.
#[handler]
async fn register_handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<()> {
    let body: RegisterRequest = req
        .parse_json()
        .await
        .map_err(|_err| AppError::FieldValidation("Invalid request body".to_owned()))?;

    validate_login(&body.login)?;
    validate_username(&body.username)?;
    validate_email(&body.email)?;
    validate_password(&body.password)?;

    let state = get_state_from_depot(depot)?;
    let user = state
        .users
        .register(Registration {
            login: body.login,
            username: body.username,
            email: body.email,
            password: body.password,
            region: body.region,
        })
        .await?;

    res.status_code(StatusCode::CREATED);
    res.render(Json(json!({ "success": true, "user": user_view(&user) })));
    Ok(())
}

/// ## Summary
/// POST /api/auth/login - Verify credentials and issue a session.
///
/// The session lands in the `chronos_session` cookie; the token is also in
/// the body for clients without a cookie jar.
///
/// ## Errors
/// Returns HTTP 401 for an unknown identifier or wrong password.
#[handler]
async fn login_handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<()> {
    let body: LoginRequest = req
        .parse_json()
        .await
        .map_err(|_err| AppError::FieldValidation("Invalid request body".to_owned()))?;

    let state = get_state_from_depot(depot)?;
    let user = state.users.login(&body.identifier, &body.password).await?;
    let token = state.sessions.create(user.id);

    tracing::info!(user = %user.id, login = %user.login, "User logged in");

    res.add_cookie(
        Cookie::build((SESSION_COOKIE, token.clone()))
            .path("/")
            .http_only(true)
            .build(),
    );
    res.render(Json(json!({
        "success": true,
        "token": token,
        "user": user_view(&user),
    })));
    Ok(())
}

/// Resend-confirmation request payload
#[derive(Debug, Deserialize)]
struct ResendConfirmationRequest {
    email: String,
}

/// ## Summary
/// GET /api/auth/confirm-email?token=... - Confirm the address holding the
/// pending token. This is the link the confirmation email carries, so it is
/// public and a GET.
///
/// ## Errors
/// Returns HTTP 400 for a missing, unknown or already consumed token.
#[handler]
async fn confirm_email_handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<()> {
    let token = req
        .query::<String>("token")
        .ok_or_else(|| AppError::FieldValidation("Confirmation token is required".to_owned()))?;

    let state = get_state_from_depot(depot)?;
    let user = state.users.confirm_email(&token).await?;

    tracing::info!(user = %user.id, login = %user.login, "Email confirmed");
    res.render(Json(json!({
        "success": true,
        "message": "Email confirmed successfully",
    })));
    Ok(())
}

/// ## Summary
/// POST /api/auth/resend-confirmation - Rotate the pending token for an
/// unconfirmed address and hand it back to mail delivery.
///
/// ## Errors
/// Returns HTTP 404 for an unknown email, 400 when it is already confirmed.
#[handler]
async fn resend_confirmation_handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<()> {
    let body: ResendConfirmationRequest = req
        .parse_json()
        .await
        .map_err(|_err| AppError::FieldValidation("Invalid request body".to_owned()))?;
    validate_email(&body.email)?;

    let state = get_state_from_depot(depot)?;
    state.users.resend_confirmation(&body.email).await?;

    res.render(Json(json!({
        "success": true,
        "message": "Confirmation email sent. Please check your inbox.",
    })));
    Ok(())
}

/// ## Summary
/// POST /api/auth/logout - Revoke the current session.
///
/// Revoking an unknown or missing token is a no-op; logout never fails.
#[handler]
async fn logout_handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<()> {
    let state = get_state_from_depot(depot)?;

    let token = req
        .cookie(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .or_else(|| {
            req.header::<String>("authorization")
                .and_then(|header| header.strip_prefix("Bearer ").map(ToOwned::to_owned))
        });
    if let Some(token) = token {
        state.sessions.revoke(&token);
    }

    res.remove_cookie(SESSION_COOKIE);
    res.render(Json(json!({ "success": true, "message": "Logged out" })));
    Ok(())
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("auth")
        .push(Router::with_path("register").post(register_handler))
        .push(Router::with_path("login").post(login_handler))
        .push(Router::with_path("confirm-email").get(confirm_email_handler))
        .push(Router::with_path("resend-confirmation").post(resend_confirmation_handler))
        .push(Router::with_path("logout").post(logout_handler))
}
