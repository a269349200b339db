//! Account profile routes.

use salvo::writing::Json;
use salvo::{Depot, Request, Response, Router, handler};
use serde::Deserialize;
use serde_json::{Value, json};

use chronos_db::model::User;
use chronos_service::calendar::CalendarEntry;
use chronos_service::user::ProfileUpdate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::current_user;
use crate::middleware::validate::{validate_email, validate_password, validate_username};
use crate::state::get_state_from_depot;

/// Safe projection of an account document: never the password hash, never
/// the pending confirmation token.
#[must_use]
pub fn user_view(user: &User) -> Value {
    json!({
        "id": user.id,
        "login": user.login,
        "username": user.username,
        "email": user.email,
        "emailConfirmed": user.email_confirmed,
        "region": user.region,
        "calendars": user.calendars,
        "sharedWithMe": user.shared_with_me,
        "createdAt": user.created_at,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProfileRequest {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    region: Option<String>,
}

/// GET /api/users/me
#[handler]
async fn me_handler(depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let user = current_user(depot)?;
    res.render(Json(user_view(&user)));
    Ok(())
}

/// ## Summary
/// PATCH /api/users/me - Partial profile update.
///
/// ## Errors
/// Returns HTTP 400 for shape violations or an unsupported region, 409 when
/// the new email is taken.
#[handler]
async fn update_me_handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<()> {
    let user = current_user(depot)?;
    let body: UpdateProfileRequest = req
        .parse_json()
        .await
        .map_err(|_err| AppError::FieldValidation("Invalid request body".to_owned()))?;

    if let Some(username) = &body.username {
        validate_username(username)?;
    }
    if let Some(email) = &body.email {
        validate_email(email)?;
    }
    if let Some(password) = &body.password {
        validate_password(password)?;
    }

    let state = get_state_from_depot(depot)?;
    let updated = state
        .users
        .update_profile(
            user.id,
            ProfileUpdate {
                username: body.username,
                email: body.email,
                password: body.password,
                region: body.region,
            },
        )
        .await?;

    res.render(Json(user_view(&updated)));
    Ok(())
}

/// ## Summary
/// DELETE /api/users/me - Delete the account and everything it owns.
#[handler]
async fn delete_me_handler(depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let user = current_user(depot)?;
    let state = get_state_from_depot(depot)?;

    state.users.delete_account(user.id).await?;
    state.sessions.revoke_user(user.id);

    res.render(Json(json!({ "success": true, "message": "Account deleted" })));
    Ok(())
}

/// GET /api/users/me/shared - Calendars other people shared with me.
#[handler]
async fn shared_handler(depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let user = current_user(depot)?;
    let state = get_state_from_depot(depot)?;

    let shared: Vec<CalendarEntry> = state
        .calendars
        .list_my(user.id)
        .await?
        .into_iter()
        .filter(|entry| match entry {
            CalendarEntry::Persisted(populated) => populated.calendar.owner != user.id,
            CalendarEntry::Regional(_) => false,
        })
        .collect();

    res.render(Json(shared));
    Ok(())
}

/// ## Summary
/// GET /api/users/search?q= - Identity search for the share and invite
/// pickers.
///
/// ## Errors
/// Returns HTTP 400 for an empty query.
#[handler]
async fn search_handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<()> {
    let query = req.query::<String>("q").unwrap_or_default();
    let state = get_state_from_depot(depot)?;

    let found = state.users.search(&query).await?;
    res.render(Json(found));
    Ok(())
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("users")
        .push(
            Router::with_path("me")
                .get(me_handler)
                .patch(update_me_handler)
                .delete(delete_me_handler)
                .push(Router::with_path("shared").get(shared_handler)),
        )
        .push(Router::with_path("search").get(search_handler))
}
