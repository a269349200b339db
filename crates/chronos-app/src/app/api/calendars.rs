//! Calendar routes.
//!
//! Every mutation parses the path id into a [`CalendarRef`] first; a
//! regional id is rejected with the fixed immutability message before any
//! store access.

use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, Router, handler};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use chronos_core::constants::REGIONAL_CALENDAR_IMMUTABLE;
use chronos_core::types::CalendarRef;
use chronos_service::calendar::{CalendarUpdate, DeleteOutcome, NewCalendarInput};
use chronos_service::error::ServiceError;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::current_user;
use crate::state::get_state_from_depot;

fn path_ref(req: &Request) -> AppResult<CalendarRef> {
    let id = req
        .param::<String>("id")
        .ok_or_else(|| AppError::FieldValidation("Calendar id is required".to_owned()))?;
    Ok(CalendarRef::parse(&id)?)
}

/// Rejects regional refs on mutation paths before anything else runs.
fn mutable_id(calendar_ref: &CalendarRef) -> AppResult<Uuid> {
    match calendar_ref {
        CalendarRef::Persisted(id) => Ok(*id),
        CalendarRef::Regional(_) => Err(AppError::ServiceError(
            ServiceError::RegionalImmutable(REGIONAL_CALENDAR_IMMUTABLE),
        )),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCalendarRequest {
    name: String,
    #[serde(default)]
    description: String,
    color: Option<String>,
    #[serde(default)]
    include_holidays: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateCalendarRequest {
    name: Option<String>,
    description: Option<String>,
    color: Option<String>,
    include_holidays: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SharingRequest {
    user_id: Uuid,
}

/// GET /api/calendars/my - Owned and shared calendars plus the regional
/// overlay.
#[handler]
async fn list_my_handler(depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let user = current_user(depot)?;
    let state = get_state_from_depot(depot)?;

    let entries = state.calendars.list_my(user.id).await?;
    res.render(Json(entries));
    Ok(())
}

/// ## Summary
/// POST /api/calendars/create - Create a calendar owned by the caller.
///
/// ## Errors
/// Returns HTTP 400 for an empty name.
#[handler]
async fn create_handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<()> {
    let user = current_user(depot)?;
    let body: CreateCalendarRequest = req
        .parse_json()
        .await
        .map_err(|_err| AppError::FieldValidation("Invalid request body".to_owned()))?;

    let state = get_state_from_depot(depot)?;
    let calendar = state
        .calendars
        .create(
            user.id,
            NewCalendarInput {
                name: body.name,
                description: body.description,
                color: body.color,
                include_holidays: body.include_holidays,
            },
        )
        .await?;

    res.status_code(StatusCode::CREATED);
    res.render(Json(calendar));
    Ok(())
}

/// GET /api/calendars/{id} - One calendar, persisted or regional.
#[handler]
async fn get_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let user = current_user(depot)?;
    let calendar_ref = path_ref(req)?;
    let state = get_state_from_depot(depot)?;

    let entry = state.calendars.get(user.id, &calendar_ref).await?;
    res.render(Json(entry));
    Ok(())
}

/// ## Summary
/// PATCH /api/calendars/{id} - Owner-only field merge.
///
/// ## Errors
/// Returns HTTP 403 for regional ids and non-owners.
#[handler]
async fn update_handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<()> {
    let user = current_user(depot)?;
    let calendar_id = mutable_id(&path_ref(req)?)?;
    let body: UpdateCalendarRequest = req
        .parse_json()
        .await
        .map_err(|_err| AppError::FieldValidation("Invalid request body".to_owned()))?;

    let state = get_state_from_depot(depot)?;
    let calendar = state
        .calendars
        .update(
            user.id,
            calendar_id,
            CalendarUpdate {
                name: body.name,
                description: body.description,
                color: body.color,
                include_holidays: body.include_holidays,
            },
        )
        .await?;

    res.render(Json(calendar));
    Ok(())
}

/// ## Summary
/// DELETE /api/calendars/{id} - Delete a calendar, or clear the default one.
///
/// ## Errors
/// Returns HTTP 403 for regional ids and non-owners.
#[handler]
async fn delete_handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<()> {
    let user = current_user(depot)?;
    let calendar_id = mutable_id(&path_ref(req)?)?;
    let state = get_state_from_depot(depot)?;

    let message = match state.calendars.delete(user.id, calendar_id).await? {
        DeleteOutcome::Cleared => "Default calendar cleared",
        DeleteOutcome::Deleted => "Calendar deleted",
    };
    res.render(Json(json!({ "success": true, "message": message })));
    Ok(())
}

/// ## Summary
/// POST /api/calendars/{id}/share - Grant a user read access.
///
/// ## Errors
/// Returns HTTP 403 for regional ids and non-owners, 400 for default
/// calendars and owner targets, 409 when already shared.
#[handler]
async fn share_handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<()> {
    let user = current_user(depot)?;
    let calendar_id = mutable_id(&path_ref(req)?)?;
    let body: SharingRequest = req
        .parse_json()
        .await
        .map_err(|_err| AppError::FieldValidation("Invalid request body".to_owned()))?;

    let state = get_state_from_depot(depot)?;
    let calendar = state
        .calendars
        .share(user.id, calendar_id, body.user_id)
        .await?;

    res.render(Json(calendar));
    Ok(())
}

/// ## Summary
/// POST /api/calendars/{id}/unshare - Revoke a sharing entry.
///
/// ## Errors
/// Returns HTTP 403 for regional ids and for non-owners removing someone
/// else, 400 for owner self-removal, 404 for a missing entry.
#[handler]
async fn unshare_handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<()> {
    let user = current_user(depot)?;
    let calendar_id = mutable_id(&path_ref(req)?)?;
    let body: SharingRequest = req
        .parse_json()
        .await
        .map_err(|_err| AppError::FieldValidation("Invalid request body".to_owned()))?;

    let state = get_state_from_depot(depot)?;
    state
        .calendars
        .unshare(user.id, calendar_id, body.user_id)
        .await?;

    res.render(Json(json!({ "success": true, "message": "Sharing removed" })));
    Ok(())
}

/// ## Summary
/// GET /api/calendars/{id}/members - Owner and sharers of a calendar.
///
/// ## Errors
/// Returns HTTP 400 for regional ids, which have no membership.
#[handler]
async fn members_handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<()> {
    let user = current_user(depot)?;
    let calendar_ref = path_ref(req)?;
    let CalendarRef::Persisted(calendar_id) = calendar_ref else {
        return Err(AppError::ServiceError(ServiceError::ValidationError(
            "Regional calendars have no members".to_owned(),
        )));
    };

    let state = get_state_from_depot(depot)?;
    let members = state.calendars.members(user.id, calendar_id).await?;
    res.render(Json(members));
    Ok(())
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("calendars")
        .push(Router::with_path("my").get(list_my_handler))
        .push(Router::with_path("create").post(create_handler))
        .push(
            Router::with_path("{id}")
                .get(get_handler)
                .patch(update_handler)
                .delete(delete_handler)
                .push(Router::with_path("share").post(share_handler))
                .push(Router::with_path("unshare").post(unshare_handler))
                .push(Router::with_path("members").get(members_handler)),
        )
}
