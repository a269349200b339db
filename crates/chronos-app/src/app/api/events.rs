//! Event routes.
//!
//! Path ids are parsed into [`EventRef`] / [`CalendarRef`] before anything
//! else; regional ids answer mutations with the fixed immutability message
//! and zero store access.

use chrono::{DateTime, Utc};
use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, Router, handler};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use chronos_core::constants::{REGIONAL_CALENDAR_IMMUTABLE, REGIONAL_EVENT_IMMUTABLE};
use chronos_core::types::{CalendarRef, EventKind, EventRef, EventStatus, RepeatKind};
use chronos_service::error::ServiceError;
use chronos_service::event::{EventUpdate, NewEventInput};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::current_user;
use crate::state::get_state_from_depot;

fn path_event_ref(req: &Request) -> AppResult<EventRef> {
    let id = req
        .param::<String>("id")
        .ok_or_else(|| AppError::FieldValidation("Event id is required".to_owned()))?;
    Ok(EventRef::parse(&id)?)
}

fn mutable_id(event_ref: &EventRef) -> AppResult<Uuid> {
    match event_ref {
        EventRef::Persisted(id) => Ok(*id),
        EventRef::Regional(_) => Err(AppError::ServiceError(ServiceError::RegionalImmutable(
            REGIONAL_EVENT_IMMUTABLE,
        ))),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateEventRequest {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "type")]
    kind: EventKind,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    calendar: String,
    repeat: Option<RepeatKind>,
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateEventRequest {
    title: Option<String>,
    description: Option<String>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InviteRequest {
    user_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct StatusRequest {
    status: EventStatus,
}

#[derive(Debug, Deserialize)]
struct RepeatRequest {
    repeat: RepeatKind,
}

/// ## Summary
/// POST /api/events/create - Create an event; a repeating one is expanded
/// into its occurrence documents.
///
/// ## Errors
/// Returns HTTP 403 when the target calendar id is regional, 400 for
/// validation failures.
#[handler]
async fn create_handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<()> {
    let user = current_user(depot)?;
    let body: CreateEventRequest = req
        .parse_json()
        .await
        .map_err(|_err| AppError::FieldValidation("Invalid request body".to_owned()))?;

    let CalendarRef::Persisted(calendar_id) = CalendarRef::parse(&body.calendar)? else {
        return Err(AppError::ServiceError(ServiceError::RegionalImmutable(
            REGIONAL_CALENDAR_IMMUTABLE,
        )));
    };

    let state = get_state_from_depot(depot)?;
    let event = state
        .events
        .create(
            user.id,
            NewEventInput {
                title: body.title,
                description: body.description,
                kind: body.kind,
                start_date: body.start_date,
                end_date: body.end_date,
                calendar: calendar_id,
                repeat: body.repeat.unwrap_or(RepeatKind::None),
                color: body.color,
            },
        )
        .await?;

    res.status_code(StatusCode::CREATED);
    res.render(Json(event));
    Ok(())
}

/// GET /api/events/calendar/{id} - All events of one calendar reference.
#[handler]
async fn list_calendar_handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<()> {
    let user = current_user(depot)?;
    let id = req
        .param::<String>("id")
        .ok_or_else(|| AppError::FieldValidation("Calendar id is required".to_owned()))?;
    let calendar_ref = CalendarRef::parse(&id)?;

    let state = get_state_from_depot(depot)?;
    let entries = state
        .events
        .list_calendar_events(user.id, &calendar_ref)
        .await?;
    res.render(Json(entries));
    Ok(())
}

/// GET /api/events/invited - Events the caller was invited to.
#[handler]
async fn invited_handler(depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let user = current_user(depot)?;
    let state = get_state_from_depot(depot)?;

    let events = state.events.invited(user.id).await?;
    res.render(Json(events));
    Ok(())
}

/// GET /api/events/{id} - One event, persisted or regional.
#[handler]
async fn get_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let user = current_user(depot)?;
    let event_ref = path_event_ref(req)?;
    let state = get_state_from_depot(depot)?;

    let entry = state.events.get(user.id, &event_ref).await?;
    res.render(Json(entry));
    Ok(())
}

/// ## Summary
/// PUT /api/events/{id} - Creator-only field merge.
///
/// ## Errors
/// Returns HTTP 403 for regional ids and non-creators.
#[handler]
async fn update_handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<()> {
    let user = current_user(depot)?;
    let event_id = mutable_id(&path_event_ref(req)?)?;
    let body: UpdateEventRequest = req
        .parse_json()
        .await
        .map_err(|_err| AppError::FieldValidation("Invalid request body".to_owned()))?;

    let state = get_state_from_depot(depot)?;
    let event = state
        .events
        .update(
            user.id,
            event_id,
            EventUpdate {
                title: body.title,
                description: body.description,
                start_date: body.start_date.map(Some),
                end_date: body.end_date.map(Some),
                color: body.color,
            },
        )
        .await?;

    res.render(Json(event));
    Ok(())
}

/// ## Summary
/// DELETE /api/events/{id} - Delete one event document.
///
/// ## Errors
/// Returns HTTP 403 for regional ids and non-creators.
#[handler]
async fn delete_handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<()> {
    let user = current_user(depot)?;
    let event_id = mutable_id(&path_event_ref(req)?)?;
    let state = get_state_from_depot(depot)?;

    state.events.delete(user.id, event_id).await?;
    res.render(Json(json!({ "success": true, "message": "Event deleted" })));
    Ok(())
}

/// ## Summary
/// POST /api/events/{id}/invite - Invite a user to an event.
///
/// ## Errors
/// Returns HTTP 403 for regional ids and non-creators, 400 when the target
/// is the creator, 404 for a missing target.
#[handler]
async fn invite_handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<()> {
    let user = current_user(depot)?;
    let event_id = mutable_id(&path_event_ref(req)?)?;
    let body: InviteRequest = req
        .parse_json()
        .await
        .map_err(|_err| AppError::FieldValidation("Invalid request body".to_owned()))?;

    let state = get_state_from_depot(depot)?;
    let event = state.events.invite(user.id, event_id, body.user_id).await?;
    res.render(Json(event));
    Ok(())
}

/// ## Summary
/// PATCH /api/events/{id}/status - Update the status tag.
///
/// ## Errors
/// Returns HTTP 403 for regional ids and non-creators, 400 for an unknown
/// status value.
#[handler]
async fn status_handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<()> {
    let user = current_user(depot)?;
    let event_id = mutable_id(&path_event_ref(req)?)?;
    let body: StatusRequest = req
        .parse_json()
        .await
        .map_err(|_err| AppError::FieldValidation("Invalid status value".to_owned()))?;

    let state = get_state_from_depot(depot)?;
    let event = state
        .events
        .update_status(user.id, event_id, body.status)
        .await?;
    res.render(Json(event));
    Ok(())
}

/// ## Summary
/// POST /api/events/{id}/repeat - Update the repeat tag. Occurrences are
/// not regenerated.
///
/// ## Errors
/// Returns HTTP 403 for regional ids and non-creators, 400 for an unknown
/// repeat value.
#[handler]
async fn repeat_handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<()> {
    let user = current_user(depot)?;
    let event_id = mutable_id(&path_event_ref(req)?)?;
    let body: RepeatRequest = req
        .parse_json()
        .await
        .map_err(|_err| AppError::FieldValidation("Invalid repeat value".to_owned()))?;

    let state = get_state_from_depot(depot)?;
    let event = state
        .events
        .update_repeat(user.id, event_id, body.repeat)
        .await?;
    res.render(Json(event));
    Ok(())
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("events")
        .push(Router::with_path("create").post(create_handler))
        .push(Router::with_path("calendar/{id}").get(list_calendar_handler))
        .push(Router::with_path("invited").get(invited_handler))
        .push(
            Router::with_path("{id}")
                .get(get_handler)
                .put(update_handler)
                .delete(delete_handler)
                .push(Router::with_path("invite").post(invite_handler))
                .push(Router::with_path("status").patch(status_handler))
                .push(Router::with_path("repeat").post(repeat_handler)),
        )
}
