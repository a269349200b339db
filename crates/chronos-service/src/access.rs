//! Calendar and event access evaluation.
//!
//! Pure predicates over the documents; the services call these before any
//! store mutation. Read access is owner-or-sharer, write access is
//! owner-only, and event mutation belongs to the creator alone.

use uuid::Uuid;

use chronos_db::model::{Calendar, Event};

use crate::error::{ServiceError, ServiceResult};

/// Read access: the owner or anyone in `shared_with`.
#[must_use]
pub fn can_access(calendar: &Calendar, user: Uuid) -> bool {
    calendar.owner == user || calendar.is_shared_with(user)
}

/// Write access (rename, delete, share, unshare others): owner only.
#[must_use]
pub fn can_write(calendar: &Calendar, user: Uuid) -> bool {
    calendar.owner == user
}

/// Sharing and inviting follow the write rule for persisted calendars.
#[must_use]
pub fn can_invite_or_share(calendar: &Calendar, user: Uuid) -> bool {
    can_write(calendar, user)
}

/// Event mutation (update, delete, status, repeat, invite) is restricted to
/// the creator, not the calendar owner, unless they coincide.
#[must_use]
pub fn can_modify_event(event: &Event, user: Uuid) -> bool {
    event.creator == user
}

/// Event read access: creator, invitee, or anyone who can read the calendar.
#[must_use]
pub fn can_view_event(event: &Event, calendar: &Calendar, user: Uuid) -> bool {
    event.creator == user || event.is_invited(user) || can_access(calendar, user)
}

/// Checks every precondition for sharing `calendar` with `target`.
///
/// ## Errors
/// - access denied when the caller is not the owner
/// - validation error for default calendars and owner self-shares
/// - conflict when the target already has a sharing entry
pub fn ensure_share_allowed(
    calendar: &Calendar,
    caller: Uuid,
    target: Uuid,
) -> ServiceResult<()> {
    if !can_invite_or_share(calendar, caller) {
        return Err(ServiceError::AccessDenied(
            "Only the owner can share this calendar".to_owned(),
        ));
    }
    if calendar.is_default {
        return Err(ServiceError::ValidationError(
            "Default calendar cannot be shared".to_owned(),
        ));
    }
    if target == calendar.owner {
        return Err(ServiceError::ValidationError(
            "Cannot share a calendar with its owner".to_owned(),
        ));
    }
    if calendar.is_shared_with(target) {
        return Err(ServiceError::Conflict(
            "User already has access to this calendar".to_owned(),
        ));
    }
    Ok(())
}

/// Checks the unshare precedence rules.
///
/// The owner may remove any sharer; a sharer may always remove themself; the
/// owner can never be unshared from their own calendar.
///
/// ## Errors
/// - validation error for owner self-removal
/// - access denied when a non-owner removes someone else
/// - not found when the target has no sharing entry
pub fn ensure_unshare_allowed(
    calendar: &Calendar,
    caller: Uuid,
    target: Uuid,
) -> ServiceResult<()> {
    if target == calendar.owner {
        return Err(ServiceError::ValidationError(
            "Owner cannot be removed from their own calendar; delete it instead".to_owned(),
        ));
    }
    if caller != target && !can_write(calendar, caller) {
        return Err(ServiceError::AccessDenied(
            "Only the owner can remove other users".to_owned(),
        ));
    }
    if !calendar.is_shared_with(target) {
        return Err(ServiceError::NotFound(
            "Sharing entry not found".to_owned(),
        ));
    }
    Ok(())
}
