//! Notification feed.

use salvo::writing::Json;
use salvo::{Depot, Response, Router, handler};

use crate::error::AppResult;
use crate::middleware::auth::current_user;
use crate::state::get_state_from_depot;

/// GET /api/notifications - The caller's reminder and invitation records.
#[handler]
async fn list_handler(depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let user = current_user(depot)?;
    let state = get_state_from_depot(depot)?;

    let notifications = state.events.notifications(user.id).await?;
    res.render(Json(notifications));
    Ok(())
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("notifications").get(list_handler)
}
