mod auth;
mod calendars;
mod events;
mod healthcheck;
mod notifications;
mod users;

use salvo::Router;

use crate::middleware::auth::AuthMiddleware;

pub use chronos_core::constants::API_ROUTE_COMPONENT;

/// ## Summary
/// Constructs the main API router. Registration, login, email confirmation
/// and the healthcheck are public; everything else sits behind the session
/// middleware.
#[must_use]
pub fn routes() -> Router {
    Router::with_path(API_ROUTE_COMPONENT)
        .push(healthcheck::routes())
        .push(auth::routes())
        .push(
            Router::new()
                .hoop(AuthMiddleware)
                .push(users::routes())
                .push(calendars::routes())
                .push(events::routes())
                .push(notifications::routes()),
        )
}
