//! Session-cookie authentication.
//!
//! Resolves the session cookie (or a bearer token, which test clients use
//! since they cannot hold a cookie jar) to the account document and stores
//! it in the depot for downstream handlers. Everything behind this
//! middleware can assume a valid `CurrentUser`.

use salvo::Depot;
use salvo::http::StatusCode;
use salvo::writing::Json;
use serde_json::json;

use chronos_core::constants::SESSION_COOKIE;
use chronos_core::error::CoreError;
use chronos_db::model::User;

use crate::error::AppResult;
use crate::state::get_state_from_depot;

const CURRENT_USER_KEY: &str = "current_user";

/// The authenticated account for this request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// ## Summary
/// Retrieves the authenticated user stored by [`AuthMiddleware`].
///
/// ## Errors
/// Returns an error if the middleware did not run on this route.
pub fn current_user(depot: &Depot) -> AppResult<User> {
    depot
        .get::<CurrentUser>(CURRENT_USER_KEY)
        .map(|current| current.0.clone())
        .map_err(|_err| CoreError::InvariantViolation("Current user not found in depot").into())
}

fn session_token(req: &salvo::Request) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        return Some(cookie.value().to_owned());
    }
    req.header::<String>("authorization")
        .and_then(|header| header.strip_prefix("Bearer ").map(ToOwned::to_owned))
}

fn reject(res: &mut salvo::Response, ctrl: &mut salvo::FlowCtrl) {
    res.status_code(StatusCode::UNAUTHORIZED);
    res.render(Json(json!({ "error": "Not authenticated. Please log in" })));
    ctrl.skip_rest();
}

/// ## Summary
/// Middleware handler for authentication.
/// Use this as a handler in routes to protect them with authentication.
pub struct AuthMiddleware;

#[salvo::async_trait]
impl salvo::Handler for AuthMiddleware {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(
        method = %req.method(),
        path = %req.uri().path()
    ))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        let Ok(state) = get_state_from_depot(depot) else {
            tracing::error!("Application state missing while authenticating");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            ctrl.skip_rest();
            return;
        };

        let Some(token) = session_token(req) else {
            tracing::trace!("Request carries no session token");
            reject(res, ctrl);
            return;
        };

        let Some(user_id) = state.sessions.resolve(&token) else {
            tracing::debug!("Session token expired or unknown");
            reject(res, ctrl);
            return;
        };

        match state.store.find_user(user_id).await {
            Ok(Some(user)) => {
                tracing::debug!(user = %user.id, login = %user.login, "Request authenticated");
                depot.insert(CURRENT_USER_KEY, CurrentUser(user));
            }
            Ok(None) => {
                // The account was deleted after the session was issued.
                state.sessions.revoke(&token);
                reject(res, ctrl);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load session user");
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
            }
        }
    }
}
