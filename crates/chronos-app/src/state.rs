//! Shared application state injected into every request's depot.

use std::sync::Arc;

use salvo::async_trait;

use chronos_core::config::Settings;
use chronos_core::error::CoreError;
use chronos_db::store::DataStore;
use chronos_service::auth::SessionStore;
use chronos_service::calendar::CalendarService;
use chronos_service::event::EventService;
use chronos_service::regional::RegionalCalendarService;
use chronos_service::reminder::ReminderScanner;
use chronos_service::user::UserService;

use crate::error::AppResult;

pub struct AppState {
    pub settings: Settings,
    pub store: Arc<dyn DataStore>,
    pub sessions: SessionStore,
    pub regional: Arc<RegionalCalendarService>,
    pub users: UserService,
    pub calendars: CalendarService,
    pub events: EventService,
}

impl AppState {
    /// Wires every service around one store and one regional adapter.
    #[must_use]
    pub fn new(settings: Settings, store: Arc<dyn DataStore>) -> Self {
        let regional = Arc::new(RegionalCalendarService::new(&settings.regional));
        Self {
            sessions: SessionStore::new(settings.session.ttl_hours),
            users: UserService::new(Arc::clone(&store)),
            calendars: CalendarService::new(Arc::clone(&store), Arc::clone(&regional)),
            events: EventService::new(Arc::clone(&store), Arc::clone(&regional)),
            regional,
            store,
            settings,
        }
    }

    #[must_use]
    pub fn reminder_scanner(&self) -> ReminderScanner {
        ReminderScanner::new(Arc::clone(&self.store))
    }
}

pub struct StateHandler {
    pub state: Arc<AppState>,
}

#[async_trait]
impl salvo::Handler for StateHandler {
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(Arc::clone(&self.state));
    }
}

/// ## Summary
/// Retrieves the application state from the depot.
///
/// ## Errors
/// Returns an error if the state is not found in the depot.
pub fn get_state_from_depot(depot: &salvo::Depot) -> AppResult<Arc<AppState>> {
    depot
        .obtain::<Arc<AppState>>()
        .cloned()
        .map_err(|_err| CoreError::InvariantViolation("Application state not found in depot").into())
}
