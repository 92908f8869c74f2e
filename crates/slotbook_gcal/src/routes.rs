// --- File: crates/slotbook_gcal/src/routes.rs ---

use crate::auth::create_calendar_hub;
use crate::handlers::{
    book_handler, get_bookable_days_handler, get_time_slots_handler, welcome_handler, GcalState,
};
use crate::service::GoogleCalendarService;
use axum::{
    routing::{get, post},
    Router,
};
use slotbook_common::{boxed, SharedClock};
use slotbook_config::AppConfig;
use std::error::Error;
use std::sync::Arc;

/// The booking router over an already-built state.
///
/// Unknown paths, and known paths hit with the wrong method, get the
/// welcome page.
pub fn routes(state: Arc<GcalState>) -> Router {
    Router::new()
        .route(
            "/days",
            get(get_bookable_days_handler).fallback(welcome_handler),
        )
        .route(
            "/timeslots",
            get(get_time_slots_handler).fallback(welcome_handler),
        )
        .route("/book", post(book_handler).fallback(welcome_handler))
        .fallback(welcome_handler)
        .with_state(state)
}

/// Authenticates against Google Calendar and builds the booking router.
pub async fn gcal_routes(
    config: &AppConfig,
    clock: SharedClock,
) -> Result<Router, Box<dyn Error + Send + Sync>> {
    let calendar_hub = create_calendar_hub(&config.gcal).await?;
    let calendar = boxed(GoogleCalendarService::new(Arc::new(calendar_hub)));
    let state = GcalState::new(config, calendar, clock)?;
    Ok(routes(Arc::new(state)))
}
