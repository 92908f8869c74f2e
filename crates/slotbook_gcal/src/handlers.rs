// File: crates/slotbook_gcal/src/handlers.rs
use crate::logic::{
    create_booking, get_available_time_slots, get_bookable_days, resolve_date, BookingQuery,
    BookingResult, BookingRules, DayAvailability, RulesError, TimeSlot,
};
use axum::{
    extract::{Query, State},
    response::{Html, Json, Response},
};
use serde::{Deserialize, Serialize};
use slotbook_common::{handle_json_result, SharedCalendar, SharedClock, Success};
use slotbook_config::AppConfig;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Shared state of the booking routes.
pub struct GcalState {
    pub calendar: SharedCalendar,
    pub calendar_id: String,
    pub rules: BookingRules,
    pub clock: SharedClock,
    pub event_summary: String,
    /// Held from the booking re-check until the insert returns, so two
    /// requests in this process cannot both claim one slot.
    pub booking_gate: Mutex<()>,
}

impl GcalState {
    pub fn new(
        config: &AppConfig,
        calendar: SharedCalendar,
        clock: SharedClock,
    ) -> Result<Self, RulesError> {
        Ok(Self {
            calendar,
            calendar_id: config.gcal.calendar_id.clone(),
            rules: BookingRules::from_config(&config.booking)?,
            clock,
            event_summary: config.gcal.event_summary.clone(),
            booking_gate: Mutex::new(()),
        })
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DaysResponse {
    pub days: Vec<DayAvailability>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlotsResponse {
    pub time_slots: Vec<TimeSlot>,
}

/// Reads an integer the lenient way browsers' `parseInt` does: optional
/// leading whitespace and sign, then digits, ignoring any trailing text.
/// Anything without leading digits counts as absent. Digit runs too long
/// for `i64` saturate, so the value is still present and gets rejected as
/// out of range further on.
pub fn parse_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    let digits = &rest[..end];
    let parsed = if negative {
        format!("-{}", digits).parse::<i64>()
    } else {
        digits.parse::<i64>()
    };
    Some(match parsed {
        Ok(value) => value,
        Err(_) if negative => i64::MIN,
        Err(_) => i64::MAX,
    })
}

fn int_param(params: &HashMap<String, String>, name: &str) -> Option<i64> {
    params.get(name).and_then(|raw| parse_int(raw))
}

/// Handler for `GET /days?year=&month=`.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/days",
    params(
        ("year" = i64, Query, description = "Calendar year", example = 2030),
        ("month" = i64, Query, description = "Month, 1-12", example = 6)
    ),
    responses(
        (status = 200, description = "Availability for every day of the month", body = DaysResponse),
        (status = 400, description = "Missing or invalid parameter"),
        (status = 502, description = "Every calendar lookup failed")
    ),
    tag = "Booking"
))]
pub async fn get_bookable_days_handler(
    State(state): State<Arc<GcalState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Success<DaysResponse>>, Response> {
    let now = state.clock.now();
    let result = get_bookable_days(
        state.calendar.as_ref(),
        &state.calendar_id,
        &state.rules,
        int_param(&params, "year"),
        int_param(&params, "month"),
        now,
    )
    .await
    .map(|days| DaysResponse { days });
    handle_json_result(result)
}

/// Handler for `GET /timeslots?year=&month=&day=`.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/timeslots",
    params(
        ("year" = i64, Query, description = "Calendar year", example = 2030),
        ("month" = i64, Query, description = "Month, 1-12", example = 6),
        ("day" = i64, Query, description = "Day of month", example = 17)
    ),
    responses(
        (status = 200, description = "Free slots of the day", body = TimeSlotsResponse),
        (status = 400, description = "Missing or invalid parameter"),
        (status = 502, description = "Calendar lookup failed")
    ),
    tag = "Booking"
))]
pub async fn get_time_slots_handler(
    State(state): State<Arc<GcalState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Success<TimeSlotsResponse>>, Response> {
    let now = state.clock.now();
    let date = resolve_date(
        int_param(&params, "year"),
        int_param(&params, "month"),
        int_param(&params, "day"),
    );
    let result = match date {
        Ok(date) => {
            get_available_time_slots(
                state.calendar.as_ref(),
                &state.calendar_id,
                &state.rules,
                date,
                now,
            )
            .await
        }
        Err(e) => Err(e),
    }
    .map(|time_slots| TimeSlotsResponse { time_slots });
    handle_json_result(result)
}

/// Handler for `POST /book?year=&month=&day=&hour=&minute=`.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/book",
    params(
        ("year" = i64, Query, example = 2030),
        ("month" = i64, Query, example = 6),
        ("day" = i64, Query, example = 17),
        ("hour" = i64, Query, example = 9),
        ("minute" = i64, Query, example = 45)
    ),
    responses(
        (status = 200, description = "Appointment booked", body = BookingResult),
        (status = 400, description = "Missing or invalid parameter"),
        (status = 409, description = "Slot is off the grid or already taken"),
        (status = 422, description = "Past, too soon or outside operating hours"),
        (status = 502, description = "Calendar lookup or insert failed")
    ),
    tag = "Booking"
))]
pub async fn book_handler(
    State(state): State<Arc<GcalState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Success<BookingResult>>, Response> {
    let query = BookingQuery {
        year: int_param(&params, "year"),
        month: int_param(&params, "month"),
        day: int_param(&params, "day"),
        hour: int_param(&params, "hour"),
        minute: int_param(&params, "minute"),
    };

    let _gate = state.booking_gate.lock().await;
    let now = state.clock.now();
    info!("Booking request {:?}", query);
    let result = create_booking(
        state.calendar.as_ref(),
        &state.calendar_id,
        &state.rules,
        query,
        &state.event_summary,
        now,
    )
    .await;
    handle_json_result(result)
}

/// Any other path or method.
pub async fn welcome_handler() -> Html<&'static str> {
    Html("<h1>Welcome!</h1>")
}
