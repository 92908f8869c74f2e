// File: crates/slotbook_gcal/src/doc.rs

#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::{DaysResponse, TimeSlotsResponse};
use crate::logic::{BookingResult, DayAvailability, TimeSlot};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::get_bookable_days_handler,
        crate::handlers::get_time_slots_handler,
        crate::handlers::book_handler
    ),
    components(
        schemas(
            DaysResponse,
            DayAvailability,
            TimeSlotsResponse,
            TimeSlot,
            BookingResult
        )
    ),
    tags(
        (name = "Booking", description = "Appointment availability and booking")
    )
)]
pub struct GcalApiDoc;
