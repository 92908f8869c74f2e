// --- File: crates/slotbook_common/src/lib.rs ---

pub mod clock; // Time source abstraction
pub mod error; // Booking error taxonomy
pub mod http; // Response envelopes
pub mod logging; // Logging utilities
pub mod services; // Calendar service abstraction

// Re-export error types and utilities for easier access
pub use error::{
    external_service_error, invalid_parameter, missing_parameter, BookingError, Context,
    HttpStatusCode,
};

// Re-export HTTP utilities for easier access
pub use http::{handle_json_result, IntoHttpResponse, Success};

pub use clock::{Clock, FixedClock, SharedClock, SystemClock};
pub use services::{
    boxed, BoxFuture, BoxedError, CalendarEvent, CalendarService, NewCalendarEvent,
    SharedCalendar,
};
