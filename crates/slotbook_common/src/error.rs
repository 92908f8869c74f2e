use std::fmt;
use thiserror::Error;

/// The closed set of failures a booking request can end in.
///
/// Messages are what clients see in the `message` field of the failure
/// envelope; [`BookingError::code`] gives the stable machine-readable kind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// A required query parameter is absent or not a number.
    #[error("Request is missing parameter: {0}")]
    MissingParameter(&'static str),

    /// A parameter is a number but does not describe a real date/time.
    #[error("Request has invalid parameter: {name} ({reason})")]
    InvalidParameter { name: &'static str, reason: String },

    /// The requested start lies before the current instant.
    #[error("Cannot book time in the past")]
    PastTime,

    /// The requested start is closer to now than the configured lead time.
    #[error("Cannot book with less than {hours} hours in advance")]
    InsufficientNotice { hours: i64 },

    /// Weekend, before opening or ending after closing.
    #[error("Cannot book outside bookable timeframe")]
    OutsideBookableWindow,

    /// Not on the slot grid, or the slot is already taken.
    #[error("Invalid time slot")]
    InvalidSlot,

    /// The calendar API call failed or was rejected.
    #[error("Calendar service error: {0}")]
    ExternalService(String),
}

impl BookingError {
    /// Snake-case kind name, stable across message wording changes.
    pub fn code(&self) -> &'static str {
        match self {
            BookingError::MissingParameter(_) => "missing_parameter",
            BookingError::InvalidParameter { .. } => "invalid_parameter",
            BookingError::PastTime => "past_time",
            BookingError::InsufficientNotice { .. } => "insufficient_notice",
            BookingError::OutsideBookableWindow => "outside_bookable_window",
            BookingError::InvalidSlot => "invalid_slot",
            BookingError::ExternalService(_) => "external_service_failure",
        }
    }

    /// True for failures caused by the request rather than by the calendar.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, BookingError::ExternalService(_))
    }
}

/// A trait for converting errors to HTTP status codes.
///
/// This trait can be implemented by error types to provide a consistent way
/// to convert errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for BookingError {
    fn status_code(&self) -> u16 {
        match self {
            BookingError::MissingParameter(_) => 400,
            BookingError::InvalidParameter { .. } => 400,
            BookingError::PastTime => 422,
            BookingError::InsufficientNotice { .. } => 422,
            BookingError::OutsideBookableWindow => 422,
            BookingError::InvalidSlot => 409,
            BookingError::ExternalService(_) => 502,
        }
    }
}

/// Adds context to calendar-layer errors, turning them into
/// [`BookingError::ExternalService`].
pub trait Context<T, E> {
    /// Adds context to an error.
    fn context<C>(self, context: C) -> Result<T, BookingError>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Adds context to an error with a lazy context provider.
    fn with_context<C, F>(self, f: F) -> Result<T, BookingError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E: std::error::Error + Send + Sync + 'static> Context<T, E> for Result<T, E> {
    fn context<C>(self, context: C) -> Result<T, BookingError>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|error| external_service_error(format!("{}: {}", context, error)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, BookingError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|error| external_service_error(format!("{}: {}", f(), error)))
    }
}

// Utility functions for error handling
pub fn missing_parameter(name: &'static str) -> BookingError {
    BookingError::MissingParameter(name)
}

pub fn invalid_parameter<T: fmt::Display>(name: &'static str, reason: T) -> BookingError {
    BookingError::InvalidParameter {
        name,
        reason: reason.to_string(),
    }
}

pub fn external_service_error<T: fmt::Display>(message: T) -> BookingError {
    BookingError::ExternalService(message.to_string())
}
