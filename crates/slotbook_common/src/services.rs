// --- File: crates/slotbook_common/src/services.rs ---
//! Service abstractions for the external calendar.
//!
//! Booking logic talks to the calendar only through [`CalendarService`], so it
//! can run against Google Calendar in production and an in-memory fake in
//! tests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A wrapper error type that implements std::error::Error for Box<dyn std::error::Error + Send + Sync>
#[derive(Debug)]
pub struct BoxedError(pub Box<dyn StdError + Send + Sync>);

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for BoxedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn StdError + Send + Sync>> for BoxedError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        BoxedError(err)
    }
}

/// Calendar operations needed to compute availability and commit bookings.
pub trait CalendarService: Send + Sync {
    /// Error type returned by calendar service operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Lists the non-cancelled, timed events overlapping `[time_min, time_max]`,
    /// ordered ascending by start.
    fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<CalendarEvent>, Self::Error>;

    /// Inserts an event and returns it as confirmed by the calendar.
    fn insert_event(
        &self,
        calendar_id: &str,
        event: NewCalendarEvent,
    ) -> BoxFuture<'_, CalendarEvent, Self::Error>;
}

impl<S: CalendarService + ?Sized> CalendarService for Arc<S> {
    type Error = S::Error;

    fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<CalendarEvent>, Self::Error> {
        (**self).list_events(calendar_id, time_min, time_max)
    }

    fn insert_event(
        &self,
        calendar_id: &str,
        event: NewCalendarEvent,
    ) -> BoxFuture<'_, CalendarEvent, Self::Error> {
        (**self).insert_event(calendar_id, event)
    }
}

/// The calendar handle injected into request handlers.
pub type SharedCalendar = Arc<dyn CalendarService<Error = BoxedError>>;

/// Erases the error type of a calendar implementation so it can be shared as
/// a [`SharedCalendar`].
pub fn boxed<S>(service: S) -> SharedCalendar
where
    S: CalendarService + 'static,
{
    Arc::new(BoxedCalendarService { inner: service })
}

struct BoxedCalendarService<S> {
    inner: S,
}

impl<S: CalendarService> CalendarService for BoxedCalendarService<S> {
    type Error = BoxedError;

    fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<CalendarEvent>, Self::Error> {
        let fut = self.inner.list_events(calendar_id, time_min, time_max);
        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }

    fn insert_event(
        &self,
        calendar_id: &str,
        event: NewCalendarEvent,
    ) -> BoxFuture<'_, CalendarEvent, Self::Error> {
        let fut = self.inner.insert_event(calendar_id, event);
        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }
}

/// Read-only view of an event reported by the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Calendar-assigned id, absent for events not yet stored.
    pub id: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// "confirmed", "tentative", ...
    pub status: Option<String>,
}

impl CalendarEvent {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: None,
            start,
            end,
            status: None,
        }
    }

    /// Half-open overlap with `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && self.end > start
    }
}

/// Payload for [`CalendarService::insert_event`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCalendarEvent {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// The summary or title of the event.
    pub summary: String,
    pub description: Option<String>,
}

/// Serializes instants as `2030-06-17T09:00:00.000Z`.
pub mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
