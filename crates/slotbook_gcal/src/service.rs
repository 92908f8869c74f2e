// --- File: crates/slotbook_gcal/src/service.rs ---
//! Google Calendar service implementation.
//!
//! This module provides an implementation of the CalendarService trait for Google Calendar.

use chrono::{DateTime, Utc};
use google_calendar3::api::{Event, EventDateTime};
use slotbook_common::services::{BoxFuture, CalendarEvent, CalendarService, NewCalendarEvent};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::auth::HubType;

/// Errors that can occur when interacting with Google Calendar.
#[derive(Error, Debug)]
pub enum GcalServiceError {
    #[error("Google API Error: {0}")]
    ApiError(#[from] google_calendar3::Error),
}

/// Google Calendar service implementation.
pub struct GoogleCalendarService {
    calendar_hub: Arc<HubType>,
}

impl GoogleCalendarService {
    /// Create a new Google Calendar service.
    pub fn new(calendar_hub: Arc<HubType>) -> Self {
        Self { calendar_hub }
    }
}

fn utc_time(time: DateTime<Utc>) -> EventDateTime {
    EventDateTime {
        date_time: Some(time),
        time_zone: Some("UTC".to_string()),
        ..Default::default()
    }
}

/// Timed start and end of an event; `None` for all-day entries.
fn event_bounds(event: &Event) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = event.start.as_ref()?.date_time?;
    let end = event.end.as_ref()?.date_time?;
    Some((start, end))
}

impl CalendarService for GoogleCalendarService {
    type Error = GcalServiceError;

    /// Lists expanded single events between `time_min` and `time_max`,
    /// following `nextPageToken` until the listing is complete.
    ///
    /// Cancelled and all-day events are skipped. The result is ordered by
    /// start time.
    fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<CalendarEvent>, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let mut events = Vec::new();
            let mut page_token: Option<String> = None;

            loop {
                let mut call = calendar_hub
                    .events()
                    .list(&calendar_id)
                    .time_min(time_min)
                    .time_max(time_max)
                    .single_events(true)
                    .order_by("startTime")
                    .time_zone("UTC");
                if let Some(token) = page_token.as_deref() {
                    call = call.page_token(token);
                }

                let (_response, page) = call.doit().await?;

                for item in page.items.unwrap_or_default() {
                    if item.status.as_deref() == Some("cancelled") {
                        continue;
                    }
                    match event_bounds(&item) {
                        Some((start, end)) => events.push(CalendarEvent {
                            id: item.id,
                            start,
                            end,
                            status: item.status,
                        }),
                        None => debug!("Skipping all-day event {:?}", item.id),
                    }
                }

                page_token = page.next_page_token;
                if page_token.is_none() {
                    break;
                }
            }

            // Pages are each ordered; keep the merged list ordered too.
            events.sort_by_key(|e| e.start);
            debug!(
                "Listed {} events in {} between {} and {}",
                events.len(),
                calendar_id,
                time_min,
                time_max
            );
            Ok(events)
        })
    }

    /// Inserts a timed event and returns the stored start and end, or the
    /// requested ones when the response omits them.
    fn insert_event(
        &self,
        calendar_id: &str,
        event: NewCalendarEvent,
    ) -> BoxFuture<'_, CalendarEvent, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let new_event = Event {
                summary: Some(event.summary.clone()),
                description: event.description.clone(),
                start: Some(utc_time(event.start)),
                end: Some(utc_time(event.end)),
                ..Default::default()
            };

            let (_response, created) = calendar_hub
                .events()
                .insert(new_event, &calendar_id)
                .doit()
                .await?;

            let (start, end) = event_bounds(&created).unwrap_or((event.start, event.end));
            info!("Inserted event {:?} into {}", created.id, calendar_id);

            Ok(CalendarEvent {
                id: created.id,
                start,
                end,
                status: created.status,
            })
        })
    }
}
