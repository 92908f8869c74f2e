// --- File: crates/slotbook_gcal/src/logic.rs ---
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use slotbook_common::services::iso_millis;
use slotbook_common::{
    external_service_error, invalid_parameter, missing_parameter, BookingError, CalendarEvent,
    CalendarService, Context, NewCalendarEvent,
};
use slotbook_config::BookingConfig;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, warn};

// --- Rules ---

/// Invalid booking rule configuration, detected at startup.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RulesError {
    #[error("Invalid time of day '{0}', expected HH:MM")]
    InvalidTime(String),
    #[error("Unknown weekday '{0}'")]
    InvalidWeekday(String),
    #[error("Closing time {close} must be after opening time {open}")]
    EmptyWindow { open: NaiveTime, close: NaiveTime },
    #[error("Appointment duration must be positive, got {0} minutes")]
    NonPositiveDuration(i64),
    #[error("{0} must not be negative")]
    Negative(&'static str),
    #[error("{0} is too large")]
    TooLarge(&'static str),
    #[error("A {minutes} minute appointment does not fit between {open} and {close}")]
    AppointmentTooLong {
        minutes: i64,
        open: NaiveTime,
        close: NaiveTime,
    },
}

/// Operating hours and slot geometry. All times are UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRules {
    pub open: NaiveTime,
    pub close: NaiveTime,
    pub appointment: Duration,
    pub gap: Duration,
    pub lead_time: Duration,
    pub working_days: Vec<Weekday>,
}

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            open: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            close: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN),
            appointment: Duration::minutes(40),
            gap: Duration::minutes(5),
            lead_time: Duration::hours(24),
            working_days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
        }
    }
}

impl BookingRules {
    pub fn from_config(config: &BookingConfig) -> Result<Self, RulesError> {
        let open = parse_time_of_day(&config.open_time)?;
        let close = parse_time_of_day(&config.close_time)?;
        if close <= open {
            return Err(RulesError::EmptyWindow { open, close });
        }
        if config.appointment_minutes <= 0 {
            return Err(RulesError::NonPositiveDuration(config.appointment_minutes));
        }
        if config.gap_minutes < 0 {
            return Err(RulesError::Negative("gap_minutes"));
        }
        if config.lead_time_hours < 0 {
            return Err(RulesError::Negative("lead_time_hours"));
        }

        let mut working_days = Vec::with_capacity(config.working_days.len());
        for name in &config.working_days {
            let day = Weekday::from_str(name.trim())
                .map_err(|_| RulesError::InvalidWeekday(name.clone()))?;
            if !working_days.contains(&day) {
                working_days.push(day);
            }
        }

        let appointment = Duration::try_minutes(config.appointment_minutes)
            .ok_or(RulesError::TooLarge("appointment_minutes"))?;
        if appointment >= close - open {
            return Err(RulesError::AppointmentTooLong {
                minutes: config.appointment_minutes,
                open,
                close,
            });
        }
        // Slot starts stay within the day they belong to.
        let gap = Duration::try_minutes(config.gap_minutes)
            .filter(|gap| appointment + *gap <= Duration::days(1))
            .ok_or(RulesError::TooLarge("gap_minutes"))?;
        let lead_time = Duration::try_hours(config.lead_time_hours)
            .ok_or(RulesError::TooLarge("lead_time_hours"))?;

        Ok(Self {
            open,
            close,
            appointment,
            gap,
            lead_time,
            working_days,
        })
    }

    /// Distance between consecutive slot starts.
    pub fn stride(&self) -> Duration {
        self.appointment + self.gap
    }

    pub fn opening(&self, date: NaiveDate) -> DateTime<Utc> {
        Utc.from_utc_datetime(&date.and_time(self.open))
    }

    pub fn closing(&self, date: NaiveDate) -> DateTime<Utc> {
        Utc.from_utc_datetime(&date.and_time(self.close))
    }

    pub fn is_working_day(&self, weekday: Weekday) -> bool {
        self.working_days.contains(&weekday)
    }

    /// The single recency predicate shared by slot listing and booking.
    pub fn has_lead_time(&self, start: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        start - now >= self.lead_time
    }

    pub fn lead_time_hours(&self) -> i64 {
        self.lead_time.num_hours()
    }

    /// Every slot position of the day, ignoring weekdays, events and `now`.
    pub fn slot_grid(&self, date: NaiveDate) -> SlotGrid {
        SlotGrid {
            next_start: self.opening(date),
            appointment: self.appointment,
            stride: self.stride(),
            day_end: self.closing(date),
        }
    }
}

fn parse_time_of_day(raw: &str) -> Result<NaiveTime, RulesError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| RulesError::InvalidTime(raw.to_string()))
}

/// Fixed-stride cursor over a day's operating window. A slot is yielded
/// while its end lies strictly before closing.
#[derive(Debug, Clone)]
pub struct SlotGrid {
    next_start: DateTime<Utc>,
    appointment: Duration,
    stride: Duration,
    day_end: DateTime<Utc>,
}

impl Iterator for SlotGrid {
    type Item = TimeSlot;

    fn next(&mut self) -> Option<TimeSlot> {
        let start_time = self.next_start;
        let end_time = start_time.checked_add_signed(self.appointment)?;
        if end_time >= self.day_end {
            return None;
        }
        // Past the last representable instant there is nothing left to yield.
        self.next_start = start_time
            .checked_add_signed(self.stride)
            .unwrap_or(self.day_end);
        Some(TimeSlot {
            start_time,
            end_time,
        })
    }
}

// --- Data Structures ---

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    #[serde(with = "iso_millis")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "2030-06-17T09:00:00.000Z"))]
    pub start_time: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "2030-06-17T09:40:00.000Z"))]
    pub end_time: DateTime<Utc>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DayAvailability {
    #[cfg_attr(feature = "openapi", schema(example = 17))]
    pub day: u32,
    pub has_time_slots: bool,
    /// Set when this day's calendar lookup failed; `has_time_slots` is then false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Raw booking parameters; any of them may be absent.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BookingQuery {
    pub year: Option<i64>,
    pub month: Option<i64>,
    pub day: Option<i64>,
    pub hour: Option<i64>,
    pub minute: Option<i64>,
}

/// A booking request with every component present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingRequest {
    pub year: i64,
    pub month: i64,
    pub day: i64,
    pub hour: i64,
    pub minute: i64,
}

impl BookingQuery {
    /// Presence check. Year, month and day must be nonzero; hour and minute
    /// may legitimately be 0.
    pub fn into_request(self) -> Result<BookingRequest, BookingError> {
        Ok(BookingRequest {
            year: require_date_part(self.year, "year")?,
            month: require_date_part(self.month, "month")?,
            day: require_date_part(self.day, "day")?,
            hour: self.hour.ok_or_else(|| missing_parameter("hour"))?,
            minute: self.minute.ok_or_else(|| missing_parameter("minute"))?,
        })
    }
}

impl BookingRequest {
    /// Start and end instants. Hours and minutes beyond their usual range
    /// roll over into neighbouring days.
    pub fn bounds(
        &self,
        rules: &BookingRules,
    ) -> Result<(NaiveDate, DateTime<Utc>, DateTime<Utc>), BookingError> {
        let date = date_from_parts(self.year, self.month, self.day)?;
        let midnight = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
        let offset = Duration::try_hours(self.hour)
            .zip(Duration::try_minutes(self.minute))
            .and_then(|(hours, minutes)| hours.checked_add(&minutes))
            .ok_or_else(|| invalid_parameter("hour", "time of day out of range"))?;
        let start_time = midnight
            .checked_add_signed(offset)
            .ok_or_else(|| invalid_parameter("hour", "time of day out of range"))?;
        let end_time = start_time
            .checked_add_signed(rules.appointment)
            .ok_or_else(|| invalid_parameter("hour", "time of day out of range"))?;
        Ok((date, start_time, end_time))
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookingResult {
    #[serde(with = "iso_millis")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "2030-06-17T09:45:00.000Z"))]
    pub start_time: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "2030-06-17T10:25:00.000Z"))]
    pub end_time: DateTime<Utc>,
}

// --- Date helpers ---

fn require_date_part(value: Option<i64>, name: &'static str) -> Result<i64, BookingError> {
    match value {
        Some(v) if v != 0 => Ok(v),
        _ => Err(missing_parameter(name)),
    }
}

fn first_of_month(year: i64, month: i64) -> Result<NaiveDate, BookingError> {
    let y = i32::try_from(year).map_err(|_| invalid_parameter("year", "out of range"))?;
    let m = u32::try_from(month)
        .ok()
        .filter(|m| (1..=12).contains(m))
        .ok_or_else(|| invalid_parameter("month", format!("{} is not in 1..=12", month)))?;
    NaiveDate::from_ymd_opt(y, m, 1).ok_or_else(|| invalid_parameter("year", "out of range"))
}

fn date_from_parts(year: i64, month: i64, day: i64) -> Result<NaiveDate, BookingError> {
    let first = first_of_month(year, month)?;
    u32::try_from(day)
        .ok()
        .and_then(|d| first.with_day(d))
        .ok_or_else(|| {
            invalid_parameter(
                "day",
                format!("{} has no day {}", first.format("%Y-%m"), day),
            )
        })
}

/// Resolves and validates the `(year, month, day)` parameters of a request.
pub fn resolve_date(
    year: Option<i64>,
    month: Option<i64>,
    day: Option<i64>,
) -> Result<NaiveDate, BookingError> {
    let year = require_date_part(year, "year")?;
    let month = require_date_part(month, "month")?;
    let day = require_date_part(day, "day")?;
    date_from_parts(year, month, day)
}

/// Number of days in the month starting at `first`.
pub fn days_in_month(first: NaiveDate) -> u32 {
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

// --- Slot Calculation ---

/// Computes the bookable slots of `date`.
///
/// `events` must be sorted by start. A slot is dropped when an event starts
/// exactly at the slot's start, or when it starts less than the lead time
/// after `now`. Returns nothing on non-working days.
pub fn calculate_time_slots(
    date: NaiveDate,
    events: &[CalendarEvent],
    now: DateTime<Utc>,
    rules: &BookingRules,
) -> Vec<TimeSlot> {
    let day_end = rules.closing(date);
    if !rules.is_working_day(day_end.weekday()) {
        return Vec::new();
    }

    let mut cursor = 0;
    let mut slots = Vec::new();
    for slot in rules.slot_grid(date) {
        while cursor < events.len() && events[cursor].start < slot.start_time {
            cursor += 1;
        }
        let mut taken = false;
        while cursor < events.len() && events[cursor].start == slot.start_time {
            taken = true;
            cursor += 1;
        }
        if taken {
            debug!("Slot {} is booked", slot.start_time);
            continue;
        }
        if !rules.has_lead_time(slot.start_time, now) {
            continue;
        }
        slots.push(slot);
    }
    slots
}

/// Whether `date` can have a bookable slot at all, before looking at events.
pub fn may_have_slots(date: NaiveDate, now: DateTime<Utc>, rules: &BookingRules) -> bool {
    if !rules.is_working_day(rules.closing(date).weekday()) {
        return false;
    }
    rules
        .slot_grid(date)
        .last()
        .is_some_and(|last| rules.has_lead_time(last.start_time, now))
}

async fn fetch_day_events<C>(
    calendar: &C,
    calendar_id: &str,
    rules: &BookingRules,
    date: NaiveDate,
) -> Result<Vec<CalendarEvent>, BookingError>
where
    C: CalendarService + ?Sized,
{
    calendar
        .list_events(calendar_id, rules.opening(date), rules.closing(date))
        .await
        .with_context(|| format!("listing events for {}", date))
}

/// Lists the free slots of one day, consulting the calendar only on working days.
pub async fn get_available_time_slots<C>(
    calendar: &C,
    calendar_id: &str,
    rules: &BookingRules,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<Vec<TimeSlot>, BookingError>
where
    C: CalendarService + ?Sized,
{
    if !rules.is_working_day(rules.closing(date).weekday()) {
        debug!("{} is not a working day", date);
        return Ok(Vec::new());
    }
    let events = fetch_day_events(calendar, calendar_id, rules, date).await?;
    Ok(calculate_time_slots(date, &events, now, rules))
}

// --- Month Availability ---

enum DayCheck {
    Skipped,
    Looked(Result<bool, BookingError>),
}

async fn check_day<C>(
    calendar: &C,
    calendar_id: &str,
    rules: &BookingRules,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> DayCheck
where
    C: CalendarService + ?Sized,
{
    if !may_have_slots(date, now, rules) {
        return DayCheck::Skipped;
    }
    let result = fetch_day_events(calendar, calendar_id, rules, date)
        .await
        .map(|events| !calculate_time_slots(date, &events, now, rules).is_empty());
    DayCheck::Looked(result)
}

/// Reports for every day of the month whether it has a bookable slot.
///
/// Days are checked concurrently. A failed lookup marks only its own day
/// (`has_time_slots: false` plus `error`); the month fails as a whole only
/// when every lookup failed.
pub async fn get_bookable_days<C>(
    calendar: &C,
    calendar_id: &str,
    rules: &BookingRules,
    year: Option<i64>,
    month: Option<i64>,
    now: DateTime<Utc>,
) -> Result<Vec<DayAvailability>, BookingError>
where
    C: CalendarService + ?Sized,
{
    let year = require_date_part(year, "year")?;
    let month = require_date_part(month, "month")?;
    let first = first_of_month(year, month)?;

    let dates: Vec<NaiveDate> = first.iter_days().take(days_in_month(first) as usize).collect();
    let checks = join_all(
        dates
            .iter()
            .map(|date| check_day(calendar, calendar_id, rules, *date, now)),
    )
    .await;

    let lookups = checks
        .iter()
        .filter(|c| matches!(c, DayCheck::Looked(_)))
        .count();
    let failures = checks
        .iter()
        .filter(|c| matches!(c, DayCheck::Looked(Err(_))))
        .count();
    if lookups > 0 && failures == lookups {
        let first_error = checks.into_iter().find_map(|c| match c {
            DayCheck::Looked(Err(e)) => Some(e),
            _ => None,
        });
        return Err(first_error.unwrap_or_else(|| external_service_error("every day lookup failed")));
    }

    Ok(dates
        .iter()
        .zip(checks)
        .map(|(date, check)| match check {
            DayCheck::Skipped => DayAvailability {
                day: date.day(),
                has_time_slots: false,
                error: None,
            },
            DayCheck::Looked(Ok(has_time_slots)) => DayAvailability {
                day: date.day(),
                has_time_slots,
                error: None,
            },
            DayCheck::Looked(Err(e)) => {
                warn!("Availability lookup for {} failed: {}", date, e);
                DayAvailability {
                    day: date.day(),
                    has_time_slots: false,
                    error: Some(e.to_string()),
                }
            }
        })
        .collect())
}

// --- Booking Logic ---

/// Validates a booking request and, if every rule holds, commits it.
///
/// Checks run in order and the first failure wins: presence, past, lead
/// time, operating window, then slot grid and conflicts against a fresh
/// read of the calendar. Callers that need mutual exclusion between the
/// read and the insert must serialize calls themselves.
pub async fn create_booking<C>(
    calendar: &C,
    calendar_id: &str,
    rules: &BookingRules,
    query: BookingQuery,
    summary: &str,
    now: DateTime<Utc>,
) -> Result<BookingResult, BookingError>
where
    C: CalendarService + ?Sized,
{
    let request = query.into_request()?;
    let (date, start_time, end_time) = request.bounds(rules)?;

    if start_time < now {
        return Err(BookingError::PastTime);
    }
    if !rules.has_lead_time(start_time, now) {
        return Err(BookingError::InsufficientNotice {
            hours: rules.lead_time_hours(),
        });
    }
    if !rules.is_working_day(start_time.weekday())
        || start_time < rules.opening(date)
        || end_time > rules.closing(date)
    {
        return Err(BookingError::OutsideBookableWindow);
    }

    let events = fetch_day_events(calendar, calendar_id, rules, date).await?;
    let on_grid = calculate_time_slots(date, &events, now, rules)
        .iter()
        .any(|slot| slot.start_time == start_time);
    if !on_grid {
        return Err(BookingError::InvalidSlot);
    }
    if let Some(conflict) = events.iter().find(|e| e.overlaps(start_time, end_time)) {
        warn!(
            "Slot {} overlaps event {:?} ({} - {})",
            start_time, conflict.id, conflict.start, conflict.end
        );
        return Err(BookingError::InvalidSlot);
    }

    let created = calendar
        .insert_event(
            calendar_id,
            NewCalendarEvent {
                start: start_time,
                end: end_time,
                summary: summary.to_string(),
                description: None,
            },
        )
        .await
        .context("creating event")?;

    info!(
        "Booked {} - {} (event {:?})",
        created.start, created.end, created.id
    );
    Ok(BookingResult {
        start_time: created.start,
        end_time: created.end,
    })
}
