//! Recurrence expansion for repeating events.
//!
//! A repeating event is stored as a template plus a bounded set of
//! materialized occurrence documents. The horizon is fixed at
//! [`OCCURRENCE_COUNT`] occurrences; nothing extends the series afterwards,
//! so a recurring event ends after roughly 30 days, weeks or months
//! depending on the unit. That bound is a known limitation of the design,
//! not a guarantee of infinite recurrence.

use chrono::{DateTime, Duration, Months, Utc};

use chronos_core::types::RepeatKind;
use chronos_db::model::{Event, NewEvent};

/// Number of occurrences materialized per template (occurrence 0 is the
/// template itself, persisted separately).
pub const OCCURRENCE_COUNT: u32 = 30;

/// Shifts a date by `index` recurrence units.
///
/// Monthly shifts use calendar month arithmetic with end-of-month clamping
/// (Jan 31 + 1 month = Feb 28/29), the accepted overflow policy.
#[must_use]
pub fn shift(date: DateTime<Utc>, repeat: RepeatKind, index: u32) -> Option<DateTime<Utc>> {
    match repeat {
        RepeatKind::None => Some(date),
        RepeatKind::Daily => date.checked_add_signed(Duration::days(i64::from(index))),
        RepeatKind::Weekly => date.checked_add_signed(Duration::days(i64::from(index) * 7)),
        RepeatKind::Monthly => date.checked_add_months(Months::new(index)),
    }
}

/// Produces the occurrence documents for a template event.
///
/// Each occurrence copies title, description, kind, color and the repeat tag,
/// keeps the template's calendar and creator, and shifts start/end by the
/// occurrence index. A template with `repeat == none` expands to nothing.
#[must_use]
pub fn expand(template: &Event, occurrence_count: u32) -> Vec<NewEvent> {
    if template.repeat == RepeatKind::None {
        return Vec::new();
    }

    let mut occurrences = Vec::with_capacity(occurrence_count as usize);
    for index in 1..=occurrence_count {
        let start_date = match template.start_date {
            Some(start) => match shift(start, template.repeat, index) {
                Some(shifted) => Some(shifted),
                None => break,
            },
            None => None,
        };
        let end_date = match template.end_date {
            Some(end) => match shift(end, template.repeat, index) {
                Some(shifted) => Some(shifted),
                None => break,
            },
            None => None,
        };

        occurrences.push(NewEvent {
            title: template.title.clone(),
            description: template.description.clone(),
            kind: template.kind,
            start_date,
            end_date,
            calendar: template.calendar,
            creator: template.creator,
            repeat: template.repeat,
            color: template.color.clone(),
        });
    }
    occurrences
}
