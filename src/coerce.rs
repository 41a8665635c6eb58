//! Type-aware coercion of raw string values into control state.
//!
//! One exhaustive dispatch on [`ControlKind`] so the compiler enforces that
//! every kind has a defined coercion rule. Every branch that mutates also
//! dispatches the events a live user edit would, so page logic observing
//! the control reacts identically. Uncoercible values (non-numeric range
//! input, unparseable dates) are logged and skipped; they never abort the
//! remaining fills of a pass.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::page::{ChoiceOption, Control, ControlKind, FormPage, UiEvent};

/// Background color applied to a just-filled control.
pub const HIGHLIGHT_COLOR: &str = "#e6f7ff";

/// How long the highlight stays before reverting.
pub const HIGHLIGHT_REVERT_AFTER: Duration = Duration::from_secs(2);

/// Values that check a checkbox; anything else unchecks it.
const TRUTHY_TOKENS: [&str; 5] = ["yes", "true", "1", "on", "y"];

/// Classes added to star indicators below the rating level.
const STAR_ACTIVE_CLASSES: [&str; 3] = ["selected", "active", "star-full"];

/// Class marking an inactive star indicator.
const STAR_ZERO_CLASS: &str = "star-zero";

/// Range bounds used when a control declares none.
const RANGE_DEFAULT_MIN: f64 = 0.0;
const RANGE_DEFAULT_MAX: f64 = 100.0;

/// Write `value` into the control identified by `control_id`.
///
/// Dispatches on the control's kind and applies the type-specific rule,
/// then transiently highlights the control. Returns `false` when no
/// control with that id exists; an uncoercible value leaves the control
/// untouched but still counts as handled.
pub fn fill_control(page: &FormPage, control_id: &str, value: &str) -> bool {
    let coerced = page.update(control_id, |control| match control.kind() {
        ControlKind::Select => coerce_select(control, value),
        ControlKind::Multiselect => coerce_multiselect(control, value),
        ControlKind::Checkbox => coerce_checkbox(control, value),
        ControlKind::Radio => coerce_radio(control, value),
        ControlKind::Range => coerce_range(control, value),
        ControlKind::Date => coerce_date(control, value, DateForm::DateOnly),
        ControlKind::Datetime => coerce_date(control, value, DateForm::DateTime),
        ControlKind::Rating => coerce_rating(control, value),
        ControlKind::Text | ControlKind::Textarea => coerce_text(control, value),
    });
    match coerced {
        Some(()) => {
            highlight(page, control_id);
            true
        }
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Per-kind rules
// ---------------------------------------------------------------------------

/// Substring match between an option and a lowercased target, in either
/// direction. Empty strings never match.
fn option_matches(option: &ChoiceOption, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let text = option.text.to_lowercase();
    let value = option.value.to_lowercase();
    if text.contains(needle) || value.contains(needle) {
        return true;
    }
    (!text.is_empty() && needle.contains(&text)) || (!value.is_empty() && needle.contains(&value))
}

fn coerce_select(control: &mut Control, value: &str) {
    let needle = value.to_lowercase();
    if let Some(index) = control
        .options
        .iter()
        .position(|option| option_matches(option, &needle))
    {
        let mut selected_value = String::new();
        for (i, option) in control.options.iter_mut().enumerate() {
            option.selected = i == index;
            if option.selected {
                selected_value = option.value.clone();
            }
        }
        control.value = selected_value;
    }
    control.dispatch(UiEvent::Change);
}

fn coerce_multiselect(control: &mut Control, value: &str) {
    if !value.contains(',') {
        coerce_select(control, value);
        return;
    }

    let tokens: Vec<String> = value
        .split(',')
        .map(|token| token.trim().to_lowercase())
        .filter(|token| !token.is_empty())
        .collect();

    for option in &mut control.options {
        let text = option.text.to_lowercase();
        let option_value = option.value.to_lowercase();
        option.selected = tokens
            .iter()
            .any(|token| text.contains(token) || option_value.contains(token));
    }
    // The control's own value mirrors the first selected option.
    control.value = control
        .options
        .iter()
        .find(|option| option.selected)
        .map(|option| option.value.clone())
        .unwrap_or_default();
    control.dispatch(UiEvent::Change);
}

fn coerce_checkbox(control: &mut Control, value: &str) {
    control.checked = TRUTHY_TOKENS.contains(&value.to_lowercase().as_str());
    control.dispatch(UiEvent::Change);
}

fn coerce_radio(control: &mut Control, value: &str) {
    let own = control.value.to_lowercase();
    let target = value.to_lowercase();
    // Loose matching lets "M" check a radio whose value is "Male".
    control.checked = own == target || own.contains(&target) || target.contains(&own);
    control.dispatch(UiEvent::Change);
}

fn coerce_range(control: &mut Control, value: &str) {
    let Ok(numeric) = value.trim().parse::<f64>() else {
        debug!(id = %control.id, value, "range value is not numeric, ignored");
        return;
    };
    if numeric.is_nan() {
        debug!(id = %control.id, value, "range value is not numeric, ignored");
        return;
    }
    let min = control.min.unwrap_or(RANGE_DEFAULT_MIN);
    let max = control.max.unwrap_or(RANGE_DEFAULT_MAX);
    let clamped = numeric.max(min).min(max);
    control.value = format!("{clamped}");
    control.dispatch(UiEvent::Input);
    control.dispatch(UiEvent::Change);
}

#[derive(Clone, Copy)]
enum DateForm {
    DateOnly,
    DateTime,
}

fn coerce_date(control: &mut Control, value: &str, form: DateForm) {
    let Some(instant) = parse_instant(value) else {
        warn!(id = %control.id, value, "unparseable date value, ignored");
        return;
    };
    control.value = match form {
        DateForm::DateOnly => instant.format("%Y-%m-%d").to_string(),
        DateForm::DateTime => instant.format("%Y-%m-%dT%H:%M").to_string(),
    };
    control.dispatch(UiEvent::Input);
    control.dispatch(UiEvent::Change);
}

/// Parse a date or date-time string into a naive instant.
///
/// Offset-bearing timestamps are normalized to UTC; naive forms are taken
/// as written.
fn parse_instant(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(instant.naive_utc());
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(instant) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(instant);
        }
    }
    for format in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

fn coerce_rating(control: &mut Control, value: &str) {
    let Ok(level) = value.trim().parse::<i64>() else {
        warn!(id = %control.id, value, "rating value is not an integer, ignored");
        return;
    };
    control.value = level.to_string();
    // Rating widgets render from CSS state, so the indicator classes must
    // track the numeric value.
    for (index, star) in control.stars.iter_mut().enumerate() {
        let lit = i64::try_from(index).is_ok_and(|i| i < level);
        if lit {
            for class in STAR_ACTIVE_CLASSES {
                star.add_class(class);
            }
            star.remove_class(STAR_ZERO_CLASS);
        } else {
            for class in STAR_ACTIVE_CLASSES {
                star.remove_class(class);
            }
            star.add_class(STAR_ZERO_CLASS);
        }
    }
    control.dispatch(UiEvent::Input);
    control.dispatch(UiEvent::Change);
}

fn coerce_text(control: &mut Control, value: &str) {
    control.value = value.to_owned();
    control.dispatch(UiEvent::Input);
    control.dispatch(UiEvent::Change);
}

// ---------------------------------------------------------------------------
// Highlight
// ---------------------------------------------------------------------------

/// Transiently recolor a just-filled control, reverting after
/// [`HIGHLIGHT_REVERT_AFTER`].
///
/// Best-effort and cosmetic: scheduling the revert needs an async runtime;
/// without one the highlight is applied but never reverted. Never fails
/// the coercion contract.
fn highlight(page: &FormPage, control_id: &str) {
    let prior = page.update(control_id, |control| {
        control.background.replace(HIGHLIGHT_COLOR.to_owned())
    });
    let Some(prior) = prior else {
        return;
    };
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            let page = page.clone();
            let id = control_id.to_owned();
            handle.spawn(async move {
                tokio::time::sleep(HIGHLIGHT_REVERT_AFTER).await;
                page.update(&id, |control| control.background = prior);
            });
        }
        Err(_) => debug!(control_id, "no async runtime, highlight revert skipped"),
    }
}
