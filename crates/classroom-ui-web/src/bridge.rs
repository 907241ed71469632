#![forbid(unsafe_code)]

//! Browser-independent glue between raw DOM event data and
//! `classroom-ui-core` values.
//!
//! The wasm layer reads fields off `web_sys` objects and hands them here as
//! plain numbers and strings, so the translation rules are testable on a
//! native target.

use core::time::Duration;

use classroom_ui_core::datetime::format_date_time;
use classroom_ui_core::event::{EventKind, Modifiers};
use classroom_ui_core::{NodeId, UiEvent};
use time::{Date, Month, PrimitiveDateTime, Time};

/// Modifier state read off a `KeyboardEvent`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct KeyState {
    pub shift: bool,
    pub alt: bool,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyState {
    #[must_use]
    pub fn modifiers(self) -> Modifiers {
        let mut mods = Modifiers::empty();
        mods.set(Modifiers::SHIFT, self.shift);
        mods.set(Modifiers::ALT, self.alt);
        mods.set(Modifiers::CTRL, self.ctrl);
        mods.set(Modifiers::SUPER, self.meta);
        mods
    }
}

/// Raw fields of one DOM event, as far as the page cares about them.
#[derive(Debug, Clone, PartialEq)]
pub enum RawEvent {
    /// `click` / `submit` / `input` / `blur` on an element.
    Element(EventKind, NodeId),
    /// `keydown` on the document.
    Key { key: String, state: KeyState },
    /// `resize` on the window, in CSS pixels.
    Resize { width: f64, height: f64 },
}

/// Translate a raw DOM event. Element kinds that the page never listens
/// for, and `keydown`/`resize` passed as element events, yield `None`.
#[must_use]
pub fn to_ui_event(raw: RawEvent) -> Option<UiEvent> {
    match raw {
        RawEvent::Element(kind, target) => match kind {
            EventKind::Click => Some(UiEvent::Click { target }),
            EventKind::Submit => Some(UiEvent::Submit { target }),
            EventKind::Input => Some(UiEvent::Input { target }),
            EventKind::Blur => Some(UiEvent::Blur { target }),
            EventKind::KeyDown | EventKind::Resize => None,
        },
        RawEvent::Key { key, state } => Some(UiEvent::KeyDown {
            key,
            mods: state.modifiers().bits(),
        }),
        RawEvent::Resize { width, height } => Some(UiEvent::Resize {
            width: css_pixels(width),
            height: css_pixels(height),
        }),
    }
}

/// Clamp a JS number of CSS pixels into `u32`.
#[must_use]
pub fn css_pixels(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

/// Convert a `performance.now()` reading into a clock position.
#[must_use]
pub fn millis(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::from_secs_f64(value / 1_000.0)
    } else {
        Duration::ZERO
    }
}

/// Delay for a `setTimeout` that should fire at `deadline`.
///
/// Rounds up so the timer never fires before the deadline it is meant for.
#[must_use]
pub fn timeout_delay(now: Duration, deadline: Duration) -> i32 {
    let remaining = deadline.saturating_sub(now);
    let mut ms = remaining.as_millis();
    if remaining > Duration::from_millis(ms as u64) {
        ms += 1;
    }
    i32::try_from(ms).unwrap_or(i32::MAX)
}

/// Local calendar fields as exposed by a JS `Date` (`getMonth` is 0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParts {
    pub year: i32,
    pub month0: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
}

impl DateParts {
    #[must_use]
    pub fn to_primitive(self) -> Option<PrimitiveDateTime> {
        let month = u8::try_from(self.month0 + 1)
            .ok()
            .and_then(|m| Month::try_from(m).ok())?;
        let day = u8::try_from(self.day).ok()?;
        let date = Date::from_calendar_date(self.year, month, day).ok()?;
        let time = Time::from_hms(
            u8::try_from(self.hour).ok()?,
            u8::try_from(self.minute).ok()?,
            0,
        )
        .ok()?;
        Some(PrimitiveDateTime::new(date, time))
    }

    /// `YYYY-MM-DD HH:MM`, or `""` for an invalid date.
    #[must_use]
    pub fn format(self) -> String {
        format_date_time(self.to_primitive())
    }
}

/// Format a JS `Date` from its `getTime()` reading and local fields. `read`
/// is only called for a valid date.
pub fn format_js_date(time_ms: f64, read: impl FnOnce() -> DateParts) -> String {
    if time_ms.is_finite() {
        read().format()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn element_events_keep_their_target() {
        let node = NodeId::from_raw(9);
        assert_eq!(
            to_ui_event(RawEvent::Element(EventKind::Submit, node)),
            Some(UiEvent::Submit { target: node })
        );
        assert_eq!(
            to_ui_event(RawEvent::Element(EventKind::Blur, node)),
            Some(UiEvent::Blur { target: node })
        );
        assert_eq!(to_ui_event(RawEvent::Element(EventKind::Resize, node)), None);
    }

    #[test]
    fn key_events_pack_modifiers() {
        let event = to_ui_event(RawEvent::Key {
            key: "Esc".into(),
            state: KeyState {
                shift: true,
                ctrl: true,
                ..KeyState::default()
            },
        })
        .unwrap();
        assert_eq!(event.modifiers(), Modifiers::SHIFT | Modifiers::CTRL);
        assert_eq!(
            event.to_json_string().unwrap(),
            r#"{"type":"key_down","key":"Esc","mods":5}"#
        );
    }

    #[test]
    fn resize_rounds_down_and_clamps() {
        assert_eq!(
            to_ui_event(RawEvent::Resize {
                width: 767.6,
                height: f64::NAN,
            }),
            Some(UiEvent::Resize {
                width: 767,
                height: 0,
            })
        );
        assert_eq!(css_pixels(-4.0), 0);
        assert_eq!(css_pixels(1e12), u32::MAX);
    }

    #[test]
    fn timeout_never_fires_early() {
        let now = Duration::from_micros(1_500);
        assert_eq!(timeout_delay(now, Duration::from_millis(5)), 4);
        assert_eq!(timeout_delay(now, Duration::from_micros(5_200)), 4);
        assert_eq!(timeout_delay(now, Duration::from_micros(1_000)), 0);
        let far = Duration::from_secs(10_000_000);
        assert_eq!(timeout_delay(Duration::ZERO, far), i32::MAX);
    }

    #[test]
    fn performance_readings() {
        assert_eq!(millis(250.0), Duration::from_millis(250));
        assert_eq!(millis(-1.0), Duration::ZERO);
        assert_eq!(millis(f64::INFINITY), Duration::ZERO);
    }

    #[test]
    fn js_date_fields_format() {
        let parts = DateParts {
            year: 2024,
            month0: 2,
            day: 5,
            hour: 9,
            minute: 7,
        };
        assert_eq!(parts.format(), "2024-03-05 09:07");
        let bad = DateParts { month0: 12, ..parts };
        assert_eq!(bad.format(), "");
    }

    #[test]
    fn js_dates_use_local_fields_and_reject_invalid() {
        // A UTC instant read back by a browser at UTC+8.
        let utc8 = || DateParts {
            year: 2024,
            month0: 2,
            day: 5,
            hour: 17,
            minute: 7,
        };
        assert_eq!(format_js_date(1_709_629_662_000.0, utc8), "2024-03-05 17:07");
        assert_eq!(format_js_date(0.0, utc8), "2024-03-05 17:07");

        let mut read = false;
        let out = format_js_date(f64::NAN, || {
            read = true;
            utc8()
        });
        assert_eq!(out, "");
        assert!(!read);
    }
}
