#![forbid(unsafe_code)]

//! Required-field validation.
//!
//! Checking and rendering are separate steps. [`check_form`] reads the
//! document and returns a [`FormReport`]; [`render_report`] writes border
//! colors and error-message siblings from it. The page runs both on every
//! submit, so nothing is cached between attempts.
//!
//! Rendering rules for a required field:
//!
//! - empty: error border, exactly one `.error-message` directly after it;
//! - filled: neutral border, a directly following `.error-message` removed.
//!
//! Live feedback while typing ([`live_input`]) and on blur ([`live_blur`])
//! only consider the `required` attribute at event time.

use crate::config::UiConfig;
use crate::dom::{Dom, NodeId};

/// Form-control tags that take part in validation.
pub const CONTROL_TAGS: [&str; 3] = ["input", "textarea", "select"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldVerdict {
    Filled,
    Empty,
}

impl FieldVerdict {
    /// Verdict for a raw control value; whitespace-only counts as empty.
    #[must_use]
    pub fn of(value: &str) -> Self {
        if value.trim().is_empty() {
            Self::Empty
        } else {
            Self::Filled
        }
    }
}

/// Inline border color applied to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BorderTone {
    Error,
    Neutral,
    Success,
}

impl BorderTone {
    #[must_use]
    pub fn color(self, config: &UiConfig) -> &str {
        match self {
            Self::Error => &config.colors.error,
            Self::Neutral => &config.colors.neutral,
            Self::Success => &config.colors.success,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldReport {
    pub field: NodeId,
    pub verdict: FieldVerdict,
}

/// Result of one submit-time pass over a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormReport {
    pub form: NodeId,
    /// Required fields in document order.
    pub fields: Vec<FieldReport>,
}

impl FormReport {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.fields.iter().all(|f| f.verdict == FieldVerdict::Filled)
    }

    pub fn invalid_fields(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.fields
            .iter()
            .filter(|f| f.verdict == FieldVerdict::Empty)
            .map(|f| f.field)
    }
}

/// Required controls under `form`, in document order.
#[must_use]
pub fn required_fields<D: Dom>(dom: &D, form: NodeId) -> Vec<NodeId> {
    dom.descendants_by_tag(form, &CONTROL_TAGS)
        .into_iter()
        .filter(|&field| dom.has_attribute(field, "required"))
        .collect()
}

#[must_use]
pub fn check_form<D: Dom>(dom: &D, form: NodeId) -> FormReport {
    let fields = required_fields(dom, form)
        .into_iter()
        .map(|field| FieldReport {
            field,
            verdict: FieldVerdict::of(&dom.value(field)),
        })
        .collect();
    FormReport { form, fields }
}

pub fn render_report<D: Dom>(dom: &mut D, config: &UiConfig, report: &FormReport) {
    for f in &report.fields {
        match f.verdict {
            FieldVerdict::Empty => mark_invalid(dom, config, f.field),
            FieldVerdict::Filled => mark_valid(dom, config, f.field, BorderTone::Neutral),
        }
    }
}

/// Error border plus a single error-message sibling.
pub fn mark_invalid<D: Dom>(dom: &mut D, config: &UiConfig, field: NodeId) {
    dom.set_style(field, "border-color", BorderTone::Error.color(config));
    if error_sibling(dom, config, field).is_some() {
        return;
    }
    let note = match dom.create_element("div") {
        Ok(note) => note,
        Err(err) => {
            tracing::debug!(%err, %field, "error message not created");
            return;
        }
    };
    dom.add_class(note, &config.classes.error_message);
    dom.set_text(note, &config.texts.field_required);
    dom.set_style(note, "color", &config.colors.error);
    dom.set_style(note, "font-size", "12px");
    dom.set_style(note, "margin-top", "4px");
    if let Err(err) = dom.insert_after(field, note) {
        tracing::debug!(%err, %field, "error message not inserted");
    }
}

/// Border `tone` and no error-message sibling.
pub fn mark_valid<D: Dom>(dom: &mut D, config: &UiConfig, field: NodeId, tone: BorderTone) {
    dom.set_style(field, "border-color", tone.color(config));
    if let Some(note) = error_sibling(dom, config, field) {
        dom.remove(note);
    }
}

/// The error message directly following `field`, if any.
#[must_use]
pub fn error_sibling<D: Dom>(dom: &D, config: &UiConfig, field: NodeId) -> Option<NodeId> {
    dom.next_element_sibling(field)
        .filter(|&next| dom.has_class(next, &config.classes.error_message))
}

/// `input` event on any control. Returns whether feedback was applied.
pub fn live_input<D: Dom>(dom: &mut D, config: &UiConfig, field: NodeId) -> bool {
    if !dom.has_attribute(field, "required")
        || FieldVerdict::of(&dom.value(field)) == FieldVerdict::Empty
    {
        return false;
    }
    mark_valid(dom, config, field, BorderTone::Success);
    true
}

/// `blur` event on any control. Never adds or removes error messages.
pub fn live_blur<D: Dom>(dom: &mut D, config: &UiConfig, field: NodeId) {
    let tone = if dom.has_attribute(field, "required")
        && FieldVerdict::of(&dom.value(field)) == FieldVerdict::Empty
    {
        BorderTone::Error
    } else {
        BorderTone::Neutral
    };
    dom.set_style(field, "border-color", tone.color(config));
}

/// Join-class guard: the class-code field when it exists and is empty.
#[must_use]
pub fn empty_class_code<D: Dom>(dom: &D, config: &UiConfig) -> Option<NodeId> {
    let field = dom.element_by_id(&config.ids.class_code)?;
    (FieldVerdict::of(&dom.value(field)) == FieldVerdict::Empty).then_some(field)
}
