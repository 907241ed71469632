#![forbid(unsafe_code)]

//! Canonical UI events pushed by the host.
//!
//! The browser host translates DOM events into [`UiEvent`] values. The schema
//! is JSON-friendly so sessions can be recorded and replayed:
//!
//! ```json
//! {"type":"click","target":12}
//! {"type":"key_down","key":"Escape","mods":0}
//! {"type":"resize","width":1024,"height":768}
//! ```
//!
//! Node targets are [`NodeId`]s in the host's id space.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::dom::NodeId;

bitflags! {
    /// Modifier keys held during a key event.
    ///
    /// Encoded as a compact `u8` bitset in JSON (`mods`).
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const SUPER = 0b1000;
    }
}

/// Normalized key identity derived from the DOM `key` string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Escape,
    Enter,
    Tab,
    Char(char),
    Other(Box<str>),
}

impl KeyCode {
    /// Normalize a DOM `KeyboardEvent.key` value.
    ///
    /// Legacy `"Esc"` (old Edge / IE) maps to [`KeyCode::Escape`].
    #[must_use]
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "Escape" | "Esc" => Self::Escape,
            "Enter" => Self::Enter,
            "Tab" => Self::Tab,
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => Self::Other(key.into()),
                }
            }
        }
    }
}

/// Event name used to register and route listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Click,
    Submit,
    Input,
    Blur,
    KeyDown,
    Resize,
}

impl EventKind {
    /// DOM event type string for `addEventListener`.
    #[must_use]
    pub const fn dom_name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Submit => "submit",
            Self::Input => "input",
            Self::Blur => "blur",
            Self::KeyDown => "keydown",
            Self::Resize => "resize",
        }
    }
}

/// Where a listener is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventTarget {
    Node(NodeId),
    Document,
    Window,
}

/// A host-delivered UI event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    Click {
        target: NodeId,
    },
    Submit {
        target: NodeId,
    },
    Input {
        target: NodeId,
    },
    Blur {
        target: NodeId,
    },
    KeyDown {
        key: String,
        #[serde(default)]
        mods: u8,
    },
    Resize {
        width: u32,
        height: u32,
    },
}

impl UiEvent {
    /// Convenience constructor for a key press without modifiers.
    #[must_use]
    pub fn key(key: &str) -> Self {
        Self::KeyDown {
            key: key.to_owned(),
            mods: 0,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Click { .. } => EventKind::Click,
            Self::Submit { .. } => EventKind::Submit,
            Self::Input { .. } => EventKind::Input,
            Self::Blur { .. } => EventKind::Blur,
            Self::KeyDown { .. } => EventKind::KeyDown,
            Self::Resize { .. } => EventKind::Resize,
        }
    }

    /// Listener target this event is delivered to.
    ///
    /// Key events go to the document and resizes to the window, matching
    /// where the page registers those listeners.
    #[must_use]
    pub const fn target(&self) -> EventTarget {
        match self {
            Self::Click { target }
            | Self::Submit { target }
            | Self::Input { target }
            | Self::Blur { target } => EventTarget::Node(*target),
            Self::KeyDown { .. } => EventTarget::Document,
            Self::Resize { .. } => EventTarget::Window,
        }
    }

    #[must_use]
    pub fn key_code(&self) -> Option<KeyCode> {
        match self {
            Self::KeyDown { key, .. } => Some(KeyCode::from_dom_key(key)),
            _ => None,
        }
    }

    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        match self {
            Self::KeyDown { mods, .. } => Modifiers::from_bits_truncate(*mods),
            _ => Modifiers::empty(),
        }
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json_str(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn escape_aliases_normalize() {
        assert_eq!(KeyCode::from_dom_key("Escape"), KeyCode::Escape);
        assert_eq!(KeyCode::from_dom_key("Esc"), KeyCode::Escape);
        assert_eq!(KeyCode::from_dom_key("a"), KeyCode::Char('a'));
        assert_eq!(
            KeyCode::from_dom_key("ArrowUp"),
            KeyCode::Other("ArrowUp".into())
        );
    }

    #[test]
    fn json_schema_is_tagged_by_type() {
        let ev = UiEvent::Click {
            target: NodeId::from_raw(3),
        };
        assert_eq!(ev.to_json_string().unwrap(), r#"{"type":"click","target":3}"#);

        let parsed = UiEvent::from_json_str(r#"{"type":"key_down","key":"Escape"}"#).unwrap();
        assert_eq!(parsed, UiEvent::key("Escape"));
        assert_eq!(parsed.target(), EventTarget::Document);
        assert_eq!(parsed.key_code(), Some(KeyCode::Escape));
    }

    #[test]
    fn modifier_bits_are_truncated() {
        let ev = UiEvent::KeyDown {
            key: "Escape".into(),
            mods: 0xFF,
        };
        assert_eq!(ev.modifiers(), Modifiers::all());
    }

    #[test]
    fn resize_routes_to_window() {
        let ev = UiEvent::Resize {
            width: 1024,
            height: 700,
        };
        assert_eq!(ev.kind(), EventKind::Resize);
        assert_eq!(ev.kind().dom_name(), "resize");
        assert_eq!(ev.target(), EventTarget::Window);
    }
}
