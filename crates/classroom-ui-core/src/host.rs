#![forbid(unsafe_code)]

//! Capabilities supplied by the embedding host.
//!
//! The browser provides an asynchronous clipboard and a blocking
//! confirmation prompt. The core only sees these traits, so tests and native
//! hosts can substitute their own.

use crate::error::UiError;

/// Clipboard write capability.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), UiError>;
}

/// Blocking yes/no prompt (`window.confirm`).
pub trait ConfirmPrompt {
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F> ConfirmPrompt for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

/// Ask `prompt` and run `callback` only on acceptance. Declining does
/// nothing. Returns whether the callback ran.
pub fn confirm_action<P, C>(prompt: &mut P, message: &str, callback: C) -> bool
where
    P: ConfirmPrompt + ?Sized,
    C: FnOnce(),
{
    if prompt.confirm(message) {
        callback();
        true
    } else {
        false
    }
}

/// In-memory clipboard for native hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
    deny: Option<String>,
}

impl MemoryClipboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard that rejects every write with `reason`.
    #[must_use]
    pub fn denying(reason: &str) -> Self {
        Self {
            contents: None,
            deny: Some(reason.to_owned()),
        }
    }

    #[must_use]
    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), UiError> {
        if let Some(reason) = &self.deny {
            return Err(UiError::Clipboard(reason.clone()));
        }
        self.contents = Some(text.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_action_runs_callback_only_on_accept() {
        let mut ran = 0;
        let mut yes = |_: &str| true;
        assert!(confirm_action(&mut yes, "Delete?", || ran += 1));
        let mut no = |_: &str| false;
        assert!(!confirm_action(&mut no, "Delete?", || ran += 1));
        assert_eq!(ran, 1);
    }

    #[test]
    fn prompt_sees_the_message() {
        let mut asked = Vec::new();
        let mut prompt = |m: &str| {
            asked.push(m.to_owned());
            false
        };
        confirm_action(&mut prompt, "Leave class?", || {});
        assert_eq!(asked, vec!["Leave class?".to_owned()]);
    }

    #[test]
    fn memory_clipboard() {
        let mut ok = MemoryClipboard::new();
        ok.write_text("ABC123").unwrap();
        assert_eq!(ok.contents(), Some("ABC123"));

        let mut denied = MemoryClipboard::denying("NotAllowedError");
        assert_eq!(
            denied.write_text("x"),
            Err(UiError::Clipboard("NotAllowedError".into()))
        );
    }
}
