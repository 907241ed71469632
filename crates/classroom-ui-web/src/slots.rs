#![forbid(unsafe_code)]

//! Slot table behind `WebDom` node ids.
//!
//! Each interned element gets the next slot index, which doubles as its
//! `NodeId` and is written to the element as [`NODE_ATTR`] so lookups are a
//! single attribute read. Releasing a slot drops the stored value but never
//! hands the index out again, so a stale id can only ever resolve to nothing.

/// Attribute carrying an element's slot index.
pub const NODE_ATTR: &str = "data-cui-node";

/// Parse a [`NODE_ATTR`] value.
#[must_use]
pub fn parse_slot(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

#[derive(Debug)]
pub struct Slots<T> {
    items: Vec<Option<T>>,
    live: usize,
}

impl<T> Default for Slots<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Slots<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            live: 0,
        }
    }

    /// Store `item` under a fresh slot.
    pub fn insert(&mut self, item: T) -> u32 {
        self.items.push(Some(item));
        self.live += 1;
        u32::try_from(self.items.len() - 1).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn get(&self, slot: u32) -> Option<&T> {
        self.items.get(slot as usize).and_then(Option::as_ref)
    }

    /// Drop the value in `slot`. The index stays retired.
    pub fn release(&mut self, slot: u32) -> Option<T> {
        let item = self.items.get_mut(slot as usize).and_then(Option::take);
        if item.is_some() {
            self.live -= 1;
        }
        item
    }

    /// Slots currently holding a value.
    #[must_use]
    pub const fn live(&self) -> usize {
        self.live
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn released_slots_are_never_reissued() {
        let mut slots = Slots::new();
        let body = slots.insert("body");
        let toast = slots.insert("toast");
        assert_eq!((body, toast), (0, 1));

        assert_eq!(slots.release(toast), Some("toast"));
        assert_eq!(slots.get(toast), None);
        assert_eq!(slots.release(toast), None);

        let next = slots.insert("loader");
        assert_eq!(next, 2);
        assert_eq!(slots.get(body), Some(&"body"));
        assert_eq!(slots.live(), 2);
    }

    #[test]
    fn removed_subtrees_stop_holding_values() {
        let mut slots = Slots::new();
        slots.insert("body");
        for _ in 0..100 {
            let root = slots.insert("message");
            let parts: Vec<_> = ["content", "icon", "text"]
                .into_iter()
                .map(|p| slots.insert(p))
                .collect();
            slots.release(root);
            for part in parts {
                slots.release(part);
            }
        }
        assert_eq!(slots.live(), 1);
    }

    #[test]
    fn slot_attribute_parsing() {
        assert_eq!(parse_slot("42"), Some(42));
        assert_eq!(parse_slot(""), None);
        assert_eq!(parse_slot("-1"), None);
        assert_eq!(parse_slot("+3"), None);
        assert_eq!(parse_slot("7a"), None);
        assert_eq!(parse_slot("99999999999"), None);
    }
}
