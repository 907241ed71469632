#![forbid(unsafe_code)]

//! Deterministic session recording and replay.
//!
//! [`SessionRecorder`] drives a [`Page`] over a [`MemoryDom`] and records
//! every input (events, value edits, time steps) together with a checksum of
//! the document after it. [`replay`] runs the same inputs through a fresh
//! page and reports any checksum that differs.
//!
//! Traces are JSONL, one record per line:
//!
//! ```text
//! {"kind":"header","schema":"classroom-ui-trace-v1"}
//! {"kind":"init","checksum":1234}
//! {"kind":"set_value","target":7,"value":"Ada","checksum":5678}
//! {"kind":"event","ts_us":0,"event":{"type":"submit","target":4},"checksum":91011}
//! {"kind":"advance","ts_us":5000000,"fired":1,"checksum":121314}
//! {"kind":"summary","records":5,"final_checksum":121314}
//! ```
//!
//! Given the same initial document and config, replay must reproduce every
//! checksum: time only moves through recorded `advance` records and events
//! are applied in recorded order.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::UiConfig;
use crate::dispatch::DispatchOutcome;
use crate::dom::{MemoryDom, NodeId};
use crate::error::UiError;
use crate::event::UiEvent;
use crate::page::Page;

/// Schema version for session traces.
pub const SCHEMA_VERSION: &str = "classroom-ui-trace-v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceRecord {
    /// Must be first.
    Header { schema: String },
    Init { checksum: u64 },
    /// The user edited a control's value.
    SetValue {
        target: NodeId,
        value: String,
        checksum: u64,
    },
    Event {
        ts_us: u64,
        event: UiEvent,
        checksum: u64,
    },
    /// Clock moved to `ts_us`; `fired` timers ran.
    Advance { ts_us: u64, fired: u64, checksum: u64 },
    /// Must be last.
    Summary { records: u64, final_checksum: u64 },
}

impl TraceRecord {
    /// Checksum recorded after this step, if the record carries one.
    #[must_use]
    pub const fn checksum(&self) -> Option<u64> {
        match self {
            Self::Init { checksum }
            | Self::SetValue { checksum, .. }
            | Self::Event { checksum, .. }
            | Self::Advance { checksum, .. } => Some(*checksum),
            Self::Summary { final_checksum, .. } => Some(*final_checksum),
            Self::Header { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTrace {
    pub records: Vec<TraceRecord>,
}

impl SessionTrace {
    pub fn to_jsonl(&self) -> Result<String, UiError> {
        let mut out = String::new();
        for record in &self.records {
            let line = serde_json::to_string(record).map_err(|e| UiError::Trace(e.to_string()))?;
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out)
    }

    /// Parse and validate a JSONL trace.
    pub fn from_jsonl(input: &str) -> Result<Self, UiError> {
        let mut records = Vec::new();
        for (idx, line) in input.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record: TraceRecord = serde_json::from_str(line)
                .map_err(|e| UiError::Trace(format!("line {}: {e}", idx + 1)))?;
            records.push(record);
        }
        let trace = Self { records };
        trace.validate()?;
        Ok(trace)
    }

    /// Check header/summary placement and schema version.
    pub fn validate(&self) -> Result<(), UiError> {
        match self.records.first() {
            Some(TraceRecord::Header { schema }) if schema == SCHEMA_VERSION => {}
            Some(TraceRecord::Header { schema }) => {
                return Err(UiError::Trace(format!("unsupported schema {schema}")));
            }
            _ => return Err(UiError::Trace("missing header".into())),
        }
        let Some(TraceRecord::Summary { records, .. }) = self.records.last() else {
            return Err(UiError::Trace("missing summary".into()));
        };
        let body = (self.records.len() as u64).saturating_sub(2);
        if *records != body {
            return Err(UiError::Trace(format!(
                "summary counts {records} records, trace has {body}"
            )));
        }
        Ok(())
    }
}

/// Records a session while driving a [`Page`].
pub struct SessionRecorder {
    page: Page<MemoryDom>,
    records: Vec<TraceRecord>,
}

impl SessionRecorder {
    #[must_use]
    pub fn new(dom: MemoryDom, config: UiConfig) -> Self {
        Self {
            page: Page::new(dom, config),
            records: vec![TraceRecord::Header {
                schema: SCHEMA_VERSION.to_owned(),
            }],
        }
    }

    pub fn init(&mut self) -> bool {
        let first = self.page.init();
        self.records.push(TraceRecord::Init {
            checksum: self.checksum(),
        });
        first
    }

    pub fn set_value(&mut self, target: NodeId, value: &str) {
        self.page.dom_mut().set_value(target, value);
        self.records.push(TraceRecord::SetValue {
            target,
            value: value.to_owned(),
            checksum: self.checksum(),
        });
    }

    pub fn dispatch(&mut self, event: UiEvent) -> DispatchOutcome {
        let outcome = self.page.dispatch(&event);
        self.records.push(TraceRecord::Event {
            ts_us: micros(self.page.now()),
            event,
            checksum: self.checksum(),
        });
        outcome
    }

    pub fn advance_time(&mut self, dt: Duration) -> usize {
        let fired = self.page.advance_time(dt);
        self.records.push(TraceRecord::Advance {
            ts_us: micros(self.page.now()),
            fired: fired as u64,
            checksum: self.checksum(),
        });
        fired
    }

    #[must_use]
    pub const fn page(&self) -> &Page<MemoryDom> {
        &self.page
    }

    /// Close the trace with a summary record.
    #[must_use]
    pub fn finish(mut self) -> SessionTrace {
        let records = (self.records.len() as u64).saturating_sub(1);
        let final_checksum = self.checksum();
        self.records.push(TraceRecord::Summary {
            records,
            final_checksum,
        });
        SessionTrace {
            records: self.records,
        }
    }

    fn checksum(&self) -> u64 {
        self.page.dom().checksum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayMismatch {
    pub record: usize,
    pub expected: u64,
    pub actual: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayResult {
    pub checked: usize,
    pub mismatches: Vec<ReplayMismatch>,
}

impl ReplayResult {
    #[must_use]
    pub fn ok(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Replay `trace` against a fresh page built from `dom` and `config`.
pub fn replay(
    dom: MemoryDom,
    config: UiConfig,
    trace: &SessionTrace,
) -> Result<ReplayResult, UiError> {
    trace.validate()?;
    let mut page = Page::new(dom, config);
    let mut result = ReplayResult::default();

    for (idx, record) in trace.records.iter().enumerate() {
        match record {
            TraceRecord::Header { .. } => continue,
            TraceRecord::Init { .. } => {
                page.init();
            }
            TraceRecord::SetValue { target, value, .. } => {
                page.dom_mut().set_value(*target, value);
            }
            TraceRecord::Event { event, .. } => {
                page.dispatch(event);
            }
            TraceRecord::Advance { ts_us, .. } => {
                page.set_time(Duration::from_micros(*ts_us));
            }
            TraceRecord::Summary { .. } => {}
        }
        if let Some(expected) = record.checksum() {
            result.checked += 1;
            let actual = page.dom().checksum();
            if actual != expected {
                tracing::warn!(record = idx, expected, actual, "replay checksum mismatch");
                result.mismatches.push(ReplayMismatch {
                    record: idx,
                    expected,
                    actual,
                });
            }
        }
    }
    Ok(result)
}

fn micros(d: Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}
