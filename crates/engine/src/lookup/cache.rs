use std::sync::{
    Mutex,
    atomic::{AtomicU64, Ordering},
};

use indexmap::IndexMap;
use serde::Serialize;
use stitch_types::{LookupOption, LookupResult};

#[derive(Debug, Clone)]
struct FieldEntry {
    fingerprint: String,
    sequence: u64,
    pending: bool,
    /// Last resolved result; kept while a refresh of the same configuration runs.
    result: Option<LookupResult>,
}

/// What a trigger for a field path should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BeginOutcome {
    /// The field is already resolved for this configuration.
    Hit(LookupResult),
    /// A resolution for this configuration is already pending for the field.
    Joined,
    /// Start a new resolution tagged with this sequence number.
    Dispatch(u64),
}

/// Per-field lookup state keyed by field path.
///
/// Every dispatched resolution carries a sequence number; only the latest
/// sequence for a path may write its result, so a slow response for a
/// superseded configuration is dropped on arrival. A forced dispatch for an
/// unchanged configuration keeps serving the previous result until the new
/// one lands.
#[derive(Debug, Default)]
pub(crate) struct FieldCache {
    entries: Mutex<IndexMap<String, FieldEntry>>,
    next_sequence: AtomicU64,
}

impl FieldCache {
    pub(crate) fn begin(&self, field_path: &str, fingerprint: &str, force: bool) -> BeginOutcome {
        let mut entries = self.entries.lock().expect("field cache lock");
        let existing = entries.get(field_path).filter(|entry| entry.fingerprint == fingerprint);
        if !force && let Some(entry) = existing {
            if entry.pending {
                return BeginOutcome::Joined;
            }
            if let Some(result) = &entry.result {
                return BeginOutcome::Hit(result.clone());
            }
        }

        let previous = existing.and_then(|entry| entry.result.clone());
        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst) + 1;
        entries.insert(
            field_path.to_string(),
            FieldEntry {
                fingerprint: fingerprint.to_string(),
                sequence,
                pending: true,
                result: previous,
            },
        );
        BeginOutcome::Dispatch(sequence)
    }

    /// Store `result` if `sequence` is still the latest for `field_path`.
    ///
    /// Returns `false` when the result is stale and was discarded.
    pub(crate) fn complete(&self, field_path: &str, sequence: u64, result: LookupResult) -> bool {
        let mut entries = self.entries.lock().expect("field cache lock");
        match entries.get_mut(field_path) {
            Some(entry) if entry.sequence == sequence => {
                entry.pending = false;
                entry.result = Some(result);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn result(&self, field_path: &str) -> Option<LookupResult> {
        let entries = self.entries.lock().expect("field cache lock");
        entries.get(field_path)?.result.clone()
    }

    pub(crate) fn remove(&self, field_path: &str) -> bool {
        self.entries
            .lock()
            .expect("field cache lock")
            .shift_remove(field_path)
            .is_some()
    }

    pub(crate) fn clear(&self) {
        self.entries.lock().expect("field cache lock").clear();
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.entries
            .lock()
            .expect("field cache lock")
            .values()
            .any(|entry| entry.pending)
    }

    pub(crate) fn snapshot(&self) -> LookupSnapshot {
        let entries = self.entries.lock().expect("field cache lock");
        let mut snapshot = LookupSnapshot::default();
        for (field_path, entry) in entries.iter() {
            snapshot.loading |= entry.pending;
            match &entry.result {
                Some(LookupResult::Options(options)) => {
                    snapshot.options.insert(field_path.clone(), options.clone());
                }
                Some(LookupResult::Error(message)) => {
                    snapshot.errors.insert(field_path.clone(), message.clone());
                }
                None => {}
            }
        }
        snapshot
    }
}

/// Point-in-time view of every tracked field, in first-triggered order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LookupSnapshot {
    pub options: IndexMap<String, Vec<LookupOption>>,
    pub errors: IndexMap<String, String>,
    pub loading: bool,
}
