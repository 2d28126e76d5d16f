//! Mutation logger.
//!
//! Emits one `info` event per mutation notification with the mutation type,
//! the payload, and a count of changed leaves, followed by one `debug` event
//! per changed leaf. The previous state snapshot is kept inside the plugin so
//! each event describes exactly one handler's effect.

use std::cell::RefCell;
use std::rc::Rc;

use canopy_reactive::{diff_values, StateDiff};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::Result;
use crate::plugin::Plugin;
use crate::store::{MutationRecord, Store};

type Filter = Rc<dyn Fn(&MutationRecord) -> bool>;

/// Logs every mutation through `tracing` under the `canopy::logger` target.
#[derive(Clone, Default)]
pub struct LoggerPlugin {
    filter: Option<Filter>,
}

impl LoggerPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only log mutations for which `filter` returns `true`. The state
    /// snapshot still advances for filtered mutations.
    pub fn with_filter(mut self, filter: impl Fn(&MutationRecord) -> bool + 'static) -> Self {
        self.filter = Some(Rc::new(filter));
        self
    }
}

impl Plugin for LoggerPlugin {
    fn name(&self) -> &str {
        "logger"
    }

    fn apply(&self, store: &Store) -> Result<()> {
        let previous = RefCell::new(store.state());
        let filter = self.filter.clone();
        store.subscribe(move |record, state| {
            let before = previous.replace(state.clone());
            if filter.as_ref().map_or(true, |keep| keep(record)) {
                log_mutation(record, &before, state);
            }
        });
        Ok(())
    }
}

fn log_mutation(record: &MutationRecord, before: &Value, after: &Value) -> StateDiff {
    let diff = diff_values(before, after);
    info!(
        target: "canopy::logger",
        mutation = %record.kind,
        payload = %record.payload,
        changes = diff.len(),
        "mutation"
    );
    for change in &diff.changes {
        debug!(target: "canopy::logger", mutation = %record.kind, "{change}");
    }
    diff
}
