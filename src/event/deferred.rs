use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;

use crate::command::HistoryKind;
use crate::document::Document;

/// Summary of the newest history commit handed to idle-time listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryNotice {
    pub cursor: usize,
    pub len: usize,
    pub description: HistoryKind,
    pub timestamp: u64,
}

/// Receives history commits after the interaction that caused them, e.g.
/// an autosave hook.
pub trait HistoryListener: Send {
    fn on_history_committed(&mut self, notice: &HistoryNotice, document: &Document);
}

impl<F> HistoryListener for F
where
    F: FnMut(&HistoryNotice, &Document) + Send,
{
    fn on_history_committed(&mut self, notice: &HistoryNotice, document: &Document) {
        self(notice, document)
    }
}

/// Holds at most one pending notice. Scheduling replaces whatever is still
/// pending; clones share the same slot so an idle callback elsewhere can
/// poll it.
#[derive(Debug, Clone, Default)]
pub struct DeferredNotifier {
    pending: Arc<Mutex<Option<HistoryNotice>>>,
}

impl DeferredNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when an older notice was superseded.
    pub fn schedule(&self, notice: HistoryNotice) -> bool {
        let superseded = self.pending.lock().replace(notice).is_some();
        if superseded {
            debug!("Superseded pending history notice");
        }
        superseded
    }

    pub fn take(&self) -> Option<HistoryNotice> {
        self.pending.lock().take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.lock().is_some()
    }

    pub fn cancel(&self) {
        self.pending.lock().take();
    }
}
