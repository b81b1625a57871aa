mod bus;
mod deferred;
mod events;

pub use bus::EventBus;
pub use deferred::{DeferredNotifier, HistoryListener, HistoryNotice};
pub use events::{EditorEvent, TextEditRequest};

pub trait EventHandler: Send {
    fn handle_event(&mut self, event: &EditorEvent);
}

impl<F> EventHandler for F
where
    F: FnMut(&EditorEvent) + Send,
{
    fn handle_event(&mut self, event: &EditorEvent) {
        self(event)
    }
}
