//! Change notification for store consumers.

use std::fmt;

/// What part of the session changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreChange {
    /// Live lines or texts, or drawing settings.
    Drawing,
    /// Players, ball, rotation, selection or 3D mode.
    Board,
    /// The chapter archive or the active slot.
    Chapters,
    /// The playing flag.
    Playback,
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(StoreChange)>;

/// Listener registry owned by a store.
#[derive(Default)]
pub struct Subscribers {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(StoreChange) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the id was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn notify(&mut self, change: StoreChange) {
        for (_, listener) in &mut self.listeners {
            listener(change);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_notify_and_unsubscribe() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut subs = Subscribers::new();

        let sink = seen.clone();
        let id = subs.subscribe(move |change| sink.borrow_mut().push(change));

        subs.notify(StoreChange::Board);
        assert!(subs.unsubscribe(id));
        subs.notify(StoreChange::Drawing);

        assert_eq!(*seen.borrow(), vec![StoreChange::Board]);
        assert!(!subs.unsubscribe(id));
        assert!(subs.is_empty());
    }
}
