use std::{collections::HashMap, fmt, sync::Arc};

use crate::{Core, ListenerId, NodeId};

/// Events a node can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// The node and its whole subtree have been laid out.
    LayoutUpdated,
}

/// A listener callback. It receives the core and the node that fired, and is
/// invoked with no node locks held, so it may mutate the tree.
pub type Listener = Arc<dyn Fn(&Core, NodeId) + Send + Sync>;

/// Per-node listener registry, kept in registration order per event kind.
#[derive(Default)]
pub struct Listeners {
    /// Registered listeners by event kind.
    by_event: HashMap<Event, Vec<(ListenerId, Listener)>>,
}

impl Listeners {
    /// Append a listener.
    pub(crate) fn add(&mut self, event: Event, id: ListenerId, listener: Listener) {
        self.by_event.entry(event).or_default().push((id, listener));
    }

    /// Remove the first listener with the given handle. Returns `true` if one
    /// was removed.
    pub(crate) fn remove(&mut self, event: Event, id: ListenerId) -> bool {
        let Some(list) = self.by_event.get_mut(&event) else {
            return false;
        };
        match list.iter().position(|(lid, _)| *lid == id) {
            Some(pos) => {
                list.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Snapshot the listeners for an event, in registration order.
    pub(crate) fn snapshot(&self, event: Event) -> Vec<Listener> {
        self.by_event
            .get(&event)
            .map(|list| list.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default()
    }

    /// Registered handles for an event, in registration order.
    pub fn ids(&self, event: Event) -> Vec<ListenerId> {
        self.by_event
            .get(&event)
            .map(|list| list.iter().map(|(id, _)| *id).collect())
            .unwrap_or_default()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.by_event.iter().map(|(k, v)| (k, v.len())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Listener {
        Arc::new(|_, _| {})
    }

    #[test]
    fn remove_by_handle_keeps_order() {
        let mut l = Listeners::default();
        l.add(Event::LayoutUpdated, ListenerId(1), noop());
        l.add(Event::LayoutUpdated, ListenerId(2), noop());
        l.add(Event::LayoutUpdated, ListenerId(3), noop());

        assert!(l.remove(Event::LayoutUpdated, ListenerId(2)));
        assert!(!l.remove(Event::LayoutUpdated, ListenerId(2)));
        assert_eq!(
            l.ids(Event::LayoutUpdated),
            vec![ListenerId(1), ListenerId(3)]
        );
        assert_eq!(l.snapshot(Event::LayoutUpdated).len(), 2);
    }

    #[test]
    fn remove_from_empty() {
        let mut l = Listeners::default();
        assert!(!l.remove(Event::LayoutUpdated, ListenerId(7)));
        assert!(l.ids(Event::LayoutUpdated).is_empty());
    }
}
