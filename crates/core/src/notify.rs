use folio_flow_protocol::FlowEvent;

/// Handle returned by [`Subscribers::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&FlowEvent)>;

/// The coordinator's single notification channel.
#[derive(Default)]
pub struct Subscribers {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl Subscribers {
    pub fn subscribe(&mut self, listener: impl FnMut(&FlowEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Deliver to every listener in subscription order.
    pub fn publish(&mut self, event: &FlowEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use folio_flow_protocol::{EventKind, ScrollDirection};

    use super::*;

    fn event(id: &str) -> FlowEvent {
        FlowEvent {
            kind: EventKind::SectionEnter,
            section_id: id.into(),
            current_section: id.into(),
            scroll_direction: ScrollDirection::Down,
        }
    }

    #[test]
    fn publish_reaches_current_subscribers_only() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut subscribers = Subscribers::default();

        let sink = Rc::clone(&seen);
        let first = subscribers.subscribe(move |e| sink.borrow_mut().push(e.section_id.clone()));
        subscribers.publish(&event("home"));

        assert!(subscribers.unsubscribe(first));
        assert!(!subscribers.unsubscribe(first));
        subscribers.publish(&event("about"));

        assert_eq!(*seen.borrow(), vec!["home".to_string()]);
        assert!(subscribers.is_empty());
    }
}
