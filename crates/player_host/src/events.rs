//! Player event model and the transport seam between host hooks and gadget
//! subscriptions.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};

use serde::{Deserialize, Serialize};

/// Player event kinds a gadget can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Playback of the gadget's source started.
    Start,
    /// Playback of the gadget's source stopped.
    Stop,
    /// The player delivered a named command to the gadget.
    Command,
}

impl EventKind {
    /// All subscribable event kinds.
    pub const ALL: [Self; 3] = [Self::Start, Self::Stop, Self::Command];

    /// Returns the stable event-name token used on the transport.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Stop => "Stop",
            Self::Command => "Command",
        }
    }
}

/// Payload delivered with [`EventKind::Command`] events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEvent {
    /// Command name.
    pub name: String,
    /// Command argument.
    pub arg: String,
}

/// Callback invoked on event delivery; `Start`/`Stop` carry no payload.
pub type EventCallback = Rc<dyn Fn(Option<CommandEvent>)>;

/// Transport-scoped handle for removing a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Wraps a raw transport-assigned listener number.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw transport-assigned listener number.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Event dispatch/subscription seam.
///
/// The browser transport rides on native page events; the in-memory
/// transport backs non-browser targets and tests. Registration is additive
/// at this layer: multiple listeners for one kind all receive each dispatch.
pub trait EventTransport {
    /// Registers a listener for `kind` and returns its removal handle.
    fn add_listener(&self, kind: EventKind, callback: EventCallback) -> ListenerId;

    /// Removes a previously registered listener. Unknown ids are ignored.
    fn remove_listener(&self, kind: EventKind, id: ListenerId);

    /// Delivers an event to every listener registered for `kind`.
    fn dispatch(&self, kind: EventKind, payload: Option<CommandEvent>);
}

#[derive(Default)]
/// In-memory event transport for non-browser targets and tests.
pub struct MemoryEventTransport {
    next_id: Cell<u64>,
    listeners: RefCell<HashMap<EventKind, Vec<(ListenerId, EventCallback)>>>,
}

impl EventTransport for MemoryEventTransport {
    fn add_listener(&self, kind: EventKind, callback: EventCallback) -> ListenerId {
        let id = ListenerId::new(self.next_id.get());
        self.next_id.set(id.raw() + 1);
        self.listeners
            .borrow_mut()
            .entry(kind)
            .or_default()
            .push((id, callback));
        id
    }

    fn remove_listener(&self, kind: EventKind, id: ListenerId) {
        if let Some(registered) = self.listeners.borrow_mut().get_mut(&kind) {
            registered.retain(|(listener, _)| *listener != id);
        }
    }

    fn dispatch(&self, kind: EventKind, payload: Option<CommandEvent>) {
        // Snapshot first so a callback may subscribe or unsubscribe without
        // holding the registry borrow open.
        let callbacks: Vec<EventCallback> = self
            .listeners
            .borrow()
            .get(&kind)
            .map(|registered| registered.iter().map(|(_, cb)| Rc::clone(cb)).collect())
            .unwrap_or_default();
        for callback in callbacks {
            callback(payload.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> (Rc<Cell<usize>>, EventCallback) {
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        let callback: EventCallback = Rc::new(move |_| seen.set(seen.get() + 1));
        (count, callback)
    }

    #[test]
    fn dispatch_reaches_every_listener_for_the_kind() {
        let transport = MemoryEventTransport::default();
        let (first_count, first) = counter();
        let (second_count, second) = counter();
        transport.add_listener(EventKind::Start, first);
        transport.add_listener(EventKind::Start, second);

        transport.dispatch(EventKind::Start, None);
        transport.dispatch(EventKind::Stop, None);
        assert_eq!(first_count.get(), 1);
        assert_eq!(second_count.get(), 1);
    }

    #[test]
    fn removed_listener_no_longer_receives_events() {
        let transport = MemoryEventTransport::default();
        let (count, callback) = counter();
        let id = transport.add_listener(EventKind::Command, callback);

        transport.remove_listener(EventKind::Command, id);
        transport.dispatch(
            EventKind::Command,
            Some(CommandEvent {
                name: "reload".to_string(),
                arg: String::new(),
            }),
        );
        assert_eq!(count.get(), 0);

        // Unknown removals are tolerated.
        transport.remove_listener(EventKind::Command, id);
    }

    #[test]
    fn command_payload_is_delivered_intact() {
        let transport = MemoryEventTransport::default();
        let delivered = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&delivered);
        transport.add_listener(
            EventKind::Command,
            Rc::new(move |payload| *sink.borrow_mut() = payload),
        );

        transport.dispatch(
            EventKind::Command,
            Some(CommandEvent {
                name: "foo".to_string(),
                arg: "bar".to_string(),
            }),
        );
        assert_eq!(
            *delivered.borrow(),
            Some(CommandEvent {
                name: "foo".to_string(),
                arg: "bar".to_string(),
            })
        );
    }

    #[test]
    fn event_kind_tokens_are_stable() {
        assert_eq!(EventKind::Start.as_str(), "Start");
        assert_eq!(EventKind::Stop.as_str(), "Stop");
        assert_eq!(EventKind::Command.as_str(), "Command");
    }
}
