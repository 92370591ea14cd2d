//! Page-event transport and legacy host hook installation.

use player_host::EventKind;

/// Page namespace owning the legacy hook object and the event-name prefix.
pub const HOOK_NAMESPACE: &str = "PlayerHost";

/// Name of the legacy controller object carrying the host callback slots.
pub const CONTROLLER_GLOBAL: &str = "Controller";

/// Returns the namespaced page-event name for an event kind.
pub fn page_event_name(kind: EventKind) -> String {
    format!("{HOOK_NAMESPACE}.{}", kind.as_str())
}

#[cfg(target_arch = "wasm32")]
fn dispatch_page_event(
    kind: EventKind,
    payload: Option<&player_host::CommandEvent>,
) -> Result<(), String> {
    let window = web_sys::window().ok_or_else(|| "window unavailable".to_string())?;
    let init = web_sys::CustomEventInit::new();
    if let Some(payload) = payload {
        let detail = serde_wasm_bindgen::to_value(payload)
            .map_err(|err| format!("event payload conversion failed: {err}"))?;
        init.set_detail(&detail);
    }
    let event =
        web_sys::CustomEvent::new_with_event_init_dict(&page_event_name(kind), &init)
            .map_err(|err| format!("event construction failed: {err:?}"))?;
    window
        .dispatch_event(&event)
        .map(|_| ())
        .map_err(|err| format!("event dispatch failed: {err:?}"))
}

/// Installs the legacy host hook namespace on the page.
///
/// The host player invokes `Controller.onCommand(name, arg)`,
/// `Controller.onStart()`, and `Controller.onStop()` on the
/// [`HOOK_NAMESPACE`] global; each hook re-dispatches as the matching
/// namespaced page event so transport listeners hear it. Installed hooks
/// live for the rest of the page. No-op off-wasm.
pub fn install_legacy_hooks() -> Result<(), String> {
    #[cfg(target_arch = "wasm32")]
    {
        use js_sys::{Object, Reflect};
        use player_host::CommandEvent;
        use wasm_bindgen::{closure::Closure, JsValue};

        let window = web_sys::window().ok_or_else(|| "window unavailable".to_string())?;

        let on_command = Closure::<dyn FnMut(JsValue, JsValue)>::wrap(Box::new(
            move |name: JsValue, arg: JsValue| {
                let payload = CommandEvent {
                    name: name.as_string().unwrap_or_default(),
                    arg: arg.as_string().unwrap_or_default(),
                };
                if let Err(err) = dispatch_page_event(EventKind::Command, Some(&payload)) {
                    log::warn!("command hook dispatch failed: {err}");
                }
            },
        ));
        let on_start = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            if let Err(err) = dispatch_page_event(EventKind::Start, None) {
                log::warn!("start hook dispatch failed: {err}");
            }
        }));
        let on_stop = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            if let Err(err) = dispatch_page_event(EventKind::Stop, None) {
                log::warn!("stop hook dispatch failed: {err}");
            }
        }));

        let controller = Object::new();
        let assign = |slot: &str, hook: &JsValue| {
            Reflect::set(&controller, &JsValue::from_str(slot), hook)
                .map(|_| ())
                .map_err(|err| format!("hook slot {slot} assignment failed: {err:?}"))
        };
        assign("onCommand", on_command.as_ref())?;
        assign("onStart", on_start.as_ref())?;
        assign("onStop", on_stop.as_ref())?;
        on_command.forget();
        on_start.forget();
        on_stop.forget();

        let namespace = Object::new();
        Reflect::set(
            &namespace,
            &JsValue::from_str(CONTROLLER_GLOBAL),
            &controller,
        )
        .map_err(|err| format!("controller assignment failed: {err:?}"))?;
        Reflect::set(&window, &JsValue::from_str(HOOK_NAMESPACE), &namespace)
            .map(|_| ())
            .map_err(|err| format!("hook namespace assignment failed: {err:?}"))
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
mod transport {
    use std::{
        cell::{Cell, RefCell},
        collections::HashMap,
    };

    use player_host::{CommandEvent, EventCallback, EventKind, EventTransport, ListenerId};
    use wasm_bindgen::{closure::Closure, JsCast};

    use super::{dispatch_page_event, page_event_name};

    type ListenerClosure = Closure<dyn FnMut(web_sys::Event)>;

    /// Event transport riding on namespaced window `CustomEvent`s.
    #[derive(Default)]
    pub struct WebEventTransport {
        next_id: Cell<u64>,
        listeners: RefCell<HashMap<u64, (EventKind, ListenerClosure)>>,
    }

    impl EventTransport for WebEventTransport {
        fn add_listener(&self, kind: EventKind, callback: EventCallback) -> ListenerId {
            let id = ListenerId::new(self.next_id.get());
            self.next_id.set(id.raw() + 1);

            let closure =
                Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |event: web_sys::Event| {
                    let payload = event
                        .dyn_ref::<web_sys::CustomEvent>()
                        .and_then(|custom| {
                            serde_wasm_bindgen::from_value::<CommandEvent>(custom.detail()).ok()
                        });
                    callback(payload);
                }));
            match web_sys::window() {
                Some(window) => {
                    if let Err(err) = window.add_event_listener_with_callback(
                        &page_event_name(kind),
                        closure.as_ref().unchecked_ref(),
                    ) {
                        log::warn!("listener registration failed: {err:?}");
                    }
                }
                None => log::warn!("window unavailable; listener not registered"),
            }
            self.listeners.borrow_mut().insert(id.raw(), (kind, closure));
            id
        }

        fn remove_listener(&self, kind: EventKind, id: ListenerId) {
            let Some((registered_kind, closure)) = self.listeners.borrow_mut().remove(&id.raw())
            else {
                return;
            };
            debug_assert_eq!(registered_kind, kind);
            if let Some(window) = web_sys::window() {
                if let Err(err) = window.remove_event_listener_with_callback(
                    &page_event_name(kind),
                    closure.as_ref().unchecked_ref(),
                ) {
                    log::warn!("listener removal failed: {err:?}");
                }
            }
        }

        fn dispatch(&self, kind: EventKind, payload: Option<CommandEvent>) {
            if let Err(err) = dispatch_page_event(kind, payload.as_ref()) {
                log::warn!("event dispatch failed: {err}");
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod transport {
    use std::cell::Cell;

    use player_host::{CommandEvent, EventCallback, EventKind, EventTransport, ListenerId};

    /// Non-wasm parity transport: registrations are acknowledged but no page
    /// events exist to deliver.
    #[derive(Debug, Default)]
    pub struct WebEventTransport {
        next_id: Cell<u64>,
    }

    impl EventTransport for WebEventTransport {
        fn add_listener(&self, _kind: EventKind, _callback: EventCallback) -> ListenerId {
            let id = ListenerId::new(self.next_id.get());
            self.next_id.set(id.raw() + 1);
            id
        }

        fn remove_listener(&self, _kind: EventKind, _id: ListenerId) {}

        fn dispatch(&self, _kind: EventKind, _payload: Option<CommandEvent>) {}
    }
}

pub use transport::WebEventTransport;
