//! Browser page environment observed by the client resolver.

use std::{rc::Rc, time::Duration};

use player_host::{EnvFuture, HostClient, HostEnvironment};

/// Well-known page global the host player publishes its client object on.
pub const CLIENT_GLOBAL: &str = "Client";

#[derive(Debug, Clone, Copy, Default)]
/// Page environment backed by the browser window.
///
/// Probes the legacy [`CLIENT_GLOBAL`] slot, reads `document.readyState`,
/// waits on the window `load` event, and sleeps on browser timers. Non-wasm
/// builds behave as a detached page (no client, load complete) so dependent
/// code and tests run on the host target.
pub struct WebHostEnvironment;

impl HostEnvironment for WebHostEnvironment {
    fn probe_client(&self) -> Option<Rc<dyn HostClient>> {
        #[cfg(target_arch = "wasm32")]
        {
            let window = web_sys::window()?;
            let slot =
                js_sys::Reflect::get(&window, &wasm_bindgen::JsValue::from_str(CLIENT_GLOBAL))
                    .ok()?;
            crate::host_client::WebHostClient::from_global(slot)
                .map(|client| Rc::new(client) as Rc<dyn HostClient>)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            None
        }
    }

    fn load_complete(&self) -> bool {
        #[cfg(target_arch = "wasm32")]
        {
            // "complete" means the load event fired and every sub-resource,
            // scripts included, has finished loading.
            web_sys::window()
                .and_then(|window| window.document())
                .map(|document| document.ready_state() == "complete")
                .unwrap_or(true)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            true
        }
    }

    fn wait_load(&self) -> EnvFuture<'_, ()> {
        #[cfg(target_arch = "wasm32")]
        {
            use std::cell::RefCell;

            use futures::channel::oneshot;
            use wasm_bindgen::{closure::Closure, JsCast};

            let (tx, rx) = oneshot::channel::<()>();
            let sender = Rc::new(RefCell::new(Some(tx)));
            if let Some(window) = web_sys::window() {
                let load_sender = Rc::clone(&sender);
                let on_load = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_| {
                    if let Some(tx) = load_sender.borrow_mut().take() {
                        let _ = tx.send(());
                    }
                }));
                let options = web_sys::AddEventListenerOptions::new();
                options.set_once(true);
                let added = window.add_event_listener_with_callback_and_add_event_listener_options(
                    "load",
                    on_load.as_ref().unchecked_ref(),
                    &options,
                );
                match added {
                    // The page owns the listener for the rest of its life.
                    Ok(()) => on_load.forget(),
                    Err(err) => log::warn!("load listener registration failed: {err:?}"),
                }
            }
            Box::pin(async move {
                let _ = rx.await;
            })
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            Box::pin(async {})
        }
    }

    fn sleep(&self, duration: Duration) -> EnvFuture<'_, ()> {
        #[cfg(target_arch = "wasm32")]
        {
            let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
            Box::pin(gloo_timers::future::TimeoutFuture::new(millis))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = duration;
            Box::pin(async {})
        }
    }
}
