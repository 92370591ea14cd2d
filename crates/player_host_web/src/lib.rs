//! Browser (`wasm32`) integration boundary for the gadget player adapter.
//!
//! This crate is the only place that touches page globals: the client slot
//! probe, the window load signal, namespaced page events, the legacy host
//! hook object, and the gadget preference API. Everything above it goes
//! through the injected contracts in [`player_host`].
//!
//! Non-wasm builds compile to inert parity adapters so the dependent test
//! suite runs on the host target.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod environment;
pub mod events;
pub mod host_client;
pub mod prefs;

use std::rc::Rc;

use player_host::{PlayerClient, PlayerOptions};

pub use environment::{WebHostEnvironment, CLIENT_GLOBAL};
pub use events::{
    install_legacy_hooks, page_event_name, WebEventTransport, CONTROLLER_GLOBAL, HOOK_NAMESPACE,
};
pub use host_client::WebHostClient;
pub use prefs::{WebPrefsReader, GADGETS_GLOBAL};

/// Builds a [`PlayerClient`] wired to the browser page.
///
/// Installs the legacy host hook namespace unless
/// [`PlayerOptions::legacy_event_hooks`] is off; hook installation failure
/// is logged and the adapter still works, minus host-pushed events.
pub fn create_player_client(options: &PlayerOptions) -> PlayerClient {
    if options.legacy_event_hooks {
        if let Err(err) = install_legacy_hooks() {
            log::warn!("legacy host hook installation failed: {err}");
        }
    }
    PlayerClient::new(
        Rc::new(WebHostEnvironment),
        Rc::new(WebEventTransport::default()),
        Rc::new(WebPrefsReader),
        options,
    )
}
