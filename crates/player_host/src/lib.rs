//! Host-player adapter contracts and the client resolution core.
//!
//! This crate is the platform-agnostic half of the gadget player adapter: the
//! [`HostClient`] capability contract, the inert [`NoopClient`] substitute,
//! the [`ClientResolver`] that settles exactly once on one of the two, and
//! the [`PlayerClient`] facade gadget code talks to. Concrete browser wiring
//! (global-slot probing, page events, gadget preferences) lives in
//! `player_host_web`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod client;
pub mod device;
pub mod environment;
pub mod events;
pub mod player;
pub mod prefs;
pub mod resolver;

pub use client::{ClientFuture, HostClient, NoopClient};
pub use device::{Device, DeviceLocation};
pub use environment::{DetachedEnvironment, InjectedEnvironment};
pub use events::{
    CommandEvent, EventCallback, EventKind, EventTransport, ListenerId, MemoryEventTransport,
};
pub use player::{PlayerClient, PlayerOptions, MAX_CALLBACK_ARGS};
pub use prefs::{MemoryPrefsReader, NoopPrefsReader, PrefsReader};
pub use resolver::{
    ClientResolver, EnvFuture, HostEnvironment, ResolutionState, DEFAULT_RESOLVE_TIMEOUT,
};
