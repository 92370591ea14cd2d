//! Public adapter facade composing resolution, events, and preferences.

use std::{cell::RefCell, collections::HashMap, rc::Rc, time::Duration};

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::device::{decode_device, Device};
use crate::events::{CommandEvent, EventKind, EventTransport, ListenerId};
use crate::prefs::PrefsReader;
use crate::resolver::{ClientResolver, HostEnvironment, ResolutionState, DEFAULT_RESOLVE_TIMEOUT};

/// Upper bound on positional arguments accepted by
/// [`PlayerClient::callback`]. Calls above the bound are dropped.
pub const MAX_CALLBACK_ARGS: usize = 5;

/// Construction options for [`PlayerClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerOptions {
    /// Install the legacy host hook namespace so player-side callbacks
    /// re-dispatch as page events. Browser integration only.
    pub legacy_event_hooks: bool,
    /// Bound on the load-completion wait before the resolver falls back to
    /// the inert client. `None` waits unbounded.
    pub resolve_timeout: Option<Duration>,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            legacy_event_hooks: true,
            resolve_timeout: Some(DEFAULT_RESOLVE_TIMEOUT),
        }
    }
}

/// Gadget-facing adapter over the host player integration.
///
/// Every operation resolves the shared client handle first, so calls issued
/// at any point of page load queue behind the same resolution and run in
/// issuance order. Public operations never fail: an absent host integration
/// and malformed host payloads both degrade to absent or neutral results.
pub struct PlayerClient {
    resolver: ClientResolver,
    transport: Rc<dyn EventTransport>,
    prefs: Rc<dyn PrefsReader>,
    subscriptions: RefCell<HashMap<EventKind, ListenerId>>,
}

impl PlayerClient {
    /// Builds an adapter over the injected environment, event transport, and
    /// preference reader.
    pub fn new(
        env: Rc<dyn HostEnvironment>,
        transport: Rc<dyn EventTransport>,
        prefs: Rc<dyn PrefsReader>,
        options: &PlayerOptions,
    ) -> Self {
        Self {
            resolver: ClientResolver::new(env, options.resolve_timeout),
            transport,
            prefs,
            subscriptions: RefCell::new(HashMap::new()),
        }
    }

    /// Current progress of the shared client resolution.
    pub fn resolution_state(&self) -> ResolutionState {
        self.resolver.state()
    }

    /// Whether the gadget is running without a genuine host integration
    /// (standalone, CMS editor, or a blocked host script).
    pub async fn is_preview_mode(&self) -> bool {
        self.resolver.resolve().await.is_inert()
    }

    /// Invokes the player-side scripting callback.
    ///
    /// Bounded variadic contract: up to [`MAX_CALLBACK_ARGS`] positional
    /// arguments are accepted and only the last one is forwarded; calls with
    /// more are dropped entirely.
    pub async fn callback(&self, args: &[Value]) {
        if args.len() > MAX_CALLBACK_ARGS {
            log::warn!(
                "dropping player callback with {} arguments (bound is {MAX_CALLBACK_ARGS})",
                args.len()
            );
            return;
        }
        let client = self.resolver.resolve().await;
        client.callback(args.last());
    }

    /// Current device time in ISO 8601, per the device's assigned timezone.
    pub async fn device_time(&self) -> Option<String> {
        self.resolver.resolve().await.device_time().await
    }

    /// Translates `instant` into device time, in ISO 8601.
    pub async fn device_time_at(&self, instant: DateTime<Utc>) -> Option<String> {
        self.resolver.resolve().await.device_time_at(instant).await
    }

    /// Name of the timezone currently assigned to the device.
    pub async fn device_time_zone_name(&self) -> Option<String> {
        self.resolver.resolve().await.device_time_zone_name().await
    }

    /// Identifier of the timezone currently assigned to the device.
    pub async fn device_time_zone_id(&self) -> Option<String> {
        self.resolver.resolve().await.device_time_zone_id().await
    }

    /// Numerical offset from GMT of the device timezone.
    pub async fn device_time_zone_offset(&self) -> Option<f64> {
        self.resolver
            .resolve()
            .await
            .device_time_zone_offset()
            .await
    }

    /// Language code currently assigned to the device.
    pub async fn language_code(&self) -> Option<String> {
        self.resolver.resolve().await.language_code().await
    }

    /// Unique registration key associated with the device.
    pub async fn device_key(&self) -> Option<String> {
        self.resolver.resolve().await.device_key().await
    }

    /// Sends a named command to the player device.
    pub async fn send_command(&self, name: &str, arg: &str) {
        self.resolver.resolve().await.send_command(name, arg);
    }

    /// Sends a named command to remote devices by registration key.
    ///
    /// Remote commands reach only devices within the sender's account.
    pub async fn send_remote_command(&self, device_keys: &[String], name: &str, arg: &str) {
        self.resolver
            .resolve()
            .await
            .send_remote_command(device_keys, name, arg);
    }

    /// Records an analytics event with optional structured properties.
    pub async fn track(&self, event_name: &str, properties: Option<&Value>) {
        let client = self.resolver.resolve().await;
        let serialized = properties.map(Value::to_string);
        client.track(event_name, serialized.as_deref());
    }

    /// Opens a timed event; a later [`track`](PlayerClient::track) call with
    /// the same name reports the elapsed duration.
    pub async fn time_event(&self, event_name: &str) {
        self.resolver.resolve().await.time_event(event_name);
    }

    /// Starts a new analytics session. Events are grouped by session id
    /// until the next call; without `id` the host generates a random one.
    pub async fn new_event_session(&self, id: Option<&str>) {
        self.resolver.resolve().await.new_event_session(id);
    }

    /// Root content folder used by the player device.
    pub async fn player_root(&self) -> Option<String> {
        self.resolver.resolve().await.player_root().await
    }

    /// Commands currently active for the device, decoded from the host
    /// record. Absent when the record cannot be decoded.
    pub async fn command_map(&self) -> Option<HashMap<String, Value>> {
        let raw = self.resolver.resolve().await.command_map().await?;
        match serde_json::from_str(&raw) {
            Ok(map) => Some(map),
            Err(err) => {
                log::warn!("discarding undecodable command map: {err}");
                None
            }
        }
    }

    /// Device descriptor for the player running the gadget. Absent when the
    /// host has none or the record cannot be decoded.
    pub async fn device(&self) -> Option<Device> {
        let raw = self.resolver.resolve().await.device().await?;
        match decode_device(&raw) {
            Ok(device) => device,
            Err(err) => {
                log::warn!("discarding undecodable device record: {err}");
                None
            }
        }
    }

    /// Width of the visualization area in pixels.
    pub async fn width(&self) -> Option<f64> {
        self.resolver.resolve().await.width().await
    }

    /// Height of the visualization area in pixels.
    pub async fn height(&self) -> Option<f64> {
        self.resolver.resolve().await.height().await
    }

    /// Duration of the currently playing source, when part of a playlist.
    pub async fn duration(&self) -> Option<f64> {
        self.resolver.resolve().await.duration().await
    }

    /// Version string of the host player SDK.
    pub async fn sdk_version(&self) -> Option<String> {
        self.resolver.resolve().await.sdk_version().await
    }

    /// Signals that the gadget finished its visualization.
    pub async fn finish(&self) {
        self.resolver.resolve().await.finish();
    }

    /// Subscribes `callback` to `kind` events.
    ///
    /// Bookkeeping holds a single slot per kind: subscribing again without
    /// [`off`](PlayerClient::off) registers an additional transport listener
    /// but only the newest is tracked for removal — the earlier listener
    /// stays attached to the transport for the life of the page.
    pub fn on<F>(&self, kind: EventKind, callback: F)
    where
        F: Fn(Option<CommandEvent>) + 'static,
    {
        let id = self.transport.add_listener(kind, Rc::new(callback));
        self.subscriptions.borrow_mut().insert(kind, id);
    }

    /// Removes the tracked subscription for `kind`, if any.
    pub fn off(&self, kind: EventKind) {
        if let Some(id) = self.subscriptions.borrow_mut().remove(&kind) {
            self.transport.remove_listener(kind, id);
        }
    }

    /// Accessor for the gadget preference passthrough.
    pub fn prefs(&self) -> Rc<dyn PrefsReader> {
        Rc::clone(&self.prefs)
    }
}
