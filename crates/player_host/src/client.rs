//! Player client capability contract and the inert no-op implementation.

use std::{future::Future, pin::Pin};

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

/// Object-safe boxed future used by [`HostClient`] async methods.
pub type ClientFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Capability contract the host player is expected to satisfy.
///
/// Query methods resolve to `Some` when the host knows the value and `None`
/// when it does not; they never fail. Command, tracking, and lifecycle
/// methods are fire-and-forget. The inert [`NoopClient`] satisfies the same
/// contract, so call sites never branch on which implementation resolved —
/// [`HostClient::is_inert`] exists only for preview-mode diagnostics.
pub trait HostClient {
    /// Invokes the player-side scripting callback with at most one argument.
    fn callback(&self, arg: Option<&Value>);

    /// Current device time in ISO 8601, per the timezone assigned to the device.
    fn device_time<'a>(&'a self) -> ClientFuture<'a, Option<String>>;

    /// Translates `instant` into device time, in ISO 8601.
    fn device_time_at<'a>(&'a self, instant: DateTime<Utc>) -> ClientFuture<'a, Option<String>>;

    /// Name of the timezone currently assigned to the device.
    fn device_time_zone_name<'a>(&'a self) -> ClientFuture<'a, Option<String>>;

    /// Identifier of the timezone currently assigned to the device.
    fn device_time_zone_id<'a>(&'a self) -> ClientFuture<'a, Option<String>>;

    /// Numerical offset from GMT of the device timezone.
    fn device_time_zone_offset<'a>(&'a self) -> ClientFuture<'a, Option<f64>>;

    /// Language code currently assigned to the device.
    fn language_code<'a>(&'a self) -> ClientFuture<'a, Option<String>>;

    /// Unique registration key associated with the device.
    fn device_key<'a>(&'a self) -> ClientFuture<'a, Option<String>>;

    /// Sends a named command to the player device.
    fn send_command(&self, name: &str, arg: &str);

    /// Sends a named command to remote devices by registration key.
    fn send_remote_command(&self, device_keys: &[String], name: &str, arg: &str);

    /// Records an analytics event with optional JSON-serialized properties.
    ///
    /// When a timed event of the same name is open (see
    /// [`HostClient::time_event`]), the host reports the elapsed duration.
    fn track(&self, event_name: &str, properties: Option<&str>);

    /// Opens a timed event closed by a later [`HostClient::track`] call.
    fn time_event(&self, event_name: &str);

    /// Starts a new analytics session, optionally with a caller-supplied id.
    fn new_event_session(&self, id: Option<&str>);

    /// Root content folder used by the player device.
    fn player_root<'a>(&'a self) -> ClientFuture<'a, Option<String>>;

    /// Serialized record of the commands currently active for the device.
    fn command_map<'a>(&'a self) -> ClientFuture<'a, Option<String>>;

    /// Serialized device descriptor record.
    fn device<'a>(&'a self) -> ClientFuture<'a, Option<String>>;

    /// Width of the visualization area in pixels.
    fn width<'a>(&'a self) -> ClientFuture<'a, Option<f64>>;

    /// Height of the visualization area in pixels.
    fn height<'a>(&'a self) -> ClientFuture<'a, Option<f64>>;

    /// Duration of the currently playing source, when part of a playlist.
    fn duration<'a>(&'a self) -> ClientFuture<'a, Option<f64>>;

    /// Version string of the host player SDK.
    fn sdk_version<'a>(&'a self) -> ClientFuture<'a, Option<String>>;

    /// Signals that the gadget finished its visualization and the player may
    /// advance to the next playlist item.
    fn finish(&self);

    /// Whether this handle is the inert stand-in rather than a real host
    /// integration. Diagnostic only; behavior never branches on it.
    fn is_inert(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Inert stand-in used when no real host integration is available.
///
/// Every query resolves immediately to a neutral value and every command is
/// accepted without effect, so gadget code runs unchanged in standalone and
/// preview contexts. Device time is the one deliberate exception: it reads
/// genuine wall-clock time so time-dependent gadget logic keeps working.
pub struct NoopClient;

impl HostClient for NoopClient {
    fn callback(&self, _arg: Option<&Value>) {}

    fn device_time<'a>(&'a self) -> ClientFuture<'a, Option<String>> {
        Box::pin(async { Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)) })
    }

    fn device_time_at<'a>(&'a self, instant: DateTime<Utc>) -> ClientFuture<'a, Option<String>> {
        Box::pin(async move { Some(instant.to_rfc3339_opts(SecondsFormat::Millis, true)) })
    }

    fn device_time_zone_name<'a>(&'a self) -> ClientFuture<'a, Option<String>> {
        Box::pin(async { None })
    }

    fn device_time_zone_id<'a>(&'a self) -> ClientFuture<'a, Option<String>> {
        Box::pin(async { None })
    }

    fn device_time_zone_offset<'a>(&'a self) -> ClientFuture<'a, Option<f64>> {
        Box::pin(async { None })
    }

    fn language_code<'a>(&'a self) -> ClientFuture<'a, Option<String>> {
        Box::pin(async { None })
    }

    fn device_key<'a>(&'a self) -> ClientFuture<'a, Option<String>> {
        Box::pin(async { None })
    }

    fn send_command(&self, _name: &str, _arg: &str) {}

    fn send_remote_command(&self, _device_keys: &[String], _name: &str, _arg: &str) {}

    fn track(&self, _event_name: &str, _properties: Option<&str>) {}

    fn time_event(&self, _event_name: &str) {}

    fn new_event_session(&self, _id: Option<&str>) {}

    fn player_root<'a>(&'a self) -> ClientFuture<'a, Option<String>> {
        Box::pin(async { None })
    }

    fn command_map<'a>(&'a self) -> ClientFuture<'a, Option<String>> {
        Box::pin(async { Some("{}".to_string()) })
    }

    fn device<'a>(&'a self) -> ClientFuture<'a, Option<String>> {
        Box::pin(async { None })
    }

    fn width<'a>(&'a self) -> ClientFuture<'a, Option<f64>> {
        Box::pin(async { None })
    }

    fn height<'a>(&'a self) -> ClientFuture<'a, Option<f64>> {
        Box::pin(async { None })
    }

    fn duration<'a>(&'a self) -> ClientFuture<'a, Option<f64>> {
        Box::pin(async { None })
    }

    fn sdk_version<'a>(&'a self) -> ClientFuture<'a, Option<String>> {
        Box::pin(async { None })
    }

    fn finish(&self) {}

    fn is_inert(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use futures::executor::block_on;

    use super::*;

    #[test]
    fn noop_device_time_parses_as_iso_8601() {
        let client = NoopClient;
        let time = block_on(client.device_time()).expect("noop device time");
        DateTime::parse_from_rfc3339(&time).expect("ISO 8601 timestamp");
    }

    #[test]
    fn noop_device_time_at_echoes_the_supplied_instant() {
        let client = NoopClient;
        let instant = DateTime::parse_from_rfc3339("2024-05-01T10:30:00.000Z")
            .expect("fixture instant")
            .with_timezone(&Utc);
        assert_eq!(
            block_on(client.device_time_at(instant)),
            Some("2024-05-01T10:30:00.000Z".to_string())
        );
    }

    #[test]
    fn noop_identity_queries_are_absent() {
        let client = NoopClient;
        assert_eq!(block_on(client.device_time_zone_name()), None);
        assert_eq!(block_on(client.device_time_zone_id()), None);
        assert_eq!(block_on(client.device_time_zone_offset()), None);
        assert_eq!(block_on(client.language_code()), None);
        assert_eq!(block_on(client.device_key()), None);
        assert_eq!(block_on(client.player_root()), None);
        assert_eq!(block_on(client.device()), None);
        assert_eq!(block_on(client.width()), None);
        assert_eq!(block_on(client.height()), None);
        assert_eq!(block_on(client.duration()), None);
        assert_eq!(block_on(client.sdk_version()), None);
    }

    #[test]
    fn noop_command_map_is_an_empty_record() {
        let client = NoopClient;
        assert_eq!(block_on(client.command_map()), Some("{}".to_string()));
    }

    #[test]
    fn noop_commands_are_accepted_without_effect() {
        let client = NoopClient;
        client.callback(None);
        client.send_command("reload", "");
        client.send_remote_command(&["key-1".to_string()], "reload", "");
        client.track("shown", None);
        client.time_event("shown");
        client.new_event_session(Some("session-1"));
        client.finish();
        assert!(client.is_inert());
    }
}
