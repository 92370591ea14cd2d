//! Adapter over the host-injected page client object.

use chrono::{DateTime, Utc};
use player_host::{ClientFuture, HostClient};
use serde_json::Value;

#[cfg(target_arch = "wasm32")]
mod imp {
    use js_sys::{Array, Function, Promise, Reflect};
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;

    /// Real host client: a JS object published on the page by the player.
    ///
    /// Methods are looked up reflectively per call and returned promises are
    /// adapted to futures. Any JS-side failure degrades to an absent result
    /// with a logged warning, preserving the never-fails adapter contract.
    pub struct WebHostClient {
        inner: js_sys::Object,
    }

    impl WebHostClient {
        /// Wraps the value found in the client global slot; non-objects read
        /// as no client at all.
        pub(crate) fn from_global(value: JsValue) -> Option<Self> {
            value
                .dyn_into::<js_sys::Object>()
                .ok()
                .map(|inner| Self { inner })
        }

        fn invoke(&self, method: &str, args: &Array) -> Result<JsValue, String> {
            let member = Reflect::get(self.inner.as_ref(), &JsValue::from_str(method))
                .map_err(|err| format!("host client lookup of {method} failed: {err:?}"))?;
            let function: Function = member
                .dyn_into()
                .map_err(|_| format!("host client has no {method} method"))?;
            function
                .apply(self.inner.as_ref(), args)
                .map_err(|err| format!("host client {method} call failed: {err:?}"))
        }

        pub(super) fn fire(&self, method: &str, args: &Array) {
            if let Err(err) = self.invoke(method, args) {
                log::warn!("{err}");
            }
        }

        pub(super) async fn query_value(
            &self,
            method: &'static str,
            args: Array,
        ) -> Option<JsValue> {
            let returned = match self.invoke(method, &args) {
                Ok(value) => value,
                Err(err) => {
                    log::warn!("{err}");
                    return None;
                }
            };
            match JsFuture::from(Promise::resolve(&returned)).await {
                Ok(value) => Some(value),
                Err(err) => {
                    log::warn!("host client {method} promise rejected: {err:?}");
                    None
                }
            }
        }

        pub(super) async fn query(&self, method: &'static str) -> Option<JsValue> {
            self.query_value(method, Array::new()).await
        }

        pub(super) async fn query_string(&self, method: &'static str) -> Option<String> {
            self.query(method).await.and_then(|value| value.as_string())
        }

        pub(super) async fn query_number(&self, method: &'static str) -> Option<f64> {
            self.query(method).await.and_then(|value| value.as_f64())
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use imp::WebHostClient;

#[cfg(target_arch = "wasm32")]
impl HostClient for WebHostClient {
    fn callback(&self, arg: Option<&Value>) {
        use js_sys::Array;
        match arg {
            None => self.fire("callback", &Array::new()),
            Some(value) => match serde_wasm_bindgen::to_value(value) {
                Ok(converted) => self.fire("callback", &Array::of1(&converted)),
                Err(err) => log::warn!("callback argument conversion failed: {err}"),
            },
        }
    }

    fn device_time<'a>(&'a self) -> ClientFuture<'a, Option<String>> {
        Box::pin(self.query_string("getDeviceTime"))
    }

    fn device_time_at<'a>(&'a self, instant: DateTime<Utc>) -> ClientFuture<'a, Option<String>> {
        use wasm_bindgen::JsValue;
        Box::pin(async move {
            let date = js_sys::Date::new(&JsValue::from_str(&instant.to_rfc3339()));
            self.query_value("getDeviceTime", js_sys::Array::of1(&date))
                .await
                .and_then(|value| value.as_string())
        })
    }

    fn device_time_zone_name<'a>(&'a self) -> ClientFuture<'a, Option<String>> {
        Box::pin(self.query_string("getDeviceTimeZoneName"))
    }

    fn device_time_zone_id<'a>(&'a self) -> ClientFuture<'a, Option<String>> {
        Box::pin(self.query_string("getDeviceTimeZoneID"))
    }

    fn device_time_zone_offset<'a>(&'a self) -> ClientFuture<'a, Option<f64>> {
        Box::pin(self.query_number("getDeviceTimeZoneOffset"))
    }

    fn language_code<'a>(&'a self) -> ClientFuture<'a, Option<String>> {
        Box::pin(self.query_string("getLanguageCode"))
    }

    fn device_key<'a>(&'a self) -> ClientFuture<'a, Option<String>> {
        Box::pin(self.query_string("getDeviceKey"))
    }

    fn send_command(&self, name: &str, arg: &str) {
        use wasm_bindgen::JsValue;
        self.fire(
            "sendCommand",
            &js_sys::Array::of2(&JsValue::from_str(name), &JsValue::from_str(arg)),
        );
    }

    fn send_remote_command(&self, device_keys: &[String], name: &str, arg: &str) {
        use wasm_bindgen::JsValue;
        let keys: js_sys::Array = device_keys
            .iter()
            .map(|key| JsValue::from_str(key))
            .collect();
        self.fire(
            "sendRemoteCommand",
            &js_sys::Array::of3(&keys, &JsValue::from_str(name), &JsValue::from_str(arg)),
        );
    }

    fn track(&self, event_name: &str, properties: Option<&str>) {
        use wasm_bindgen::JsValue;
        let properties = properties.map_or(JsValue::UNDEFINED, JsValue::from_str);
        self.fire(
            "track",
            &js_sys::Array::of2(&JsValue::from_str(event_name), &properties),
        );
    }

    fn time_event(&self, event_name: &str) {
        use wasm_bindgen::JsValue;
        self.fire(
            "timeEvent",
            &js_sys::Array::of1(&JsValue::from_str(event_name)),
        );
    }

    fn new_event_session(&self, id: Option<&str>) {
        use wasm_bindgen::JsValue;
        let args = match id {
            Some(id) => js_sys::Array::of1(&JsValue::from_str(id)),
            None => js_sys::Array::new(),
        };
        self.fire("newEventSession", &args);
    }

    fn player_root<'a>(&'a self) -> ClientFuture<'a, Option<String>> {
        Box::pin(self.query_string("getPlayerRoot"))
    }

    fn command_map<'a>(&'a self) -> ClientFuture<'a, Option<String>> {
        Box::pin(self.query_string("getCommandMap"))
    }

    fn device<'a>(&'a self) -> ClientFuture<'a, Option<String>> {
        Box::pin(self.query_string("getDevice"))
    }

    fn width<'a>(&'a self) -> ClientFuture<'a, Option<f64>> {
        Box::pin(self.query_number("getWidth"))
    }

    fn height<'a>(&'a self) -> ClientFuture<'a, Option<f64>> {
        Box::pin(self.query_number("getHeight"))
    }

    fn duration<'a>(&'a self) -> ClientFuture<'a, Option<f64>> {
        Box::pin(self.query_number("getDuration"))
    }

    fn sdk_version<'a>(&'a self) -> ClientFuture<'a, Option<String>> {
        Box::pin(self.query_string("getSdkVersion"))
    }

    fn finish(&self) {
        self.fire("finish", &js_sys::Array::new());
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy, Default)]
/// Non-wasm parity stand-in: an unreachable host, so every query is absent
/// and every command is accepted without effect. Never constructed by the
/// environment probe off-wasm; exists so dependents typecheck on the host
/// target.
pub struct WebHostClient;

#[cfg(not(target_arch = "wasm32"))]
impl HostClient for WebHostClient {
    fn callback(&self, _arg: Option<&Value>) {}

    fn device_time<'a>(&'a self) -> ClientFuture<'a, Option<String>> {
        Box::pin(async { None })
    }

    fn device_time_at<'a>(&'a self, _instant: DateTime<Utc>) -> ClientFuture<'a, Option<String>> {
        Box::pin(async { None })
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
        Box::pin(async { None })
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
}

#[cfg(test)]
mod tests {
    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn parity_client_is_absent_everywhere_but_not_inert() {
        use chrono::Utc;
        use futures::executor::block_on;

        use super::*;

        let client = WebHostClient;
        assert_eq!(block_on(client.device_time()), None);
        assert_eq!(block_on(client.device_time_at(Utc::now())), None);
        assert_eq!(block_on(client.device_key()), None);
        assert_eq!(block_on(client.command_map()), None);
        assert_eq!(block_on(client.width()), None);
        client.send_command("reload", "");
        client.finish();
        // Parity stub models an unreachable real client, not the inert one.
        assert!(!client.is_inert());
    }
}
