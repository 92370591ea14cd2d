//! Preference passthrough over the gadget preference API global.

use player_host::PrefsReader;

/// Page global exposing the gadget API namespace.
pub const GADGETS_GLOBAL: &str = "gadgets";

#[derive(Debug, Clone, Copy, Default)]
/// Reader over the gadget preference object the hosting page publishes at
/// `gadgets.Prefs`.
///
/// Each read constructs a fresh preference object and calls the matching
/// typed getter; any missing piece of the chain reads as an absent value.
/// Off-wasm every key is absent.
pub struct WebPrefsReader;

#[cfg(target_arch = "wasm32")]
impl WebPrefsReader {
    fn getter(method: &str, key: &str) -> Option<wasm_bindgen::JsValue> {
        use js_sys::{Array, Function, Reflect};
        use wasm_bindgen::{JsCast, JsValue};

        let window = web_sys::window()?;
        let gadgets = Reflect::get(&window, &JsValue::from_str(GADGETS_GLOBAL)).ok()?;
        let constructor: Function = Reflect::get(&gadgets, &JsValue::from_str("Prefs"))
            .ok()?
            .dyn_into()
            .ok()?;
        let prefs = Reflect::construct(&constructor, &Array::new()).ok()?;
        let getter: Function = Reflect::get(&prefs, &JsValue::from_str(method))
            .ok()?
            .dyn_into()
            .ok()?;
        getter.call1(&prefs, &JsValue::from_str(key)).ok()
    }
}

impl PrefsReader for WebPrefsReader {
    fn string(&self, key: &str) -> Option<String> {
        #[cfg(target_arch = "wasm32")]
        {
            Self::getter("getString", key).and_then(|value| value.as_string())
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            None
        }
    }

    fn integer(&self, key: &str) -> Option<i64> {
        #[cfg(target_arch = "wasm32")]
        {
            Self::getter("getInt", key)
                .and_then(|value| value.as_f64())
                .map(|value| value as i64)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            None
        }
    }

    fn boolean(&self, key: &str) -> Option<bool> {
        #[cfg(target_arch = "wasm32")]
        {
            Self::getter("getBool", key).and_then(|value| value.as_bool())
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            None
        }
    }

    fn list(&self, key: &str) -> Option<Vec<String>> {
        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;

            let value = Self::getter("getArray", key)?;
            let items: js_sys::Array = value.dyn_into().ok()?;
            Some(
                items
                    .iter()
                    .filter_map(|item| item.as_string())
                    .collect(),
            )
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            None
        }
    }
}
