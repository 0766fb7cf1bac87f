//! Access to the page's `document.cookie`
//!
//! Captures the original accessor pair of `Document.prototype.cookie` once,
//! before anything is redefined, and exposes it as the engine's
//! [`CookieStore`]. Later writes through the captured setter never reach the
//! filtering setter installed on top.

use cg_core::store::{CookieStore, StoreError};
use js_sys::{Function, Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Location};

const COOKIE_PROPERTY: &str = "cookie";

#[wasm_bindgen(inline_js = "export function bind_receiver(filter) { return function (value) { filter(this, value); }; }")]
extern "C" {
    /// Wrap `filter(receiver, value)` as an accessor setter, so the object a
    /// `cookie` assignment targets reaches `filter` as its first argument.
    /// Anything `filter` throws propagates to the assigning script.
    pub fn bind_receiver(filter: &Function) -> Function;
}

/// The original `cookie` accessor of `Document.prototype`.
#[derive(Clone)]
pub struct CookieAccessor {
    prototype: Object,
    getter: Function,
    setter: Function,
    enumerable: bool,
}

impl CookieAccessor {
    pub fn capture() -> Result<Self, JsValue> {
        let document_class = Reflect::get(&js_sys::global(), &"Document".into())?;
        let prototype: Object = Reflect::get(&document_class, &"prototype".into())?
            .dyn_into()
            .map_err(|_| JsValue::from_str("Document.prototype is not an object"))?;

        let descriptor = Object::get_own_property_descriptor(&prototype, &COOKIE_PROPERTY.into());
        if descriptor.is_undefined() {
            return Err(JsValue::from_str("Document.prototype has no cookie property"));
        }

        let getter: Function = Reflect::get(&descriptor, &"get".into())?
            .dyn_into()
            .map_err(|_| JsValue::from_str("cookie property has no getter"))?;
        let setter: Function = Reflect::get(&descriptor, &"set".into())?
            .dyn_into()
            .map_err(|_| JsValue::from_str("cookie property has no setter"))?;
        let enumerable = Reflect::get(&descriptor, &"enumerable".into())?.is_truthy();

        Ok(Self {
            prototype,
            getter,
            setter,
            enumerable,
        })
    }

    /// The original setter.
    pub fn setter(&self) -> &Function {
        &self.setter
    }

    /// Redefine `cookie` with the original getter and `setter`.
    pub fn redefine(&self, setter: &Function) -> Result<(), JsValue> {
        let descriptor = Object::new();
        Reflect::set(&descriptor, &"configurable".into(), &JsValue::TRUE)?;
        Reflect::set(&descriptor, &"enumerable".into(), &JsValue::from_bool(self.enumerable))?;
        Reflect::set(&descriptor, &"get".into(), &self.getter)?;
        Reflect::set(&descriptor, &"set".into(), setter)?;

        if Reflect::define_property(&self.prototype, &COOKIE_PROPERTY.into(), &descriptor)? {
            Ok(())
        } else {
            Err(JsValue::from_str("cookie property is not configurable"))
        }
    }
}

/// The engine's view of `document.cookie`, bypassing any filter.
pub struct DocumentCookieStore {
    document: Document,
    location: Location,
    accessor: CookieAccessor,
}

impl DocumentCookieStore {
    pub fn new(document: Document, location: Location, accessor: CookieAccessor) -> Self {
        Self {
            document,
            location,
            accessor,
        }
    }
}

impl CookieStore for DocumentCookieStore {
    fn read(&self) -> String {
        self.accessor
            .getter
            .call0(&self.document)
            .ok()
            .and_then(|value| value.as_string())
            .unwrap_or_default()
    }

    fn write(&self, assignment: &str) -> Result<(), StoreError> {
        self.accessor
            .setter
            .call1(&self.document, &JsValue::from_str(assignment))
            .map(|_| ())
            .map_err(|e| StoreError::Rejected(describe(&e)))
    }

    fn hostname(&self) -> String {
        self.location.hostname().unwrap_or_default()
    }

    fn pathname(&self) -> String {
        self.location.pathname().unwrap_or_else(|_| "/".to_string())
    }
}

/// String form of a value assigned to `document.cookie`, coerced with the
/// page's own `String` like the original setter does.
pub fn coerce_to_string(value: &JsValue) -> Result<String, JsValue> {
    if let Some(s) = value.as_string() {
        return Ok(s);
    }
    let string_fn: Function = Reflect::get(&js_sys::global(), &"String".into())?
        .dyn_into()
        .map_err(|_| JsValue::from_str("String is not a function"))?;
    string_fn
        .call1(&JsValue::UNDEFINED, value)?
        .as_string()
        .ok_or_else(|| JsValue::from_str("cookie value is not convertible to a string"))
}

pub(crate) fn describe(error: &JsValue) -> String {
    error
        .as_string()
        .or_else(|| {
            error
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{error:?}"))
}
