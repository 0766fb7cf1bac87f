//! WebAssembly page host for CookieGate
//!
//! Meant to load as early as possible in the page head. On start it reads
//! the configuration from the `cookieGateConfig` global, compiles it, and if
//! any pattern survives installs the gate on `Document.prototype.cookie` and
//! schedules sweeps. Exposes nothing else to the page.

mod console;
mod document;

use std::cell::{Cell, OnceCell};
use std::time::Duration;

use cg_compiler::{compile_patterns, config_from_value};
use cg_core::{Diagnostics, Engine, EngineConfig};
use js_sys::Reflect;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, PageTransitionEvent, Window};

use crate::document::{bind_receiver, coerce_to_string, describe, CookieAccessor, DocumentCookieStore};

/// Global the delivery layer assigns the configuration to.
pub const CONFIG_GLOBAL: &str = "cookieGateConfig";

thread_local! {
    static ENGINE: OnceCell<Engine<DocumentCookieStore>> = const { OnceCell::new() };
    static SWEEP_TICK: OnceCell<Closure<dyn Fn()>> = const { OnceCell::new() };
    static SWEEP_TIMER: Cell<Option<i32>> = const { Cell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() {
    let config = read_config();
    let diagnostics = Diagnostics::new(config.enable_logging);
    if diagnostics.is_enabled() {
        console::init();
    }

    if let Err(e) = install(&config, &diagnostics) {
        diagnostics.install_failed(&describe(&e));
    }
}

fn read_config() -> EngineConfig {
    let value = Reflect::get(&js_sys::global(), &CONFIG_GLOBAL.into())
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
        .and_then(|v| js_sys::JSON::stringify(&v).ok())
        .and_then(|json| json.as_string())
        .and_then(|json| serde_json::from_str::<serde_json::Value>(&json).ok());
    config_from_value(value.as_ref())
}

fn install(config: &EngineConfig, diagnostics: &Diagnostics) -> Result<(), JsValue> {
    if ENGINE.with(|cell| cell.get().is_some()) {
        return Err(JsValue::from_str("already installed"));
    }

    let output = compile_patterns(&config.patterns, diagnostics);
    if output.matchers.is_empty() {
        return Ok(());
    }

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;
    let accessor = CookieAccessor::capture()?;
    let store = DocumentCookieStore::new(document, window.location(), accessor.clone());

    // Runs the first sweep. No page script can run before the setter below
    // is in place.
    let engine = Engine::install(config, output.matchers, store);
    let interval = engine.sweep_interval();
    ENGINE
        .with(|cell| cell.set(engine))
        .map_err(|_| JsValue::from_str("already installed"))?;

    install_setter(&accessor)?;
    start_sweep_timer(&window, interval)?;
    watch_page_lifecycle(&window, interval)
}

fn install_setter(accessor: &CookieAccessor) -> Result<(), JsValue> {
    let original = accessor.setter().clone();
    // Allowed writes go to the original setter on the assignment's own
    // receiver, and whatever it throws is rethrown untouched.
    let filter = Closure::<dyn Fn(JsValue, JsValue) -> Result<(), JsValue>>::new(
        move |receiver: JsValue, value: JsValue| {
            let assignment = coerce_to_string(&value)?;
            let forward = |assignment: &str| {
                original
                    .call1(&receiver, &JsValue::from_str(assignment))
                    .map(|_| ())
            };
            ENGINE.with(|cell| match cell.get() {
                Some(engine) => engine.write_with(&assignment, forward).map(|_| ()),
                None => forward(&assignment),
            })
        },
    );
    accessor.redefine(&bind_receiver(filter.as_ref().unchecked_ref()))?;
    // The property keeps pointing at it for the rest of the page's life.
    filter.forget();
    Ok(())
}

fn start_sweep_timer(window: &Window, interval: Duration) -> Result<(), JsValue> {
    let timeout = i32::try_from(interval.as_millis()).unwrap_or(i32::MAX);
    let handle = SWEEP_TICK.with(|cell| {
        let tick = cell.get_or_init(|| {
            Closure::<dyn Fn()>::new(|| {
                ENGINE.with(|cell| {
                    if let Some(engine) = cell.get() {
                        engine.tick();
                    }
                });
            })
        });
        window.set_interval_with_callback_and_timeout_and_arguments_0(tick.as_ref().unchecked_ref(), timeout)
    })?;
    SWEEP_TIMER.with(|timer| timer.set(Some(handle)));
    Ok(())
}

fn stop_sweep_timer() {
    if let Some(handle) = SWEEP_TIMER.with(Cell::take) {
        if let Some(window) = web_sys::window() {
            window.clear_interval_with_handle(handle);
        }
    }
}

/// Release the sweep timer when the page goes away, and resume it when the
/// page comes back from the back/forward cache.
fn watch_page_lifecycle(window: &Window, interval: Duration) -> Result<(), JsValue> {
    let on_hide = Closure::<dyn Fn(Event)>::new(|_event: Event| stop_sweep_timer());
    window.add_event_listener_with_callback("pagehide", on_hide.as_ref().unchecked_ref())?;
    on_hide.forget();

    let on_show = Closure::<dyn Fn(PageTransitionEvent)>::new(move |event: PageTransitionEvent| {
        if !event.persisted() || SWEEP_TIMER.with(Cell::get).is_some() {
            return;
        }
        ENGINE.with(|cell| {
            if let Some(engine) = cell.get() {
                engine.tick();
            }
        });
        if let Some(window) = web_sys::window() {
            let _ = start_sweep_timer(&window, interval);
        }
    });
    window.add_event_listener_with_callback("pageshow", on_show.as_ref().unchecked_ref())?;
    on_show.forget();
    Ok(())
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use js_sys::Object;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::*;

    use crate::document::{bind_receiver, coerce_to_string};

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_coerce_to_string() {
        assert_eq!(coerce_to_string(&JsValue::from_str("a=1")).unwrap(), "a=1");
        assert_eq!(coerce_to_string(&JsValue::from(5)).unwrap(), "5");
        assert_eq!(coerce_to_string(&JsValue::NULL).unwrap(), "null");
        assert_eq!(coerce_to_string(&JsValue::UNDEFINED).unwrap(), "undefined");
    }

    #[wasm_bindgen_test]
    fn test_bound_setter_keeps_receiver_and_error() {
        let seen: Rc<RefCell<Option<JsValue>>> = Rc::new(RefCell::new(None));
        let record = Rc::clone(&seen);
        let thrown = js_sys::Error::new("rejected");
        let to_throw = thrown.clone();
        let filter = Closure::<dyn Fn(JsValue, JsValue) -> Result<(), JsValue>>::new(
            move |receiver: JsValue, value: JsValue| {
                *record.borrow_mut() = Some(receiver);
                if value.as_string().as_deref() == Some("fail=1") {
                    return Err(to_throw.clone().into());
                }
                Ok(())
            },
        );
        let setter = bind_receiver(filter.as_ref().unchecked_ref());

        let target = Object::new();
        setter.call1(&target, &JsValue::from_str("a=1")).unwrap();
        assert!(Object::is(seen.borrow().as_ref().unwrap(), &target));

        let error = setter.call1(&target, &JsValue::from_str("fail=1")).unwrap_err();
        assert!(Object::is(&error, &thrown));
    }
}
