//! Event listener plumbing.
//!
//! Listeners live as long as the page, so closures are leaked with
//! `forget()`. Async handlers are spawned with
//! `wasm_bindgen_futures::spawn_local`.

use std::future::Future;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::EventTarget;

/// Attach a sync handler.
pub fn on<F>(target: &EventTarget, event: &str, handler: F)
where
    F: FnMut(web_sys::Event) + 'static,
{
    let cb = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
    if let Err(err) = target.add_event_listener_with_callback(event, cb.as_ref().unchecked_ref()) {
        tracing::warn!(event, error = ?err, "could not attach listener");
    }
    cb.forget();
}

/// Attach an async handler; each event spawns one task.
pub fn on_async<F, Fut>(target: &EventTarget, event: &str, handler: F)
where
    F: Fn(web_sys::Event) -> Fut + 'static,
    Fut: Future<Output = ()> + 'static,
{
    on(target, event, move |ev| {
        wasm_bindgen_futures::spawn_local(handler(ev));
    });
}
