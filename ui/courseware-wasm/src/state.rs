//! Page-wide state for widgets bound after start.
//!
//! Uses `RefCell`-wrapped `thread_local!` storage (WASM is single-threaded).

use crate::api::Client;
use crate::config::PageConfig;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone)]
pub struct Page {
    pub config: PageConfig,
    pub client: Rc<Client>,
}

thread_local! {
    static PAGE: RefCell<Option<Page>> = const { RefCell::new(None) };
}

pub fn install(config: PageConfig, client: Rc<Client>) {
    PAGE.with(|p| *p.borrow_mut() = Some(Page { config, client }));
}

/// Config and client recorded by `start`, if it has run.
pub fn page() -> Option<Page> {
    PAGE.with(|p| p.borrow().clone())
}
