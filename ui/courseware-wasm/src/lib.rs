//! Courseware widgets WASM frontend
//!
//! Binds the `cw-widgets` components to the LMS and Studio pages: web-sys DOM
//! handles, a `fetch` transport, console logging and event wiring.

pub mod api;
pub mod bookmarks;
pub mod certificates;
pub mod config;
pub mod dom;
pub mod ecommerce;
pub mod events;
pub mod logging;
pub mod state;

use wasm_bindgen::prelude::*;
use web_sys::Element;

/// WASM entry point – called automatically when the module is instantiated.
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    // Improve panic messages in the browser console
    console_error_panic_hook::set_once();

    init().await
}

/// Read page config, install logging and bind every widget whose markup is present.
async fn init() -> Result<(), JsValue> {
    let config = config::PageConfig::read();
    logging::init(&config.log_filter);

    let client = api::client(&config);

    let bookmark_scopes = bookmarks::bind(&config, &client);
    let ecommerce_parts = ecommerce::bind(&client);
    let certificate_forms = certificates::bind(&client);

    state::install(config, client);

    tracing::info!(
        bookmark_scopes,
        ecommerce_parts,
        certificate_forms,
        "courseware widgets ready"
    );
    Ok(())
}

/// Called by the XBlock runtime for each vertical it renders, including the
/// ones sequence navigation inserts after the page has loaded.
#[wasm_bindgen(js_name = verticalStudentView)]
pub fn vertical_student_view(element: Element) -> Result<(), JsValue> {
    let Some(page) = state::page() else {
        return Err(JsValue::from_str("courseware widgets have not started"));
    };
    if page.config.bookmark_layout != config::BookmarkLayout::Vertical {
        return Ok(());
    }
    match bookmarks::bind_vertical(&element, &page.config, &page.client) {
        Ok(bound) => {
            tracing::debug!(bound, "vertical student view");
            Ok(())
        }
        Err(err) => Err(JsValue::from_str(&err.to_string())),
    }
}
