//! Instructor dashboard e-commerce panel.

use crate::api::{Client, FetchTransport};
use crate::dom::{self, DomNode};
use crate::events;
use cw_api_types::RegistrationCodeAction;
use cw_widgets::{ExpiryCouponToggle, Node, RegistrationCodePanel, ReportTrigger};
use std::rc::Rc;
use tracing::{debug, warn};

const EXPIRY_FIELD: &str = "li#add-coupon-modal-field-expiry";
const EXPIRY_CHECKBOX: &str = r#"input[type="checkbox"]"#;

/// Report buttons with their response and error elements.
const REPORTS: &[(&str, &str, &str)] = &[
    (
        r#"input[name="user-enrollment-report"]"#,
        "enrollment-report-request-response",
        "enrollment-report-request-response-error",
    ),
    (
        r#"input[name="exec-summary-report"]"#,
        "exec-summary-report-request-response",
        "exec-summary-report-request-response-error",
    ),
];

const LOOKUP_PANEL_ID: &str = "registration-code-lookup";
const LOOKUP_CODE_INPUT: &str = r#"input[name="registration_code"]"#;
const LOOKUP_BUTTON: &str = ".lookup-registration-code";
const LOOKUP_RESULT: &str = ".registration-code-lookup-result";
const LOOKUP_MESSAGE: &str = ".registration-code-lookup-message";
const ACTION_LINK: &str = ".registration-code-action";

/// Bind whatever parts of the panel are on the page. Returns how many were bound.
pub fn bind(client: &Rc<Client>) -> usize {
    let mut bound = 0;
    if bind_expiry_toggle() {
        bound += 1;
    }
    bound += bind_reports(client);
    if bind_registration_code_panel(client) {
        bound += 1;
    }
    debug!(bound, "ecommerce panel bound");
    bound
}

fn bind_expiry_toggle() -> bool {
    let Some(container) = dom::query(EXPIRY_FIELD) else {
        return false;
    };
    let toggle = ExpiryCouponToggle::bind(DomNode(container.clone()));
    let scope = container.clone();
    events::on(&container, "click", move |ev| {
        if let Some(checkbox) = dom::closest_in(&scope, &ev, EXPIRY_CHECKBOX) {
            toggle.on_checkbox_changed(DomNode(checkbox).is_checked());
        }
    });
    true
}

fn bind_reports(client: &Rc<Client>) -> usize {
    let mut bound = 0;
    for (selector, response_id, error_id) in REPORTS {
        let Some(button) = dom::query(selector) else {
            continue;
        };
        let (Some(response), Some(error)) = (dom::by_id(response_id), dom::by_id(error_id)) else {
            warn!(selector, "report output elements missing, skipping trigger");
            continue;
        };
        let trigger: Rc<ReportTrigger<DomNode, FetchTransport>> = Rc::new(ReportTrigger::new(
            DomNode(button.clone()),
            DomNode(response),
            DomNode(error),
            client.clone(),
        ));
        events::on_async(&button, "click", move |_| {
            let trigger = trigger.clone();
            async move {
                let _ = trigger.on_click().await;
            }
        });
        bound += 1;
    }
    bound
}

fn bind_registration_code_panel(client: &Rc<Client>) -> bool {
    let Some(container) = dom::by_id(LOOKUP_PANEL_ID) else {
        return false;
    };
    let panel_node = DomNode(container.clone());
    let parts = [LOOKUP_CODE_INPUT, LOOKUP_BUTTON, LOOKUP_RESULT, LOOKUP_MESSAGE]
        .map(|selector| (selector, panel_node.find(selector)));
    if let Some((selector, _)) = parts.iter().find(|(_, node)| node.is_none()) {
        warn!(selector, "registration code panel incomplete, skipping");
        return false;
    }
    let [Some(input), Some(button), Some(result), Some(message)] = parts.map(|(_, node)| node) else {
        return false;
    };

    let lookup_button = button.0.clone();
    let panel: Rc<RegistrationCodePanel<DomNode, FetchTransport>> =
        Rc::new(RegistrationCodePanel::new(input, button, result, message, client.clone()));

    let on_lookup = panel.clone();
    events::on(&lookup_button, "click", move |ev| {
        ev.prevent_default();
        let panel = on_lookup.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let _ = panel.on_lookup().await;
        });
    });

    let scope = container.clone();
    events::on(&container, "click", move |ev| {
        let Some(link) = dom::closest_in(&scope, &ev, ACTION_LINK) else {
            return;
        };
        ev.prevent_default();
        let Some(action) = DomNode(link)
            .data("action")
            .and_then(|raw| RegistrationCodeAction::parse(&raw))
        else {
            warn!("registration code action link without a known data-action");
            return;
        };
        let panel = panel.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let _ = panel.on_action(action).await;
        });
    });
    true
}
