//! Studio certificate edit forms.

use crate::api::{Client, FetchTransport};
use crate::dom::{self, DomNode};
use crate::events;
use cw_api_types::Certificate;
use cw_widgets::{CertificateEditor, CertificateEditorView, MessageBanner, Node};
use std::rc::Rc;
use tracing::{debug, warn};
use web_sys::Element;

const EDIT_FORM: &str = ".certificate-edit";
const ERROR_BANNER: &str = ".message-status.error";
const NAME_INPUT: &str = ".collection-name-input";
const DESCRIPTION_INPUT: &str = ".certificate-description-input";
const ORG_LOGO_INPUT: &str = ".org-logo-input";
const ADD_SIGNATORY: &str = ".action-add-signatory";
const DELETE_SIGNATORY: &str = ".signatory-panel-delete";
const CANCEL: &str = ".action-cancel";

type View = CertificateEditorView<DomNode, FetchTransport>;

/// Bind every edit form on the page. Returns how many were bound.
pub fn bind(client: &Rc<Client>) -> usize {
    dom::query_all(EDIT_FORM)
        .into_iter()
        .filter(|form| bind_form(form, client))
        .count()
}

fn bind_form(form: &Element, client: &Rc<Client>) -> bool {
    let node = DomNode(form.clone());
    let Some(banner) = node.find(ERROR_BANNER) else {
        warn!(selector = ERROR_BANNER, "certificate form without a message area, skipping");
        return false;
    };
    let editor = match node.data("certificate") {
        Some(json) => match serde_json::from_str::<Certificate>(&json) {
            Ok(certificate) => CertificateEditor::new(certificate),
            Err(err) => {
                warn!(error = %err, "unreadable certificate on form, skipping");
                return false;
            }
        },
        None => CertificateEditor::new_for_add(),
    };
    let collection_url = node.data("certificates-url");
    let view: Rc<View> = Rc::new(CertificateEditorView::new(
        node,
        Rc::new(MessageBanner::new(banner)),
        client.clone(),
        collection_url,
        editor,
    ));

    let on_change = view.clone();
    let scope = form.clone();
    events::on(form, "change", move |ev| {
        if dom::closest_in(&scope, &ev, NAME_INPUT).is_some() {
            on_change.on_name_changed();
        } else if dom::closest_in(&scope, &ev, DESCRIPTION_INPUT).is_some() {
            on_change.on_description_changed();
        } else if dom::closest_in(&scope, &ev, ORG_LOGO_INPUT).is_some() {
            on_change.on_org_logo_changed();
        }
    });

    let on_click = view.clone();
    let scope = form.clone();
    events::on(form, "click", move |ev| {
        if dom::closest_in(&scope, &ev, ADD_SIGNATORY).is_some() {
            ev.prevent_default();
            if let Err(err) = on_click.on_add_signatory() {
                debug!(error = %err, "signatory not added");
            }
        } else if let Some(link) = dom::closest_in(&scope, &ev, DELETE_SIGNATORY) {
            ev.prevent_default();
            let Some(index) = link
                .get_attribute("data-index")
                .and_then(|raw| raw.trim().parse::<usize>().ok())
            else {
                warn!("signatory delete link without an index");
                return;
            };
            let view = on_click.clone();
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(err) = view.on_remove_signatory(index).await {
                    debug!(error = %err, "signatory not removed");
                }
            });
        } else if dom::closest_in(&scope, &ev, CANCEL).is_some() {
            ev.prevent_default();
            on_click.on_cancel();
        }
    });

    let on_submit = view;
    events::on(form, "submit", move |ev| {
        ev.prevent_default();
        if let Err(err) = on_submit.on_submit() {
            debug!(error = %err, "certificate form rejected");
        }
    });
    true
}
