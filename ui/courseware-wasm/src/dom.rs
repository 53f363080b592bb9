//! DOM access.
//!
//! Free helpers over the page document plus [`DomNode`], the web-sys
//! implementation of the widgets' `Node` handle.

use cw_widgets::Node;
use wasm_bindgen::JsCast;
use web_sys::{
    CustomEvent, CustomEventInit, Document, Element, HtmlDocument, HtmlElement, HtmlInputElement,
    HtmlSelectElement, HtmlTextAreaElement,
};

// ── Helpers ──

pub fn window() -> web_sys::Window {
    web_sys::window().expect("no global window")
}

pub fn document() -> Document {
    window().document().expect("window has no document")
}

pub fn by_id(id: &str) -> Option<Element> {
    document().get_element_by_id(id)
}

pub fn query(selector: &str) -> Option<Element> {
    document().query_selector(selector).ok()?
}

pub fn query_all(selector: &str) -> Vec<Element> {
    match document().query_selector_all(selector) {
        Ok(nl) => collect(&nl),
        Err(_) => Vec::new(),
    }
}

fn collect(nl: &web_sys::NodeList) -> Vec<Element> {
    let mut v = Vec::new();
    for i in 0..nl.length() {
        if let Some(e) = nl.item(i) {
            if let Ok(el) = e.dyn_into::<Element>() {
                v.push(el);
            }
        }
    }
    v
}

/// Nearest ancestor-or-self of the event target matching `selector`,
/// provided it sits inside `scope`.
pub fn closest_in(scope: &Element, event: &web_sys::Event, selector: &str) -> Option<Element> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let found = target.closest(selector).ok()??;
    let node: &web_sys::Node = &found;
    scope.contains(Some(node)).then_some(found)
}

/// Value of a cookie set on this document.
pub fn cookie(name: &str) -> Option<String> {
    let doc: HtmlDocument = document().dyn_into().ok()?;
    parse_cookie(&doc.cookie().ok()?, name)
}

pub fn parse_cookie(cookies: &str, name: &str) -> Option<String> {
    cookies
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_owned())
        .filter(|value| !value.is_empty())
}

// ── Node handle ──

#[derive(Clone, Debug)]
pub struct DomNode(pub Element);

impl From<Element> for DomNode {
    fn from(el: Element) -> Self {
        DomNode(el)
    }
}

impl DomNode {
    fn set_display(&self, display: &str) {
        if let Some(el) = self.0.dyn_ref::<HtmlElement>() {
            let _ = el.style().set_property("display", display);
        }
    }
}

impl Node for DomNode {
    fn find(&self, selector: &str) -> Option<Self> {
        self.0.query_selector(selector).ok()?.map(DomNode)
    }

    fn has_class(&self, class: &str) -> bool {
        self.0.class_list().contains(class)
    }

    fn add_class(&self, class: &str) {
        let _ = self.0.class_list().add_1(class);
    }

    fn remove_class(&self, class: &str) {
        let _ = self.0.class_list().remove_1(class);
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }

    fn set_attr(&self, name: &str, value: &str) {
        let _ = self.0.set_attribute(name, value);
    }

    fn remove_attr(&self, name: &str) {
        let _ = self.0.remove_attribute(name);
    }

    fn set_text(&self, text: &str) {
        self.0.set_text_content(Some(text));
    }

    fn set_html(&self, html: &str) {
        self.0.set_inner_html(html);
    }

    fn append_text(&self, text: &str) {
        let _ = self.0.append_with_str_1(text);
    }

    fn show(&self) {
        self.set_display("block");
    }

    fn hide(&self) {
        self.set_display("none");
    }

    fn value(&self) -> String {
        if let Some(input) = self.0.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(area) = self.0.dyn_ref::<HtmlTextAreaElement>() {
            area.value()
        } else if let Some(select) = self.0.dyn_ref::<HtmlSelectElement>() {
            select.value()
        } else {
            String::new()
        }
    }

    fn is_checked(&self) -> bool {
        self.0
            .dyn_ref::<HtmlInputElement>()
            .is_some_and(|input| input.checked())
    }

    fn focus(&self) {
        if let Some(el) = self.0.dyn_ref::<HtmlElement>() {
            let _ = el.focus();
        }
    }

    fn dispatch(&self, event: &str) {
        let init = CustomEventInit::new();
        init.set_bubbles(true);
        match CustomEvent::new_with_event_init_dict(event, &init) {
            Ok(ev) => {
                let _ = self.0.dispatch_event(&ev);
            }
            Err(err) => tracing::warn!(event, error = ?err, "could not create event"),
        }
    }
}

/// Attribute flags rendered by the server templates ("true", "True", "1").
pub fn parse_flag(raw: Option<String>) -> bool {
    matches!(
        raw.as_deref().map(str::trim),
        Some("true" | "True" | "1")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_lookup() {
        let jar = "sessionid=abc; csrftoken=XyZ123; theme=dark";
        assert_eq!(parse_cookie(jar, "csrftoken").as_deref(), Some("XyZ123"));
        assert_eq!(parse_cookie(jar, "missing"), None);
        assert_eq!(parse_cookie("csrftoken=", "csrftoken"), None);
        assert_eq!(parse_cookie("", "csrftoken"), None);
    }

    #[test]
    fn server_rendered_flags() {
        assert!(parse_flag(Some("True".into())));
        assert!(parse_flag(Some(" true ".into())));
        assert!(parse_flag(Some("1".into())));
        assert!(!parse_flag(Some("False".into())));
        assert!(!parse_flag(None));
    }
}
