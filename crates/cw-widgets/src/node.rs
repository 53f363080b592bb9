//! Handle to one element of the page.
//!
//! Methods take `&self`: like a DOM element, a handle is a shared reference to
//! state owned by the page.

pub trait Node: Clone {
    /// First descendant matching a CSS selector.
    fn find(&self, selector: &str) -> Option<Self>;

    fn has_class(&self, class: &str) -> bool;
    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);

    fn attr(&self, name: &str) -> Option<String>;
    fn set_attr(&self, name: &str, value: &str);
    fn remove_attr(&self, name: &str);

    /// Replace all content with a text node.
    fn set_text(&self, text: &str);
    /// Replace all content with trusted markup.
    fn set_html(&self, html: &str);
    /// Append a text node after the current content.
    fn append_text(&self, text: &str);

    fn show(&self);
    fn hide(&self);

    /// Current value of a form control; empty for anything else.
    fn value(&self) -> String;
    fn is_checked(&self) -> bool;
    fn focus(&self);

    /// Fire a bubbling custom event on this element.
    fn dispatch(&self, event: &str);

    fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// `data-<key>` attribute, ignoring blank values.
    fn data(&self, key: &str) -> Option<String> {
        self.attr(&format!("data-{key}"))
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    }

    fn swap_class(&self, remove: &str, add: &str) {
        self.remove_class(remove);
        self.add_class(add);
    }
}
