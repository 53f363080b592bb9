//! In-memory page and scripted transport for widget tests.

use crate::node::Node;
use async_trait::async_trait;
use cw_client::{ClientError, HttpRequest, HttpResponse, Transport};
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

#[derive(Default)]
struct FakeState {
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    text: String,
    html: String,
    visible: Option<bool>,
    value: String,
    checked: bool,
    focused: bool,
    events: Vec<String>,
    children: Vec<(String, FakeNode)>,
}

/// Element stand-in. Descendants are registered under the exact selector
/// the widget will query them with.
#[derive(Clone, Default)]
pub struct FakeNode(Rc<RefCell<FakeState>>);

impl FakeNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class(self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    pub fn with_attr(self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_value(self, value: &str) -> Self {
        self.set_value(value);
        self
    }

    pub fn with_child(self, selector: &str, child: &FakeNode) -> Self {
        self.0
            .borrow_mut()
            .children
            .push((selector.to_owned(), child.clone()));
        self
    }

    pub fn set_value(&self, value: &str) {
        self.0.borrow_mut().value = value.to_owned();
    }

    pub fn set_checked(&self, checked: bool) {
        self.0.borrow_mut().checked = checked;
    }

    pub fn text(&self) -> String {
        self.0.borrow().text.clone()
    }

    pub fn html(&self) -> String {
        self.0.borrow().html.clone()
    }

    pub fn is_visible(&self) -> Option<bool> {
        self.0.borrow().visible
    }

    pub fn is_focused(&self) -> bool {
        self.0.borrow().focused
    }

    pub fn events(&self) -> Vec<String> {
        self.0.borrow().events.clone()
    }

    pub fn event_count(&self, event: &str) -> usize {
        self.0.borrow().events.iter().filter(|e| *e == event).count()
    }
}

impl Node for FakeNode {
    fn find(&self, selector: &str) -> Option<Self> {
        let state = self.0.borrow();
        if let Some((_, child)) = state.children.iter().find(|(sel, _)| sel == selector) {
            return Some(child.clone());
        }
        state.children.iter().find_map(|(_, child)| child.find(selector))
    }

    fn has_class(&self, class: &str) -> bool {
        self.0.borrow().classes.iter().any(|c| c == class)
    }

    fn add_class(&self, class: &str) {
        if !self.has_class(class) {
            self.0.borrow_mut().classes.push(class.to_owned());
        }
    }

    fn remove_class(&self, class: &str) {
        self.0.borrow_mut().classes.retain(|c| c != class);
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.0.borrow().attrs.get(name).cloned()
    }

    fn set_attr(&self, name: &str, value: &str) {
        self.0
            .borrow_mut()
            .attrs
            .insert(name.to_owned(), value.to_owned());
    }

    fn remove_attr(&self, name: &str) {
        self.0.borrow_mut().attrs.remove(name);
    }

    fn set_text(&self, text: &str) {
        let mut state = self.0.borrow_mut();
        state.html.clear();
        state.text = text.to_owned();
    }

    fn set_html(&self, html: &str) {
        let mut state = self.0.borrow_mut();
        state.text.clear();
        state.html = html.to_owned();
    }

    fn append_text(&self, text: &str) {
        self.0.borrow_mut().text.push_str(text);
    }

    fn show(&self) {
        self.0.borrow_mut().visible = Some(true);
    }

    fn hide(&self) {
        self.0.borrow_mut().visible = Some(false);
    }

    fn value(&self) -> String {
        self.0.borrow().value.clone()
    }

    fn is_checked(&self) -> bool {
        self.0.borrow().checked
    }

    fn focus(&self) {
        self.0.borrow_mut().focused = true;
    }

    fn dispatch(&self, event: &str) {
        self.0.borrow_mut().events.push(event.to_owned());
    }
}

/// Replays queued replies in order and records every request. Each send
/// yields once so concurrent callers can interleave.
#[derive(Default)]
pub struct ScriptedTransport {
    sent: RefCell<Vec<HttpRequest>>,
    replies: RefCell<VecDeque<Result<HttpResponse, ClientError>>>,
}

impl ScriptedTransport {
    pub fn respond(&self, status: u16, body: &str) {
        self.replies
            .borrow_mut()
            .push_back(Ok(HttpResponse::new(status, body)));
    }

    pub fn fail(&self, reason: &str) {
        self.replies
            .borrow_mut()
            .push_back(Err(ClientError::Transport(reason.to_owned())));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.sent.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        self.sent.borrow_mut().push(request);
        tokio::task::yield_now().await;
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(HttpResponse::new(200, "{}")))
    }
}
