//! Bookmark controls on courseware pages.
//!
//! Clicks are delegated from the layout's scope element; each click builds a
//! `BookmarkButton` over the clicked control, so all toggle state stays in the
//! DOM.

use crate::api::{Client, FetchTransport};
use crate::config::{BookmarkLayout, PageConfig};
use crate::dom::{self, DomNode};
use crate::events;
use cw_widgets::{BookmarkButton, BookmarkConfig, MessageBanner, Node, WidgetError};
use std::rc::Rc;
use tracing::{debug, info, warn};
use web_sys::Element;

const VERTICAL_SCOPE: &str = ".xblock-student_view-vertical";
const COURSE_CONTENT_SCOPE: &str = ".course-content";
const SEQUENCE_SCOPE_ID: &str = "seq_content";
const COURSEWIDE_BANNER: &str = ".coursewide-message-banner";
const LOADING_MESSAGE: &str = "#loading-message";
const ERROR_MESSAGE: &str = "#error-message";
const SEQUENCE: &str = ".sequence";
const SEQUENCE_CHANGED_EVENT: &str = "sequence:changed";
const BOUND_MARKER: &str = "data-bookmarks-bound";

type Button = BookmarkButton<DomNode, FetchTransport>;

/// Everything the controls of one scope share.
struct Binding {
    scope: Element,
    client: Rc<Client>,
    banner: Rc<MessageBanner<DomNode>>,
    progress: Option<Rc<MessageBanner<DomNode>>>,
    config: Rc<BookmarkConfig>,
}

impl Binding {
    fn button(&self, button: Element) -> Button {
        let widget = BookmarkButton::for_button(
            DomNode(self.scope.clone()),
            DomNode(button),
            self.client.clone(),
            self.banner.clone(),
            self.config.clone(),
            None,
        );
        self.with_progress(widget)
    }

    fn first_button(&self, initial: Option<bool>) -> Result<Button, WidgetError> {
        let widget = BookmarkButton::initialize(
            DomNode(self.scope.clone()),
            self.client.clone(),
            self.banner.clone(),
            self.config.clone(),
            initial,
        )?;
        Ok(self.with_progress(widget))
    }

    fn with_progress(&self, widget: Button) -> Button {
        match &self.progress {
            Some(progress) => widget.with_progress_banner(progress.clone()),
            None => widget,
        }
    }

    fn listen_clicks(self: &Rc<Self>) {
        let binding = self.clone();
        events::on(&self.scope, "click", move |ev| {
            let Some(button) = dom::closest_in(&binding.scope, &ev, &binding.config.button_selector)
            else {
                return;
            };
            ev.prevent_default();
            let widget = binding.button(button);
            wasm_bindgen_futures::spawn_local(async move {
                let outcome = widget.on_toggle_clicked().await;
                debug!(?outcome, "bookmark toggle finished");
            });
        });
    }

    fn listen_sequence_changes(self: &Rc<Self>) {
        let binding = self.clone();
        events::on(&self.scope, SEQUENCE_CHANGED_EVENT, move |ev| {
            let Some(sequence) = dom::closest_in(&binding.scope, &ev, SEQUENCE) else {
                return;
            };
            let sequence = DomNode(sequence);
            match BookmarkButton::for_sequence(
                DomNode(binding.scope.clone()),
                &sequence,
                binding.client.clone(),
                binding.banner.clone(),
                binding.config.clone(),
            ) {
                Ok(widget) => binding.with_progress(widget).on_sequence_changed(&sequence),
                Err(err) => warn!(error = %err, "sequence changed without a bookmark control"),
            }
        });
    }
}

fn banner(selector: &str) -> Option<Rc<MessageBanner<DomNode>>> {
    dom::query(selector).map(|el| Rc::new(MessageBanner::new(DomNode(el))))
}

/// Bind the layout named in the page config. Returns how many scopes were bound.
pub fn bind(config: &PageConfig, client: &Rc<Client>) -> usize {
    let bound = match config.bookmark_layout {
        BookmarkLayout::Vertical => bind_verticals(config, client),
        BookmarkLayout::CourseContent => bind_course_content(config, client),
        BookmarkLayout::Sequence => bind_sequence(client),
    };
    info!(layout = ?config.bookmark_layout, scopes = bound, "bookmark controls bound");
    bound
}

fn bind_verticals(config: &PageConfig, client: &Rc<Client>) -> usize {
    dom::query_all(VERTICAL_SCOPE)
        .iter()
        .filter(|vertical| match bind_vertical(vertical, config, client) {
            Ok(bound) => bound,
            Err(err) => {
                warn!(error = %err, "vertical bookmarks not bound");
                false
            }
        })
        .count()
}

/// Bind the control of one vertical. Verticals rendered after start arrive
/// here through `verticalStudentView`. `Ok(false)` if it was already bound.
pub fn bind_vertical(
    vertical: &Element,
    config: &PageConfig,
    client: &Rc<Client>,
) -> Result<bool, WidgetError> {
    if vertical.has_attribute(BOUND_MARKER) {
        return Ok(false);
    }
    let endpoint = config
        .bookmarks_api_url
        .as_deref()
        .ok_or_else(|| WidgetError::MissingAttribute("data-bookmarks-api-url".to_owned()))?;
    let banner = banner(COURSEWIDE_BANNER)
        .ok_or_else(|| WidgetError::MissingElement(COURSEWIDE_BANNER.to_owned()))?;
    let binding = Rc::new(Binding {
        scope: vertical.clone(),
        client: client.clone(),
        banner,
        progress: None,
        config: Rc::new(BookmarkConfig::vertical_view(endpoint)),
    });
    binding.first_button(initial_flag(vertical))?;
    binding.listen_clicks();
    DomNode(vertical.clone()).set_attr(BOUND_MARKER, "true");
    Ok(true)
}

/// Flag rendered on the enclosing sequence, if the vertical sits directly in one.
pub fn initial_flag(vertical: &Element) -> Option<bool> {
    let parent = vertical.parent_element()?;
    if parent.id() != SEQUENCE_SCOPE_ID {
        return None;
    }
    parent
        .get_attribute("data-bookmarked")
        .map(|raw| dom::parse_flag(Some(raw)))
}

fn bind_course_content(config: &PageConfig, client: &Rc<Client>) -> usize {
    let Some(scope) = dom::query(COURSE_CONTENT_SCOPE) else {
        warn!(selector = COURSE_CONTENT_SCOPE, "course content missing, skipping bookmarks");
        return 0;
    };
    let Some(endpoint) = config.bookmarks_api_url.as_deref() else {
        warn!("no bookmarks api url on the page, skipping course content bookmarks");
        return 0;
    };
    let Some(banner) = banner(COURSEWIDE_BANNER) else {
        warn!(selector = COURSEWIDE_BANNER, "message banner missing, skipping course content bookmarks");
        return 0;
    };
    let binding = Rc::new(Binding {
        scope,
        client: client.clone(),
        banner,
        progress: None,
        config: Rc::new(BookmarkConfig::course_content(endpoint)),
    });
    binding.listen_clicks();
    binding.listen_sequence_changes();
    1
}

fn bind_sequence(client: &Rc<Client>) -> usize {
    let Some(scope) = dom::by_id(SEQUENCE_SCOPE_ID) else {
        warn!(id = SEQUENCE_SCOPE_ID, "sequence content missing, skipping bookmarks");
        return 0;
    };
    let Some(errors) = banner(ERROR_MESSAGE) else {
        warn!(selector = ERROR_MESSAGE, "error banner missing, skipping sequence bookmarks");
        return 0;
    };
    let binding = Rc::new(Binding {
        scope,
        client: client.clone(),
        banner: errors,
        progress: banner(LOADING_MESSAGE),
        config: Rc::new(BookmarkConfig::sequence_content()),
    });
    binding.listen_clicks();
    1
}
