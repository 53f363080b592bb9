//! Bookmark toggle for a single course unit.
//!
//! The control's classes always show the last state the server acknowledged.
//! While a request is in flight the control carries the `disabled` attribute
//! and further clicks are ignored.

use crate::error::WidgetError;
use crate::message::{ERROR_ICON, IN_PROGRESS_ICON, MessageBanner};
use crate::node::Node;
use cw_api_types::{BookmarkId, UsageId};
use cw_client::{CoursewareClient, Transport};
use std::rc::Rc;
use tracing::{debug, info, warn};

pub const BOOKMARKED: &str = "bookmarked";
pub const UN_BOOKMARKED: &str = "un-bookmarked";
pub const IS_DISABLED: &str = "is-disabled";
pub const IS_HIDDEN: &str = "is-hidden";
pub const BOOKMARK_ADD_EVENT: &str = "bookmark:add";
pub const BOOKMARK_REMOVE_EVENT: &str = "bookmark:remove";

const SR_LABEL: &str = ".bookmark-sr";
const ACTIVE_ICON_IN_SEQUENCE: &str = ".active .bookmark-icon";

/// How a control names the bookmark it toggles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyScheme {
    /// `data-bookmark-id="<username>,<usage_id>"`.
    BookmarkId,
    /// `data-username` plus `data-id="<usage_id>"`.
    UsernameUsage,
}

/// Where the bookmarks collection URL comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EndpointSource {
    Fixed(String),
    /// Read from this attribute of the control on every request.
    ButtonAttribute(String),
}

#[derive(Clone, Debug)]
pub struct BookmarkConfig {
    pub button_selector: String,
    pub key_scheme: KeyScheme,
    pub endpoint: EndpointSource,
    pub add_label: String,
    pub remove_label: String,
    pub error_message: String,
    pub error_icon: String,
    pub in_progress_icon: String,
    /// Icon of the active sequence tab, kept in step with the control.
    pub active_icon_selector: Option<String>,
}

impl Default for BookmarkConfig {
    fn default() -> Self {
        Self {
            button_selector: ".bookmark-button".to_owned(),
            key_scheme: KeyScheme::BookmarkId,
            endpoint: EndpointSource::ButtonAttribute("data-url".to_owned()),
            add_label: "Click to add".to_owned(),
            remove_label: "Click to remove".to_owned(),
            error_message: "An error has occurred. Please try again.".to_owned(),
            error_icon: ERROR_ICON.to_owned(),
            in_progress_icon: IN_PROGRESS_ICON.to_owned(),
            active_icon_selector: None,
        }
    }
}

impl BookmarkConfig {
    /// Unit rendered by the vertical student view.
    pub fn vertical_view(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: EndpointSource::Fixed(endpoint.into()),
            ..Self::default()
        }
    }

    /// Buttons anywhere in the course content pane.
    pub fn course_content(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: EndpointSource::Fixed(endpoint.into()),
            add_label: "Click to bookmark this unit".to_owned(),
            remove_label: "Click to remove bookmark from this unit".to_owned(),
            ..Self::default()
        }
    }

    /// Sequence navigation: per-button URL and username, active tab icon sync.
    pub fn sequence_content() -> Self {
        Self {
            key_scheme: KeyScheme::UsernameUsage,
            endpoint: EndpointSource::ButtonAttribute("data-url".to_owned()),
            active_icon_selector: Some(".seq-book.active .bookmark-icon".to_owned()),
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// A request was already in flight.
    Ignored,
    Added,
    Removed,
    Failed,
}

pub struct BookmarkButton<N, T> {
    scope: N,
    button: N,
    client: Rc<CoursewareClient<T>>,
    banner: Rc<MessageBanner<N>>,
    progress: Option<Rc<MessageBanner<N>>>,
    config: Rc<BookmarkConfig>,
}

impl<N: Node, T: Transport> BookmarkButton<N, T> {
    /// Bind to the first control in `scope`. With `Some(flag)` the control is
    /// drawn in that state; with `None` the server-rendered markup is kept.
    /// Never touches the network.
    pub fn initialize(
        scope: N,
        client: Rc<CoursewareClient<T>>,
        banner: Rc<MessageBanner<N>>,
        config: Rc<BookmarkConfig>,
        initial: Option<bool>,
    ) -> Result<Self, WidgetError> {
        let button = scope
            .find(&config.button_selector)
            .ok_or_else(|| WidgetError::MissingElement(config.button_selector.clone()))?;
        Ok(Self::for_button(scope, button, client, banner, config, initial))
    }

    pub fn for_button(
        scope: N,
        button: N,
        client: Rc<CoursewareClient<T>>,
        banner: Rc<MessageBanner<N>>,
        config: Rc<BookmarkConfig>,
        initial: Option<bool>,
    ) -> Self {
        let widget = Self {
            scope,
            button,
            client,
            banner,
            progress: None,
            config,
        };
        if let Some(bookmarked) = initial {
            widget.update_bookmark_state(bookmarked);
        }
        widget
    }

    /// Bind to the control inside `sequence`, not the first one in `scope`:
    /// the pane can hold other controls ahead of the sequence.
    pub fn for_sequence(
        scope: N,
        sequence: &N,
        client: Rc<CoursewareClient<T>>,
        banner: Rc<MessageBanner<N>>,
        config: Rc<BookmarkConfig>,
    ) -> Result<Self, WidgetError> {
        let button = sequence
            .find(&config.button_selector)
            .ok_or_else(|| WidgetError::MissingElement(config.button_selector.clone()))?;
        Ok(Self::for_button(scope, button, client, banner, config, None))
    }

    /// Banner that shows a spinner while a request is in flight.
    pub fn with_progress_banner(mut self, progress: Rc<MessageBanner<N>>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn button(&self) -> &N {
        &self.button
    }

    pub fn is_bookmarked(&self) -> bool {
        self.button.has_class(BOOKMARKED)
    }

    pub fn is_pending(&self) -> bool {
        self.button.has_attr("disabled")
    }

    pub async fn on_toggle_clicked(&self) -> ToggleOutcome {
        if self.is_pending() {
            debug!("bookmark request already in flight, ignoring click");
            return ToggleOutcome::Ignored;
        }

        self.set_pending(true);
        if let Some(progress) = &self.progress {
            progress.show_message("", &self.config.in_progress_icon);
        }

        let outcome = if self.is_bookmarked() {
            match self.remove_current().await {
                Ok(()) => ToggleOutcome::Removed,
                Err(_) => ToggleOutcome::Failed,
            }
        } else {
            match self.add_current().await {
                Ok(()) => ToggleOutcome::Added,
                Err(_) => ToggleOutcome::Failed,
            }
        };

        self.set_pending(false);
        if let Some(progress) = &self.progress {
            progress.hide_message();
        }
        outcome
    }

    pub async fn add_bookmark(&self, usage_id: &UsageId) -> Result<(), WidgetError> {
        let result = match self.endpoint() {
            Ok(endpoint) => self
                .client
                .add_bookmark(&endpoint, usage_id)
                .await
                .map_err(WidgetError::from),
            Err(err) => Err(err),
        };

        match result {
            Ok(()) => {
                info!(usage_id = %usage_id.0, "unit bookmarked");
                self.update_bookmark_state(true);
                self.sync_active_icon(true);
                self.button.dispatch(BOOKMARK_ADD_EVENT);
                Ok(())
            }
            Err(err) => Err(self.report_failure(err)),
        }
    }

    pub async fn remove_bookmark(&self, bookmark_id: &BookmarkId) -> Result<(), WidgetError> {
        let result = match self.endpoint() {
            Ok(endpoint) => self
                .client
                .remove_bookmark(&endpoint, bookmark_id)
                .await
                .map_err(WidgetError::from),
            Err(err) => Err(err),
        };

        match result {
            Ok(()) => {
                info!(bookmark_id = %bookmark_id, "bookmark removed");
                self.update_bookmark_state(false);
                self.sync_active_icon(false);
                self.button.dispatch(BOOKMARK_REMOVE_EVENT);
                Ok(())
            }
            Err(err) => Err(self.report_failure(err)),
        }
    }

    pub fn update_bookmark_state(&self, bookmarked: bool) {
        let (label, pressed) = if bookmarked {
            self.button.swap_class(UN_BOOKMARKED, BOOKMARKED);
            (&self.config.remove_label, "true")
        } else {
            self.button.swap_class(BOOKMARKED, UN_BOOKMARKED);
            (&self.config.add_label, "false")
        };
        self.button.set_attr("aria-pressed", pressed);
        if let Some(sr) = self.button.find(SR_LABEL) {
            sr.set_text(label);
        }
    }

    /// The sequence now shows a different unit; take the flag from its
    /// active tab icon.
    pub fn on_sequence_changed(&self, sequence: &N) {
        let bookmarked = sequence
            .find(ACTIVE_ICON_IN_SEQUENCE)
            .is_some_and(|icon| icon.has_class(BOOKMARKED));
        self.update_bookmark_state(bookmarked);
    }

    async fn add_current(&self) -> Result<(), WidgetError> {
        match self.usage_id() {
            Ok(usage_id) => self.add_bookmark(&usage_id).await,
            Err(err) => Err(self.report_failure(err)),
        }
    }

    async fn remove_current(&self) -> Result<(), WidgetError> {
        match self.bookmark_id() {
            Ok(bookmark_id) => self.remove_bookmark(&bookmark_id).await,
            Err(err) => Err(self.report_failure(err)),
        }
    }

    fn usage_id(&self) -> Result<UsageId, WidgetError> {
        match self.config.key_scheme {
            KeyScheme::BookmarkId => Ok(self.bookmark_id()?.usage_id),
            KeyScheme::UsernameUsage => Ok(UsageId(self.required_data("id")?)),
        }
    }

    fn bookmark_id(&self) -> Result<BookmarkId, WidgetError> {
        match self.config.key_scheme {
            KeyScheme::BookmarkId => Ok(self.required_data("bookmark-id")?.parse()?),
            KeyScheme::UsernameUsage => Ok(BookmarkId::new(
                self.required_data("username")?,
                self.required_data("id")?,
            )),
        }
    }

    fn endpoint(&self) -> Result<String, WidgetError> {
        match &self.config.endpoint {
            EndpointSource::Fixed(url) => Ok(url.clone()),
            EndpointSource::ButtonAttribute(name) => self
                .button
                .attr(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| WidgetError::MissingAttribute(name.clone())),
        }
    }

    fn required_data(&self, key: &str) -> Result<String, WidgetError> {
        self.button
            .data(key)
            .ok_or_else(|| WidgetError::MissingAttribute(format!("data-{key}")))
    }

    fn set_pending(&self, pending: bool) {
        if pending {
            self.button.set_attr("disabled", "disabled");
            self.button.add_class(IS_DISABLED);
        } else {
            self.button.remove_attr("disabled");
            self.button.remove_class(IS_DISABLED);
        }
    }

    fn sync_active_icon(&self, bookmarked: bool) {
        let Some(selector) = &self.config.active_icon_selector else {
            return;
        };
        if let Some(icon) = self.scope.find(selector) {
            if bookmarked {
                icon.swap_class(IS_HIDDEN, BOOKMARKED);
            } else {
                icon.swap_class(BOOKMARKED, IS_HIDDEN);
            }
        }
    }

    fn report_failure(&self, err: WidgetError) -> WidgetError {
        warn!(error = %err, "bookmark request failed");
        self.banner
            .show_message(&self.config.error_message, &self.config.error_icon);
        err
    }
}
