//! Transient message banner.

use crate::node::Node;
use std::cell::RefCell;

pub const ERROR_ICON: &str =
    r#"<i class="fa fa-fw fa-exclamation-triangle message-error" aria-hidden="true"></i>"#;
pub const IN_PROGRESS_ICON: &str =
    r#"<i class="fa fa-fw fa-spinner fa-pulse message-in-progress" aria-hidden="true"></i>"#;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BannerState {
    pub visible: bool,
    pub text: String,
    pub icon_markup: String,
}

/// Shows one message at a time; the latest call wins.
pub struct MessageBanner<N> {
    region: N,
    state: RefCell<BannerState>,
}

impl<N: Node> MessageBanner<N> {
    pub fn new(region: N) -> Self {
        Self {
            region,
            state: RefCell::new(BannerState::default()),
        }
    }

    pub fn show_message(&self, text: &str, icon_markup: &str) {
        self.region.set_html(icon_markup);
        if !text.is_empty() {
            self.region.append_text(text);
        }
        self.region.show();
        *self.state.borrow_mut() = BannerState {
            visible: true,
            text: text.to_owned(),
            icon_markup: icon_markup.to_owned(),
        };
    }

    pub fn hide_message(&self) {
        self.region.set_html("");
        self.region.hide();
        *self.state.borrow_mut() = BannerState::default();
    }

    pub fn state(&self) -> BannerState {
        self.state.borrow().clone()
    }

    pub fn region(&self) -> &N {
        &self.region
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeNode;

    #[test]
    fn show_replaces_previous_message() {
        let region = FakeNode::new();
        let banner = MessageBanner::new(region.clone());

        banner.show_message("first", ERROR_ICON);
        banner.show_message("second", IN_PROGRESS_ICON);

        assert_eq!(
            banner.state(),
            BannerState {
                visible: true,
                text: "second".into(),
                icon_markup: IN_PROGRESS_ICON.into(),
            }
        );
        assert_eq!(region.text(), "second");
        assert_eq!(region.html(), IN_PROGRESS_ICON);
        assert_eq!(region.is_visible(), Some(true));
    }

    #[test]
    fn hide_clears_state_and_region() {
        let region = FakeNode::new();
        let banner = MessageBanner::new(region.clone());
        banner.show_message("oops", ERROR_ICON);
        banner.hide_message();

        assert_eq!(banner.state(), BannerState::default());
        assert_eq!(region.text(), "");
        assert_eq!(region.html(), "");
        assert_eq!(region.is_visible(), Some(false));
    }

    #[test]
    fn icon_only_message() {
        let region = FakeNode::new();
        let banner = MessageBanner::new(region.clone());
        banner.show_message("", IN_PROGRESS_ICON);
        assert!(banner.state().visible);
        assert_eq!(region.text(), "");
    }
}
