//! Instructor dashboard e-commerce panel: coupon expiry field, report
//! triggers and registration code lookup.

use crate::error::WidgetError;
use crate::markup::escape_html;
use crate::node::Node;
use cw_api_types::{MessageResponse, RegistrationCodeAction, RegistrationCodeLookupResponse, ReportStatusResponse};
use cw_client::{CoursewareClient, Transport};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{info, warn};

pub const REPORT_ERROR: &str = "Error generating grades. Please try again.";
pub const EMPTY_CODE_MESSAGE: &str = "Please enter a registration code.";
pub const LOOKUP_ERROR: &str = "Error looking up the registration code. Please try again.";
pub const ACTION_ERROR: &str = "Error updating the registration code. Please try again.";
pub const NO_LOOKUP_MESSAGE: &str = "Look up a registration code first.";

const EXPIRY_INPUT_BY_NAME: &str = r#"input[name="expiration_date"]"#;
const EXPIRY_INPUT: &str = "#coupon_expiration_date";

/// Shows the coupon expiration date field only while its checkbox is ticked.
pub struct ExpiryCouponToggle<N> {
    container: N,
}

impl<N: Node> ExpiryCouponToggle<N> {
    pub fn bind(container: N) -> Self {
        if let Some(input) = container.find(EXPIRY_INPUT_BY_NAME) {
            input.hide();
        }
        Self { container }
    }

    pub fn on_checkbox_changed(&self, checked: bool) {
        let Some(input) = self.container.find(EXPIRY_INPUT) else {
            return;
        };
        if checked {
            input.show();
            input.focus();
        } else {
            input.hide();
        }
    }
}

/// A button whose `data-endpoint` starts a background report.
pub struct ReportTrigger<N, T> {
    button: N,
    response: N,
    error: N,
    client: Rc<CoursewareClient<T>>,
}

impl<N: Node, T: Transport> ReportTrigger<N, T> {
    pub fn new(button: N, response: N, error: N, client: Rc<CoursewareClient<T>>) -> Self {
        Self {
            button,
            response,
            error,
            client,
        }
    }

    pub async fn on_click(&self) -> Result<ReportStatusResponse, WidgetError> {
        let Some(endpoint) = self.button.data("endpoint") else {
            self.show_error();
            return Err(WidgetError::MissingAttribute("data-endpoint".to_owned()));
        };

        match self.client.request_report(&endpoint).await {
            Ok(status) => {
                info!(%endpoint, "report requested");
                self.response.set_text(&status.status);
                self.response.show();
                Ok(status)
            }
            Err(err) => {
                warn!(%endpoint, error = %err, "report request failed");
                self.show_error();
                Err(err.into())
            }
        }
    }

    fn show_error(&self) {
        self.error.set_text(REPORT_ERROR);
        self.error.show();
    }
}

#[derive(Clone, Debug)]
struct LookedUp {
    code: String,
    detail_url: Option<String>,
}

/// Registration code lookup form plus the follow-up actions rendered into
/// its result table.
pub struct RegistrationCodePanel<N, T> {
    code_input: N,
    lookup_button: N,
    result: N,
    message: N,
    client: Rc<CoursewareClient<T>>,
    last: RefCell<Option<LookedUp>>,
}

impl<N: Node, T: Transport> RegistrationCodePanel<N, T> {
    pub fn new(code_input: N, lookup_button: N, result: N, message: N, client: Rc<CoursewareClient<T>>) -> Self {
        Self {
            code_input,
            lookup_button,
            result,
            message,
            client,
            last: RefCell::new(None),
        }
    }

    pub async fn on_lookup(&self) -> Result<RegistrationCodeLookupResponse, WidgetError> {
        let code = self.code_input.value().trim().to_owned();
        if code.is_empty() {
            self.clear_result();
            self.show_message(EMPTY_CODE_MESSAGE);
            return Err(WidgetError::Validation(EMPTY_CODE_MESSAGE.to_owned()));
        }
        let Some(endpoint) = self.lookup_button.data("endpoint") else {
            self.show_message(LOOKUP_ERROR);
            return Err(WidgetError::MissingAttribute("data-endpoint".to_owned()));
        };

        match self.client.lookup_registration_code(&endpoint, &code).await {
            Ok(lookup) => {
                self.result.set_html(&render_lookup_table(&code, &lookup));
                self.result.show();
                match lookup.message.as_deref() {
                    Some(text) if !text.is_empty() => self.show_message(text),
                    _ => self.message.hide(),
                }
                *self.last.borrow_mut() = Some(LookedUp {
                    code,
                    detail_url: lookup.registration_code_detail_url.clone(),
                });
                Ok(lookup)
            }
            Err(err) => {
                warn!(error = %err, "registration code lookup failed");
                self.clear_result();
                self.show_message(err.server_message().unwrap_or(LOOKUP_ERROR));
                Err(err.into())
            }
        }
    }

    pub async fn on_action(&self, action: RegistrationCodeAction) -> Result<MessageResponse, WidgetError> {
        let Some(LookedUp { code, detail_url }) = self.last.borrow().clone() else {
            self.show_message(NO_LOOKUP_MESSAGE);
            return Err(WidgetError::Validation(NO_LOOKUP_MESSAGE.to_owned()));
        };
        let Some(endpoint) = detail_url else {
            self.show_message(ACTION_ERROR);
            return Err(WidgetError::MissingAttribute("registration_code_detail_url".to_owned()));
        };

        match self
            .client
            .registration_code_action(&endpoint, &code, action)
            .await
        {
            Ok(reply) => {
                info!(%action, "registration code updated");
                self.show_message(&reply.message);
                Ok(reply)
            }
            Err(err) => {
                warn!(%action, error = %err, "registration code action failed");
                self.show_message(err.server_message().unwrap_or(ACTION_ERROR));
                Err(err.into())
            }
        }
    }

    fn clear_result(&self) {
        self.result.set_html("");
        self.result.hide();
        *self.last.borrow_mut() = None;
    }

    fn show_message(&self, text: &str) {
        self.message.set_text(text);
        self.message.show();
    }
}

/// Follow-up actions offered for a looked-up code.
pub fn available_actions(lookup: &RegistrationCodeLookupResponse) -> Vec<RegistrationCodeAction> {
    if !lookup.is_registration_code_exists {
        return Vec::new();
    }
    let mut actions = vec![if lookup.is_registration_code_valid {
        RegistrationCodeAction::InvalidateRegistrationCode
    } else {
        RegistrationCodeAction::ValidateRegistrationCode
    }];
    if lookup.is_registration_code_redeemed {
        actions.push(RegistrationCodeAction::UnredeemRegistrationCode);
    }
    actions
}

fn action_label(action: RegistrationCodeAction) -> &'static str {
    match action {
        RegistrationCodeAction::InvalidateRegistrationCode => "Mark as Invalid",
        RegistrationCodeAction::ValidateRegistrationCode => "Mark as Valid",
        RegistrationCodeAction::UnredeemRegistrationCode => "Unredeem",
    }
}

pub fn render_lookup_table(code: &str, lookup: &RegistrationCodeLookupResponse) -> String {
    let links: Vec<String> = available_actions(lookup)
        .into_iter()
        .map(|action| {
            format!(
                r##"<a href="#" class="registration-code-action" data-action="{}">{}</a>"##,
                action,
                action_label(action)
            )
        })
        .collect();

    format!(
        concat!(
            r#"<table class="registration-code-status">"#,
            "<thead><tr><th>Code</th><th>Status</th><th>Redeemed</th><th>Actions</th></tr></thead>",
            "<tbody><tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr></tbody>",
            "</table>"
        ),
        escape_html(code),
        if lookup.is_registration_code_valid { "Valid" } else { "Invalid" },
        if lookup.is_registration_code_redeemed { "Yes" } else { "No" },
        links.join(" "),
    )
}
