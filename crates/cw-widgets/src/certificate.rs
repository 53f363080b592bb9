//! Certificate editor: draft model with a 1..=4 signatory window and the
//! form view that drives it.

use crate::markup::escape_html;
use crate::message::{ERROR_ICON, MessageBanner};
use crate::node::Node;
use cw_api_types::{Certificate, Signatory};
use cw_client::{ClientError, CoursewareClient, Transport};
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const MIN_SIGNATORIES: usize = 1;
pub const MAX_SIGNATORIES: usize = 4;
pub const CERTIFICATE_SUBMIT_EVENT: &str = "certificate:submit";
pub const SIGNATORY_ADDED_EVENT: &str = "certificate:signatory-added";
pub const SIGNATORY_REMOVED_EVENT: &str = "certificate:signatory-removed";
pub const CERTIFICATE_RESET_EVENT: &str = "certificate:reset";
pub const DELETE_SIGNATORY_ERROR: &str = "Error deleting signatory. Please try again.";

const NAME_INPUT: &str = ".collection-name-input";
const DESCRIPTION_INPUT: &str = ".certificate-description-input";
const ORG_LOGO_INPUT: &str = ".org-logo-input";
const ORG_LOGO_IMAGE: &str = ".current-org-logo img.org-logo";
const SIGNATORY_LIST: &str = "div.signatory-edit-list";
const ADD_SIGNATORY: &str = ".action-add-signatory";
const DISABLE_CLICK: &str = "disableClick";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CertificateEvent {
    SignatoryAdded(usize),
    SignatoryRemoved(usize),
    Reset,
}

impl CertificateEvent {
    /// Custom event fired on the edit form.
    pub fn dom_event(&self) -> &'static str {
        match self {
            CertificateEvent::SignatoryAdded(_) => SIGNATORY_ADDED_EVENT,
            CertificateEvent::SignatoryRemoved(_) => SIGNATORY_REMOVED_EVENT,
            CertificateEvent::Reset => CERTIFICATE_RESET_EVENT,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CertificateError {
    #[error("a certificate can have at most {} signatories", MAX_SIGNATORIES)]
    TooManySignatories,
    #[error("a certificate needs at least {} signatory", MIN_SIGNATORIES)]
    TooFewSignatories,
    #[error("no signatory at position {0}")]
    NoSuchSignatory(usize),
    #[error("could not delete signatory: {0}")]
    Persist(#[from] ClientError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidField {
    Name,
    Signatories(Vec<usize>),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub message: &'static str,
    pub field: InvalidField,
}

type Observer = Box<dyn Fn(&CertificateEvent)>;

pub struct CertificateEditor {
    draft: Certificate,
    original: Certificate,
    observers: Vec<Observer>,
}

impl CertificateEditor {
    pub fn new(certificate: Certificate) -> Self {
        Self {
            original: certificate.clone(),
            draft: certificate,
            observers: Vec::new(),
        }
    }

    /// A brand new certificate always starts with one signatory.
    pub fn new_for_add() -> Self {
        Self::new(Certificate {
            signatories: vec![Signatory::default()],
            ..Certificate::default()
        })
    }

    pub fn subscribe(&mut self, observer: impl Fn(&CertificateEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn certificate(&self) -> &Certificate {
        &self.draft
    }

    pub fn set_name(&mut self, name: &str) {
        self.draft.name = name.to_owned();
    }

    pub fn set_description(&mut self, description: &str) {
        self.draft.description = description.to_owned();
    }

    pub fn set_org_logo_path(&mut self, path: &str) {
        self.draft.org_logo_path = path.to_owned();
    }

    pub fn signatory_mut(&mut self, index: usize) -> Option<&mut Signatory> {
        self.draft.signatories.get_mut(index)
    }

    pub fn can_add_signatory(&self) -> bool {
        self.draft.signatories.len() < MAX_SIGNATORIES
    }

    pub fn add_signatory(&mut self) -> Result<usize, CertificateError> {
        if !self.can_add_signatory() {
            return Err(CertificateError::TooManySignatories);
        }
        self.draft.signatories.push(Signatory::default());
        let index = self.draft.signatories.len() - 1;
        self.notify(&CertificateEvent::SignatoryAdded(index));
        Ok(index)
    }

    /// Signatory at `index`, if removing it keeps the certificate valid.
    pub fn removable(&self, index: usize) -> Result<&Signatory, CertificateError> {
        let signatory = self
            .draft
            .signatories
            .get(index)
            .ok_or(CertificateError::NoSuchSignatory(index))?;
        if self.draft.signatories.len() <= MIN_SIGNATORIES {
            return Err(CertificateError::TooFewSignatories);
        }
        Ok(signatory)
    }

    /// A removal has already been deleted on the server, so it also becomes
    /// the new baseline for `reset`.
    pub fn remove_signatory(&mut self, index: usize) -> Result<Signatory, CertificateError> {
        self.removable(index)?;
        let removed = self.draft.signatories.remove(index);
        self.notify(&CertificateEvent::SignatoryRemoved(index));
        self.snapshot();
        Ok(removed)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.draft.name.trim().is_empty() {
            return Err(ValidationError {
                message: "Certificate name is required.",
                field: InvalidField::Name,
            });
        }
        let invalid: Vec<usize> = self
            .draft
            .signatories
            .iter()
            .enumerate()
            .filter(|(_, s)| s.name.trim().is_empty() || s.title.trim().is_empty())
            .map(|(i, _)| i)
            .collect();
        if !invalid.is_empty() {
            return Err(ValidationError {
                message: "Signatory field(s) has invalid data.",
                field: InvalidField::Signatories(invalid),
            });
        }
        Ok(())
    }

    pub fn snapshot(&mut self) {
        self.original = self.draft.clone();
    }

    pub fn reset(&mut self) {
        self.draft = self.original.clone();
        self.notify(&CertificateEvent::Reset);
    }

    /// Collection URL of this certificate's signatories; new certificates
    /// have none yet.
    pub fn signatories_url(&self, collection_url: &str) -> Option<String> {
        self.draft
            .id
            .map(|id| format!("{}/{}/signatories", collection_url.trim_end_matches('/'), id))
    }

    fn notify(&self, event: &CertificateEvent) {
        debug!(?event, "certificate event");
        for observer in &self.observers {
            observer(event);
        }
    }
}

/// Binds a `CertificateEditor` to its edit form. Editor events are re-fired
/// on the form as custom DOM events.
pub struct CertificateEditorView<N, T> {
    form: N,
    banner: Rc<MessageBanner<N>>,
    client: Rc<CoursewareClient<T>>,
    collection_url: Option<String>,
    editor: RefCell<CertificateEditor>,
}

impl<N: Node + 'static, T: Transport> CertificateEditorView<N, T> {
    /// `collection_url` is the course's certificates collection; without it
    /// signatories are only removed from the draft.
    pub fn new(
        form: N,
        banner: Rc<MessageBanner<N>>,
        client: Rc<CoursewareClient<T>>,
        collection_url: Option<String>,
        mut editor: CertificateEditor,
    ) -> Self {
        let target = form.clone();
        editor.subscribe(move |event| target.dispatch(event.dom_event()));
        let view = Self {
            form,
            banner,
            client,
            collection_url,
            editor: RefCell::new(editor),
        };
        view.render();
        view
    }

    pub fn certificate(&self) -> Certificate {
        self.editor.borrow().certificate().clone()
    }

    pub fn on_name_changed(&self) {
        let name = self.field_value(NAME_INPUT);
        self.editor.borrow_mut().set_name(&name);
    }

    pub fn on_description_changed(&self) {
        let description = self.field_value(DESCRIPTION_INPUT);
        self.editor.borrow_mut().set_description(&description);
    }

    pub fn on_org_logo_changed(&self) {
        let path = self.field_value(ORG_LOGO_INPUT);
        self.editor.borrow_mut().set_org_logo_path(&path);
        if let Some(img) = self.form.find(ORG_LOGO_IMAGE) {
            img.set_attr("src", &path);
        }
    }

    pub fn on_add_signatory(&self) -> Result<usize, CertificateError> {
        self.read_fields();
        let index = self.editor.borrow_mut().add_signatory()?;
        self.render();
        Ok(index)
    }

    /// A saved signatory is deleted on the server first; the draft only
    /// changes once that succeeds.
    pub async fn on_remove_signatory(&self, index: usize) -> Result<Signatory, CertificateError> {
        self.read_fields();
        let target = {
            let editor = self.editor.borrow();
            let id = editor.removable(index)?.id;
            let url = self
                .collection_url
                .as_deref()
                .and_then(|collection| editor.signatories_url(collection));
            id.zip(url)
        };

        if let Some((id, url)) = target {
            if let Err(err) = self.client.remove_signatory(&url, id).await {
                warn!(signatory = id, error = %err, "signatory delete failed");
                self.banner.show_message(DELETE_SIGNATORY_ERROR, ERROR_ICON);
                return Err(err.into());
            }
            info!(signatory = id, "signatory deleted");
        }

        let removed = self.editor.borrow_mut().remove_signatory(index)?;
        self.render();
        Ok(removed)
    }

    pub fn on_submit(&self) -> Result<Certificate, ValidationError> {
        self.read_fields();
        let editor = self.editor.borrow();
        if let Err(err) = editor.validate() {
            self.banner.show_message(err.message, ERROR_ICON);
            return Err(err);
        }
        self.banner.hide_message();

        let certificate = editor.certificate().clone();
        if let Ok(json) = serde_json::to_string(&certificate) {
            self.form.set_attr("data-certificate", &json);
        }
        self.form.dispatch(CERTIFICATE_SUBMIT_EVENT);
        info!(name = %certificate.name, signatories = certificate.signatories.len(), "certificate submitted");
        Ok(certificate)
    }

    pub fn on_cancel(&self) {
        self.editor.borrow_mut().reset();
        self.banner.hide_message();
        self.render();
    }

    pub fn render(&self) {
        let editor = self.editor.borrow();
        if let Some(list) = self.form.find(SIGNATORY_LIST) {
            let rows: String = editor
                .certificate()
                .signatories
                .iter()
                .enumerate()
                .map(|(i, s)| render_signatory_row(i, s))
                .collect();
            list.set_html(&rows);
        }
        if let Some(add) = self.form.find(ADD_SIGNATORY) {
            if editor.can_add_signatory() {
                add.remove_class(DISABLE_CLICK);
            } else {
                add.add_class(DISABLE_CLICK);
            }
        }
    }

    /// Copy every form field into the draft.
    fn read_fields(&self) {
        let name = self.field_value(NAME_INPUT);
        let description = self.field_value(DESCRIPTION_INPUT);
        let logo = self.field_value(ORG_LOGO_INPUT);

        let mut editor = self.editor.borrow_mut();
        editor.set_name(&name);
        editor.set_description(&description);
        editor.set_org_logo_path(&logo);

        let count = editor.certificate().signatories.len();
        for i in 0..count {
            let row = format!(".signatory-edit-{i}");
            let read = |class: &str| {
                self.form
                    .find(&format!("{row} .{class}"))
                    .map(|input| input.value())
            };
            let (name, title, org) = (
                read("signatory-name-input"),
                read("signatory-title-input"),
                read("signatory-organization-input"),
            );
            if let Some(signatory) = editor.signatory_mut(i) {
                if let Some(name) = name {
                    signatory.name = name;
                }
                if let Some(title) = title {
                    signatory.title = title;
                }
                if let Some(org) = org {
                    signatory.organization = org;
                }
            }
        }
    }

    fn field_value(&self, selector: &str) -> String {
        self.form
            .find(selector)
            .map(|input| input.value())
            .unwrap_or_default()
    }
}

fn render_signatory_row(index: usize, signatory: &Signatory) -> String {
    format!(
        concat!(
            r#"<div class="signatory-edit signatory-edit-{i}" data-index="{i}">"#,
            r#"<input type="text" class="signatory-name-input" value="{name}">"#,
            r#"<input type="text" class="signatory-title-input" value="{title}">"#,
            r#"<input type="text" class="signatory-organization-input" value="{org}">"#,
            r##"<a href="#" class="signatory-panel-delete" data-index="{i}">Delete</a>"##,
            "</div>"
        ),
        i = index,
        name = escape_html(&signatory.name),
        title = escape_html(&signatory.title),
        org = escape_html(&signatory.organization),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeNode, ScriptedTransport};
    use cw_client::Method;
    use std::cell::RefCell;

    fn signed(name: &str, title: &str) -> Signatory {
        Signatory {
            name: name.into(),
            title: title.into(),
            ..Signatory::default()
        }
    }

    #[test]
    fn new_certificate_starts_with_one_signatory() {
        let editor = CertificateEditor::new_for_add();
        assert_eq!(editor.certificate().signatories.len(), 1);
        assert_eq!(editor.certificate().version, 1);
        assert!(editor.signatories_url("/certificates/course-v1:x").is_none());
    }

    #[test]
    fn signatory_window_is_one_to_four() {
        let mut editor = CertificateEditor::new_for_add();
        for _ in 0..3 {
            editor.add_signatory().unwrap();
        }
        assert!(!editor.can_add_signatory());
        assert_eq!(editor.add_signatory(), Err(CertificateError::TooManySignatories));

        for _ in 0..3 {
            editor.remove_signatory(0).unwrap();
        }
        assert_eq!(editor.remove_signatory(0), Err(CertificateError::TooFewSignatories));
        assert_eq!(editor.remove_signatory(5), Err(CertificateError::NoSuchSignatory(5)));
    }

    #[test]
    fn removal_notifies_and_becomes_baseline() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut editor = CertificateEditor::new(Certificate {
            id: Some(7),
            signatories: vec![signed("Ada", "Dean"), signed("Alan", "Chair")],
            ..Certificate::default()
        });
        let sink = seen.clone();
        editor.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        editor.set_name("Renamed");
        editor.remove_signatory(1).unwrap();
        assert_eq!(*seen.borrow(), vec![CertificateEvent::SignatoryRemoved(1)]);

        editor.set_name("Again");
        editor.reset();
        assert_eq!(editor.certificate().name, "Renamed");
        assert_eq!(editor.certificate().signatories.len(), 1);
        assert_eq!(seen.borrow().last(), Some(&CertificateEvent::Reset));
    }

    #[test]
    fn validation_rules() {
        let mut editor = CertificateEditor::new(Certificate {
            signatories: vec![signed("Ada", "Dean")],
            ..Certificate::default()
        });
        assert!(editor.validate().is_ok());

        editor.set_name("   ");
        assert_eq!(editor.validate().unwrap_err().field, InvalidField::Name);

        editor.set_name("Honor code");
        editor.add_signatory().unwrap();
        let err = editor.validate().unwrap_err();
        assert_eq!(err.message, "Signatory field(s) has invalid data.");
        assert_eq!(err.field, InvalidField::Signatories(vec![1]));
    }

    #[test]
    fn signatories_url_for_persisted_certificate() {
        let editor = CertificateEditor::new(Certificate {
            id: Some(3),
            ..Certificate::default()
        });
        assert_eq!(
            editor.signatories_url("/certificates/course-v1:x/").as_deref(),
            Some("/certificates/course-v1:x/3/signatories")
        );
    }

    struct Form {
        form: FakeNode,
        name: FakeNode,
        list: FakeNode,
        add: FakeNode,
        logo_img: FakeNode,
        banner_region: FakeNode,
        sig_name: FakeNode,
        sig_title: FakeNode,
    }

    fn form() -> Form {
        let name = FakeNode::new().with_value("Honor code");
        let description = FakeNode::new().with_value("For honor learners");
        let logo = FakeNode::new().with_value("/static/logo.png");
        let logo_img = FakeNode::new();
        let list = FakeNode::new();
        let add = FakeNode::new();
        let sig_name = FakeNode::new().with_value("Ada");
        let sig_title = FakeNode::new().with_value("Dean");
        let form = FakeNode::new()
            .with_child(NAME_INPUT, &name)
            .with_child(DESCRIPTION_INPUT, &description)
            .with_child(ORG_LOGO_INPUT, &logo)
            .with_child(ORG_LOGO_IMAGE, &logo_img)
            .with_child(SIGNATORY_LIST, &list)
            .with_child(ADD_SIGNATORY, &add)
            .with_child(".signatory-edit-0 .signatory-name-input", &sig_name)
            .with_child(".signatory-edit-0 .signatory-title-input", &sig_title);
        Form {
            form,
            name,
            list,
            add,
            logo_img,
            banner_region: FakeNode::new(),
            sig_name,
            sig_title,
        }
    }

    type View = CertificateEditorView<FakeNode, ScriptedTransport>;

    fn view(f: &Form) -> View {
        view_of(f, CertificateEditor::new_for_add(), ScriptedTransport::default())
    }

    fn view_of(f: &Form, editor: CertificateEditor, transport: ScriptedTransport) -> View {
        CertificateEditorView::new(
            f.form.clone(),
            Rc::new(MessageBanner::new(f.banner_region.clone())),
            Rc::new(CoursewareClient::new(transport)),
            Some("/certificates/course-v1:x".to_owned()),
            editor,
        )
    }

    fn saved_certificate() -> CertificateEditor {
        CertificateEditor::new(Certificate {
            id: Some(7),
            signatories: vec![
                Signatory { id: Some(11), ..signed("Ada", "Dean") },
                Signatory { id: Some(12), ..signed("Alan", "Chair") },
            ],
            ..Certificate::default()
        })
    }

    #[test]
    fn submit_reads_form_and_emits_event() {
        let f = form();
        let v = view(&f);
        assert!(f.list.html().contains("signatory-edit-0"));

        let cert = v.on_submit().unwrap();
        assert_eq!(cert.name, "Honor code");
        assert_eq!(cert.description, "For honor learners");
        assert_eq!(cert.org_logo_path, "/static/logo.png");
        assert_eq!(cert.signatories[0], signed("Ada", "Dean"));
        assert_eq!(f.form.event_count(CERTIFICATE_SUBMIT_EVENT), 1);
        let json = f.form.attr("data-certificate").unwrap();
        assert!(json.contains(r#""name":"Honor code""#));
    }

    #[test]
    fn invalid_submit_shows_banner() {
        let f = form();
        let v = view(&f);
        f.name.set_value("");
        assert!(v.on_submit().is_err());
        assert_eq!(f.banner_region.text(), "Certificate name is required.");
        assert!(f.form.events().is_empty());

        f.name.set_value("Honor code");
        f.sig_title.set_value(" ");
        let err = v.on_submit().unwrap_err();
        assert_eq!(err.field, InvalidField::Signatories(vec![0]));
        assert_eq!(f.sig_name.value(), "Ada");
    }

    #[tokio::test]
    async fn add_button_disabled_at_limit() {
        let f = form();
        let v = view(&f);
        for _ in 0..3 {
            v.on_add_signatory().unwrap();
        }
        assert!(f.add.has_class(DISABLE_CLICK));
        assert!(f.list.html().contains("signatory-edit-3"));
        assert!(v.on_add_signatory().is_err());
        assert_eq!(f.form.event_count(SIGNATORY_ADDED_EVENT), 3);

        // unsaved signatory: draft only
        v.on_remove_signatory(3).await.unwrap();
        assert!(!f.add.has_class(DISABLE_CLICK));
        assert_eq!(f.form.event_count(SIGNATORY_REMOVED_EVENT), 1);
    }

    #[tokio::test]
    async fn saved_signatory_is_deleted_on_server_before_removal() {
        let f = form();
        let transport = ScriptedTransport::default();
        transport.respond(204, "");
        let v = view_of(&f, saved_certificate(), transport);

        let removed = v.on_remove_signatory(1).await.unwrap();
        assert_eq!(removed.id, Some(12));

        let cert = v.certificate();
        assert_eq!(cert.signatories.len(), 1);
        assert_eq!(cert.signatories[0].id, Some(11));
        assert!(!f.list.html().contains("signatory-edit-1"));
        assert_eq!(f.form.event_count(SIGNATORY_REMOVED_EVENT), 1);

        let sent = v.client.transport().requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, Method::Delete);
        assert_eq!(sent[0].url, "/certificates/course-v1:x/7/signatories/12");
    }

    #[tokio::test]
    async fn failed_delete_keeps_signatory() {
        let f = form();
        let transport = ScriptedTransport::default();
        transport.respond(500, "");
        let v = view_of(&f, saved_certificate(), transport);

        let err = v.on_remove_signatory(1).await.unwrap_err();
        assert!(matches!(err, CertificateError::Persist(_)));
        assert_eq!(v.certificate().signatories.len(), 2);
        assert_eq!(f.banner_region.text(), DELETE_SIGNATORY_ERROR);
        assert_eq!(f.form.event_count(SIGNATORY_REMOVED_EVENT), 0);
    }

    #[tokio::test]
    async fn last_signatory_is_never_deleted() {
        let f = form();
        let transport = ScriptedTransport::default();
        let v = view_of(
            &f,
            CertificateEditor::new(Certificate {
                id: Some(7),
                signatories: vec![Signatory { id: Some(11), ..signed("Ada", "Dean") }],
                ..Certificate::default()
            }),
            transport,
        );

        assert_eq!(v.on_remove_signatory(0).await, Err(CertificateError::TooFewSignatories));
        assert!(v.client.transport().requests().is_empty());
    }

    #[test]
    fn logo_change_updates_preview() {
        let f = form();
        let v = view(&f);
        v.on_org_logo_changed();
        assert_eq!(f.logo_img.attr("src").as_deref(), Some("/static/logo.png"));
        assert_eq!(v.certificate().org_logo_path, "/static/logo.png");
    }

    #[test]
    fn cancel_reverts_draft() {
        let f = form();
        let v = view(&f);
        v.on_name_changed();
        assert_eq!(v.certificate().name, "Honor code");
        v.on_cancel();
        assert_eq!(v.certificate().name, "Name of the certificate");
        assert_eq!(f.form.event_count(CERTIFICATE_RESET_EVENT), 1);
    }
}
