use async_trait::async_trait;
use cw_api_types::{
    AddBookmarkRequest, BookmarkId, MessageResponse, RegistrationCodeAction,
    RegistrationCodeActionRequest, RegistrationCodeLookupRequest, RegistrationCodeLookupResponse,
    ReportStatusResponse, UsageId,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }

    /// Safe methods never carry a CSRF token.
    pub fn is_safe(&self) -> bool {
        matches!(self, Method::Get)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("server returned HTTP {status}")]
    Server { status: u16, message: Option<String> },
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("could not encode request: {0}")]
    Encode(String),
}

impl ClientError {
    /// Human-readable message supplied by the server, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Server { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// Moves one request over the wire. The browser build implements this with
/// `fetch`; tests replay canned responses.
#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError>;
}

/// Typed calls against the LMS endpoints the widgets talk to.
pub struct CoursewareClient<T> {
    transport: T,
    csrf_token: Option<String>,
}

impl<T: Transport> CoursewareClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            csrf_token: None,
        }
    }

    pub fn with_csrf_token(mut self, token: Option<String>) -> Self {
        self.csrf_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// POST <endpoint> with `usage_id`.
    pub async fn add_bookmark(&self, endpoint: &str, usage_id: &UsageId) -> Result<(), ClientError> {
        let body = AddBookmarkRequest {
            usage_id: usage_id.0.clone(),
        };
        self.execute(Method::Post, endpoint.to_owned(), Some(&body))
            .await
            .map(|_| ())
    }

    /// DELETE <endpoint>/<username,usage_id>/
    pub async fn remove_bookmark(&self, endpoint: &str, bookmark_id: &BookmarkId) -> Result<(), ClientError> {
        let url = bookmark_url(endpoint, bookmark_id);
        self.execute::<()>(Method::Delete, url, None).await.map(|_| ())
    }

    /// DELETE <signatories_url>/<id>
    pub async fn remove_signatory(&self, signatories_url: &str, signatory_id: u64) -> Result<(), ClientError> {
        let url = format!("{}/{}", signatories_url.trim_end_matches('/'), signatory_id);
        self.execute::<()>(Method::Delete, url, None).await.map(|_| ())
    }

    /// GET <endpoint> for a report generation trigger.
    pub async fn request_report(&self, endpoint: &str) -> Result<ReportStatusResponse, ClientError> {
        let response = self.execute::<()>(Method::Get, endpoint.to_owned(), None).await?;
        decode(&response)
    }

    pub async fn lookup_registration_code(
        &self,
        endpoint: &str,
        registration_code: &str,
    ) -> Result<RegistrationCodeLookupResponse, ClientError> {
        let body = RegistrationCodeLookupRequest {
            registration_code: registration_code.to_owned(),
        };
        let response = self.execute(Method::Post, endpoint.to_owned(), Some(&body)).await?;
        decode(&response)
    }

    pub async fn registration_code_action(
        &self,
        endpoint: &str,
        registration_code: &str,
        action_type: RegistrationCodeAction,
    ) -> Result<MessageResponse, ClientError> {
        let body = RegistrationCodeActionRequest {
            registration_code: registration_code.to_owned(),
            action_type,
        };
        let response = self.execute(Method::Post, endpoint.to_owned(), Some(&body)).await?;
        decode(&response)
    }

    async fn execute<B: Serialize>(
        &self,
        method: Method,
        url: String,
        body: Option<&B>,
    ) -> Result<HttpResponse, ClientError> {
        let mut headers = vec![
            ("X-Requested-With".to_owned(), "XMLHttpRequest".to_owned()),
            ("Accept".to_owned(), "application/json".to_owned()),
        ];
        if !method.is_safe() {
            if let Some(token) = &self.csrf_token {
                headers.push(("X-CSRFToken".to_owned(), token.clone()));
            }
        }

        let body = match body {
            Some(b) => {
                headers.push(("Content-Type".to_owned(), FORM_CONTENT_TYPE.to_owned()));
                Some(serde_urlencoded::to_string(b).map_err(|e| ClientError::Encode(e.to_string()))?)
            }
            None => None,
        };

        debug!(method = method.as_str(), %url, "sending request");
        let response = self
            .transport
            .send(HttpRequest {
                method,
                url: url.clone(),
                headers,
                body,
            })
            .await?;

        if !response.is_success() {
            warn!(method = method.as_str(), %url, status = response.status, "request failed");
            return Err(ClientError::Server {
                status: response.status,
                message: error_message(&response.body),
            });
        }

        Ok(response)
    }
}

/// `<endpoint>/<bookmark id>/` with exactly one slash at the seam.
pub fn bookmark_url(endpoint: &str, bookmark_id: &BookmarkId) -> String {
    format!("{}/{}/", endpoint.trim_end_matches('/'), bookmark_id)
}

fn decode<R: DeserializeOwned>(response: &HttpResponse) -> Result<R, ClientError> {
    serde_json::from_str(&response.body)
        .map_err(|e| ClientError::Decode(format!("{e} (raw: {})", response.body)))
}

fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("error"))
        .and_then(|v| v.as_str())
        .map(str::to_owned)
}
