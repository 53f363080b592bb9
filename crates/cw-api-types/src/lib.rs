use serde::de::value::{self, StrDeserializer};
use serde::de::IntoDeserializer;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Username(pub String);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UsageId(pub String);

/// Composite key of a bookmark: `"<username>,<usage_id>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkId {
    pub username: Username,
    pub usage_id: UsageId,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("malformed bookmark id {0:?}: expected \"<username>,<usage_id>\"")]
pub struct BookmarkIdError(pub String);

impl BookmarkId {
    pub fn new(username: impl Into<String>, usage_id: impl Into<String>) -> Self {
        Self {
            username: Username(username.into()),
            usage_id: UsageId(usage_id.into()),
        }
    }
}

impl fmt::Display for BookmarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.username.0, self.usage_id.0)
    }
}

impl FromStr for BookmarkId {
    type Err = BookmarkIdError;

    // Usernames never contain a comma, usage ids might.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.split_once(',') {
            Some((user, usage)) if !user.trim().is_empty() && !usage.trim().is_empty() => {
                Ok(BookmarkId::new(user.trim(), usage.trim()))
            }
            _ => Err(BookmarkIdError(raw.to_owned())),
        }
    }
}

// ── Bookmarks ──

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddBookmarkRequest {
    pub usage_id: String,
}

// ── Instructor dashboard: reports ──

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportStatusResponse {
    pub status: String,
}

// ── Instructor dashboard: registration codes ──

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrationCodeLookupRequest {
    pub registration_code: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrationCodeLookupResponse {
    #[serde(default)]
    pub is_registration_code_exists: bool,
    #[serde(default)]
    pub is_registration_code_valid: bool,
    #[serde(default)]
    pub is_registration_code_redeemed: bool,
    #[serde(default, deserialize_with = "string_or_first")]
    pub registration_code_detail_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationCodeAction {
    InvalidateRegistrationCode,
    ValidateRegistrationCode,
    UnredeemRegistrationCode,
}

impl RegistrationCodeAction {
    pub const ALL: [Self; 3] = [
        Self::InvalidateRegistrationCode,
        Self::ValidateRegistrationCode,
        Self::UnredeemRegistrationCode,
    ];

    /// Read a wire name such as `validate_registration_code`.
    pub fn parse(raw: &str) -> Option<Self> {
        let de: StrDeserializer<'_, value::Error> = raw.into_deserializer();
        Self::deserialize(de).ok()
    }
}

/// Writes the wire name.
impl fmt::Display for RegistrationCodeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.serialize(f)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrationCodeActionRequest {
    pub registration_code: String,
    pub action_type: RegistrationCodeAction,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// The lookup endpoint has been seen to send the detail URL wrapped in a
/// one-element array.
fn string_or_first<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(url)) => Some(url),
        Some(OneOrMany::Many(urls)) => urls.into_iter().next(),
        None => None,
    })
}

// ── Certificates ──

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Signatory {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub signature_image_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Certificate {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    pub description: String,
    pub course_title: String,
    #[serde(default)]
    pub org_logo_path: String,
    pub version: u32,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub signatories: Vec<Signatory>,
}

impl Default for Certificate {
    fn default() -> Self {
        Self {
            id: None,
            name: "Name of the certificate".to_owned(),
            description: "Description of the certificate".to_owned(),
            course_title: "Title of the course".to_owned(),
            org_logo_path: String::new(),
            version: 1,
            is_active: false,
            signatories: Vec::new(),
        }
    }
}

impl Certificate {
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }
}
