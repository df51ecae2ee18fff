//! Payload types carried by store actions and state slices.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserPlanType {
    DefaultPlan,
    PremiumPlan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPlan {
    #[serde(rename = "type")]
    pub plan_type: UserPlanType,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Profile stored at `{uid}/profile`. Unknown keys are preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<UserPlan>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    pub fn plan_type(&self) -> Option<UserPlanType> {
        self.plan.as_ref().map(|p| p.plan_type)
    }
}

/// One saved picture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbRecord {
    /// Encoded image, usually a `data:image/png;base64,...` URL.
    pub picture: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl DbRecord {
    pub fn new(picture: impl Into<String>) -> Self {
        Self {
            picture: picture.into(),
            created_at: Utc::now(),
            name: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Per-user pictures keyed by backend-generated key.
pub type Pictures = BTreeMap<String, DbRecord>;

/// Shared picture URLs keyed by backend-generated key.
pub type PublicPictures = BTreeMap<String, String>;

/// Outgoing request configuration, as handed to an HTTP client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestConfig {
    pub url: String,
    pub headers: BTreeMap<String, String>,
}

impl RequestConfig {
    pub const AUTHORIZATION: &'static str = "Authorization";

    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
        }
    }

    /// Header lookup, case-insensitive on the name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn has_authorization(&self) -> bool {
        self.header(Self::AUTHORIZATION).is_some()
    }
}
