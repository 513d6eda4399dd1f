// ABOUTME: Type definitions for API tokens
// ABOUTME: Token records and drafts with the project/environment wildcard scope

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Public wildcard meaning "every project" or "every environment"
pub const ALL: &str = "*";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown api token type: {0}")]
pub struct ParseTokenTypeError(pub String);

/// Kind of client a token was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiTokenType {
    Admin,
    Client,
    Frontend,
}

impl ApiTokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiTokenType::Admin => "admin",
            ApiTokenType::Client => "client",
            ApiTokenType::Frontend => "frontend",
        }
    }
}

impl fmt::Display for ApiTokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiTokenType {
    type Err = ParseTokenTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(ApiTokenType::Admin),
            "client" => Ok(ApiTokenType::Client),
            "frontend" => Ok(ApiTokenType::Frontend),
            _ => Err(ParseTokenTypeError(s.to_string())),
        }
    }
}

/// Project or environment a token is restricted to.
///
/// `All` is the wildcard. It is written as `*` in the public representation
/// and persisted as the absence of a value, so a token scoped to every project
/// never carries a literal `*` in storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum TokenScope {
    #[default]
    All,
    Named(String),
}

impl TokenScope {
    pub fn named(name: impl Into<String>) -> Self {
        TokenScope::Named(name.into())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, TokenScope::All)
    }

    /// Whether a request for `name` falls inside this scope
    pub fn covers(&self, name: &str) -> bool {
        match self {
            TokenScope::All => true,
            TokenScope::Named(scoped) => scoped == name,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TokenScope::All => ALL,
            TokenScope::Named(name) => name,
        }
    }

    pub(crate) fn to_column(&self) -> Option<&str> {
        match self {
            TokenScope::All => None,
            TokenScope::Named(name) => Some(name),
        }
    }

    pub(crate) fn from_column(value: Option<String>) -> Self {
        match value {
            Some(name) => TokenScope::Named(name),
            None => TokenScope::All,
        }
    }
}

impl From<&str> for TokenScope {
    fn from(value: &str) -> Self {
        if value == ALL {
            TokenScope::All
        } else {
            TokenScope::Named(value.to_string())
        }
    }
}

impl From<String> for TokenScope {
    fn from(value: String) -> Self {
        if value == ALL {
            TokenScope::All
        } else {
            TokenScope::Named(value)
        }
    }
}

impl fmt::Display for TokenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TokenScope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TokenScope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(TokenScope::from)
    }
}

/// API token as stored and returned by the token store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiToken {
    pub secret: String,
    pub username: String,
    #[serde(rename = "type")]
    pub token_type: ApiTokenType,
    pub project: TokenScope,
    pub environment: TokenScope,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub seen_at: Option<DateTime<Utc>>,
}

impl ApiToken {
    /// Active means no expiry, or an expiry strictly after `now`
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            None => true,
            Some(expires_at) => expires_at > now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }

    pub fn covers(&self, project: &str, environment: &str) -> bool {
        self.project.covers(project) && self.environment.covers(environment)
    }
}

/// Input for issuing a new token. The secret is generated by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTokenCreate {
    pub secret: String,
    pub username: String,
    #[serde(rename = "type")]
    pub token_type: ApiTokenType,
    #[serde(default)]
    pub project: TokenScope,
    #[serde(default)]
    pub environment: TokenScope,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl ApiTokenCreate {
    pub fn new(
        secret: impl Into<String>,
        username: impl Into<String>,
        token_type: ApiTokenType,
    ) -> Self {
        Self {
            secret: secret.into(),
            username: username.into(),
            token_type,
            project: TokenScope::All,
            environment: TokenScope::All,
            expires_at: None,
        }
    }

    pub fn with_project(mut self, project: impl Into<TokenScope>) -> Self {
        self.project = project.into();
        self
    }

    pub fn with_environment(mut self, environment: impl Into<TokenScope>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// The record this draft becomes once the store assigns `created_at`
    pub fn into_token(self, created_at: DateTime<Utc>) -> ApiToken {
        ApiToken {
            secret: self.secret,
            username: self.username,
            token_type: self.token_type,
            project: self.project,
            environment: self.environment,
            created_at,
            expires_at: self.expires_at,
            seen_at: None,
        }
    }
}
