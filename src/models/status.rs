//! Response envelope and the business outcome it carries.

use serde::{Deserialize, Serialize};

/// Outcome of a request that reached the handler.
///
/// Everything except `Success` and `Empty` is a rejected business rule. These
/// are delivered in a successful response so clients can branch on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseStatus {
    #[serde(rename = "success")]
    Success,
    #[serde(rename = "error:duplicatename")]
    DuplicateName,
    #[serde(rename = "error:maxteamcount")]
    MaxTeamCount,
    #[serde(rename = "error:maxmembercount")]
    Full,
    #[serde(rename = "error:alreadymember")]
    AlreadyMember,
    #[serde(rename = "error:notowner")]
    NotOwner,
    #[serde(rename = "empty")]
    Empty,
}

impl ResponseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStatus::Success => "success",
            ResponseStatus::DuplicateName => "error:duplicatename",
            ResponseStatus::MaxTeamCount => "error:maxteamcount",
            ResponseStatus::Full => "error:maxmembercount",
            ResponseStatus::AlreadyMember => "error:alreadymember",
            ResponseStatus::NotOwner => "error:notowner",
            ResponseStatus::Empty => "empty",
        }
    }
}

impl std::fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response envelope shared by every operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub api: String,
    pub status: ResponseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            api: crate::service::API_VERSION.to_string(),
            status: ResponseStatus::Success,
            data: Some(data),
        }
    }

    /// A response carrying a status and no payload.
    pub fn status(status: ResponseStatus) -> Self {
        Self {
            api: crate::service::API_VERSION.to_string(),
            status,
            data: None,
        }
    }

    /// A payload that still reports `Empty`, e.g. a zero-row delete.
    pub fn empty_with(data: T) -> Self {
        Self {
            api: crate::service::API_VERSION.to_string(),
            status: ResponseStatus::Empty,
            data: Some(data),
        }
    }
}

/// Identifier of a freshly created row, exposed as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedId {
    pub id: String,
}

/// Result of removing a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Removed {
    pub removed: u64,
}
