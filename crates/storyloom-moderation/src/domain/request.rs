//! Review requests.

use std::fmt;

use serde::{Deserialize, Serialize};
use storyloom_core::entity::Entity;

/// Request discriminator. Open-ended: unknown codes are stored and fanned
/// out like any other request, they just trigger no side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestType(pub i32);

impl RequestType {
    /// Approval of a newly registered admin or, when a chapter is named,
    /// of that chapter's publication.
    pub const REGISTRATION_APPROVAL: Self = Self(1);

    /// Returns the numeric code.
    #[must_use]
    pub fn code(self) -> i32 {
        self.0
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A moderation record awaiting reviewer attention. Never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Entity identifier.
    pub id: i64,
    /// Always `0`; requests are immutable.
    #[serde(default)]
    pub version: i64,
    /// What is being requested.
    pub request_type: RequestType,
    /// The admin that originated the request.
    pub requesting_admin: i64,
    /// Chapter under review, if the request is chapter-scoped.
    #[serde(default)]
    pub requested_chapter_id: Option<i64>,
}

impl Request {
    /// The chapter that creating this request moves into review, if any.
    #[must_use]
    pub fn submits_chapter(&self) -> Option<i64> {
        if self.request_type == RequestType::REGISTRATION_APPROVAL {
            self.requested_chapter_id
        } else {
            None
        }
    }
}

impl Entity for Request {
    const KIND: &'static str = "request";

    fn id(&self) -> i64 {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(request_type: RequestType, chapter: Option<i64>) -> Request {
        Request {
            id: 1,
            version: 0,
            request_type,
            requesting_admin: 2,
            requested_chapter_id: chapter,
        }
    }

    #[test]
    fn test_only_type_one_with_chapter_submits_chapter() {
        assert_eq!(
            request(RequestType::REGISTRATION_APPROVAL, Some(7)).submits_chapter(),
            Some(7)
        );
        assert_eq!(
            request(RequestType::REGISTRATION_APPROVAL, None).submits_chapter(),
            None
        );
        assert_eq!(request(RequestType(4), Some(7)).submits_chapter(), None);
    }

    #[test]
    fn test_request_type_serializes_as_bare_integer() {
        let json = serde_json::to_value(request(RequestType(4), None)).unwrap();

        assert_eq!(json["request_type"], 4);
        assert!(json["requested_chapter_id"].is_null());
    }
}
