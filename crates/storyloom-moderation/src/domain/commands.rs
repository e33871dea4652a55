//! Commands for the Moderation context.

use storyloom_core::command::Command;
use uuid::Uuid;

use super::request::RequestType;

/// Command to create a review request and deliver it to reviewers.
#[derive(Debug, Clone)]
pub struct CreateRequest {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The admin originating the request.
    pub requesting_admin_id: i64,
    /// What is being requested.
    pub request_type: RequestType,
    /// Chapter under review, if any.
    pub requested_chapter_id: Option<i64>,
}

/// Command to submit a chapter for publication review.
#[derive(Debug, Clone)]
pub struct RequestChapterPublication {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The admin submitting the chapter.
    pub admin_id: i64,
    /// The chapter to review.
    pub chapter_id: i64,
}

/// Command to register a new, disabled admin.
#[derive(Debug, Clone)]
pub struct RegisterAdmin {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Login email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Opaque credential.
    pub password: String,
}

/// Command to change an admin's profile. Empty strings and `None` leave
/// the corresponding field unchanged.
#[derive(Debug, Clone)]
pub struct ChangeAdmin {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The admin to change.
    pub admin_id: i64,
    /// New display name.
    pub name: String,
    /// New login email.
    pub email: String,
    /// New credential.
    pub password: String,
    /// New approval state.
    pub admin_status: Option<i32>,
    /// Replacement list of created chapters.
    pub created_chapters: Option<Vec<i64>>,
}

impl Command for CreateRequest {
    fn command_type(&self) -> &'static str {
        "moderation.create_request"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

impl Command for RequestChapterPublication {
    fn command_type(&self) -> &'static str {
        "moderation.request_chapter_publication"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

impl Command for RegisterAdmin {
    fn command_type(&self) -> &'static str {
        "moderation.register_admin"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

impl Command for ChangeAdmin {
    fn command_type(&self) -> &'static str {
        "moderation.change_admin"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
