//! Entities of the Moderation context.

use serde::{Deserialize, Serialize};
use storyloom_core::entity::Entity;

/// `admin_status` of an admin awaiting approval. Any other value marks a
/// reviewer.
pub const DISABLED_ADMIN_STATUS: i32 = -1;

/// An administrator account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    /// Entity identifier.
    pub id: i64,
    /// Optimistic-concurrency stamp.
    #[serde(default)]
    pub version: i64,
    /// Login email; unique among admins.
    pub email: String,
    /// Opaque credential, compared verbatim.
    pub password: String,
    /// Display name.
    pub name: String,
    /// Approval state; see [`DISABLED_ADMIN_STATUS`].
    pub admin_status: i32,
    /// Chapters this admin created.
    #[serde(default)]
    pub created_chapters: Vec<i64>,
    /// Requests this admin originated (outbox).
    #[serde(default)]
    pub requests_sent: Vec<i64>,
    /// Requests delivered to this admin for review (inbox).
    #[serde(default)]
    pub requests_received: Vec<i64>,
}

impl Admin {
    /// Creates a disabled admin with empty request lists.
    #[must_use]
    pub fn new(
        id: i64,
        email: impl Into<String>,
        name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id,
            version: 0,
            email: email.into(),
            password: password.into(),
            name: name.into(),
            admin_status: DISABLED_ADMIN_STATUS,
            created_chapters: Vec::new(),
            requests_sent: Vec::new(),
            requests_received: Vec::new(),
        }
    }

    /// Returns `true` if this admin is still awaiting approval.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.admin_status == DISABLED_ADMIN_STATUS
    }

    /// Returns `true` if this admin receives review requests.
    #[must_use]
    pub fn is_reviewer(&self) -> bool {
        !self.is_disabled()
    }

    /// Records an originated request. Returns whether the outbox changed.
    pub fn send_request(&mut self, request_id: i64) -> bool {
        push_unique(&mut self.requests_sent, request_id)
    }

    /// Records a delivered request. Returns whether the inbox changed.
    pub fn receive_request(&mut self, request_id: i64) -> bool {
        push_unique(&mut self.requests_received, request_id)
    }
}

fn push_unique(list: &mut Vec<i64>, id: i64) -> bool {
    if list.contains(&id) {
        return false;
    }
    list.push(id);
    true
}

impl Entity for Admin {
    const KIND: &'static str = "admin";

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

/// A reader account. Every admin is mirrored by a player with the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Entity identifier.
    pub id: i64,
    /// Optimistic-concurrency stamp.
    #[serde(default)]
    pub version: i64,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Opaque credential.
    pub password: String,
    /// Marks the mirror of an admin account.
    #[serde(default)]
    pub admin: bool,
}

impl Player {
    /// Builds the player record mirroring `admin`.
    #[must_use]
    pub fn mirror_of(admin: &Admin) -> Self {
        Self {
            id: admin.id,
            version: 0,
            name: admin.name.clone(),
            email: admin.email.clone(),
            password: admin.password.clone(),
            admin: true,
        }
    }
}

impl Entity for Player {
    const KIND: &'static str = "player";

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
