//! Query handlers for the Moderation context.
//!
//! Views never carry credentials.

use serde::Serialize;
use storyloom_authoring::application::query_handlers::{ChapterView, list_chapters};
use storyloom_authoring::domain::aggregates::Chapter;
use storyloom_core::error::DomainError;
use storyloom_core::repository::Repository;
use storyloom_core::wire;
use tracing::debug;

use crate::domain::aggregates::{Admin, Player};
use crate::domain::request::{Request, RequestType};

/// Read-only view of an admin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminView {
    /// The admin identifier.
    #[serde(with = "wire::id")]
    pub admin_id: i64,
    /// Login email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Approval state, `-1` while disabled.
    pub admin_status: i32,
    /// Chapters this admin created.
    #[serde(with = "wire::ids")]
    pub created_chapters: Vec<i64>,
    /// Outbox.
    #[serde(with = "wire::ids")]
    pub requests_sent: Vec<i64>,
    /// Inbox.
    #[serde(with = "wire::ids")]
    pub requests_received: Vec<i64>,
}

impl From<Admin> for AdminView {
    fn from(admin: Admin) -> Self {
        Self {
            admin_id: admin.id,
            email: admin.email,
            name: admin.name,
            admin_status: admin.admin_status,
            created_chapters: admin.created_chapters,
            requests_sent: admin.requests_sent,
            requests_received: admin.requests_received,
        }
    }
}

/// Read-only view of a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestView {
    /// The request identifier.
    #[serde(with = "wire::id")]
    pub request_id: i64,
    /// Request discriminator.
    pub request_type: RequestType,
    /// Originating admin.
    #[serde(with = "wire::id")]
    pub requesting_admin: i64,
    /// Chapter under review, if any.
    #[serde(with = "wire::opt_id")]
    pub requested_chapter_id: Option<i64>,
}

impl From<Request> for RequestView {
    fn from(request: Request) -> Self {
        Self {
            request_id: request.id,
            request_type: request.request_type,
            requesting_admin: request.requesting_admin,
            requested_chapter_id: request.requested_chapter_id,
        }
    }
}

/// Looks up the admin with `email` and checks `password` against it.
/// Disabled admins are returned too; callers decide what that means.
///
/// # Errors
///
/// Returns `DomainError::InvalidCredentials` if no admin has the email or
/// the password differs, or the store error if the lookup fails.
pub async fn authorize_admin(
    email: &str,
    password: &str,
    admins: &dyn Repository<Admin>,
) -> Result<AdminView, DomainError> {
    let found = admins
        .query_all(&|admin: &Admin| admin.email == email)
        .await?;
    match found.into_iter().next() {
        Some(admin) if admin.password == password => Ok(admin.into()),
        _ => Err(DomainError::InvalidCredentials),
    }
}

/// Retrieves an admin by id.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the admin does not exist.
pub async fn get_admin_by_id(
    admin_id: i64,
    admins: &dyn Repository<Admin>,
) -> Result<AdminView, DomainError> {
    Ok(admins.get_by_id(admin_id).await?.into())
}

/// Retrieves a request by id.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the request does not exist.
pub async fn get_request_by_id(
    request_id: i64,
    requests: &dyn Repository<Request>,
) -> Result<RequestView, DomainError> {
    Ok(requests.get_by_id(request_id).await?.into())
}

/// Retrieves the requests delivered to an admin, in delivery order. Ids
/// that no longer resolve are skipped.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the admin does not exist, or any
/// store error other than a missing request.
pub async fn get_inbox(
    admin_id: i64,
    admins: &dyn Repository<Admin>,
    requests: &dyn Repository<Request>,
) -> Result<Vec<RequestView>, DomainError> {
    let admin = admins.get_by_id(admin_id).await?;
    let mut inbox = Vec::with_capacity(admin.requests_received.len());
    for request_id in admin.requests_received {
        match requests.get_by_id(request_id).await {
            Ok(request) => inbox.push(request.into()),
            Err(err) if err.is_not_found() => {
                debug!(admin_id, request_id, "skipping unresolvable inbox entry");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(inbox)
}

/// Lists the chapters visible to a user: every chapter for an admin, only
/// published chapters for a plain player.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if `user_id` is neither an admin nor a
/// player.
pub async fn get_chapters_for_user(
    user_id: i64,
    admins: &dyn Repository<Admin>,
    players: &dyn Repository<Player>,
    chapters: &dyn Repository<Chapter>,
) -> Result<Vec<ChapterView>, DomainError> {
    match admins.get_by_id(user_id).await {
        Ok(_) => return list_chapters(chapters, false).await,
        Err(err) if err.is_not_found() => {}
        Err(err) => return Err(err),
    }

    let player = players.get_by_id(user_id).await.map_err(|err| {
        if err.is_not_found() {
            DomainError::not_found("user", user_id)
        } else {
            err
        }
    })?;
    list_chapters(chapters, !player.admin).await
}
