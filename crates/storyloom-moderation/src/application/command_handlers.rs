//! Command handlers for the Moderation context.
//!
//! `handle_create_request` performs four independent writes: the request
//! row, the requester's outbox, every reviewer's inbox, and (for chapter
//! submissions) the chapter status. Only the first, second and last are
//! decisive; inbox delivery is best effort, logged and skipped per
//! reviewer on failure.

use storyloom_core::command::Command;
use storyloom_core::error::DomainError;
use storyloom_core::id::IdGenerator;
use storyloom_core::repository::modify_entity;
use tracing::{info, warn};

use super::ModerationRepositories;
use crate::domain::aggregates::{Admin, Player};
use crate::domain::commands::{ChangeAdmin, CreateRequest, RegisterAdmin, RequestChapterPublication};
use crate::domain::request::{Request, RequestType};

/// Handles the `CreateRequest` command and returns the new request id.
///
/// # Errors
///
/// Returns `DomainError` if the request insert, the requester's outbox
/// update, or the chapter transition fails. In the last case the request
/// and its deliveries have already been written.
pub async fn handle_create_request(
    command: &CreateRequest,
    ids: &IdGenerator,
    repos: ModerationRepositories<'_>,
) -> Result<i64, DomainError> {
    let request = Request {
        id: ids.next_id(),
        version: 0,
        request_type: command.request_type,
        requesting_admin: command.requesting_admin_id,
        requested_chapter_id: command.requested_chapter_id.filter(|id| *id != 0),
    };
    repos.requests.insert(&request).await?;

    modify_entity(repos.admins, command.requesting_admin_id, |admin| {
        admin.send_request(request.id);
        Ok(())
    })
    .await?;

    let delivered = fan_out(&request, repos).await;

    if let Some(chapter_id) = request.submits_chapter() {
        let chapter = modify_entity(repos.chapters, chapter_id, |chapter| {
            chapter.submit_for_review()
        })
        .await?;
        info!(
            correlation_id = %command.correlation_id,
            chapter_id,
            status = %chapter.status,
            "chapter submitted for review"
        );
    }

    info!(
        correlation_id = %command.correlation_id,
        command = command.command_type(),
        request_id = request.id,
        request_type = %request.request_type,
        requesting_admin = request.requesting_admin,
        delivered,
        "request created"
    );

    Ok(request.id)
}

/// Appends `request` to the inbox of every admin that is a reviewer right
/// now. Returns the number of successful deliveries.
async fn fan_out(request: &Request, repos: ModerationRepositories<'_>) -> usize {
    let reviewers = match repos.admins.query_all(&|admin: &Admin| admin.is_reviewer()).await {
        Ok(reviewers) => reviewers,
        Err(err) => {
            warn!(request_id = request.id, error = %err, "could not list reviewers");
            return 0;
        }
    };

    let mut delivered = 0;
    for reviewer in reviewers {
        let result = modify_entity(repos.admins, reviewer.id, |admin| {
            admin.receive_request(request.id);
            Ok(())
        })
        .await;
        match result {
            Ok(_) => delivered += 1,
            Err(err) => warn!(
                request_id = request.id,
                reviewer_id = reviewer.id,
                error = %err,
                "request delivery failed"
            ),
        }
    }
    delivered
}

/// Handles the `RequestChapterPublication` command: checks the chapter can
/// enter review, then creates a chapter-scoped approval request.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the chapter does not exist,
/// `DomainError::Validation` if it is already published, or any error of
/// [`handle_create_request`].
pub async fn handle_request_chapter_publication(
    command: &RequestChapterPublication,
    ids: &IdGenerator,
    repos: ModerationRepositories<'_>,
) -> Result<i64, DomainError> {
    let chapter = repos.chapters.get_by_id(command.chapter_id).await?;
    chapter.status.submit_for_review()?;

    let create = CreateRequest {
        correlation_id: command.correlation_id,
        requesting_admin_id: command.admin_id,
        request_type: RequestType::REGISTRATION_APPROVAL,
        requested_chapter_id: Some(command.chapter_id),
    };
    handle_create_request(&create, ids, repos).await
}

/// Handles the `RegisterAdmin` command: stores a disabled admin, asks the
/// reviewers to approve it, and mirrors it as a player.
///
/// # Errors
///
/// Returns `DomainError::Validation` for an empty email or password,
/// `DomainError::Duplicate` if the email is taken,
/// `DomainError::RegistrationRequestFailed` if the approval request fails,
/// and `DomainError::PlayerMirrorFailed` if the player insert fails. The
/// admin record is kept in the last two cases.
pub async fn handle_register_admin(
    command: &RegisterAdmin,
    ids: &IdGenerator,
    repos: ModerationRepositories<'_>,
) -> Result<i64, DomainError> {
    if command.email.trim().is_empty() || command.password.is_empty() {
        return Err(DomainError::Validation(
            "email and password are required".into(),
        ));
    }

    let taken = repos
        .admins
        .query_all(&|admin: &Admin| admin.email == command.email)
        .await?;
    if !taken.is_empty() {
        return Err(DomainError::Duplicate(format!(
            "admin with email {} already exists",
            command.email
        )));
    }

    let admin = Admin::new(
        ids.next_id(),
        command.email.clone(),
        command.name.clone(),
        command.password.clone(),
    );
    repos.admins.insert(&admin).await?;

    let approval = CreateRequest {
        correlation_id: command.correlation_id,
        requesting_admin_id: admin.id,
        request_type: RequestType::REGISTRATION_APPROVAL,
        requested_chapter_id: None,
    };
    handle_create_request(&approval, ids, repos)
        .await
        .map_err(|err| DomainError::RegistrationRequestFailed(err.to_string()))?;

    repos
        .players
        .insert(&Player::mirror_of(&admin))
        .await
        .map_err(|err| DomainError::PlayerMirrorFailed(err.to_string()))?;

    info!(
        correlation_id = %command.correlation_id,
        command = command.command_type(),
        admin_id = admin.id,
        "admin registered"
    );

    Ok(admin.id)
}

/// Handles the `ChangeAdmin` command. This is the only path that changes an
/// admin's approval state. Name, email and password changes are copied to
/// the mirrored player on a best-effort basis.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the admin does not exist,
/// `DomainError::Duplicate` if the new email belongs to another admin, or
/// the store error of the admin update.
pub async fn handle_change_admin(
    command: &ChangeAdmin,
    repos: ModerationRepositories<'_>,
) -> Result<Admin, DomainError> {
    if !command.email.is_empty() {
        let taken = repos
            .admins
            .query_all(&|admin: &Admin| admin.email == command.email && admin.id != command.admin_id)
            .await?;
        if !taken.is_empty() {
            return Err(DomainError::Duplicate(format!(
                "admin with email {} already exists",
                command.email
            )));
        }
    }

    let admin = modify_entity(repos.admins, command.admin_id, |admin| {
        if !command.name.is_empty() {
            admin.name.clone_from(&command.name);
        }
        if !command.email.is_empty() {
            admin.email.clone_from(&command.email);
        }
        if !command.password.is_empty() {
            admin.password.clone_from(&command.password);
        }
        if let Some(status) = command.admin_status {
            admin.admin_status = status;
        }
        if let Some(chapters) = &command.created_chapters {
            admin.created_chapters.clone_from(chapters);
        }
        Ok(())
    })
    .await?;

    let mirrored = modify_entity(repos.players, admin.id, |player| {
        player.name.clone_from(&admin.name);
        player.email.clone_from(&admin.email);
        player.password.clone_from(&admin.password);
        Ok(())
    })
    .await;
    if let Err(err) = mirrored {
        warn!(admin_id = admin.id, error = %err, "player mirror not updated");
    }

    info!(
        correlation_id = %command.correlation_id,
        command = command.command_type(),
        admin_id = admin.id,
        admin_status = admin.admin_status,
        "admin changed"
    );

    Ok(admin)
}
