//! Storyloom: Moderation bounded context.
//!
//! Responsible for admin onboarding (registration, authorization, profile
//! changes) and for review requests: creating a request, recording it in
//! the requester's outbox, fanning it out to every reviewer's inbox, and
//! moving a submitted chapter into review.

pub mod application;
pub mod domain;
