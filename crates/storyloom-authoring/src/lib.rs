//! Storyloom: Chapter Authoring bounded context.
//!
//! Responsible for the narrative graph: creating chapters with their root
//! node, adding nodes, and keeping a chapter's node, character and
//! start-node fields consistent with the nodes that point back at it.

pub mod application;
pub mod domain;
