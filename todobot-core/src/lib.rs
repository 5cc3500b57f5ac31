//! Per-user to-do list engine driven by chat-style commands.
//!
//! The engine is two small pieces: a [`store::TaskStore`] owning the
//! mapping from user identity to an ordered task list (loaded once at
//! startup, full snapshot rewritten after every mutation), and a
//! stateless [`command`] processor that validates raw argument text and
//! maps each command onto a store operation. How command lines arrive
//! and how outcomes are displayed are collaborator concerns; see the
//! gateway crate.

pub mod command;
pub mod outcome;
pub mod snapshot;
pub mod store;
pub mod task;
pub mod user;
