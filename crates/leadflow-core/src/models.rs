//! Domain models for Leadflow.

pub mod chat;
pub mod lead;
pub mod modification;
pub mod user;
