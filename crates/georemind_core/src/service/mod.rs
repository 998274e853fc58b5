//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs.
//! - Keep UI collaborators decoupled from storage details.

pub mod reminder_service;
