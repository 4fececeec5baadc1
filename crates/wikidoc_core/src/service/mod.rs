//! Core use-case services.
//!
//! # Responsibility
//! - Validate caller input before it reaches a repository.
//! - Keep API/CLI layers decoupled from storage details.

pub mod document_service;
