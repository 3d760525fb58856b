//! # Goi Common Library
//!
//! Shared code for the goi vocabulary sync tools including:
//! - Error types
//! - Configuration loading
//! - AnkiConnect client (the card store collaborator)

pub mod anki;
pub mod config;
pub mod error;

pub use error::{Error, Result};
