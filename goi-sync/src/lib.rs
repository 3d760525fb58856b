//! goi-sync library interface
//!
//! Exposes the sync pipeline for integration testing:
//! - Glossary canonicalization (parser, merge engine, renderer)
//! - Reference tables (tag registry, kanji bank, radicals)
//! - Deck source readers and the entry assembler
//! - Card model definition
//! - Dictionary API client

pub mod furigana;
pub mod glossary;
pub mod jisho;
pub mod kanji;
pub mod model;
pub mod normalize;
pub mod note;
pub mod radicals;
pub mod sources;
pub mod tags;
