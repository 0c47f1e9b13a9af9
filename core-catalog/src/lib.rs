//! # Song Catalog
//!
//! Static bilingual song data: one [`Song`](models::Song) per document with
//! per-line language tags and translations, plus the in-memory
//! [`Catalog`](catalog::Catalog) the UI queries (lookup, album/language
//! filters, free-text search) and the playback layer asks for a song's
//! (track name, performer) pair.

pub mod catalog;
pub mod models;

pub use catalog::{Catalog, CatalogError};
pub use models::{Language, LineKind, LyricLine, Song, Year};
