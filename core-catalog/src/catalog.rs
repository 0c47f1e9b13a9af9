//! In-memory song catalog with lookup, filter and search helpers.

use thiserror::Error;

use crate::models::{Language, Song};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to parse song data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate song id: {0}")]
    DuplicateId(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// The full static song collection, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Catalog {
    songs: Vec<Song>,
    default_performer: String,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate song ids.
    pub fn new(songs: Vec<Song>, default_performer: impl Into<String>) -> Result<Self> {
        let mut seen = std::collections::HashSet::new();
        for song in &songs {
            if !seen.insert(song.id.as_str()) {
                return Err(CatalogError::DuplicateId(song.id.clone()));
            }
        }
        Ok(Self {
            songs,
            default_performer: default_performer.into(),
        })
    }

    /// Parse a catalog from a JSON array of songs.
    pub fn from_json(json: &str, default_performer: impl Into<String>) -> Result<Self> {
        let songs: Vec<Song> = serde_json::from_str(json)?;
        Self::new(songs, default_performer)
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// All songs in catalog order.
    pub fn all(&self) -> &[Song] {
        &self.songs
    }

    /// Look up a song by id.
    pub fn get(&self, id: &str) -> Option<&Song> {
        self.songs.iter().find(|song| song.id == id)
    }

    /// Songs belonging to the given album.
    pub fn by_album<'a>(&'a self, album: &'a str) -> impl Iterator<Item = &'a Song> {
        self.songs.iter().filter(move |song| song.album == album)
    }

    /// Songs whose primary language matches.
    pub fn by_language(&self, language: Language) -> impl Iterator<Item = &Song> {
        self.songs
            .iter()
            .filter(move |song| song.primary_language == language)
    }

    /// Case-insensitive free-text search over title, translated title,
    /// album and description.
    pub fn search<'a>(&'a self, query: &str) -> Vec<&'a Song> {
        let query = query.to_lowercase();
        self.songs
            .iter()
            .filter(|song| {
                song.title.to_lowercase().contains(&query)
                    || song.title_english.to_lowercase().contains(&query)
                    || song.album.to_lowercase().contains(&query)
                    || song
                        .description
                        .as_ref()
                        .is_some_and(|d| d.to_lowercase().contains(&query))
            })
            .collect()
    }

    /// The (track name, performer) pair handed to the track resolver for a
    /// song's playback.
    pub fn player_target<'a>(&'a self, song: &'a Song) -> (&'a str, &'a str) {
        let performer = song
            .performer
            .as_deref()
            .unwrap_or(&self.default_performer);
        (&song.title, performer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Year;

    fn song(id: &str, title: &str, album: &str, language: Language) -> Song {
        Song {
            id: id.into(),
            title: title.into(),
            title_english: format!("{} (EN)", title),
            album: album.into(),
            year: Year::Number(2024),
            duration: None,
            primary_language: language,
            has_translation: true,
            performer: None,
            description: None,
            lines: Vec::new(),
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(
            vec![
                song("amach-anocht", "Amach Anocht", "3CAG", Language::Irish),
                song("fine-art", "Fine Art", "Fine Art", Language::English),
                song("harrow-road", "Harrow Road", "Fine Art", Language::Mixed),
            ],
            "KNEECAP",
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_by_id() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 3);
        assert!(catalog.get("fine-art").is_some());
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = Catalog::new(
            vec![
                song("dup", "A", "X", Language::Irish),
                song("dup", "B", "X", Language::Irish),
            ],
            "KNEECAP",
        );
        assert!(matches!(result, Err(CatalogError::DuplicateId(ref id)) if id == "dup"));
    }

    #[test]
    fn test_filters() {
        let catalog = catalog();
        assert_eq!(catalog.by_album("Fine Art").count(), 2);
        assert_eq!(catalog.by_language(Language::Irish).count(), 1);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let catalog = catalog();
        let hits = catalog.search("fine");
        assert_eq!(hits.len(), 2); // title and album both match
        assert!(catalog.search("AMACH").len() == 1);
        assert!(catalog.search("nothing-here").is_empty());
    }

    #[test]
    fn test_player_target_uses_default_performer() {
        let catalog = catalog();
        let song = catalog.get("amach-anocht").unwrap();
        assert_eq!(catalog.player_target(song), ("Amach Anocht", "KNEECAP"));
    }

    #[test]
    fn test_player_target_prefers_song_performer() {
        let mut featured = song("parful", "Parful", "Fine Art", Language::Mixed);
        featured.performer = Some("KNEECAP, Radie Peat".into());
        let catalog = Catalog::new(vec![featured], "KNEECAP").unwrap();
        let song = catalog.get("parful").unwrap();
        assert_eq!(catalog.player_target(song).1, "KNEECAP, Radie Peat");
    }
}
