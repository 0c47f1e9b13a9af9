//! Domain models for the bilingual song catalog
//!
//! Songs are authored as static JSON documents, one per song, and loaded at
//! startup. Every lyric line carries an explicit language tag; the primary
//! language of a line is never inferred from which field happens to appear
//! first in the document.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Language of a lyric line or a song's primary language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Irish,
    English,
    /// The line mixes both languages.
    Mixed,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Irish => write!(f, "Irish"),
            Language::English => write!(f, "English"),
            Language::Mixed => write!(f, "Mixed"),
        }
    }
}

/// Kind of catalog line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    /// A structural marker such as "Verse 1" or "Chorus".
    Section,
    /// A sung/rapped lyric line.
    #[default]
    Lyric,
}

/// One line of a song's lyrics.
///
/// `text` is in the line's tagged `language`; `translation` carries the
/// other-language rendering used by the per-line translation toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricLine {
    #[serde(default)]
    pub kind: LineKind,
    /// Explicit language tag of `text`.
    pub language: Language,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    /// Section label this line belongs to (e.g., "Chorus").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Credited performer for this line, when it differs from the song's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
}

impl LyricLine {
    /// Whether the line has a translation to toggle to.
    pub fn has_translation(&self) -> bool {
        self.translation.is_some()
    }
}

/// Release year, which source documents record either as a number or as
/// free text (e.g., "2017" vs "unreleased").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Year {
    Number(u16),
    Text(String),
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Year::Number(year) => write!(f, "{}", year),
            Year::Text(text) => write!(f, "{}", text),
        }
    }
}

/// One song with its bilingual lyrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    /// Stable identifier used in routes and lookups.
    pub id: String,
    /// Title in the song's primary language.
    pub title: String,
    /// English rendering of the title.
    pub title_english: String,
    /// Album or collection name ("Singles" for standalone releases).
    pub album: String,
    pub year: Year,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// Dominant language across the song's lines.
    pub primary_language: Language,
    #[serde(default)]
    pub has_translation: bool,
    /// Credited performer; the catalog's default performer applies when
    /// absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub lines: Vec<LyricLine>,
}

impl Song {
    /// Lines carrying lyrics (excluding section markers).
    pub fn lyric_lines(&self) -> impl Iterator<Item = &LyricLine> {
        self.lines
            .iter()
            .filter(|line| line.kind == LineKind::Lyric)
    }

    /// Whether any line offers a translation.
    pub fn any_line_translated(&self) -> bool {
        self.lines.iter().any(LyricLine::has_translation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SONG_JSON: &str = r#"{
        "id": "cearta",
        "title": "C.E.A.R.T.A",
        "titleEnglish": "R.I.G.H.T.S",
        "album": "3CAG",
        "year": 2017,
        "primaryLanguage": "irish",
        "hasTranslation": true,
        "lines": [
            { "kind": "section", "language": "english", "text": "Verse 1" },
            {
                "language": "irish",
                "text": "Ní catch mé",
                "translation": "They won't catch me",
                "section": "Verse 1"
            },
            { "language": "english", "text": "Straight outta Belfast", "section": "Verse 1" }
        ]
    }"#;

    #[test]
    fn test_song_deserializes_with_tagged_languages() {
        let song: Song = serde_json::from_str(SONG_JSON).unwrap();

        assert_eq!(song.id, "cearta");
        assert_eq!(song.year, Year::Number(2017));
        assert_eq!(song.primary_language, Language::Irish);
        assert_eq!(song.lines.len(), 3);
        assert_eq!(song.lines[0].kind, LineKind::Section);
        assert_eq!(song.lines[1].language, Language::Irish);
        assert!(song.lines[1].has_translation());
        assert_eq!(song.lines[2].language, Language::English);
        assert!(!song.lines[2].has_translation());
    }

    #[test]
    fn test_line_without_language_tag_is_rejected() {
        // Language is an explicit required tag, never inferred.
        let json = r#"{ "text": "Ní catch mé" }"#;
        assert!(serde_json::from_str::<LyricLine>(json).is_err());
    }

    #[test]
    fn test_year_accepts_text() {
        let year: Year = serde_json::from_str(r#""unreleased""#).unwrap();
        assert_eq!(year, Year::Text("unreleased".into()));
        assert_eq!(year.to_string(), "unreleased");
    }

    #[test]
    fn test_lyric_lines_excludes_sections() {
        let song: Song = serde_json::from_str(SONG_JSON).unwrap();
        assert_eq!(song.lyric_lines().count(), 2);
        assert!(song.any_line_translated());
    }

    #[test]
    fn test_song_round_trip() {
        let song: Song = serde_json::from_str(SONG_JSON).unwrap();
        let json = serde_json::to_string(&song).unwrap();
        let back: Song = serde_json::from_str(&json).unwrap();
        assert_eq!(song, back);
    }
}
