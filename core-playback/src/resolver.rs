//! Track resolution against the vendor search endpoint.
//!
//! Maps a human-readable (track name, performer) pair to a vendor track
//! reference, tolerating imprecise matches: a field-scoped search first,
//! then a broader name-only fallback that prefers results whose performer
//! contains the expected name case-insensitively.

use std::sync::Arc;

use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use core_auth::AuthManager;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{PlaybackError, Result};
use crate::types::TrackRef;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: TrackPage,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    items: Vec<TrackItem>,
}

#[derive(Debug, Deserialize)]
struct TrackItem {
    name: String,
    uri: String,
    id: String,
    artists: Vec<ArtistItem>,
}

#[derive(Debug, Deserialize)]
struct ArtistItem {
    name: String,
}

impl From<TrackItem> for TrackRef {
    fn from(item: TrackItem) -> Self {
        Self {
            name: item.name,
            artists: item.artists.into_iter().map(|a| a.name).collect(),
            uri: item.uri,
            id: item.id,
        }
    }
}

/// Resolves display names to vendor track references.
pub struct TrackResolver {
    http_client: Arc<dyn HttpClient>,
    auth: Arc<AuthManager>,
    api_base_url: String,
}

impl TrackResolver {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        auth: Arc<AuthManager>,
        api_base_url: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            auth,
            api_base_url: api_base_url.into(),
        }
    }

    /// Resolve a (track, performer) pair to a track reference.
    ///
    /// An empty result set is a normal outcome and returns `Ok(None)`; only
    /// transport and authorization failures are errors. No retries; a failed
    /// search is a single round-trip, reported once.
    #[instrument(skip(self))]
    pub async fn resolve(&self, track_name: &str, artist_name: &str) -> Result<Option<TrackRef>> {
        let token = match self.auth.valid_credential().await? {
            Some(credential) => credential.access_token,
            None => return Err(PlaybackError::NotAuthenticated),
        };

        let scoped = format!(r#"track:"{}" artist:"{}""#, track_name, artist_name);
        let mut items = self.search(&scoped, 1, &token).await?;
        if let Some(item) = items.pop() {
            debug!(track = %track_name, "Resolved track with scoped search");
            return Ok(Some(item.into()));
        }

        // Fallback: broaden to the track name alone and pick the closest
        // performer match, else the first result.
        let mut fallback = self.search(track_name, 5, &token).await?;
        if fallback.is_empty() {
            debug!(track = %track_name, "No search results for track");
            return Ok(None);
        }

        let wanted = artist_name.to_lowercase();
        let position = fallback
            .iter()
            .position(|item| {
                item.artists
                    .iter()
                    .any(|artist| artist.name.to_lowercase().contains(&wanted))
            })
            .unwrap_or(0);

        debug!(track = %track_name, "Resolved track with fallback search");
        Ok(Some(fallback.swap_remove(position).into()))
    }

    async fn search(&self, query: &str, limit: u8, token: &str) -> Result<Vec<TrackItem>> {
        let mut url = Url::parse(&format!("{}/search", self.api_base_url))
            .map_err(|e| PlaybackError::Network(format!("invalid search URL: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("type", "track")
            .append_pair("limit", &limit.to_string());

        let request = HttpRequest::new(HttpMethod::Get, url).bearer_token(token);
        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| PlaybackError::Network(e.to_string()))?;

        if !response.is_success() {
            let message = response
                .text()
                .unwrap_or_else(|_| "vendor search failed".to_string());
            return Err(PlaybackError::Api {
                status: response.status,
                message,
            });
        }

        let parsed: SearchResponse = response
            .json()
            .map_err(|e| PlaybackError::Network(format!("failed to parse search response: {}", e)))?;
        Ok(parsed.tracks.items)
    }
}
