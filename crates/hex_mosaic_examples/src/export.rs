//! Entity source backed by a JSON export of a user's profile and media lists.
//!
//! The export bundles three API responses under `user`, `anime` and `manga`:
//!
//! ```json
//! {
//!   "user":  { "data": { "Viewer": { "avatar": { "large": "…" }, "favourites": { … } } } },
//!   "anime": { "data": { "MediaListCollection": { "lists": [ { "entries": [ … ] } ] } } },
//!   "manga": { "data": { "MediaListCollection": { "lists": [] } } }
//! }
//! ```
use std::fs;
use std::path::Path;

use hex_mosaic::prelude::*;
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, Deserialize)]
pub struct Export {
    pub user: Envelope<UserData>,
    pub anime: Envelope<ListData>,
    pub manga: Envelope<ListData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserData {
    #[serde(rename = "Viewer")]
    pub viewer: Viewer,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Viewer {
    pub id: i64,
    pub name: String,
    pub avatar: ImageSizes,
    pub favourites: Favourites,
}

/// Avatar and character images come in two sizes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImageSizes {
    pub large: Option<String>,
    pub medium: Option<String>,
}

impl ImageSizes {
    pub fn best(&self) -> Option<ImageRef> {
        first_present([&self.large, &self.medium])
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Favourites {
    pub anime: FavouriteNodes,
    pub manga: FavouriteNodes,
    pub characters: CharacterNodes,
}

impl Favourites {
    fn of(&self, kind: ListKind) -> &FavouriteNodes {
        match kind {
            ListKind::Anime => &self.anime,
            ListKind::Manga => &self.manga,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FavouriteNodes {
    pub nodes: Vec<MediaNode>,
}

impl FavouriteNodes {
    pub fn has(&self, id: i64) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaNode {
    pub id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CharacterNodes {
    pub nodes: Vec<CharacterNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CharacterNode {
    pub id: i64,
    #[serde(default)]
    pub image: ImageSizes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListData {
    #[serde(rename = "MediaListCollection")]
    pub collection: MediaListCollection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MediaListCollection {
    pub lists: Vec<MediaList>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MediaList {
    pub name: String,
    pub entries: Vec<MediaEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaEntry {
    pub media: Media,
    #[serde(default)]
    pub score: Option<f64>,
    pub status: Status,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Media {
    pub id: i64,
    #[serde(rename = "coverImage", default)]
    pub cover_image: CoverImage,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CoverImage {
    #[serde(rename = "extraLarge")]
    pub extra_large: Option<String>,
    pub large: Option<String>,
    pub medium: Option<String>,
}

impl CoverImage {
    pub fn best(&self) -> Option<ImageRef> {
        first_present([&self.extra_large, &self.large, &self.medium])
    }
}

fn first_present<const N: usize>(candidates: [&Option<String>; N]) -> Option<ImageRef> {
    candidates
        .into_iter()
        .flatten()
        .find(|url| !url.trim().is_empty())
        .map(|url| ImageRef::new(url.as_str()))
}

/// [`EntitySource`] over a parsed [`Export`].
#[derive(Debug, Clone)]
pub struct ExportSource {
    export: Export,
}

impl ExportSource {
    pub fn new(export: Export) -> Self {
        Self { export }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let export = serde_json::from_str(json)
            .map_err(|e| Error::Source(format!("invalid export: {e}")))?;
        Ok(Self::new(export))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        debug!("Read export from {}.", path.display());
        Self::from_json(&json)
    }

    pub fn viewer(&self) -> &Viewer {
        &self.export.user.data.viewer
    }

    fn collection(&self, kind: ListKind) -> &MediaListCollection {
        match kind {
            ListKind::Anime => &self.export.anime.data.collection,
            ListKind::Manga => &self.export.manga.data.collection,
        }
    }
}

impl EntitySource for ExportSource {
    fn primary(&self) -> Result<ImageRef> {
        self.viewer()
            .avatar
            .best()
            .ok_or_else(|| Error::Source("viewer has no avatar image".into()))
    }

    fn favourite_characters(&self) -> Result<Vec<ImageRef>> {
        Ok(self
            .viewer()
            .favourites
            .characters
            .nodes
            .iter()
            .filter_map(|c| c.image.best())
            .collect())
    }

    fn list(&self, kind: ListKind) -> Result<Vec<ListEntry>> {
        let favourites = self.viewer().favourites.of(kind);
        let mut entries = Vec::new();

        for entry in self
            .collection(kind)
            .lists
            .iter()
            .flat_map(|l| l.entries.iter())
        {
            let Some(image) = entry.media.cover_image.best() else {
                warn!("Skipping {kind} {} without a cover image.", entry.media.id);
                continue;
            };
            let mut item = ListEntry::new(entry.media.id, image, entry.status)
                .with_favourite(favourites.has(entry.media.id));
            if let Some(score) = entry.score {
                item = item.with_rating(score);
            }
            entries.push(item);
        }

        debug!("Loaded {} {kind} entries.", entries.len());
        Ok(entries)
    }
}
