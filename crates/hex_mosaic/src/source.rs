//! Entity source collaborator: where ranked pictures come from.
//!
//! The core only sees an [`EntitySource`]: one primary picture, favourite character
//! pictures, and one list per [`ListKind`]. Transport (remote query, exported file, ...)
//! is up to the implementor.
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Opaque reference to an image (URL or path).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ImageRef(pub String);

impl ImageRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Last path segment of the reference, without query string or fragment.
    pub fn file_name(&self) -> Option<&str> {
        let path = self.0.split(['?', '#']).next().unwrap_or_default();
        path.trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty() && !name.contains(':'))
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ImageRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Watch/read status of a list entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Status {
    Current,
    Completed,
    Dropped,
    Paused,
    Planning,
}

/// The two independently fetched list categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ListKind {
    Anime,
    Manga,
}

impl ListKind {
    pub const ALL: [ListKind; 2] = [ListKind::Anime, ListKind::Manga];
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListKind::Anime => f.write_str("anime"),
            ListKind::Manga => f.write_str("manga"),
        }
    }
}

/// One entry of a user's list.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ListEntry {
    /// Identifier of the listed media.
    pub media_id: i64,
    /// Cover picture.
    pub image: ImageRef,
    /// User rating on a 0–10 scale, if rated.
    pub rating: Option<f64>,
    pub status: Status,
    /// Whether the media is among the user's favourites.
    pub favourite: bool,
}

impl ListEntry {
    pub fn new(media_id: i64, image: impl Into<ImageRef>, status: Status) -> Self {
        Self {
            media_id,
            image: image.into(),
            rating: None,
            status,
            favourite: false,
        }
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_favourite(mut self, favourite: bool) -> Self {
        self.favourite = favourite;
        self
    }
}

/// Supplies the entities a mosaic is built from.
///
/// Any error is fatal for a run: no placements are generated.
pub trait EntitySource: Send + Sync {
    /// Picture of the primary entity (always placed at the center).
    fn primary(&self) -> Result<ImageRef>;

    /// Pictures of favourite characters.
    fn favourite_characters(&self) -> Result<Vec<ImageRef>>;

    /// All entries of one list category.
    fn list(&self, kind: ListKind) -> Result<Vec<ListEntry>>;
}
