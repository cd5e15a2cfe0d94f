//! Generated entities and cover images for demos that run without an export.
use std::collections::HashSet;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::io::Cursor;

use hex_mosaic::prelude::*;
use image::{ImageFormat, Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const STATUSES: [Status; 5] = [
    Status::Current,
    Status::Completed,
    Status::Dropped,
    Status::Paused,
    Status::Planning,
];

fn rand01(rng: &mut dyn Rng) -> f64 {
    f64::from(rng.next_u32()) / (f64::from(u32::MAX) + 1.0)
}

/// Seeded random lists of `synthetic/<kind>-<i>.png` entries.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    characters: Vec<ImageRef>,
    anime: Vec<ListEntry>,
    manga: Vec<ListEntry>,
}

impl SyntheticSource {
    pub fn generate(seed: u64, characters: usize, anime: usize, manga: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self {
            characters: (0..characters)
                .map(|i| ImageRef::new(format!("synthetic/character-{i}.png")))
                .collect(),
            anime: generate_entries(ListKind::Anime, anime, &mut rng),
            manga: generate_entries(ListKind::Manga, manga, &mut rng),
        }
    }

    /// Number of entities a ranking of this source yields.
    pub fn entity_count(&self) -> usize {
        1 + self.characters.len() + self.anime.len() + self.manga.len()
    }
}

fn generate_entries(kind: ListKind, count: usize, rng: &mut dyn Rng) -> Vec<ListEntry> {
    (0..count)
        .map(|i| {
            let status = STATUSES[((rand01(rng) * 5.0) as usize).min(4)];
            let mut entry =
                ListEntry::new(i as i64, format!("synthetic/{kind}-{i}.png"), status)
                    .with_favourite(rand01(rng) < 0.1);
            if rand01(rng) < 0.8 {
                entry = entry.with_rating((rand01(rng) * 100.0).round() / 10.0);
            }
            entry
        })
        .collect()
}

impl EntitySource for SyntheticSource {
    fn primary(&self) -> Result<ImageRef> {
        Ok(ImageRef::new("synthetic/avatar.png"))
    }

    fn favourite_characters(&self) -> Result<Vec<ImageRef>> {
        Ok(self.characters.clone())
    }

    fn list(&self, kind: ListKind) -> Result<Vec<ListEntry>> {
        Ok(match kind {
            ListKind::Anime => self.anime.clone(),
            ListKind::Manga => self.manga.clone(),
        })
    }
}

/// Encodes a portrait PNG per reference, tinted by a color derived from the reference.
#[derive(Debug, Clone)]
pub struct SolidColorImages {
    seed: u64,
    width: u32,
    height: u32,
    missing: HashSet<ImageRef>,
}

impl SolidColorImages {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            width: 230,
            height: 345,
            missing: HashSet::new(),
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Makes `image` fail to load.
    pub fn with_missing(mut self, image: impl Into<ImageRef>) -> Self {
        self.missing.insert(image.into());
        self
    }

    pub fn color_for(&self, image: &ImageRef) -> Rgba<u8> {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        image.hash(&mut hasher);
        let mut rng = StdRng::seed_from_u64(hasher.finish());
        let [r, g, b, _] = rng.next_u32().to_le_bytes();
        Rgba([r, g, b, 255])
    }
}

impl ImageSource for SolidColorImages {
    fn load(&self, image: &ImageRef) -> Result<Vec<u8>> {
        if self.missing.contains(image) {
            return Err(Error::fetch(image.as_str(), "status code 404"));
        }

        let cover = RgbaImage::from_pixel(
            self.width.max(1),
            self.height.max(1),
            self.color_for(image),
        );
        let mut bytes = Vec::new();
        cover.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_is_seeded() {
        let a = SyntheticSource::generate(7, 2, 10, 5);
        let b = SyntheticSource::generate(7, 2, 10, 5);
        assert_eq!(a.anime, b.anime);
        assert_eq!(a.manga, b.manga);
        assert_eq!(a.entity_count(), 18);
        assert!(a
            .anime
            .iter()
            .all(|e| e.rating.is_none_or(|r| (0.0..=10.0).contains(&r))));
    }

    #[test]
    fn ranking_covers_every_entity() {
        let source = SyntheticSource::generate(1, 3, 20, 12);
        let ranked = rank_entities(&source).expect("ranks");
        assert_eq!(ranked.len(), source.entity_count());
        assert_eq!(ranked[0].image.as_str(), "synthetic/avatar.png");
    }

    #[test]
    fn images_decode_to_their_color() {
        let images = SolidColorImages::new(3).with_size(20, 30);
        let reference = ImageRef::new("synthetic/anime-0.png");
        let bytes = images.load(&reference).expect("loads");
        let decoded = image::load_from_memory(&bytes).expect("decodes").to_rgba8();

        assert_eq!(decoded.dimensions(), (20, 30));
        assert_eq!(*decoded.get_pixel(10, 15), images.color_for(&reference));
    }

    #[test]
    fn missing_images_fail() {
        let images = SolidColorImages::new(3).with_missing("synthetic/manga-1.png");
        assert!(matches!(
            images.load(&ImageRef::new("synthetic/manga-1.png")),
            Err(Error::Fetch { .. })
        ));
    }

    #[test]
    fn synthetic_run_skips_the_missing_cover() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = MosaicConfig::new(600, 600)
            .with_cell_radius(40.0)
            .with_workers(2)
            .with_output(dir.path().join("mosaic.png"));
        let runner = MosaicRunner::try_new(config).expect("valid config");
        let source = SyntheticSource::generate(11, 1, 6, 4);
        let images = SolidColorImages::new(11)
            .with_size(16, 24)
            .with_missing("synthetic/anime-2.png");

        let report = runner.run(&source, &images).expect("run succeeds");
        assert_eq!(report.attempted(), source.entity_count());
        assert_eq!(report.failures.len(), 1);
        assert!(dir.path().join("mosaic.png").exists());
    }
}
