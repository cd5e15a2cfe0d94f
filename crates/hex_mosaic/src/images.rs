//! Image byte sources.
//!
//! [`ImageSource`] turns an [`ImageRef`] into encoded image bytes. [`DiskCache`] wraps any
//! upstream source and keeps fetched bytes on disk, keyed by the reference's file name;
//! [`LocalFiles`] resolves references against a local directory.
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::source::ImageRef;

/// Yields encoded image bytes for a reference.
pub trait ImageSource: Send + Sync {
    fn load(&self, image: &ImageRef) -> Result<Vec<u8>>;
}

impl<S: ImageSource + ?Sized> ImageSource for &S {
    fn load(&self, image: &ImageRef) -> Result<Vec<u8>> {
        (**self).load(image)
    }
}

impl<S: ImageSource + ?Sized> ImageSource for Box<S> {
    fn load(&self, image: &ImageRef) -> Result<Vec<u8>> {
        (**self).load(image)
    }
}

/// Reads references as file paths.
///
/// Relative paths resolve against `root`. URLs (`scheme://...`) resolve to their file name
/// inside `root`, which lets a directory of pre-downloaded pictures stand in for a remote
/// host.
#[derive(Clone, Debug)]
pub struct LocalFiles {
    root: PathBuf,
}

impl LocalFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a reference resolves to, if it names a file at all.
    pub fn resolve(&self, image: &ImageRef) -> Option<PathBuf> {
        let reference = image.as_str().trim();
        if let Some(path) = reference.strip_prefix("file://") {
            return Some(PathBuf::from(path));
        }
        if reference.contains("://") {
            return image.file_name().map(|name| self.root.join(name));
        }
        if reference.is_empty() {
            return None;
        }
        let path = Path::new(reference);
        if path.is_absolute() {
            Some(path.to_path_buf())
        } else {
            Some(self.root.join(path))
        }
    }
}

impl ImageSource for LocalFiles {
    fn load(&self, image: &ImageRef) -> Result<Vec<u8>> {
        let path = self
            .resolve(image)
            .ok_or_else(|| Error::fetch(image.as_str(), "reference does not name a file"))?;
        fs::read(&path)
            .map_err(|e| Error::fetch(image.as_str(), format!("{}: {e}", path.display())))
    }
}

/// On-disk cache in front of an upstream [`ImageSource`].
///
/// Entries are stored as `<dir>/<file name of the reference>`; an existing file is served
/// without touching the upstream source.
pub struct DiskCache<S> {
    dir: PathBuf,
    upstream: S,
    tmp_counter: AtomicU64,
}

impl<S: ImageSource> DiskCache<S> {
    pub fn new(dir: impl Into<PathBuf>, upstream: S) -> Self {
        Self {
            dir: dir.into(),
            upstream,
            tmp_counter: AtomicU64::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache location for a reference.
    pub fn path_for(&self, image: &ImageRef) -> Option<PathBuf> {
        image.file_name().map(|name| self.dir.join(name))
    }

    fn store(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        // Write-then-rename so concurrent readers never see a partial file.
        let n = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let tmp = self.dir.join(format!(".partial-{}-{n}", std::process::id()));
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl<S: ImageSource> ImageSource for DiskCache<S> {
    fn load(&self, image: &ImageRef) -> Result<Vec<u8>> {
        let path = self
            .path_for(image)
            .ok_or_else(|| Error::fetch(image.as_str(), "reference has no file name"))?;

        if path.is_file() {
            debug!("Image already cached at {}.", path.display());
            return Ok(fs::read(&path)?);
        }

        let bytes = self.upstream.load(image)?;
        match self.store(&path, &bytes) {
            Ok(()) => debug!("Cached image {} at {}.", image, path.display()),
            Err(err) => warn!("Could not cache image {image}: {err}"),
        }
        Ok(bytes)
    }
}
