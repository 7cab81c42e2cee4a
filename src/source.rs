//! Opening, probing and decoding source images, including ones that live in remote storage.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, ImageReader};
use log::{debug, warn};
use tempfile::NamedTempFile;

use crate::error::IiifError;
use crate::request::{Location, SourceDescriptor};
use crate::{backend_err, backend_try};

/// Storage holding sources that are not on the local filesystem.
pub trait SourceStore: Send + Sync {
    /// Copies the object stored under `key` into `dest`, returning the number of bytes written.
    fn fetch(&self, key: &str, dest: &mut dyn Write) -> io::Result<u64>;
}

/// A directory laid out as an object store: keys are relative paths under `root`.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SourceStore for DirectoryStore {
    fn fetch(&self, key: &str, dest: &mut dyn Write) -> io::Result<u64> {
        let relative = Path::new(key);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("key `{key}' escapes the store"),
            ));
        }
        let mut file = File::open(self.root.join(relative))?;
        io::copy(&mut file, dest)
    }
}

/// A source that is readable from the local filesystem for as long as this value lives.
///
/// Remote sources are copied into a temporary file that is deleted on drop.
enum LocalSource<'a> {
    Borrowed(&'a Path),
    Materialized(NamedTempFile),
}

impl LocalSource<'_> {
    fn path(&self) -> &Path {
        match self {
            LocalSource::Borrowed(path) => path,
            LocalSource::Materialized(file) => file.path(),
        }
    }
}

impl Drop for LocalSource<'_> {
    // NamedTempFile swallows removal errors, so remove the copy here and report them
    fn drop(&mut self) {
        if let LocalSource::Materialized(file) = self {
            match std::fs::remove_file(file.path()) {
                Ok(()) => debug!("removed {}", file.path().display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!("unable to remove {}: {e}", file.path().display()),
            }
        }
    }
}

fn localize<'a>(
    source: &'a SourceDescriptor,
    store: Option<&dyn SourceStore>,
    scratch_dir: &Path,
) -> Result<LocalSource<'a>, IiifError> {
    match &source.location {
        Location::Path(path) => {
            // existence and readability only; decoding happens later
            File::open(path).map_err(|e| IiifError::source_unreadable(&source.location, e))?;
            Ok(LocalSource::Borrowed(path))
        }
        Location::Remote(key) => {
            let store = store.ok_or_else(|| {
                IiifError::source_unreadable(
                    &source.location,
                    io::Error::new(io::ErrorKind::Unsupported, "no source store configured"),
                )
            })?;
            let mut copy = tempfile::Builder::new()
                .prefix("iiif-source-")
                .tempfile_in(scratch_dir)
                .map_err(|e| IiifError::source_unreadable(&source.location, e))?;
            let bytes = store
                .fetch(key, copy.as_file_mut())
                .and_then(|bytes| copy.as_file_mut().flush().map(|_| bytes))
                .map_err(|e| IiifError::source_unreadable(&source.location, e))?;
            debug!("materialized {} ({bytes} bytes) at {}", source.location, copy.path().display());
            Ok(LocalSource::Materialized(copy))
        }
    }
}

fn reader(path: &Path, format: ImageFormat) -> Result<ImageReader<BufReader<File>>, IiifError> {
    let mut reader = ImageReader::open(path)
        .map_err(|e| IiifError::source_unreadable(path.display(), e))?;
    reader.set_format(format);
    Ok(reader)
}

/// Reads the pixel dimensions from the image header without decoding the pixels.
pub fn probe_dimensions(
    source: &SourceDescriptor,
    format: ImageFormat,
    store: Option<&dyn SourceStore>,
    scratch_dir: &Path,
) -> Result<(u32, u32), IiifError> {
    let local = localize(source, store, scratch_dir)?;
    let dimensions = reader(local.path(), format)?
        .into_dimensions()
        .map_err(|e| backend_err!("failed to read the header of {}: {e}", source.location))?;
    debug!("probed {} as {}x{}", source.location, dimensions.0, dimensions.1);
    Ok(dimensions)
}

/// Decodes the whole source. Any temporary copy is gone by the time this returns.
pub fn decode(
    source: &SourceDescriptor,
    format: ImageFormat,
    store: Option<&dyn SourceStore>,
    scratch_dir: &Path,
) -> Result<DynamicImage, IiifError> {
    let local = localize(source, store, scratch_dir)?;
    let image = backend_try!(reader(local.path(), format)?.decode());
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(width, height, Rgb([10, 20, 30]))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();
        path
    }

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn probe_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "a.png", 12, 7);
        let source = SourceDescriptor::new(Location::Path(path), "image/png");
        let dims = probe_dimensions(&source, ImageFormat::Png, None, dir.path()).unwrap();
        assert_eq!(dims, (12, 7));
    }

    #[test]
    fn missing_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let source = SourceDescriptor::new(Location::Path(dir.path().join("nope.png")), "image/png");
        let result = decode(&source, ImageFormat::Png, None, dir.path());
        assert!(matches!(result, Err(IiifError::SourceUnreadable { .. })));
    }

    #[test]
    fn garbage_is_a_backend_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        let source = SourceDescriptor::new(Location::Path(path), "image/png");
        let result = decode(&source, ImageFormat::Png, None, dir.path());
        assert!(matches!(result, Err(IiifError::BackendExecution(_))));
    }

    #[test]
    fn remote_copy_is_removed_after_decode() {
        let store_dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        write_png(store_dir.path(), "remote.png", 5, 6);
        let store = DirectoryStore::new(store_dir.path());

        let source = SourceDescriptor::new(Location::Remote("remote.png".into()), "image/png");
        let image = decode(&source, ImageFormat::Png, Some(&store), scratch.path()).unwrap();
        assert_eq!((image.width(), image.height()), (5, 6));
        assert_eq!(entries(scratch.path()), 0);
    }

    #[test]
    fn remote_copy_is_removed_after_header_read() {
        let store_dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        write_png(store_dir.path(), "remote.png", 9, 4);
        let store = DirectoryStore::new(store_dir.path());

        let source = SourceDescriptor::new(Location::Remote("remote.png".into()), "image/png");
        let dims = probe_dimensions(&source, ImageFormat::Png, Some(&store), scratch.path()).unwrap();
        assert_eq!(dims, (9, 4));
        assert_eq!(entries(scratch.path()), 0);
    }

    #[test]
    fn failed_remote_decode_still_cleans_up() {
        let store_dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        std::fs::write(store_dir.path().join("broken.png"), b"\x89PNG broken").unwrap();
        let store = DirectoryStore::new(store_dir.path());

        let source = SourceDescriptor::new(Location::Remote("broken.png".into()), "image/png");
        assert!(decode(&source, ImageFormat::Png, Some(&store), scratch.path()).is_err());
        assert_eq!(entries(scratch.path()), 0);
    }

    #[test]
    fn remote_without_store_or_object() {
        let store_dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(store_dir.path());

        let source = SourceDescriptor::new(Location::Remote("missing.png".into()), "image/png");
        let result = decode(&source, ImageFormat::Png, None, scratch.path());
        assert!(matches!(result, Err(IiifError::SourceUnreadable { .. })));
        let result = decode(&source, ImageFormat::Png, Some(&store), scratch.path());
        assert!(matches!(result, Err(IiifError::SourceUnreadable { .. })));
        assert_eq!(entries(scratch.path()), 0);

        let escaping = SourceDescriptor::new(Location::Remote("../etc/passwd".into()), "image/png");
        let result = decode(&escaping, ImageFormat::Png, Some(&store), scratch.path());
        assert!(matches!(result, Err(IiifError::SourceUnreadable { .. })));
    }
}
