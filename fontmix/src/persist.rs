//! Writing font binaries to disk
//!
//! Writes that fail with a transient error are retried a few times. If the
//! requested path still can't be written, the font goes to a sibling path
//! with a timestamp appended to the file stem.

use std::{
    fs, io,
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use crate::error::PersistError;

/// Somewhere font bytes can be written.
pub trait FontStorage {
    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

/// Writes to the local filesystem, creating parent directories as needed.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileStorage;

impl FontStorage for FileStorage {
    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bytes)
    }
}

/// How hard to try before falling back to an alternate path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaveOptions {
    pub attempts: usize,
    pub retry_delay: Duration,
}

impl Default for SaveOptions {
    fn default() -> Self {
        SaveOptions {
            attempts: 3,
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// Where a font ended up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedFont {
    pub path: PathBuf,
    /// `true` if the requested path could not be written.
    pub used_alternate: bool,
}

/// `true` for errors that may go away if the write is retried, such as a
/// file held open by another process.
pub fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::PermissionDenied
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::ResourceBusy
            | io::ErrorKind::Interrupted
    )
}

/// `dir/name.ttf` becomes `dir/name_{timestamp}.ttf`.
pub fn alternate_path(path: &Path, timestamp: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "font".to_string());
    let name = match path.extension() {
        Some(ext) => format!("{stem}_{timestamp}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{timestamp}"),
    };
    path.with_file_name(name)
}

/// Write `bytes` to `path`, falling back to [`alternate_path`].
pub fn save_font(
    storage: &impl FontStorage,
    path: &Path,
    bytes: &[u8],
    options: &SaveOptions,
    timestamp: &str,
) -> Result<SavedFont, PersistError> {
    let attempts = options.attempts.max(1);
    for attempt in 1..=attempts {
        match storage.write(path, bytes) {
            Ok(()) => {
                return Ok(SavedFont {
                    path: path.to_owned(),
                    used_alternate: false,
                })
            }
            Err(err) if is_transient(&err) && attempt < attempts => {
                log::warn!(
                    "writing {} failed ({err}), attempt {attempt} of {attempts}",
                    path.display()
                );
                thread::sleep(options.retry_delay);
            }
            Err(err) => {
                log::warn!("giving up on {}: {err}", path.display());
                break;
            }
        }
    }

    let alternate = alternate_path(path, timestamp);
    match storage.write(&alternate, bytes) {
        Ok(()) => {
            log::warn!("saved to {} instead", alternate.display());
            Ok(SavedFont {
                path: alternate,
                used_alternate: true,
            })
        }
        Err(inner) => Err(PersistError {
            requested: path.to_owned(),
            alternate,
            inner,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    /// Fails the first `failures` writes to any path, then succeeds.
    struct FlakyStorage {
        failures: usize,
        kind: io::ErrorKind,
        writes: RefCell<Vec<PathBuf>>,
    }

    impl FlakyStorage {
        fn new(failures: usize, kind: io::ErrorKind) -> Self {
            FlakyStorage {
                failures,
                kind,
                writes: RefCell::new(Vec::new()),
            }
        }
    }

    impl FontStorage for FlakyStorage {
        fn write(&self, path: &Path, _bytes: &[u8]) -> io::Result<()> {
            let mut writes = self.writes.borrow_mut();
            writes.push(path.to_owned());
            if writes.len() <= self.failures {
                Err(io::Error::new(self.kind, "locked"))
            } else {
                Ok(())
            }
        }
    }

    fn quick() -> SaveOptions {
        SaveOptions {
            attempts: 3,
            retry_delay: Duration::ZERO,
        }
    }

    #[test]
    fn retries_keep_requested_path() {
        let storage = FlakyStorage::new(2, io::ErrorKind::PermissionDenied);
        let path = Path::new("out/Mixed.ttf");
        let saved = save_font(&storage, path, b"font", &quick(), "123").unwrap();
        assert_eq!(
            saved,
            SavedFont {
                path: path.to_owned(),
                used_alternate: false
            }
        );
        assert_eq!(storage.writes.borrow().len(), 3);
    }

    #[test]
    fn exhausted_retries_use_alternate() {
        let _ = env_logger::builder().is_test(true).try_init();
        let storage = FlakyStorage::new(3, io::ErrorKind::PermissionDenied);
        let saved = save_font(
            &storage,
            Path::new("out/Mixed.ttf"),
            b"font",
            &quick(),
            "123",
        )
        .unwrap();
        assert_eq!(saved.path, PathBuf::from("out/Mixed_123.ttf"));
        assert!(saved.used_alternate);
    }

    #[test]
    fn permanent_errors_skip_retries() {
        let storage = FlakyStorage::new(1, io::ErrorKind::NotFound);
        let saved = save_font(&storage, Path::new("a.ttf"), b"", &quick(), "9").unwrap();
        assert_eq!(saved.path, PathBuf::from("a_9.ttf"));
        assert_eq!(
            *storage.writes.borrow(),
            vec![PathBuf::from("a.ttf"), PathBuf::from("a_9.ttf")]
        );
    }

    #[test]
    fn both_paths_failing_is_an_error() {
        let storage = FlakyStorage::new(10, io::ErrorKind::PermissionDenied);
        let err = save_font(&storage, Path::new("a.ttf"), b"", &quick(), "9").unwrap_err();
        assert_eq!(err.requested, PathBuf::from("a.ttf"));
        assert_eq!(err.alternate, PathBuf::from("a_9.ttf"));
        assert_eq!(err.inner.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn alternate_without_extension() {
        assert_eq!(
            alternate_path(Path::new("dir/font"), "42"),
            PathBuf::from("dir/font_42")
        );
    }

    #[test]
    fn file_storage_creates_directories() {
        let dir = std::env::temp_dir().join(format!("fontmix-persist-{}", std::process::id()));
        let path = dir.join("nested").join("Mixed.ttf");
        FileStorage.write(&path, b"abc").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"abc");
        let _ = fs::remove_dir_all(&dir);
    }
}
