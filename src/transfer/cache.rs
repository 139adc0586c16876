use crate::error::{io_err, Result, SyncError};
use crate::source::SourceRepository;
use log::debug;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Suffix of a download still in progress.
const PARTIAL_SUFFIX: &str = ".part";

/// Directory of downloaded revisions, addressed by synthetic filename.
///
/// The cache is a pass-through optimisation, never a record of what has been
/// archived: presence only means the bytes were downloaded before. Downloads
/// land in a `.part` file that is renamed once complete, so an interrupted
/// download is never mistaken for a cached file.
#[derive(Debug, Clone)]
pub struct LocalCache {
    dir: PathBuf,
}

impl LocalCache {
    /// Opens the cache at `dir`, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| io_err(&dir, e))?;
        Ok(LocalCache { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a synthetic filename is cached under.
    ///
    /// Names that could escape the cache directory are rejected with
    /// [`SyncError::InvalidName`].
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\')
            || name.contains('\0')
        {
            return Err(SyncError::InvalidName(name.to_string()));
        }
        Ok(self.dir.join(name))
    }

    /// Returns `true` if a complete download of `name` is cached.
    pub async fn contains(&self, name: &str) -> Result<bool> {
        let path = self.path_for(name)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_err(path, e)),
        }
    }

    /// Downloads `location` from `source` into the cache under `name`.
    ///
    /// # Returns
    ///
    /// * `Ok(u64)` - Bytes written.
    /// * `Err(SyncError)` - The download or a cache write failed; no file is
    ///   left behind under `name`.
    pub async fn store(
        &self,
        name: &str,
        source: &dyn SourceRepository,
        location: &str,
    ) -> Result<u64> {
        let final_path = self.path_for(name)?;
        let partial_path = self.dir.join(format!("{}{}", name, PARTIAL_SUFFIX));

        let mut file = tokio::fs::File::create(&partial_path)
            .await
            .map_err(|e| io_err(&partial_path, e))?;
        let written = match source.fetch_into(location, &mut file).await {
            Ok(n) => n,
            Err(e) => {
                drop(file);
                let _ = tokio::fs::remove_file(&partial_path).await;
                return Err(e);
            }
        };
        drop(file);

        if let Err(e) = tokio::fs::rename(&partial_path, &final_path).await {
            let _ = tokio::fs::remove_file(&partial_path).await;
            return Err(io_err(&final_path, e));
        }
        debug!("Cached {} ({} bytes)", final_path.display(), written);
        Ok(written)
    }
}
