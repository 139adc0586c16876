use crate::error::{io_err, Result};
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Computes a SHA-256 digest of an in-memory buffer.
///
/// # Arguments
///
/// * `raw_content` - The raw bytes to hash.
///
/// # Returns
///
/// A hexadecimal string representation of the SHA-256 digest.
pub fn compute_digest(raw_content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_content);
    hex::encode(hasher.finalize())
}

/// Computes the size and SHA-256 digest of a file on disk.
///
/// The file is read in fixed-size chunks so large data files are never held
/// in memory. The digest is only logged next to each upload; novelty is
/// decided by name alone.
///
/// # Arguments
///
/// * `path` - Path of the file to hash.
///
/// # Returns
///
/// * `Ok((u64, String))` - The byte length and hex digest.
/// * `Err(SyncError::Io)` - The file could not be opened or read.
pub async fn digest_file(path: &Path) -> Result<(u64, String)> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| io_err(path, e))?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];
    let mut total = 0u64;
    loop {
        let n = file.read(&mut buf).await.map_err(|e| io_err(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        total += n as u64;
    }
    Ok((total, hex::encode(hasher.finalize())))
}
