//! Whole-file writes that are never visible half-written

use std::path::{Path, PathBuf};

use crate::error::{PersistenceError, Result};

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `contents` to a sibling temp file, flush it, then rename over `path`
///
/// Readers see either the previous file or the complete new one. The temp
/// file is removed if any step fails.
pub(crate) async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp = temp_path_for(path);

    let result: std::io::Result<()> = async {
        let mut file = tokio::fs::File::create(&tmp).await?;
        tokio::io::AsyncWriteExt::write_all(&mut file, contents).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, path).await
    }
    .await;

    if let Err(e) = result {
        // best effort: the temp file may not exist if create failed
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(PersistenceError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Serialize `value` as pretty JSON and write it atomically
pub(crate) async fn write_json_atomic<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    write_atomic(path, &bytes).await
}
