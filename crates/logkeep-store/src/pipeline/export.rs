//! Concatenate a category's files into one shareable file

use super::Pipeline;
use crate::naming::list_files;
use logkeep_core::{Error, Result};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

impl Pipeline {
    /// Write every file under `dir`, oldest-first by last-modified time, into
    /// `output` (truncated first). Returns the number of files copied.
    pub fn export(&self, dir: &Path, output: &Path) -> Result<usize> {
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent).map_err(|source| Error::CreateDirFailed {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let write_failed = |source| Error::WriteFailed {
            path: output.to_path_buf(),
            source,
        };
        let mut writer = BufWriter::new(File::create(output).map_err(write_failed)?);

        let mut copied = 0;
        for file in list_files(dir, None, true) {
            let appended = self.locks.with_lock(&file.path, || match File::open(&file.path) {
                Ok(mut source) => io::copy(&mut source, &mut writer).map(|_| true),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
                Err(e) => Err(e),
            })?;
            if appended {
                copied += 1;
            } else {
                debug!("[EXPORT] {} vanished before export", file.path.display());
            }
        }
        writer.flush().map_err(write_failed)?;

        info!("[EXPORT] Exported {} file(s) to {}", copied, output.display());
        Ok(copied)
    }
}
