// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Secure delete — overwrite a file with zeros, flush, then unlink.
//
// LIMITATION: this is not cryptographic erasure. Journaling and
// copy-on-write file systems, snapshots, backups and SSD wear levelling can
// all keep earlier copies of the bytes that this routine never touches.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use tracing::{debug, instrument, warn};

/// Zeros are written in blocks of this size so large files never need a
/// buffer of their own length.
const CHUNK_LEN: usize = 64 * 1024;

/// Overwrite `path` with zeros and remove it. Never fails.
///
/// * Missing path → nothing happens.
/// * Overwrite fault → falls back to a plain removal.
/// * Removal fault → logged at `warn`, swallowed.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn secure_delete(path: impl AsRef<Path>) {
    let path = path.as_ref();

    if !path.is_file() {
        debug!("nothing to shred");
        return;
    }

    match overwrite_with_zeros(path) {
        Ok(len) => debug!(bytes = len, "file overwritten"),
        Err(err) => warn!(%err, "overwrite failed, falling back to plain removal"),
    }

    if let Err(err) = std::fs::remove_file(path) {
        warn!(%err, "could not remove file");
    } else {
        debug!("file removed");
    }
}

/// Replace every byte of the file with zero without changing its length.
fn overwrite_with_zeros(path: &Path) -> io::Result<u64> {
    let mut file = OpenOptions::new().write(true).open(path)?;
    let len = file.metadata()?.len();

    let zeros = [0u8; CHUNK_LEN];
    let mut remaining = len;
    while remaining > 0 {
        let step = remaining.min(CHUNK_LEN as u64) as usize;
        file.write_all(&zeros[..step])?;
        remaining -= step as u64;
    }

    file.flush()?;
    file.sync_all()?;
    Ok(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secret.pdf");
        std::fs::write(&path, b"%PDF-1.4 confidential").unwrap();

        secure_delete(&path);

        assert!(!path.exists());
    }

    #[test]
    fn missing_file_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never-existed.pdf");

        secure_delete(&path);
        secure_delete(&path);

        assert!(!path.exists());
    }

    #[test]
    fn overwrite_keeps_length_and_zeroes_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        let original: Vec<u8> = (0..(CHUNK_LEN * 2 + 17)).map(|i| (i % 251) as u8 + 1).collect();
        std::fs::write(&path, &original).unwrap();

        let len = overwrite_with_zeros(&path).unwrap();

        let after = std::fs::read(&path).unwrap();
        assert_eq!(len as usize, original.len());
        assert_eq!(after.len(), original.len());
        assert!(after.iter().all(|b| *b == 0));
    }

    #[test]
    fn directories_are_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        secure_delete(dir.path());
        assert!(dir.path().exists());
    }

    #[cfg(unix)]
    #[test]
    fn read_only_file_still_removed() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locked.pdf");
        std::fs::write(&path, b"locked").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o444)).unwrap();

        // Opening for write fails for non-root users; removal only needs
        // write access to the directory.
        secure_delete(&path);

        assert!(!path.exists());
    }
}
