//! The persisted snapshot: one JSON blob holding the full note collection.
//!
//! Format matches the original storage blob: a JSON array of note records,
//! canonically sorted at write time. Reads distinguish "absent" (a fresh
//! install) from "unreadable" so the store can apply its recovery policy.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{NotesError, Result};

use super::model::Note;

fn io_error(path: &Path, source: std::io::Error) -> NotesError {
    NotesError::SnapshotIo {
        path: path.display().to_string(),
        source,
    }
}

/// Read the snapshot. `Ok(None)` means no snapshot exists yet; an `Err`
/// means the blob exists but could not be read or parsed.
pub fn read(path: &Path) -> Result<Option<Vec<Note>>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "No snapshot on disk");
            return Ok(None);
        }
        Err(e) => return Err(io_error(path, e)),
    };

    if raw.trim().is_empty() {
        debug!(path = %path.display(), "Snapshot is empty");
        return Ok(None);
    }

    let notes: Vec<Note> = serde_json::from_str(&raw)?;

    debug!(path = %path.display(), count = notes.len(), "Snapshot loaded");
    Ok(Some(notes))
}

/// Write the snapshot. The blob is written to a sibling temp file first and
/// renamed over the target so a crash mid-write cannot corrupt it.
pub fn write(path: &Path, notes: &[Note]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }

    let json = serde_json::to_string(notes)?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|e| io_error(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| io_error(path, e))?;

    debug!(path = %path.display(), count = notes.len(), "Snapshot written");
    Ok(())
}

/// Move an unreadable snapshot aside so a reset loses nothing on disk.
pub fn quarantine(path: &Path) -> Result<()> {
    let sidecar = path.with_extension("json.corrupt");
    match fs::rename(path, &sidecar) {
        Ok(()) => {
            info!(
                from = %path.display(),
                to = %sidecar.display(),
                "Unreadable snapshot moved aside"
            );
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not quarantine snapshot");
            Err(io_error(path, e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        assert!(read(&path).unwrap().is_none());
    }

    #[test]
    fn test_read_empty_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        fs::write(&path, "").unwrap();
        assert!(read(&path).unwrap().is_none());
    }

    #[test]
    fn test_write_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");

        let notes = vec![Note::untitled(), Note::untitled()];
        write(&path, &notes).unwrap();

        let back = read(&path).unwrap().unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[0].id, notes[0].id);
        assert_eq!(back[1].content, notes[1].content);
    }

    #[test]
    fn test_malformed_blob_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(read(&path), Err(NotesError::SnapshotParse(_))));
    }

    #[test]
    fn test_quarantine_moves_blob_aside() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        fs::write(&path, "{not json").unwrap();

        quarantine(&path).unwrap();
        assert!(!path.exists());
        assert!(dir.path().join("notes.json.corrupt").exists());
    }

    #[test]
    fn test_quarantine_of_missing_blob_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        assert!(quarantine(&path).is_ok());
    }
}
