//! Building whole archives: import of a directory tree and rebuild.

use std::io;
use std::path::Path;

use log::debug;
use walkdir::WalkDir;

use crate::name::{self, SEPARATOR};
use crate::progress::ProgressReporter;
use crate::read::Archive;
use crate::{ArchiveOptions, Error, Result};

impl Archive {
    /// Creates an archive holding every regular file under `source_dir`.
    ///
    /// Entry names are the paths relative to `source_dir`, or relative to
    /// its parent when `use_dir_name` is set so that the directory's own
    /// name becomes the first component. Files are enumerated in sorted
    /// order and written in one commit; `progress` follows that commit.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::SizeLimitExceeded`] before anything is written
    /// if a file is at or above the per-item limit, and with
    /// [`Error::InvalidName`] if a path cannot be stored.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use pck::progress::NoProgress;
    /// use pck::{Archive, ArchiveOptions};
    ///
    /// let archive = Archive::create_from_directory(
    ///     "models.pck",
    ///     "./models",
    ///     true,
    ///     false,
    ///     &ArchiveOptions::default(),
    ///     &mut NoProgress,
    /// )?;
    /// println!("{} files", archive.len());
    /// # Ok::<(), pck::Error>(())
    /// ```
    pub fn create_from_directory(
        path: impl AsRef<Path>,
        source_dir: impl AsRef<Path>,
        use_dir_name: bool,
        overwrite: bool,
        options: &ArchiveOptions,
        progress: &mut dyn ProgressReporter,
    ) -> Result<Archive> {
        let source_dir = source_dir.as_ref();
        let prefix = if use_dir_name {
            source_dir
                .canonicalize()?
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
        } else {
            None
        };

        let mut files = Vec::new();
        for entry in WalkDir::new(source_dir)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(source_dir)
                .unwrap_or(entry.path());
            let mut entry_name = match &prefix {
                Some(prefix) => prefix.clone(),
                None => String::new(),
            };
            for component in relative.components() {
                let part = component.as_os_str().to_str().ok_or_else(|| {
                    Error::invalid_name(
                        relative.to_string_lossy(),
                        "path is not valid Unicode",
                    )
                })?;
                if !entry_name.is_empty() {
                    entry_name.push(SEPARATOR);
                }
                entry_name.push_str(part);
            }
            files.push((entry.into_path(), entry_name));
        }

        let mut archive = Archive::create_with_options(path, overwrite, options)?;
        archive.begin_transaction()?;
        for (file, entry_name) in &files {
            if let Err(e) = archive.add_file(file, entry_name) {
                archive.cancel_transaction();
                return Err(e);
            }
        }
        let _ = archive.commit_transaction(progress)?;

        debug!(
            "Imported {} files from {} into {}",
            files.len(),
            source_dir.display(),
            archive.path().display()
        );
        Ok(archive)
    }

    /// Copies the entries of `path` into a fresh archive at `new_path`.
    ///
    /// Entries whose names differ only in case or separator style are
    /// collapsed to one; the survivor is the first in index order, though
    /// callers should not rely on which one is kept. Payloads are copied in
    /// their stored form, and the result has no redundancy.
    pub fn rebuild(
        path: impl AsRef<Path>,
        new_path: impl AsRef<Path>,
        overwrite: bool,
        progress: &mut dyn ProgressReporter,
    ) -> Result<Archive> {
        let source = Archive::open(path)?;
        let mut handles = source.handles();
        handles.sort_by(|a, b| name::compare_names(a.name(), b.name()));
        handles.dedup_by(|b, a| name::names_equal(a.name(), b.name()));

        let options = source.options().clone().read_only(false);
        let mut target = Archive::create_with_options(new_path, overwrite, &options)?;
        target.begin_transaction()?;
        for handle in &handles {
            target.add_entry(handle)?;
        }
        let _ = target.commit_transaction(progress)?;

        debug!(
            "Rebuilt {} into {}: {} entries kept of {}",
            source.path().display(),
            target.path().display(),
            target.len(),
            source.len()
        );
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_create_from_directory_names() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("data");
        fs::create_dir_all(src.join("sub/deeper")).unwrap();
        fs::write(src.join("top.txt"), b"top").unwrap();
        fs::write(src.join("sub/mid.txt"), b"mid").unwrap();
        fs::write(src.join("sub/deeper/low.txt"), b"low").unwrap();

        let plain = Archive::create_from_directory(
            dir.path().join("plain.pck"),
            &src,
            false,
            false,
            &ArchiveOptions::default(),
            &mut NoProgress,
        )
        .unwrap();
        let names: Vec<_> = plain.entries().iter().map(|e| e.name().to_string()).collect();
        assert_eq!(names, vec!["sub\\deeper\\low.txt", "sub\\mid.txt", "top.txt"]);

        let prefixed = Archive::create_from_directory(
            dir.path().join("prefixed.pck"),
            &src,
            true,
            false,
            &ArchiveOptions::default(),
            &mut NoProgress,
        )
        .unwrap();
        assert!(prefixed.contains("data\\top.txt"));
        assert_eq!(prefixed.read_by_name("data/sub/mid.txt").unwrap(), b"mid");
    }

    #[test]
    fn test_rebuild_dedups_by_case() {
        let dir = TempDir::new().unwrap();
        let src_path = dir.path().join("src.pck");
        let mut src = Archive::create(&src_path, false).unwrap();
        src.begin_transaction().unwrap();
        src.add_bytes("keep.txt", b"keep".to_vec()).unwrap();
        src.add_bytes("dup.txt", b"first".to_vec()).unwrap();
        let _ = src.commit_transaction(&mut NoProgress).unwrap();
        // Mutators never create case duplicates, so forge one in the entry list.
        src.add_bytes("other.txt", b"second".to_vec()).unwrap();
        src.entries[2].name = crate::name::EntryName::new("DUP.TXT").unwrap();
        src.begin_transaction().unwrap();
        let _ = src.commit_transaction(&mut NoProgress).unwrap();
        drop(src);

        let rebuilt =
            Archive::rebuild(&src_path, dir.path().join("new.pck"), false, &mut NoProgress)
                .unwrap();
        assert_eq!(rebuilt.len(), 2);
        assert_eq!(rebuilt.read_by_name("dup.txt").unwrap(), b"first");
        assert_eq!(rebuilt.stats().redundancy, 0);
    }
}
