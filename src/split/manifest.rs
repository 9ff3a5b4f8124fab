//! Plain-text manifest files: one image identifier per line.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::Split;
use crate::error::CirclegenError;
use crate::ir::ImageName;

pub const TRAINVAL_FILE_NAME: &str = "trainval.txt";
pub const TRAIN_FILE_NAME: &str = "training.txt";
pub const VAL_FILE_NAME: &str = "validation.txt";

/// The full identifier list plus its training/validation partition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DatasetManifest {
    pub all: Vec<ImageName>,
    pub split: Split,
}

impl DatasetManifest {
    pub fn new(all: Vec<ImageName>, split: Split) -> Self {
        Self { all, split }
    }

    /// Write `trainval.txt`, `training.txt` and `validation.txt` into `dir`.
    pub fn write(&self, dir: &Path) -> Result<(), CirclegenError> {
        fs::create_dir_all(dir).map_err(CirclegenError::Io)?;
        write_manifest(&dir.join(TRAINVAL_FILE_NAME), &self.all)?;
        write_manifest(&dir.join(TRAIN_FILE_NAME), &self.split.train)?;
        write_manifest(&dir.join(VAL_FILE_NAME), &self.split.val)?;
        Ok(())
    }

    /// Read the three manifest files back from `dir`.
    pub fn read(dir: &Path) -> Result<Self, CirclegenError> {
        Ok(Self {
            all: read_manifest(&dir.join(TRAINVAL_FILE_NAME))?,
            split: Split {
                train: read_manifest(&dir.join(TRAIN_FILE_NAME))?,
                val: read_manifest(&dir.join(VAL_FILE_NAME))?,
            },
        })
    }
}

/// Write one identifier per line, newline-terminated.
pub fn write_manifest(path: &Path, ids: &[ImageName]) -> Result<(), CirclegenError> {
    let mut out = String::with_capacity(ids.len() * 12);
    for id in ids {
        out.push_str(id.as_str());
        out.push('\n');
    }
    fs::write(path, out).map_err(CirclegenError::Io)
}

/// Read identifiers from `path`, ignoring blank lines and surrounding whitespace.
///
/// An identifier listed twice is an error.
pub fn read_manifest(path: &Path) -> Result<Vec<ImageName>, CirclegenError> {
    let text = fs::read_to_string(path).map_err(CirclegenError::Io)?;

    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let id = line.trim();
        if id.is_empty() {
            continue;
        }
        if !seen.insert(id) {
            return Err(CirclegenError::ManifestParse {
                path: path.to_path_buf(),
                message: format!("line {}: duplicate identifier '{id}'", line_no + 1),
            });
        }
        ids.push(ImageName::new(id));
    }
    Ok(ids)
}

/// Image files directly inside `dir` with the given extension, by file name.
pub fn list_images(dir: &Path, extension: &str) -> Result<Vec<ImageName>, CirclegenError> {
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| {
            CirclegenError::Io(source.into_io_error().unwrap_or_else(|| {
                std::io::Error::other(format!("failed to list {}", dir.display()))
            }))
        })?;
        if entry.file_type().is_file() && has_extension(entry.path(), extension) {
            files.push(entry.into_path());
        }
    }

    let mut names: Vec<ImageName> = files
        .iter()
        .filter_map(|path| path.file_name())
        .map(|name| ImageName::new(name.to_string_lossy()))
        .collect();
    names.sort();
    Ok(names)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_roundtrip_through_directory() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let manifest = DatasetManifest::new(
            vec![ImageName::for_index(0), ImageName::for_index(1), ImageName::for_index(2)],
            Split {
                train: vec![ImageName::for_index(0), ImageName::for_index(2)],
                val: vec![ImageName::for_index(1)],
            },
        );
        manifest.write(temp.path()).expect("write manifests");

        let train_text = fs::read_to_string(temp.path().join(TRAIN_FILE_NAME)).expect("read");
        assert_eq!(train_text, "log_000.png\nlog_002.png\n");
        assert_eq!(DatasetManifest::read(temp.path()).expect("read back"), manifest);
    }

    #[test]
    fn read_manifest_skips_blank_lines() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("list.txt");
        fs::write(&path, "a.png\n\n  b.png  \r\n").expect("write");
        let ids = read_manifest(&path).expect("read");
        assert_eq!(ids, vec![ImageName::new("a.png"), ImageName::new("b.png")]);
    }

    #[test]
    fn read_manifest_rejects_duplicates() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("list.txt");
        fs::write(&path, "a.png\nb.png\na.png\n").expect("write");
        let err = read_manifest(&path).unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn list_images_is_flat_and_filtered() {
        let temp = tempfile::tempdir().expect("create temp dir");
        fs::write(temp.path().join("b.png"), b"").expect("write");
        fs::write(temp.path().join("a.PNG"), b"").expect("write");
        fs::write(temp.path().join("notes.txt"), b"").expect("write");
        fs::create_dir_all(temp.path().join("nested")).expect("mkdir");
        fs::write(temp.path().join("nested/c.png"), b"").expect("write");

        let names = list_images(temp.path(), "png").expect("list");
        assert_eq!(names, vec![ImageName::new("a.PNG"), ImageName::new("b.png")]);
    }
}
