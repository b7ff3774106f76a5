use std::path::{Path, PathBuf};

use thiserror::Error;

/// Extensions the browser picks up, compared case-insensitively
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("{0} has no parent folder")]
    NoParent(PathBuf),
    #[error("Failed to list folder {1}: {0}")]
    ListError(std::io::Error, PathBuf),
    #[error("No png/jpg/jpeg images in {0}")]
    NoImages(PathBuf),
    #[error("{0} is not an image in its folder listing")]
    NotInListing(PathBuf),
}

/// Folder being browsed and the position within it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    folder: Option<PathBuf>,
    files: Vec<String>,
    index: usize,
}

impl Session {
    /// Start browsing the folder containing `path`, positioned on `path`.
    /// On error the current session is left untouched.
    pub fn open(&mut self, path: &Path) -> Result<PathBuf, SessionError> {
        let folder = match path.parent() {
            Some(parent) if parent.as_os_str().is_empty() => PathBuf::from("."),
            Some(parent) => parent.to_path_buf(),
            None => return Err(SessionError::NoParent(path.to_path_buf())),
        };

        let files = list_images(&folder)?;
        if files.is_empty() {
            return Err(SessionError::NoImages(folder));
        }

        let chosen = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| SessionError::NotInListing(path.to_path_buf()))?;
        let index = files
            .iter()
            .position(|f| f == chosen)
            .ok_or_else(|| SessionError::NotInListing(path.to_path_buf()))?;

        log::info!(
            "Browsing {} ({} images, starting at {})",
            folder.display(),
            files.len(),
            index + 1
        );

        *self = Session {
            folder: Some(folder),
            files,
            index,
        };
        Ok(self.current_path_unchecked())
    }

    pub fn is_browsing(&self) -> bool {
        self.folder.is_some() && self.index < self.files.len()
    }

    pub fn folder(&self) -> Option<&Path> {
        self.folder.as_deref()
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn index(&self) -> Option<usize> {
        self.is_browsing().then_some(self.index)
    }

    pub fn current_name(&self) -> Option<&str> {
        self.index().map(|i| self.files[i].as_str())
    }

    pub fn current(&self) -> Option<PathBuf> {
        self.is_browsing().then(|| self.current_path_unchecked())
    }

    /// Step forward; `None` (and no change) at the last image
    pub fn next(&mut self) -> Option<PathBuf> {
        if !self.is_browsing() || self.index + 1 >= self.files.len() {
            return None;
        }
        self.index += 1;
        self.current()
    }

    /// Step back; `None` (and no change) at the first image
    pub fn previous(&mut self) -> Option<PathBuf> {
        if !self.is_browsing() || self.index == 0 {
            return None;
        }
        self.index -= 1;
        self.current()
    }

    fn current_path_unchecked(&self) -> PathBuf {
        let folder = self.folder.as_deref().unwrap_or(Path::new("."));
        folder.join(&self.files[self.index])
    }
}

pub fn is_image_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Image file names in `folder`, sorted lexicographically
pub fn list_images(folder: &Path) -> Result<Vec<String>, SessionError> {
    let entries =
        std::fs::read_dir(folder).map_err(|e| SessionError::ListError(e, folder.to_path_buf()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| SessionError::ListError(e, folder.to_path_buf()))?;
        if !entry.path().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            log::debug!("Skipping non UTF-8 file name {:?}", entry.file_name());
            continue;
        };
        if is_image_name(&name) {
            files.push(name);
        }
    }
    files.sort();
    Ok(files)
}
