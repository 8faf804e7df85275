//! File system document store.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use super::error::DocumentError;
use super::traits::DocumentStore;
use super::types::{DocumentBody, DocumentHandle};

/// Upper bound on ` (n)` suffixes tried for a taken name.
const MAX_NAME_SUFFIX: u32 = 1000;

/// Document store rooted at a directory.
///
/// Template identifiers name UTF-8 text files and folder identifiers name
/// directories, both relative to the root. Duplicates keep the template's
/// extension and get a fresh UUID as their id.
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    /// Creates a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves an identifier to a path under the root, refusing anything
    /// that would escape it.
    fn resolve(&self, id: &str) -> Result<PathBuf, DocumentError> {
        let relative = Path::new(id);
        let is_contained = !id.trim().is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !is_contained {
            return Err(DocumentError::InvalidIdentifier { id: id.to_string() });
        }
        Ok(self.root.join(relative))
    }

    fn template_path(&self, template_id: &str) -> Result<PathBuf, DocumentError> {
        let path = self.resolve(template_id)?;
        if !path.is_file() {
            return Err(DocumentError::TemplateNotFound {
                template_id: template_id.to_string(),
            });
        }
        Ok(path)
    }

    fn folder_path(&self, folder_id: &str) -> Result<PathBuf, DocumentError> {
        let path = self.resolve(folder_id)?;
        if !path.is_dir() {
            return Err(DocumentError::FolderNotFound {
                folder_id: folder_id.to_string(),
            });
        }
        Ok(path)
    }

    /// Makes a display name safe to use as a file stem.
    fn sanitize_name(name: &str) -> String {
        let cleaned: String = name
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '\0' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect();
        let cleaned = cleaned.trim().trim_start_matches('.').to_string();
        if cleaned.is_empty() {
            "untitled".to_string()
        } else {
            cleaned
        }
    }

    /// Creates a new file in `folder`, adding ` (n)` when the name is taken.
    fn create_unique(
        folder: &Path,
        stem: &str,
        extension: Option<&str>,
        contents: &[u8],
    ) -> Result<PathBuf, DocumentError> {
        for attempt in 1..=MAX_NAME_SUFFIX {
            let stem = if attempt == 1 {
                stem.to_string()
            } else {
                format!("{} ({})", stem, attempt)
            };
            let file_name = match extension {
                Some(ext) => format!("{}.{}", stem, ext),
                None => stem,
            };
            let path = folder.join(file_name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(contents)
                        .and_then(|_| file.sync_all())
                        .map_err(|e| DocumentError::CreateFailed {
                            path: path.clone(),
                            source: e,
                        })?;
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(DocumentError::CreateFailed { path, source: e }),
            }
        }

        Err(DocumentError::CreateFailed {
            path: folder.join(stem),
            source: std::io::Error::new(ErrorKind::AlreadyExists, "no free document name"),
        })
    }
}

impl DocumentStore for FsDocumentStore {
    fn name(&self) -> &str {
        "filesystem"
    }

    fn duplicate(
        &self,
        template_id: &str,
        folder_id: &str,
        name: &str,
    ) -> Result<DocumentHandle, DocumentError> {
        let template = self.template_path(template_id)?;
        let folder = self.folder_path(folder_id)?;

        let contents = fs::read(&template)?;
        let extension = template.extension().and_then(|e| e.to_str());
        let path = Self::create_unique(&folder, &Self::sanitize_name(name), extension, &contents)?;

        debug!("Duplicated template {} to {}", template.display(), path.display());

        Ok(DocumentHandle {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            location: path.to_string_lossy().into_owned(),
        })
    }

    fn open_body(&self, handle: &DocumentHandle) -> Result<DocumentBody, DocumentError> {
        let path = PathBuf::from(&handle.location);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(DocumentBody::new(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(DocumentError::DocumentNotFound {
                location: handle.location.clone(),
            }),
            Err(e) if e.kind() == ErrorKind::InvalidData => Err(DocumentError::NotText { path }),
            Err(e) => Err(DocumentError::Io(e)),
        }
    }

    fn save_and_close(
        &self,
        handle: &DocumentHandle,
        body: DocumentBody,
    ) -> Result<(), DocumentError> {
        let path = PathBuf::from(&handle.location);
        if !path.is_file() {
            return Err(DocumentError::DocumentNotFound {
                location: handle.location.clone(),
            });
        }

        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        fs::write(&tmp_path, body.into_text()).map_err(|e| DocumentError::SaveFailed {
            path: path.clone(),
            source: e,
        })?;
        fs::rename(&tmp_path, &path).map_err(|e| DocumentError::SaveFailed { path, source: e })
    }

    fn discard(&self, handle: &DocumentHandle) -> Result<(), DocumentError> {
        match fs::remove_file(&handle.location) {
            Ok(()) => {
                debug!("Removed document {}", handle.location);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DocumentError::Io(e)),
        }
    }

    fn validate(&self, template_id: &str, folder_id: &str) -> Result<(), DocumentError> {
        self.template_path(template_id)?;
        self.folder_path(folder_id)?;
        Ok(())
    }
}
