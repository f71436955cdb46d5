//! The host's code-writing layer.
//!
//! The generator only ever asks for new files; an existing file is an error,
//! never overwritten.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from creating a generated source file.
#[derive(Debug, Error)]
pub enum FilerError {
    #[error("source file for {0} already exists")]
    AlreadyExists(String),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Creates generated source files.
pub trait Filer {
    /// Create the source file for the top-level type `qualified_name`.
    fn create_source_file(&mut self, qualified_name: &str, contents: &str)
    -> Result<(), FilerError>;
}

/// Path of the source file for a top-level type, relative to a source root.
pub fn source_path(qualified_name: &str) -> PathBuf {
    let mut path = PathBuf::new();
    let mut segments = qualified_name.split('.').peekable();
    while let Some(segment) = segments.next() {
        if segments.peek().is_some() {
            path.push(segment);
        } else {
            path.push(format!("{segment}.java"));
        }
    }
    path
}

/// Keeps generated files in memory, keyed by qualified name.
#[derive(Debug, Default)]
pub struct MemoryFiler {
    files: BTreeMap<String, String>,
}

impl MemoryFiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, qualified_name: &str) -> Option<&str> {
        self.files.get(qualified_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Filer for MemoryFiler {
    fn create_source_file(
        &mut self,
        qualified_name: &str,
        contents: &str,
    ) -> Result<(), FilerError> {
        if self.files.contains_key(qualified_name) {
            return Err(FilerError::AlreadyExists(qualified_name.to_string()));
        }
        self.files
            .insert(qualified_name.to_string(), contents.to_string());
        Ok(())
    }
}

/// Writes generated files below a source root directory.
#[derive(Debug, Clone)]
pub struct DirectoryFiler {
    root: PathBuf,
}

impl DirectoryFiler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Filer for DirectoryFiler {
    fn create_source_file(
        &mut self,
        qualified_name: &str,
        contents: &str,
    ) -> Result<(), FilerError> {
        let path = self.root.join(source_path(qualified_name));
        let io_error = |source| FilerError::Io {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(FilerError::AlreadyExists(qualified_name.to_string()));
            }
            Err(e) => return Err(io_error(e)),
        };
        file.write_all(contents.as_bytes()).map_err(io_error)?;

        tracing::debug!(path = %path.display(), "wrote generated source");
        Ok(())
    }
}

#[cfg(test)]
#[path = "filer/filer_tests.rs"]
mod filer_tests;
