//! JSON-backed household lists.
//!
//! Each collection lives in one file holding the whole ordered array. Saves
//! replace the file atomically: the new contents go to a temp file in the
//! same directory, which is then renamed over the target.

use std::{
    fs,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};
use tempfile::NamedTempFile;

use crate::{
    error::StoreError,
    model::{GroceryItem, TodoItem},
};

/// A named list persisted by [`ListStore`].
pub trait ListCollection {
    const FILE_NAME: &'static str;

    type Item: Serialize + DeserializeOwned;

    /// Whether `item` is written on save.
    fn keep_on_save(_item: &Self::Item) -> bool {
        true
    }
}

#[derive(Debug)]
pub enum Grocery {}

impl ListCollection for Grocery {
    const FILE_NAME: &'static str = "family_grocery.json";
    type Item = GroceryItem;
}

#[derive(Debug)]
pub enum Todo {}

impl ListCollection for Todo {
    const FILE_NAME: &'static str = "family_todo.json";
    type Item = TodoItem;

    /// Completed todos are purged, never archived.
    fn keep_on_save(item: &TodoItem) -> bool {
        !item.done
    }
}

#[derive(Debug, Clone)]
pub struct ListStore {
    dir: PathBuf,
}

impl ListStore {
    /// Open the store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io { path: dir.clone(), source })?;
        Ok(Self { dir })
    }

    /// Handle on `dir` without touching the filesystem. A missing or
    /// unusable directory surfaces on the first load or save.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path<C: ListCollection>(&self) -> PathBuf {
        self.dir.join(C::FILE_NAME)
    }

    /// Create both list files with empty collections if they are missing.
    pub fn ensure_files(&self) -> Result<(), StoreError> {
        self.load::<Grocery>()?;
        self.load::<Todo>()?;
        Ok(())
    }

    /// Read the whole collection.
    ///
    /// A missing file is created empty. A file that is not a valid collection
    /// is reported as [`StoreError::Corrupt`] and left as is.
    pub fn load<C: ListCollection>(&self) -> Result<Vec<C::Item>, StoreError> {
        let path = self.path::<C>();

        match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| {
                tracing::warn!(path = %path.display(), error = %source, "list file is corrupt");
                StoreError::Corrupt { path, source }
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "creating empty list file");
                self.save::<C>(&[])?;
                Ok(Vec::new())
            }
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    /// Replace the whole collection on disk with `items`, minus anything
    /// [`ListCollection::keep_on_save`] rejects.
    pub fn save<C: ListCollection>(&self, items: &[C::Item]) -> Result<(), StoreError> {
        let kept: Vec<&C::Item> = items.iter().filter(|item| C::keep_on_save(item)).collect();
        let path = self.path::<C>();

        tracing::debug!(path = %path.display(), count = kept.len(), "saving list");
        write_atomic(&path, |out| serde_json::to_writer_pretty(out, &kept).map_err(io::Error::from))
    }
}

/// Write a file via temp-file-and-rename so readers only ever see a complete
/// old or complete new document. If `write` fails the target is untouched.
fn write_atomic<F>(path: &Path, write: F) -> Result<(), StoreError>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let io_err = |source| StoreError::Io { path: path.to_path_buf(), source };
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    {
        let mut out = BufWriter::new(tmp.as_file_mut());
        write(&mut out).map_err(io_err)?;
        out.write_all(b"\n").map_err(io_err)?;
        out.flush().map_err(io_err)?;
    }
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}
