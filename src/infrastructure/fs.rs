//! Filesystem host: directory trees walked lazily
//!
//! Directories expand into their entries, sorted by name. A directory holding
//! one of the configured stop markers still lists its entries, but those
//! entries are pinned to the directory's own level and never expand.

use std::cell::Cell;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, instrument, trace, warn};

use crate::domain::{Definition, ItemKey, NodeScope, Registry, TypeInfo, Walkable, WalkerKind};
use crate::infrastructure::error::{InfraError, InfraResult};

pub static FS_ENTRY: TypeInfo = TypeInfo::new("fs::Entry").with_capabilities(&["fs::Named"]);
pub static FS_DIRECTORY: TypeInfo = TypeInfo::new("fs::Directory")
    .with_capabilities(&["fs::Container"])
    .with_parent(&FS_ENTRY);
pub static FS_FILE: TypeInfo = TypeInfo::new("fs::File").with_parent(&FS_ENTRY);
pub static FS_OTHER: TypeInfo = TypeInfo::new("fs::Other").with_parent(&FS_ENTRY);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Directory,
    File,
    Other,
}

/// One filesystem entry. Symlinks are followed, so a link to a directory is
/// a directory sharing the target's identity.
#[derive(Debug, Clone, Serialize)]
pub struct FsEntry {
    pub path: PathBuf,
    pub name: String,
    pub kind: EntryKind,
    pub size: u64,
    #[serde(skip)]
    key: ItemKey,
}

impl FsEntry {
    #[instrument(level = "trace")]
    pub fn from_path(path: &Path) -> InfraResult<Self> {
        let metadata = fs::metadata(path)
            .map_err(|e| InfraError::io(format!("Failed to stat {}", path.display()), e))?;

        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else if metadata.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            path: path.to_path_buf(),
            name,
            kind,
            size: metadata.len(),
            key: identity(path, &metadata),
        })
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_hidden(&self) -> bool {
        is_hidden_name(&self.name)
    }
}

impl fmt::Display for FsEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dir() {
            write!(f, "{}/", self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

impl Walkable for FsEntry {
    fn type_info(&self) -> &'static TypeInfo {
        match self.kind {
            EntryKind::Directory => &FS_DIRECTORY,
            EntryKind::File => &FS_FILE,
            EntryKind::Other => &FS_OTHER,
        }
    }

    fn item_key(&self) -> ItemKey {
        self.key
    }
}

#[cfg(unix)]
fn identity(_path: &Path, metadata: &fs::Metadata) -> ItemKey {
    use std::os::unix::fs::MetadataExt;

    let mut hasher = DefaultHasher::new();
    (metadata.dev(), metadata.ino()).hash(&mut hasher);
    ItemKey(hasher.finish())
}

#[cfg(not(unix))]
fn identity(path: &Path, _metadata: &fs::Metadata) -> ItemKey {
    let canonical = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let mut hasher = DefaultHasher::new();
    canonical.hash(&mut hasher);
    ItemKey(hasher.finish())
}

fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.')
}

/// Per-walk filesystem settings handed to every node.
#[derive(Debug, Clone, Default)]
pub struct FsContext {
    pub show_hidden: bool,
    /// Entry names that stop expansion below the directory containing them
    pub stop_markers: Vec<String>,
}

/// Walker kind for directory trees.
#[derive(Debug)]
pub struct FsWalker;

impl WalkerKind for FsWalker {
    type Item = FsEntry;
    type Context = FsContext;

    fn name() -> &'static str {
        "treewalk::fs"
    }

    fn initialize_definitions(registry: &mut Registry<Self>, context: &FsContext) {
        let show_hidden = context.show_hidden;
        registry
            .add_custom_definition(FS_DIRECTORY.name, DirectoryListing::default())
            .add_count_definition("fs::Container", move |entry: &FsEntry| {
                count_entries(&entry.path, show_hidden)
            });
    }
}

/// Lists a directory's entries; stops expansion when a marker is present.
#[derive(Debug, Default)]
pub struct DirectoryListing {
    stopped: Cell<bool>,
}

impl Definition<FsWalker> for DirectoryListing {
    fn children(&self, item: &FsEntry, node: &mut NodeScope<'_, FsWalker>) -> Vec<Option<FsEntry>> {
        self.stopped.set(false);

        let entries = match read_entries(&item.path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %item.path.display(), error = %e, "cannot list directory");
                node.add_metadata("error", e.to_string());
                return Vec::new();
            }
        };

        let context = node.context();
        let marker = entries
            .iter()
            .find(|entry| context.stop_markers.iter().any(|m| *m == entry.name))
            .map(|entry| entry.name.clone());
        let visible: Vec<FsEntry> = entries
            .into_iter()
            .filter(|entry| context.show_hidden || !entry.is_hidden())
            .collect();

        let files = visible.iter().filter(|e| e.kind == EntryKind::File).count();
        let directories = visible.iter().filter(|e| e.is_dir()).count();
        let bytes: u64 = visible
            .iter()
            .filter(|e| e.kind == EntryKind::File)
            .map(|e| e.size)
            .sum();
        node.add_metadata("files", files)
            .add_metadata("directories", directories)
            .add_metadata("bytes", bytes);

        if let Some(marker) = marker {
            debug!(path = %item.path.display(), %marker, "stop marker found");
            node.add_metadata("stopped_at", marker);
            self.stopped.set(true);
        }

        visible.into_iter().map(Some).collect()
    }

    fn should_stop_expansion(&self) -> bool {
        self.stopped.get()
    }
}

/// All readable entries of `dir` sorted by name. Entries that cannot be
/// stat'ed (dangling symlinks, races) are skipped.
fn read_entries(dir: &Path) -> InfraResult<Vec<FsEntry>> {
    let reader = fs::read_dir(dir)
        .map_err(|e| InfraError::io(format!("Failed to read directory {}", dir.display()), e))?;

    let mut entries: Vec<FsEntry> = reader
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| match FsEntry::from_path(&entry.path()) {
            Ok(fs_entry) => Some(fs_entry),
            Err(e) => {
                trace!(error = %e, "skipping entry");
                None
            }
        })
        .collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Entry count without building any entries, zero if unreadable.
fn count_entries(dir: &Path, show_hidden: bool) -> usize {
    match fs::read_dir(dir) {
        Ok(reader) => reader
            .filter_map(|entry| entry.ok())
            .filter(|entry| fs::metadata(entry.path()).is_ok())
            .filter(|entry| show_hidden || !is_hidden_name(&entry.file_name().to_string_lossy()))
            .count(),
        Err(e) => {
            trace!(path = %dir.display(), error = %e, "cannot count directory");
            0
        }
    }
}
