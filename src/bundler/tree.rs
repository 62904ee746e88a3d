//! Directory tree mirroring.
//!
//! Walks a source binary directory and rebuilds it as a tree of directory
//! nodes, each with a file group for the files directly inside it. Both the
//! WiX object graph and the NSIS script are generated from this tree.

use crate::bundler::{
    error::{Context, Error, ErrorExt, Result},
    utils::fs::extend_long_path,
};
use std::{
    io,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Name of the root node: its contents are flattened into the install directory.
pub const ROOT_NAME: &str = ".";

/// Wildcard matched against each directory for its file group.
pub const FILE_WILDCARD: &str = "*.*";

/// Files found directly inside one directory (non-recursive wildcard match).
///
/// Order is the filesystem's enumeration order. An empty group is legal and
/// means the directory holds no files at this level.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileGroup {
    pattern: PathBuf,
    files: Vec<PathBuf>,
}

impl FileGroup {
    /// Wildcard pattern the group was matched with, e.g. `bin/*.*`.
    pub fn pattern(&self) -> &Path {
        &self.pattern
    }

    /// Full paths of the matched files.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// `true` when no file matched.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// One directory of the mirrored tree.
///
/// Each physical directory maps to exactly one node, owned by its parent.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DirectoryTree {
    name: String,
    path: PathBuf,
    relative: PathBuf,
    files: FileGroup,
    children: Vec<DirectoryTree>,
}

impl DirectoryTree {
    /// Mirrors `root` into a tree.
    ///
    /// Depth-first pre-order: the file group of a directory is collected
    /// before its subdirectories are visited, and subdirectories keep the
    /// filesystem enumeration order. The root node is named [`ROOT_NAME`].
    /// Symbolic links are followed; a link back to an ancestor is skipped.
    ///
    /// # Errors
    ///
    /// `DirectoryNotFound` when `root` does not exist or is not a directory.
    pub fn mirror(root: &Path) -> Result<Self> {
        if !extend_long_path(root).is_dir() {
            return Err(Error::DirectoryNotFound(root.to_path_buf()));
        }

        let mut ancestors = Vec::new();
        mirror_dir(root, PathBuf::new(), ROOT_NAME.to_string(), &mut ancestors)
    }

    /// Runs [`mirror`](Self::mirror) on the blocking thread pool.
    pub async fn mirror_blocking(root: &Path) -> Result<Self> {
        let root = root.to_path_buf();
        tokio::task::spawn_blocking(move || Self::mirror(&root))
            .await
            .context("directory walk task panicked")?
    }

    /// Node name: [`ROOT_NAME`] for the root, the basename otherwise.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this node is the flattened root.
    pub fn is_root(&self) -> bool {
        self.relative.as_os_str().is_empty()
    }

    /// Source directory this node mirrors.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path relative to the tree root (empty for the root).
    pub fn relative_path(&self) -> &Path {
        &self.relative
    }

    /// Files directly inside this directory.
    pub fn files(&self) -> &FileGroup {
        &self.files
    }

    /// Immediate subdirectories.
    pub fn children(&self) -> &[DirectoryTree] {
        &self.children
    }

    /// All nodes in depth-first pre-order, starting with `self`.
    pub fn nodes(&self) -> Vec<&DirectoryTree> {
        let mut out = Vec::new();
        self.collect_nodes(&mut out);
        out
    }

    fn collect_nodes<'a>(&'a self, out: &mut Vec<&'a DirectoryTree>) {
        out.push(self);
        for child in &self.children {
            child.collect_nodes(out);
        }
    }

    /// Total number of files in the tree.
    pub fn file_count(&self) -> usize {
        self.nodes().iter().map(|n| n.files.files.len()).sum()
    }

    /// Resolves a path relative to the root (`/` or `\` separated) to the
    /// node holding it and the file's full path.
    pub fn find_file(&self, relative: &str) -> Option<(&DirectoryTree, &Path)> {
        let mut parts: Vec<&str> = relative
            .split(['/', '\\'])
            .filter(|p| !p.is_empty() && *p != ".")
            .collect();
        let file_name = parts.pop()?;

        let mut node = self;
        for part in parts {
            node = node.children.iter().find(|c| c.name == part)?;
        }

        node.files
            .files
            .iter()
            .find(|f| f.file_name().is_some_and(|n| n == file_name))
            .map(|f| (node, f.as_path()))
    }
}

fn mirror_dir(
    dir: &Path,
    relative: PathBuf,
    name: String,
    ancestors: &mut Vec<PathBuf>,
) -> Result<DirectoryTree> {
    let canonical = std::fs::canonicalize(extend_long_path(dir))
        .fs_context("resolving source directory", dir)?;
    ancestors.push(canonical);

    let mut files = Vec::new();
    let mut subdirs = Vec::new();

    for entry in WalkDir::new(extend_long_path(dir))
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = entry
            .map_err(io::Error::from)
            .fs_context("reading source directory", dir)?;
        let path = dir.join(entry.file_name());

        if entry.file_type().is_dir() {
            subdirs.push(path);
        } else if entry.file_type().is_file() {
            files.push(path);
        }
    }

    let mut children = Vec::with_capacity(subdirs.len());
    for sub in subdirs {
        let canonical = std::fs::canonicalize(extend_long_path(&sub))
            .fs_context("resolving source directory", &sub)?;
        if ancestors.contains(&canonical) {
            log::warn!("Skipping {}: links back to a parent directory", sub.display());
            continue;
        }

        let child_name = sub
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let child_relative = relative.join(&child_name);
        children.push(mirror_dir(&sub, child_relative, child_name, ancestors)?);
    }

    ancestors.pop();

    Ok(DirectoryTree {
        name,
        path: dir.to_path_buf(),
        relative,
        files: FileGroup {
            pattern: dir.join(FILE_WILDCARD),
            files,
        },
        children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn missing_root_is_directory_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = DirectoryTree::mirror(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, Error::DirectoryNotFound(_)));
    }

    #[test]
    fn file_root_is_directory_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.exe");
        touch(&file);
        assert!(matches!(
            DirectoryTree::mirror(&file),
            Err(Error::DirectoryNotFound(_))
        ));
    }

    #[test]
    fn empty_directory_yields_empty_group() {
        let dir = tempfile::tempdir().unwrap();
        let tree = DirectoryTree::mirror(dir.path()).unwrap();
        assert_eq!(tree.name(), ROOT_NAME);
        assert!(tree.files().is_empty());
        assert!(tree.children().is_empty());
        assert_eq!(tree.files().pattern(), dir.path().join("*.*"));
    }

    #[test]
    fn mirrors_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.exe"));
        touch(&dir.path().join("docs/manual.pdf"));
        fs::create_dir_all(dir.path().join("docs/empty")).unwrap();

        let tree = DirectoryTree::mirror(dir.path()).unwrap();
        assert!(tree.is_root());
        assert_eq!(tree.files().files(), [dir.path().join("a.exe")]);
        assert_eq!(tree.children().len(), 1);

        let docs = &tree.children()[0];
        assert_eq!(docs.name(), "docs");
        assert_eq!(docs.relative_path(), Path::new("docs"));
        assert_eq!(docs.files().files(), [dir.path().join("docs/manual.pdf")]);

        let empty = &docs.children()[0];
        assert_eq!(empty.name(), "empty");
        assert!(empty.files().is_empty());
        assert_eq!(tree.nodes().len(), 3);
        assert_eq!(tree.file_count(), 2);
    }

    #[test]
    fn finds_files_by_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.exe"));
        touch(&dir.path().join("tools/helper.exe"));

        let tree = DirectoryTree::mirror(dir.path()).unwrap();
        let (node, file) = tree.find_file("a.exe").unwrap();
        assert!(node.is_root());
        assert_eq!(file, dir.path().join("a.exe"));

        let (node, _) = tree.find_file(r"tools\helper.exe").unwrap();
        assert_eq!(node.name(), "tools");
        assert!(tree.find_file("tools/missing.exe").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn link_to_ancestor_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("sub/a.txt"));
        std::os::unix::fs::symlink(dir.path(), dir.path().join("sub/loop")).unwrap();

        let tree = DirectoryTree::mirror(dir.path()).unwrap();
        let sub = &tree.children()[0];
        assert!(sub.children().is_empty());
    }
}
