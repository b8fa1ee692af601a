// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! The naming service's directory tree.
//!
//! Directories map component names to children; files record the storage
//! node that owns them. All addressing is by `PathKey`, one component per
//! level, so lookups cost O(depth) and a name is never confused with a
//! longer name that happens to start with it.

use common::{Error, PathKey, Result, StorageNodeHandle};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Directory(Directory),
    File(FileEntry),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Directory {
    children: BTreeMap<String, Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    pub owner: StorageNodeHandle,
}

impl Node {
    #[must_use]
    pub fn is_directory(&self) -> bool {
        matches!(self, Node::Directory(_))
    }

    /// Every file at or below this node, given that this node sits at `path`
    #[must_use]
    pub fn files(&self, path: &PathKey) -> Vec<(PathKey, StorageNodeHandle)> {
        let mut out = Vec::new();
        let mut pending = vec![(path.clone(), self)];
        while let Some((path, node)) = pending.pop() {
            match node {
                Node::File(file) => out.push((path, file.owner)),
                Node::Directory(dir) => {
                    for (name, child) in &dir.children {
                        // Names in the tree were validated when inserted
                        if let Ok(child_path) = path.join(name) {
                            pending.push((child_path, child));
                        }
                    }
                }
            }
        }
        out
    }
}

impl Directory {
    #[must_use]
    pub fn names(&self) -> BTreeSet<String> {
        self.children.keys().cloned().collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct DirectoryTree {
    root: Directory,
}

impl DirectoryTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn root(&self) -> &Directory {
        &self.root
    }

    /// The node at `path`, or `None` if any component is missing.
    /// The root itself is not a `Node`; see [`DirectoryTree::root`].
    #[must_use]
    pub fn lookup(&self, path: &PathKey) -> Option<&Node> {
        let mut components = path.iter();
        let first = components.next()?;
        let mut node = self.root.children.get(first)?;
        for name in components {
            match node {
                Node::Directory(dir) => node = dir.children.get(name)?,
                Node::File(_) => return None,
            }
        }
        Some(node)
    }

    #[must_use]
    pub fn exists(&self, path: &PathKey) -> bool {
        path.is_root() || self.lookup(path).is_some()
    }

    pub fn is_directory(&self, path: &PathKey) -> Result<bool> {
        if path.is_root() {
            return Ok(true);
        }
        self.lookup(path)
            .map(Node::is_directory)
            .ok_or_else(|| Error::not_found(path))
    }

    /// Names of the immediate children of `directory`
    pub fn list(&self, directory: &PathKey) -> Result<BTreeSet<String>> {
        if directory.is_root() {
            return Ok(self.root.names());
        }
        match self.lookup(directory) {
            Some(Node::Directory(dir)) => Ok(dir.names()),
            Some(Node::File(_)) => Err(Error::not_found(format!("{directory} is a file"))),
            None => Err(Error::not_found(directory)),
        }
    }

    /// The node owning the file at `path`
    pub fn owner(&self, path: &PathKey) -> Result<StorageNodeHandle> {
        match self.lookup(path) {
            Some(Node::File(file)) => Ok(file.owner),
            Some(Node::Directory(_)) => Err(Error::not_found(format!("{path} is a directory"))),
            None => Err(Error::not_found(path)),
        }
    }

    /// True if `path` could not be added as a new file: something already
    /// lives there, or one of its ancestors is a file.
    #[must_use]
    pub fn conflicts(&self, path: &PathKey) -> bool {
        if path.is_root() {
            return true;
        }
        let mut dir = &self.root;
        for name in path.iter() {
            match dir.children.get(name) {
                None => return false,
                Some(Node::File(_)) => return true,
                Some(Node::Directory(child)) => dir = child,
            }
        }
        true
    }

    /// Add a file owned by `owner`, creating missing parent directories.
    ///
    /// Does not look for conflicts; callers check [`DirectoryTree::conflicts`]
    /// first. Only fails when the walk runs into an existing file.
    pub fn insert(&mut self, path: &PathKey, owner: StorageNodeHandle) -> Result<()> {
        let (dir, name) = self.make_parents(path)?;
        _ = dir
            .children
            .insert(name.to_string(), Node::File(FileEntry { owner }));
        Ok(())
    }

    /// Add an empty directory, creating missing parents
    pub fn insert_directory(&mut self, path: &PathKey) -> Result<()> {
        let (dir, name) = self.make_parents(path)?;
        _ = dir
            .children
            .entry(name.to_string())
            .or_insert_with(|| Node::Directory(Directory::default()));
        Ok(())
    }

    /// Detach and return the subtree at `path`
    pub fn remove(&mut self, path: &PathKey) -> Option<Node> {
        let name = path.last().ok()?;
        let parent = path.parent().ok()?;
        self.directory_mut(&parent)?.children.remove(name)
    }

    fn directory_mut(&mut self, path: &PathKey) -> Option<&mut Directory> {
        let mut dir = &mut self.root;
        for name in path.iter() {
            match dir.children.get_mut(name)? {
                Node::Directory(child) => dir = child,
                Node::File(_) => return None,
            }
        }
        Some(dir)
    }

    fn make_parents<'a, 'p>(&'a mut self, path: &'p PathKey) -> Result<(&'a mut Directory, &'p str)> {
        let name = path.last()?;
        let mut dir = &mut self.root;
        for component in path.iter().take(path.depth() - 1) {
            let child = dir
                .children
                .entry(component.to_string())
                .or_insert_with(|| Node::Directory(Directory::default()));
            match child {
                Node::Directory(child) => dir = child,
                Node::File(_) => {
                    return Err(Error::invalid_argument(format!(
                        "cannot place {path}: {component} is a file"
                    )));
                }
            }
        }
        Ok((dir, name))
    }
}
