// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Location-transparent filesystem paths.
//!
//! A `PathKey` is an immutable sequence of components. Its string form is
//! `/` for the root and `/c1/c2/...` otherwise. Components may not be empty
//! and may not contain the separator (`/`) or the delimiter (`:`), which is
//! reserved for application use.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

pub const SEPARATOR: char = '/';
pub const DELIMITER: char = ':';

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathKey {
    components: Vec<String>,
}

impl PathKey {
    /// The root directory
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a path string. Empty components (repeated or trailing
    /// separators) are dropped.
    pub fn parse(s: &str) -> Result<Self> {
        if !s.starts_with(SEPARATOR) {
            return Err(Error::invalid_path(format!(
                "'{s}' does not begin with '{SEPARATOR}'"
            )));
        }
        if s.contains(DELIMITER) {
            return Err(Error::invalid_path(format!(
                "'{s}' contains '{DELIMITER}'"
            )));
        }
        let components = s
            .split(SEPARATOR)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        Ok(Self { components })
    }

    /// A new path with one more component
    pub fn join(&self, component: &str) -> Result<Self> {
        check_component(component)?;
        let mut components = self.components.clone();
        components.push(component.to_string());
        Ok(Self { components })
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    pub fn parent(&self) -> Result<Self> {
        match self.components.split_last() {
            Some((_, rest)) => Ok(Self {
                components: rest.to_vec(),
            }),
            None => Err(Error::invalid_path("the root directory has no parent")),
        }
    }

    pub fn last(&self) -> Result<&str> {
        self.components
            .last()
            .map(String::as_str)
            .ok_or_else(|| Error::invalid_path("the root directory has no last component"))
    }

    /// True if `ancestor` is a prefix of this path, compared component by
    /// component. Every path is a subpath of itself and of the root.
    #[must_use]
    pub fn is_subpath_of(&self, ancestor: &PathKey) -> bool {
        ancestor.components.len() <= self.components.len()
            && ancestor
                .components
                .iter()
                .zip(&self.components)
                .all(|(a, b)| a == b)
    }

    /// Number of components; zero for the root
    #[must_use]
    pub fn depth(&self) -> usize {
        self.components.len()
    }

    pub fn iter(&self) -> Components<'_> {
        Components {
            inner: self.components.iter(),
        }
    }

    /// Map this path onto the host filesystem below `root`.
    ///
    /// `.` and `..` are legal components but cannot be mapped: they would
    /// resolve outside of the key's own position in the tree.
    pub fn to_local<P: AsRef<Path>>(&self, root: P) -> Result<PathBuf> {
        let mut local = root.as_ref().to_path_buf();
        for component in &self.components {
            if component == "." || component == ".." {
                return Err(Error::invalid_path(format!(
                    "'{self}' cannot be mapped onto a local directory"
                )));
            }
            local.push(component);
        }
        Ok(local)
    }

    /// Build a key from a host path relative to some walked root.
    pub fn from_relative<P: AsRef<Path>>(relative: P) -> Result<Self> {
        let relative = relative.as_ref();
        let mut key = Self::root();
        for component in relative.components() {
            match component {
                Component::Normal(name) => {
                    let name = name.to_str().ok_or_else(|| {
                        Error::invalid_path(format!(
                            "'{}' is not valid UTF-8",
                            relative.display()
                        ))
                    })?;
                    key = key.join(name)?;
                }
                Component::CurDir => {}
                _ => {
                    return Err(Error::invalid_path(format!(
                        "'{}' is not a relative path",
                        relative.display()
                    )));
                }
            }
        }
        Ok(key)
    }

    /// Every regular file below `directory`, relative to it.
    ///
    /// The tree is walked breadth-first. Symbolic links are not followed.
    pub async fn list_local<P: AsRef<Path>>(directory: P) -> Result<BTreeSet<PathKey>> {
        let directory = directory.as_ref();
        let display = directory.display();
        let metadata = match tokio::fs::metadata(directory).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::not_found(format!("no such directory '{display}'")));
            }
            Err(e) => return Err(Error::io(display, &e)),
        };
        if !metadata.is_dir() {
            return Err(Error::invalid_argument(format!(
                "'{display}' is not a directory"
            )));
        }

        let mut files = BTreeSet::new();
        let mut pending = VecDeque::from([directory.to_path_buf()]);
        while let Some(dir) = pending.pop_front() {
            let mut entries = tokio::fs::read_dir(&dir)
                .await
                .map_err(|e| Error::io(dir.display(), &e))?;
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| Error::io(dir.display(), &e))?
            {
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| Error::io(entry.path().display(), &e))?;
                let path = entry.path();
                if file_type.is_dir() {
                    pending.push_back(path);
                } else if file_type.is_file() {
                    let relative = path.strip_prefix(directory).map_err(|_| {
                        Error::invalid_path(format!("'{}' escaped the walk", path.display()))
                    })?;
                    _ = files.insert(Self::from_relative(relative)?);
                }
            }
        }
        Ok(files)
    }
}

fn check_component(component: &str) -> Result<()> {
    if component.is_empty() {
        return Err(Error::invalid_path("empty path component"));
    }
    if component.contains(SEPARATOR) || component.contains(DELIMITER) {
        return Err(Error::invalid_path(format!(
            "component '{component}' contains '{SEPARATOR}' or '{DELIMITER}'"
        )));
    }
    Ok(())
}

/// Read-only iterator over a path's components
#[derive(Clone)]
pub struct Components<'a> {
    inner: std::slice::Iter<'a, String>,
}

impl<'a> Iterator for Components<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(String::as_str)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Components<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(String::as_str)
    }
}

impl ExactSizeIterator for Components<'_> {}

impl<'a> IntoIterator for &'a PathKey {
    type Item = &'a str;
    type IntoIter = Components<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            return write!(f, "{SEPARATOR}");
        }
        for component in &self.components {
            write!(f, "{SEPARATOR}{component}")?;
        }
        Ok(())
    }
}

impl FromStr for PathKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PathKey {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<PathKey> for String {
    fn from(p: PathKey) -> String {
        p.to_string()
    }
}
