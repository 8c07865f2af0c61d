//! Response header files.
//!
//! After a body open succeeds, each response header becomes a read-only
//! file in the session directory: `Content-Type` is served as
//! `contenttype`, with multiple values joined by spaces.

use webfs_http::HeaderMultiMap;
use webfs_tree::{Mode, Node, TreeError};

use crate::error::{Error, Result};
use crate::file::{single_shot, WebFile};

/// File name for a header: lowercase, hyphens removed.
pub fn normalize(name: &str) -> String {
    name.replace('-', "").to_ascii_lowercase()
}

/// A header's value, fixed when the file is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderFile {
    key: String,
    value: String,
}

impl HeaderFile {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        tracing::debug!(key = %self.key, "headerfile read");
        single_shot(self.value.as_bytes(), buf)
    }
}

/// Create one file per header under `dir`, returning how many were made.
///
/// A header whose name collides with an existing entry is skipped and
/// logged; the rest are still created.
pub fn materialize(dir: &Node<WebFile>, headers: &HeaderMultiMap, owner: &str) -> usize {
    let mut created = 0;
    for (name, values) in headers.iter() {
        let key = normalize(name);
        if key.is_empty() || key == "." || key == ".." {
            tracing::warn!(header = name, "body: header name is not a usable file name");
            continue;
        }
        let file = HeaderFile::new(key.clone(), values.join(" "));
        let node = Node::file(key.clone(), owner, Mode::file(0o444), WebFile::Header(file));
        match dir.add(node) {
            Ok(_) => created += 1,
            Err(TreeError::AlreadyExists(_)) => {
                let err = Error::DuplicateHeaderKey(key);
                tracing::warn!(header = name, error = %err, "body: skipping header");
            }
            Err(e) => {
                tracing::warn!(header = name, error = %e, "body: can't make header file");
            }
        }
    }
    created
}
