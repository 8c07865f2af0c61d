//! Tree nodes: directories, files, and their permission bits.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::server::Fid;
use crate::TreeError;

/// Permission bits of a node, plus the directory flag.
///
/// Only the owner triplet is consulted when checking access: every
/// connection is served under the same fixed identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mode(u32);

impl Mode {
    /// Directory flag, in the high bit like a 9P `DMDIR`.
    pub const DIR: u32 = 0x8000_0000;

    /// A regular file with the given permission bits.
    pub fn file(perm: u32) -> Self {
        Mode(perm & 0o777)
    }

    /// A directory with the given permission bits.
    pub fn dir(perm: u32) -> Self {
        Mode(Self::DIR | (perm & 0o777))
    }

    /// Raw bits, including the directory flag.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Permission bits only.
    pub fn perm(self) -> u32 {
        self.0 & 0o777
    }

    pub fn is_dir(self) -> bool {
        self.0 & Self::DIR != 0
    }

    /// Whether the owner may open a node with this mode as requested.
    pub fn allows(self, open: OpenMode) -> bool {
        let owner = (self.0 >> 6) & 0o7;
        (!open.reads() || owner & 0o4 != 0) && (!open.writes() || owner & 0o2 != 0)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::with_capacity(10);
        out.push(if self.is_dir() { 'd' } else { '-' });
        for shift in [6, 3, 0] {
            let bits = (self.0 >> shift) & 0o7;
            out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
            out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
            out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
        }
        f.write_str(&out)
    }
}

/// Access requested when opening a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    Write,
    ReadWrite,
}

impl OpenMode {
    pub fn reads(self) -> bool {
        matches!(self, OpenMode::Read | OpenMode::ReadWrite)
    }

    pub fn writes(self) -> bool {
        matches!(self, OpenMode::Write | OpenMode::ReadWrite)
    }
}

/// Callbacks implemented by the files in a tree.
///
/// Every callback receives the handle it was invoked through, so a file can
/// inspect or rebind it. `read` and `write` report the number of bytes
/// produced or consumed.
pub trait FileHandler: Send + Sync + Sized + 'static {
    /// Error returned by this file's callbacks.
    ///
    /// Structural failures detected by the server are converted into it.
    type Error: From<TreeError> + std::error::Error + Send + Sync + 'static;

    /// Called once per successful permission check on open.
    fn open(&self, fid: &mut Fid<Self>, mode: OpenMode) -> Result<(), Self::Error> {
        let _ = (fid, mode);
        Ok(())
    }

    /// Fill `buf` with the file's contents starting at `offset`.
    fn read(&self, fid: &mut Fid<Self>, buf: &mut [u8], offset: u64)
        -> Result<usize, Self::Error>;

    /// Consume `data` written at `offset`.
    fn write(&self, fid: &mut Fid<Self>, data: &[u8], offset: u64) -> Result<usize, Self::Error> {
        let _ = (fid, data, offset);
        Err(TreeError::NotSupported.into())
    }
}

/// What a node is.
pub enum NodeKind<H> {
    /// A directory and its children, ordered by name.
    Dir(RwLock<BTreeMap<String, Arc<Node<H>>>>),
    /// A file served by its handler.
    File(H),
}

/// A named entry in the tree.
///
/// Nodes are shared behind `Arc`; directories may gain and lose children at
/// runtime while other handles hold references to them.
pub struct Node<H> {
    name: String,
    owner: String,
    group: String,
    mode: Mode,
    kind: NodeKind<H>,
}

impl<H> Node<H> {
    /// Create an empty directory owned by `owner` (who is also its group).
    pub fn dir(name: impl Into<String>, owner: impl Into<String>, mode: Mode) -> Arc<Self> {
        let owner = owner.into();
        Arc::new(Self {
            name: name.into(),
            group: owner.clone(),
            owner,
            mode: Mode::dir(mode.perm()),
            kind: NodeKind::Dir(RwLock::new(BTreeMap::new())),
        })
    }

    /// Create a file served by `handler`.
    pub fn file(
        name: impl Into<String>,
        owner: impl Into<String>,
        mode: Mode,
        handler: H,
    ) -> Arc<Self> {
        let owner = owner.into();
        Arc::new(Self {
            name: name.into(),
            group: owner.clone(),
            owner,
            mode: Mode::file(mode.perm()),
            kind: NodeKind::File(handler),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn kind(&self) -> &NodeKind<H> {
        &self.kind
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Dir(_))
    }

    /// The file's handler, or `None` for a directory.
    pub fn handler(&self) -> Option<&H> {
        match &self.kind {
            NodeKind::File(handler) => Some(handler),
            NodeKind::Dir(_) => None,
        }
    }

    fn entries(&self) -> Result<&RwLock<BTreeMap<String, Arc<Node<H>>>>, TreeError> {
        match &self.kind {
            NodeKind::Dir(entries) => Ok(entries),
            NodeKind::File(_) => Err(TreeError::NotADirectory),
        }
    }

    /// Attach `child` under this directory.
    ///
    /// Fails with `AlreadyExists` if the name is taken; the existing child is
    /// left untouched.
    pub fn add(&self, child: Arc<Node<H>>) -> Result<Arc<Node<H>>, TreeError> {
        let mut entries = self
            .entries()?
            .write()
            .unwrap_or_else(|e| e.into_inner());
        if entries.contains_key(child.name()) {
            return Err(TreeError::AlreadyExists(child.name().to_string()));
        }
        entries.insert(child.name().to_string(), Arc::clone(&child));
        Ok(child)
    }

    /// Detach the child called `name`, returning it if it was present.
    pub fn remove(&self, name: &str) -> Option<Arc<Node<H>>> {
        self.entries()
            .ok()?
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(name)
    }

    /// Look up a direct child by name.
    pub fn child(&self, name: &str) -> Option<Arc<Node<H>>> {
        self.entries()
            .ok()?
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }

    /// Snapshot of the children, in name order. Empty for files.
    pub fn children(&self) -> Vec<Arc<Node<H>>> {
        match self.entries() {
            Ok(entries) => entries
                .read()
                .unwrap_or_else(|e| e.into_inner())
                .values()
                .cloned()
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Directory listing: one name per line, directories suffixed with `/`.
    pub fn listing(&self) -> Result<String, TreeError> {
        let entries = self.entries()?.read().unwrap_or_else(|e| e.into_inner());
        let mut out = String::new();
        for (name, node) in entries.iter() {
            out.push_str(name);
            if node.is_dir() {
                out.push('/');
            }
            out.push('\n');
        }
        Ok(out)
    }
}

impl<H> fmt::Debug for Node<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("mode", &self.mode)
            .field("dir", &self.is_dir())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nothing;

    fn tree() -> Arc<Node<Nothing>> {
        let root = Node::dir("/", "glenda", Mode::dir(0o555));
        root.add(Node::file("ctl", "glenda", Mode::file(0o666), Nothing))
            .unwrap();
        root.add(Node::dir("0", "glenda", Mode::dir(0o555))).unwrap();
        root
    }

    #[test]
    fn mode_display() {
        assert_eq!(Mode::file(0o444).to_string(), "-r--r--r--");
        assert_eq!(Mode::dir(0o555).to_string(), "dr-xr-xr-x");
        assert_eq!(Mode::file(0o666).to_string(), "-rw-rw-rw-");
    }

    #[test]
    fn mode_allows_checks_owner_bits() {
        let ro = Mode::file(0o444);
        assert!(ro.allows(OpenMode::Read));
        assert!(!ro.allows(OpenMode::Write));
        assert!(!ro.allows(OpenMode::ReadWrite));

        let wo = Mode::file(0o200);
        assert!(wo.allows(OpenMode::Write));
        assert!(!wo.allows(OpenMode::Read));

        assert!(Mode::file(0o666).allows(OpenMode::ReadWrite));
    }

    #[test]
    fn dir_and_file_constructors_fix_the_flag() {
        let dir: Arc<Node<Nothing>> = Node::dir("d", "u", Mode::file(0o555));
        assert!(dir.mode().is_dir());
        let file = Node::file("f", "u", Mode::dir(0o444), Nothing);
        assert!(!file.mode().is_dir());
        assert_eq!(file.group(), "u");
    }

    #[test]
    fn add_rejects_duplicate_names() {
        let root = tree();
        let err = root
            .add(Node::file("ctl", "glenda", Mode::file(0o444), Nothing))
            .unwrap_err();
        assert_eq!(err, TreeError::AlreadyExists("ctl".to_string()));
        assert_eq!(root.children().len(), 2);
    }

    #[test]
    fn add_to_file_fails() {
        let root = tree();
        let ctl = root.child("ctl").unwrap();
        let err = ctl
            .add(Node::file("x", "glenda", Mode::file(0o444), Nothing))
            .unwrap_err();
        assert_eq!(err, TreeError::NotADirectory);
    }

    #[test]
    fn remove_detaches_child() {
        let root = tree();
        assert!(root.remove("0").is_some());
        assert!(root.child("0").is_none());
        assert!(root.remove("0").is_none());
    }

    #[test]
    fn listing_is_sorted_and_marks_dirs() {
        let root = tree();
        assert_eq!(root.listing().unwrap(), "0/\nctl\n");
        let ctl = root.child("ctl").unwrap();
        assert_eq!(ctl.listing().unwrap_err(), TreeError::NotADirectory);
    }
}
