//! Per-open-handle bookkeeping over a node tree.
//!
//! A `FileServer` hands out numeric fids the way a remote file protocol
//! does: attach to the root, walk to a name, open, then read or write at
//! offsets, and finally clunk. The wire protocol that carries these calls
//! lives elsewhere.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use crate::node::{FileHandler, Mode, Node, NodeKind, OpenMode};
use crate::{read_at, TreeError};

/// Numeric handle identifier.
pub type FidId = u32;

/// State of one open handle.
///
/// Handlers receive the fid they were called through and may `rebind` it to
/// another node; later operations on the handle then reach that node.
pub struct Fid<H> {
    id: FidId,
    node: Arc<Node<H>>,
    opened: Option<OpenMode>,
}

impl<H> Fid<H> {
    pub fn id(&self) -> FidId {
        self.id
    }

    pub fn node(&self) -> &Arc<Node<H>> {
        &self.node
    }

    /// The mode this handle was opened with, if it has been opened.
    pub fn opened(&self) -> Option<OpenMode> {
        self.opened
    }

    /// Point this handle at a different node, keeping its open mode.
    pub fn rebind(&mut self, node: Arc<Node<H>>) {
        self.node = node;
    }
}

/// Metadata about the node behind a handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    pub name: String,
    pub owner: String,
    pub group: String,
    pub mode: Mode,
}

type FidTable<H> = HashMap<FidId, Arc<Mutex<Fid<H>>>>;

/// Serves a tree of `Node`s through numeric handles.
///
/// Operations on different handles proceed concurrently: the fid table is
/// locked only to look a handle up, never while a handler runs.
pub struct FileServer<H> {
    root: Arc<Node<H>>,
    fids: Mutex<FidTable<H>>,
    next_fid: AtomicU32,
}

impl<H: FileHandler> FileServer<H> {
    pub fn new(root: Arc<Node<H>>) -> Self {
        Self {
            root,
            fids: Mutex::new(HashMap::new()),
            next_fid: AtomicU32::new(0),
        }
    }

    pub fn root(&self) -> &Arc<Node<H>> {
        &self.root
    }

    fn insert(&self, node: Arc<Node<H>>) -> FidId {
        let id = self.next_fid.fetch_add(1, Ordering::Relaxed);
        let fid = Fid {
            id,
            node,
            opened: None,
        };
        self.fids
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, Arc::new(Mutex::new(fid)));
        id
    }

    fn fid(&self, id: FidId) -> Result<Arc<Mutex<Fid<H>>>, TreeError> {
        self.fids
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
            .cloned()
            .ok_or(TreeError::UnknownFid(id))
    }

    /// Create a new handle on the root directory.
    pub fn attach(&self) -> FidId {
        let id = self.insert(Arc::clone(&self.root));
        tracing::trace!(fid = id, "attach");
        id
    }

    /// Walk from `from` through `names`, returning a new unopened handle.
    ///
    /// An empty walk clones the handle.
    pub fn walk(&self, from: FidId, names: &[&str]) -> Result<FidId, TreeError> {
        let mut node = {
            let fid = self.fid(from)?;
            let fid = fid.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(&fid.node)
        };
        for name in names {
            if !node.is_dir() {
                return Err(TreeError::NotADirectory);
            }
            node = match *name {
                "" | "." => node,
                _ => node
                    .child(name)
                    .ok_or_else(|| TreeError::NotFound((*name).to_string()))?,
            };
        }
        let id = self.insert(node);
        tracing::trace!(from, fid = id, ?names, "walk");
        Ok(id)
    }

    /// Walk from the root along a slash-separated path.
    ///
    /// Returns a new unopened handle; the temporary root handle is released.
    pub fn walk_path(&self, path: &str) -> Result<FidId, TreeError> {
        let names: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();
        let root = self.attach();
        let result = self.walk(root, &names);
        self.clunk(root)?;
        result
    }

    /// Open a handle after checking the node's permission bits.
    pub fn open(&self, id: FidId, mode: OpenMode) -> Result<(), H::Error> {
        let fid = self.fid(id)?;
        let mut fid = fid.lock().unwrap_or_else(|e| e.into_inner());
        let node = Arc::clone(&fid.node);
        if node.is_dir() && mode.writes() {
            return Err(TreeError::IsADirectory.into());
        }
        if !node.mode().allows(mode) {
            return Err(TreeError::PermissionDenied.into());
        }
        if let NodeKind::File(handler) = node.kind() {
            handler.open(&mut fid, mode)?;
        }
        fid.opened = Some(mode);
        Ok(())
    }

    /// Read from an open handle into `buf`.
    pub fn read(&self, id: FidId, buf: &mut [u8], offset: u64) -> Result<usize, H::Error> {
        let fid = self.fid(id)?;
        let mut fid = fid.lock().unwrap_or_else(|e| e.into_inner());
        match fid.opened {
            Some(mode) if mode.reads() => {}
            Some(_) => return Err(TreeError::PermissionDenied.into()),
            None => return Err(TreeError::NotOpen.into()),
        }
        let node = Arc::clone(&fid.node);
        match node.kind() {
            NodeKind::Dir(_) => Ok(read_at(node.listing()?.as_bytes(), buf, offset)),
            NodeKind::File(handler) => handler.read(&mut fid, buf, offset),
        }
    }

    /// Write `data` through an open handle.
    pub fn write(&self, id: FidId, data: &[u8], offset: u64) -> Result<usize, H::Error> {
        let fid = self.fid(id)?;
        let mut fid = fid.lock().unwrap_or_else(|e| e.into_inner());
        match fid.opened {
            Some(mode) if mode.writes() => {}
            Some(_) => return Err(TreeError::PermissionDenied.into()),
            None => return Err(TreeError::NotOpen.into()),
        }
        let node = Arc::clone(&fid.node);
        match node.kind() {
            NodeKind::Dir(_) => Err(TreeError::IsADirectory.into()),
            NodeKind::File(handler) => handler.write(&mut fid, data, offset),
        }
    }

    /// Read from offset zero until a read comes back shorter than `chunk`.
    ///
    /// Only for files that honor the offset. A file that serves its value
    /// from the start on every read never yields a short read once the
    /// value fills `chunk`.
    pub fn read_to_end(&self, id: FidId, chunk: usize) -> Result<Vec<u8>, H::Error> {
        let mut out = Vec::new();
        let mut buf = vec![0u8; chunk.max(1)];
        loop {
            let n = self.read(id, &mut buf, out.len() as u64)?;
            out.extend_from_slice(&buf[..n]);
            if n < buf.len() {
                return Ok(out);
            }
        }
    }

    /// The node a handle currently refers to.
    pub fn node(&self, id: FidId) -> Result<Arc<Node<H>>, TreeError> {
        let fid = self.fid(id)?;
        let fid = fid.lock().unwrap_or_else(|e| e.into_inner());
        Ok(Arc::clone(&fid.node))
    }

    /// Describe the node a handle currently refers to.
    pub fn stat(&self, id: FidId) -> Result<Stat, TreeError> {
        let fid = self.fid(id)?;
        let fid = fid.lock().unwrap_or_else(|e| e.into_inner());
        Ok(Stat {
            name: fid.node.name().to_string(),
            owner: fid.node.owner().to_string(),
            group: fid.node.group().to_string(),
            mode: fid.node.mode(),
        })
    }

    /// Forget a handle.
    pub fn clunk(&self, id: FidId) -> Result<(), TreeError> {
        self.fids
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&id)
            .map(|_| ())
            .ok_or(TreeError::UnknownFid(id))
    }
}
