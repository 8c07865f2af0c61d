//! # webfs-tree
//!
//! A synthetic file tree served through per-open-handle operations.
//!
//! This is the narrow waist between a remote file-access protocol and the
//! files it exposes. Nothing here knows what the files mean:
//! - `Node`: a named directory or file carrying owner, group, and mode
//! - `FileHandler`: the `open`/`read`/`write` callbacks a file implements
//! - `FileServer`: fid bookkeeping, walking, and permission checks
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use webfs_tree::{FileHandler, FileServer, Fid, Mode, Node, OpenMode, TreeError};
//!
//! struct Hello;
//!
//! impl FileHandler for Hello {
//!     type Error = TreeError;
//!
//!     fn read(&self, _fid: &mut Fid<Self>, buf: &mut [u8], offset: u64) -> Result<usize, TreeError> {
//!         Ok(webfs_tree::read_at(b"hello\n", buf, offset))
//!     }
//! }
//!
//! let root = Node::dir("/", "none", Mode::dir(0o555));
//! root.add(Node::file("hello", "none", Mode::file(0o444), Hello)).unwrap();
//!
//! let server = FileServer::new(root);
//! let fid = server.attach();
//! let file = server.walk(fid, &["hello"]).unwrap();
//! server.open(file, OpenMode::Read).unwrap();
//!
//! let mut buf = [0u8; 16];
//! let n = server.read(file, &mut buf, 0).unwrap();
//! assert_eq!(&buf[..n], b"hello\n");
//! ```

mod error;
mod node;
mod server;

pub use error::TreeError;
pub use node::{FileHandler, Mode, Node, NodeKind, OpenMode};
pub use server::{Fid, FidId, FileServer, Stat};

/// Copy the part of `data` starting at `offset` into `buf`.
///
/// Returns the number of bytes copied; zero once `offset` is past the end.
pub fn read_at(data: &[u8], buf: &mut [u8], offset: u64) -> usize {
    let len = data.len() as u64;
    if offset >= len {
        return 0;
    }
    let rest = &data[offset as usize..];
    let n = rest.len().min(buf.len());
    buf[..n].copy_from_slice(&rest[..n]);
    n
}
