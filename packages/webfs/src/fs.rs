//! Assembling the tree and serving it.

use std::sync::Arc;

use webfs_http::{HttpExecutor, ReqwestExecutor};
use webfs_tree::{FidId, FileServer, Mode, Node, OpenMode};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::file::{ReadPolicy, WebFile};
use crate::root::{CloneFile, RootCtl, RootState};
use crate::session::SessionId;

/// Chunk size used by the whole-file helpers.
const CHUNK: usize = 8192;

/// A webfs tree and the file server handing out handles on it.
///
/// ```text
/// /clone                 read → allocates session N, returns "N\n"
/// /ctl                   read → "useragent <ua>\ntimeout <ms>\n"
/// /N/ctl                 write "url <u>\n" | "baseurl <u>\n"; read → "N\n"
/// /N/body                open → executes request; read → response bytes
/// /N/parsed/<component>  read → component of the resolved URL
/// /N/<header-name>       read → header value, present only post-execution
/// ```
pub struct WebFs {
    state: Arc<RootState>,
    server: FileServer<WebFile>,
}

impl WebFs {
    pub fn new(config: Config, executor: Arc<dyn HttpExecutor>) -> Result<Self> {
        let owner = config.owner.clone();
        let state = Arc::new(RootState::new(config, executor));

        let root = Node::dir("/", owner.as_str(), Mode::dir(0o555));
        root.add(Node::file(
            "clone",
            owner.as_str(),
            Mode::file(0o666),
            WebFile::Clone(CloneFile::new(Arc::clone(&state), Arc::downgrade(&root))),
        ))?;
        root.add(Node::file(
            "ctl",
            owner.as_str(),
            Mode::file(0o444),
            WebFile::RootCtl(RootCtl::new(Arc::clone(&state))),
        ))?;

        Ok(Self {
            state,
            server: FileServer::new(root),
        })
    }

    /// A tree that performs requests with reqwest.
    pub fn with_reqwest(config: Config) -> Result<Self> {
        let executor = ReqwestExecutor::new()?;
        Self::new(config, Arc::new(executor))
    }

    pub fn server(&self) -> &FileServer<WebFile> {
        &self.server
    }

    pub fn root(&self) -> &Arc<Node<WebFile>> {
        self.server.root()
    }

    pub fn state(&self) -> &RootState {
        &self.state
    }

    /// Ids of every session directory, ascending.
    pub fn session_ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self
            .root()
            .children()
            .iter()
            .filter(|node| node.is_dir())
            .filter_map(|node| node.name().parse().ok())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Walk to `path` and open it.
    pub fn open(&self, path: &str, mode: OpenMode) -> Result<FidId> {
        let fid = self.server.walk_path(path)?;
        if let Err(e) = self.server.open(fid, mode) {
            self.server.clunk(fid)?;
            return Err(e);
        }
        Ok(fid)
    }

    /// Open `path` for reading and return its contents.
    pub fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let fid = self.open(path, OpenMode::Read)?;
        let result = self.read_whole(fid);
        self.server.clunk(fid)?;
        result
    }

    /// Ranged files and directories are read in chunks. Every other file
    /// yields its whole value in one read at offset zero, so it is read
    /// once, again with a larger buffer if the first was too small.
    fn read_whole(&self, fid: FidId) -> Result<Vec<u8>> {
        let node = self.server.node(fid)?;
        match node.handler().map(WebFile::read_policy) {
            Some(ReadPolicy::SingleShot | ReadPolicy::FromStart) => {
                let mut buf = vec![0u8; CHUNK];
                let n = match self.server.read(fid, &mut buf, 0) {
                    Err(Error::BufferTooSmall { needed, .. }) => {
                        buf.resize(needed, 0);
                        self.server.read(fid, &mut buf, 0)?
                    }
                    other => other?,
                };
                buf.truncate(n);
                Ok(buf)
            }
            Some(ReadPolicy::Ranged) | None => self.server.read_to_end(fid, CHUNK),
        }
    }

    /// Open `path` for writing and write `data` at offset zero.
    pub fn write_file(&self, path: &str, data: &[u8]) -> Result<usize> {
        let fid = self.open(path, OpenMode::Write)?;
        let result = self.server.write(fid, data, 0);
        self.server.clunk(fid)?;
        result
    }

    /// Allocate a session through `/clone`.
    ///
    /// Returns the new id and a handle, now bound to the session's `ctl`,
    /// that is open for reading and writing.
    pub fn clone_session(&self) -> Result<(SessionId, FidId)> {
        let fid = self.open("clone", OpenMode::ReadWrite)?;
        let mut buf = [0u8; 32];
        let n = match self.server.read(fid, &mut buf, 0) {
            Ok(n) => n,
            Err(e) => {
                self.server.clunk(fid)?;
                return Err(e);
            }
        };
        match String::from_utf8_lossy(&buf[..n]).trim().parse() {
            Ok(id) => Ok((id, fid)),
            Err(_) => {
                self.server.clunk(fid)?;
                Err(Error::RequestFailed("clone returned no id".to_string()))
            }
        }
    }
}
