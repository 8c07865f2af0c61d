//! The root of the tree: `clone`, `ctl`, and the session directories.

use std::sync::{Arc, Mutex, Weak};

use webfs_http::HttpExecutor;
use webfs_tree::{read_at, Fid, Mode, Node, TreeError};

use crate::body::BodyFile;
use crate::config::Config;
use crate::ctl::CtlFile;
use crate::error::{Error, Result};
use crate::file::WebFile;
use crate::parsed::{ParsedFile, ParsedKind};
use crate::session::{SessionCell, SessionId};

/// State shared by the whole tree.
///
/// Configuration is fixed at construction; only the session counter moves.
pub struct RootState {
    config: Config,
    executor: Arc<dyn HttpExecutor>,
    next_session_id: Mutex<SessionId>,
}

impl RootState {
    pub fn new(config: Config, executor: Arc<dyn HttpExecutor>) -> Self {
        Self {
            config,
            executor,
            next_session_id: Mutex::new(0),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn executor(&self) -> &dyn HttpExecutor {
        self.executor.as_ref()
    }

    /// Id the next successful clone will receive.
    pub fn next_session_id(&self) -> SessionId {
        *self.next_session_id.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// A session directory and its control file, not yet attached anywhere.
struct SessionDir {
    dir: Arc<Node<WebFile>>,
    ctl: Arc<Node<WebFile>>,
}

/// Assemble `<id>/{ctl,body,parsed/*}` off to the side.
///
/// Nothing is visible until the caller attaches the directory, so an early
/// return simply drops whatever was built.
fn build_session_dir(id: SessionId, state: &Arc<RootState>) -> Result<SessionDir> {
    let owner = state.config().owner.as_str();
    let dir = Node::dir(id.to_string(), owner, Mode::dir(0o555));
    let session = SessionCell::new(id, Arc::downgrade(&dir));

    let ctl = dir.add(Node::file(
        "ctl",
        owner,
        Mode::file(0o666),
        WebFile::SessionCtl(CtlFile::new(Arc::clone(&session))),
    ))?;
    dir.add(Node::file(
        "body",
        owner,
        Mode::file(0o444),
        WebFile::SessionBody(BodyFile::new(Arc::clone(&session), Arc::clone(state))),
    ))?;

    let parsed = dir.add(Node::dir("parsed", owner, Mode::dir(0o555)))?;
    for kind in ParsedKind::ALL {
        parsed.add(Node::file(
            kind.name(),
            owner,
            Mode::file(0o444),
            WebFile::Parsed(ParsedFile::new(kind, Arc::clone(&session))),
        ))?;
    }

    Ok(SessionDir { dir, ctl })
}

/// The root `clone` file.
///
/// Each read at offset zero allocates a session, returns its id, and
/// rebinds the reading handle to the new session's `ctl`.
pub struct CloneFile {
    state: Arc<RootState>,
    root: Weak<Node<WebFile>>,
}

impl CloneFile {
    pub fn new(state: Arc<RootState>, root: Weak<Node<WebFile>>) -> Self {
        Self { state, root }
    }

    pub fn read(&self, fid: &mut Fid<WebFile>, buf: &mut [u8]) -> Result<usize> {
        // Held until the directory is attached, so ids are handed out in order.
        let mut next = self
            .state
            .next_session_id
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let id = *next;

        let session = build_session_dir(id, &self.state)?;
        let out = format!("{}\n", id);
        if buf.len() < out.len() {
            return Err(Error::BufferTooSmall {
                needed: out.len(),
                available: buf.len(),
            });
        }

        let root = self
            .root
            .upgrade()
            .ok_or_else(|| TreeError::NotFound("/".to_string()))?;
        root.add(session.dir)?;
        *next += 1;
        drop(next);

        fid.rebind(session.ctl);
        tracing::info!(session = id, "clone: new session");

        buf[..out.len()].copy_from_slice(out.as_bytes());
        Ok(out.len())
    }
}

/// The root `ctl` file, reporting the global configuration.
pub struct RootCtl {
    state: Arc<RootState>,
}

impl RootCtl {
    pub fn new(state: Arc<RootState>) -> Self {
        Self { state }
    }

    pub fn read(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        Ok(read_at(self.state.config().render().as_bytes(), buf, offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webfs_http::mock::MockExecutor;

    fn state() -> Arc<RootState> {
        Arc::new(RootState::new(
            Config::default().with_owner("glenda"),
            Arc::new(MockExecutor::new()),
        ))
    }

    #[test]
    fn session_dir_layout() {
        let session = build_session_dir(7, &state()).unwrap();
        assert_eq!(session.dir.name(), "7");
        assert_eq!(session.dir.owner(), "glenda");
        assert_eq!(session.dir.listing().unwrap(), "body\nctl\nparsed/\n");
        assert_eq!(session.ctl.mode().perm(), 0o666);

        let parsed = session.dir.child("parsed").unwrap();
        assert_eq!(parsed.children().len(), ParsedKind::ALL.len());
        assert!(parsed.child("fragment").is_some());
        assert_eq!(session.dir.child("body").unwrap().mode().perm(), 0o444);
    }

    #[test]
    fn root_ctl_renders_config() {
        let ctl = RootCtl::new(state());
        let mut buf = [0u8; 64];
        let n = ctl.read(&mut buf, 0).unwrap();
        assert_eq!(&buf[..n], b"useragent hjdicks\ntimeout 10000\n");

        let n = ctl.read(&mut buf, 10).unwrap();
        assert_eq!(&buf[..n], b"hjdicks\ntimeout 10000\n");
    }

    #[test]
    fn counter_starts_at_zero() {
        assert_eq!(state().next_session_id(), 0);
    }
}
