//! The closed set of files webfs serves.

use webfs_tree::{Fid, FileHandler, OpenMode};

use crate::body::BodyFile;
use crate::ctl::CtlFile;
use crate::error::{Error, Result};
use crate::header::HeaderFile;
use crate::parsed::ParsedFile;
use crate::root::{CloneFile, RootCtl};

/// How a file treats the read offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadPolicy {
    /// Only offset zero yields data; any other offset is end of file.
    SingleShot,
    /// Standard random access over the file's contents.
    Ranged,
    /// The offset is ignored; every read starts from the beginning.
    FromStart,
}

/// Every kind of file in the tree.
pub enum WebFile {
    Clone(CloneFile),
    RootCtl(RootCtl),
    SessionCtl(CtlFile),
    SessionBody(BodyFile),
    Parsed(ParsedFile),
    Header(HeaderFile),
}

impl WebFile {
    pub fn read_policy(&self) -> ReadPolicy {
        match self {
            WebFile::Clone(_) | WebFile::SessionCtl(_) | WebFile::Header(_) => {
                ReadPolicy::SingleShot
            }
            WebFile::RootCtl(_) | WebFile::SessionBody(_) => ReadPolicy::Ranged,
            WebFile::Parsed(_) => ReadPolicy::FromStart,
        }
    }
}

/// Copy all of `value` into `buf`, or fail if it does not fit.
pub(crate) fn single_shot(value: &[u8], buf: &mut [u8]) -> Result<usize> {
    if buf.len() < value.len() {
        return Err(Error::BufferTooSmall {
            needed: value.len(),
            available: buf.len(),
        });
    }
    buf[..value.len()].copy_from_slice(value);
    Ok(value.len())
}

impl FileHandler for WebFile {
    type Error = Error;

    fn open(&self, _fid: &mut Fid<Self>, _mode: OpenMode) -> Result<()> {
        match self {
            WebFile::SessionBody(body) => body.open(),
            _ => Ok(()),
        }
    }

    fn read(&self, fid: &mut Fid<Self>, buf: &mut [u8], offset: u64) -> Result<usize> {
        if self.read_policy() == ReadPolicy::SingleShot && offset > 0 {
            return Ok(0);
        }
        match self {
            WebFile::Clone(clone) => clone.read(fid, buf),
            WebFile::RootCtl(ctl) => ctl.read(buf, offset),
            WebFile::SessionCtl(ctl) => ctl.read(buf),
            WebFile::SessionBody(body) => body.read(buf, offset),
            WebFile::Parsed(parsed) => parsed.read(buf),
            WebFile::Header(header) => header.read(buf),
        }
    }

    fn write(&self, _fid: &mut Fid<Self>, data: &[u8], _offset: u64) -> Result<usize> {
        match self {
            WebFile::SessionCtl(ctl) => ctl.write(data),
            WebFile::Clone(_) => Err(Error::NotImplemented("clone write")),
            _ => Err(Error::NotImplemented("write")),
        }
    }
}
