use std::ffi::CString;
use std::fmt;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use crate::error::{LinkError, Result};

/// File name prefix shared with the shell-side helpers.
pub const DEFAULT_PREFIX: &str = "tst_fifo";

/// Direction a channel carries within a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Message bytes, sender to receiver.
    Request,
    /// The `OK` confirmation, receiver to sender.
    Ack,
}

impl ChannelKind {
    /// File extension used on disk.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Request => "req",
            Self::Ack => "ack",
        }
    }

    pub(crate) fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "req" => Some(Self::Request),
            "ack" => Some(Self::Ack),
            _ => None,
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Access a resolved channel path must grant, checked with `access(2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
    ReadWrite,
}

impl Access {
    fn mode(self) -> libc::c_int {
        match self {
            Self::Read => libc::R_OK,
            Self::Write => libc::W_OK,
            Self::ReadWrite => libc::R_OK | libc::W_OK,
        }
    }
}

/// The shared directory all channels of a link group live in.
///
/// Cloning is cheap; clones share ownership of a temporary directory created
/// by [`ChannelDir::create_temp`], which is removed when the last clone drops.
#[derive(Clone)]
pub struct ChannelDir {
    path: PathBuf,
    prefix: String,
    owned: Option<Arc<TempDir>>,
}

impl ChannelDir {
    /// Use an existing directory. Relative paths are made absolute.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(LinkError::NotInitialized);
        }
        let path = std::path::absolute(path).map_err(|source| LinkError::Inaccessible {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path,
            prefix: DEFAULT_PREFIX.to_string(),
            owned: None,
        })
    }

    /// Create a fresh temporary directory owned by this value.
    pub fn create_temp() -> Result<Self> {
        Self::create_temp_in(std::env::temp_dir())
    }

    /// Like [`ChannelDir::create_temp`], under `parent` instead of the system temp dir.
    pub fn create_temp_in(parent: impl AsRef<Path>) -> Result<Self> {
        let parent = parent.as_ref();
        let tmp = tempfile::Builder::new()
            .prefix("fifolink-")
            .tempdir_in(parent)
            .map_err(|source| LinkError::TempDir {
                parent: parent.to_path_buf(),
                source,
            })?;
        Ok(Self {
            path: tmp.path().to_path_buf(),
            prefix: DEFAULT_PREFIX.to_string(),
            owned: Some(Arc::new(tmp)),
        })
    }

    /// Override the channel file name prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Directory holding the channels.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Channel file name prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether this value owns (and will clean up) its directory.
    pub fn is_owned(&self) -> bool {
        self.owned.is_some()
    }

    /// Compute the path of one channel of link `name`.
    ///
    /// With `access` set, the path must exist and grant that access.
    pub fn resolve(&self, name: &str, kind: ChannelKind, access: Option<Access>) -> Result<PathBuf> {
        validate_name(name)?;
        let path = self
            .path
            .join(format!("{}_{}.{}", self.prefix, name, kind.extension()));
        if let Some(access) = access {
            check_access(&path, access)?;
        }
        Ok(path)
    }
}

impl fmt::Debug for ChannelDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelDir")
            .field("path", &self.path)
            .field("prefix", &self.prefix)
            .field("owned", &self.is_owned())
            .finish()
    }
}

pub(crate) fn validate_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "must not be empty"
    } else if name.contains('/') {
        "must not contain a path separator"
    } else if name.contains('\0') {
        "must not contain a NUL byte"
    } else if name == "." || name == ".." {
        "must not be a relative directory name"
    } else {
        return Ok(());
    };
    Err(LinkError::InvalidName {
        name: name.to_string(),
        reason,
    })
}

fn check_access(path: &Path, access: Access) -> Result<()> {
    let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| LinkError::Inaccessible {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "path contains a NUL byte"),
    })?;

    // SAFETY: `c_path` is a valid NUL-terminated string that outlives the call.
    let rc = unsafe { libc::access(c_path.as_ptr(), access.mode()) };
    if rc != 0 {
        return Err(LinkError::Inaccessible {
            path: path.to_path_buf(),
            source: std::io::Error::last_os_error(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_builds_prefixed_paths() {
        let dir = ChannelDir::new("/run/links").unwrap();
        assert_eq!(
            dir.resolve("p2c", ChannelKind::Request, None).unwrap(),
            PathBuf::from("/run/links/tst_fifo_p2c.req")
        );
        assert_eq!(
            dir.resolve("p2c", ChannelKind::Ack, None).unwrap(),
            PathBuf::from("/run/links/tst_fifo_p2c.ack")
        );
    }

    #[test]
    fn custom_prefix_is_used() {
        let dir = ChannelDir::new("/run/links").unwrap().with_prefix("suite");
        assert_eq!(
            dir.resolve("c2p", ChannelKind::Ack, None).unwrap(),
            PathBuf::from("/run/links/suite_c2p.ack")
        );
    }

    #[test]
    fn relative_dir_becomes_absolute() {
        let dir = ChannelDir::new("relative/links").unwrap();
        assert!(dir.path().is_absolute());
    }

    #[test]
    fn empty_dir_is_not_initialized() {
        assert!(matches!(ChannelDir::new(""), Err(LinkError::NotInitialized)));
    }

    #[test]
    fn rejects_unusable_names() {
        let dir = ChannelDir::new("/run/links").unwrap();
        for name in ["", "a/b", "..", ".", "nul\0name"] {
            let err = dir.resolve(name, ChannelKind::Request, None).unwrap_err();
            assert!(
                matches!(err, LinkError::InvalidName { .. }),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn access_check_fails_for_missing_channel() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = ChannelDir::new(tmp.path()).unwrap();
        let err = dir
            .resolve("missing", ChannelKind::Request, Some(Access::Write))
            .unwrap_err();
        assert!(matches!(err, LinkError::Inaccessible { .. }));
    }

    #[test]
    fn temp_dir_failure_names_the_parent() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("no-such-parent");

        let err = ChannelDir::create_temp_in(&missing).unwrap_err();
        assert!(matches!(err, LinkError::TempDir { ref parent, .. } if *parent == missing));
        let message = err.to_string();
        assert!(message.contains("temporary channel directory"), "{message}");
        assert!(!message.contains("mkfifo"), "{message}");
    }

    #[test]
    fn access_modes_are_checked() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = ChannelDir::new(tmp.path()).unwrap();
        let path = dir.resolve("ro", ChannelKind::Request, None).unwrap();
        std::fs::write(&path, b"").unwrap();

        for access in [Access::Read, Access::Write, Access::ReadWrite] {
            assert_eq!(
                dir.resolve("ro", ChannelKind::Request, Some(access)).unwrap(),
                path
            );
        }
    }

    #[test]
    fn temp_dir_is_removed_with_last_clone() {
        let dir = ChannelDir::create_temp().unwrap();
        let path = dir.path().to_path_buf();
        assert!(dir.is_owned());
        assert!(path.is_dir());

        let clone = dir.clone();
        drop(dir);
        assert!(path.is_dir(), "clone keeps the directory alive");
        drop(clone);
        assert!(!path.exists());
    }
}
