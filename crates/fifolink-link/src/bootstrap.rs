use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::dir::ChannelDir;
use crate::error::{LinkError, Result};

/// Environment variable carrying the channel directory to child processes.
pub const FIFO_ENV_VAR: &str = "LTP_FIFO_PATH";

/// Settle on the channel directory for this process.
///
/// A directory the caller owns (e.g. its freshly created temp dir) wins and
/// is published through [`FIFO_ENV_VAR`] so spawned children inherit it.
/// Otherwise the directory is taken from [`FIFO_ENV_VAR`].
pub fn init(owned: Option<&Path>) -> Result<ChannelDir> {
    let inherited = std::env::var_os(FIFO_ENV_VAR);
    let (path, publish) = select_dir(owned, inherited)?;
    let dir = ChannelDir::new(path)?;
    if publish {
        dir.publish();
    }
    debug!(dir = ?dir.path(), published = publish, "channel directory ready");
    Ok(dir)
}

fn select_dir(owned: Option<&Path>, inherited: Option<OsString>) -> Result<(PathBuf, bool)> {
    if let Some(owned) = owned.filter(|p| !p.as_os_str().is_empty()) {
        return Ok((owned.to_path_buf(), true));
    }
    match inherited {
        Some(value) if !value.is_empty() => Ok((PathBuf::from(value), false)),
        _ => Err(LinkError::NotInitialized),
    }
}

impl ChannelDir {
    /// Read the directory a parent published through [`FIFO_ENV_VAR`].
    pub fn from_env() -> Result<Self> {
        let (path, _) = select_dir(None, std::env::var_os(FIFO_ENV_VAR))?;
        Self::new(path)
    }

    /// Set [`FIFO_ENV_VAR`] in this process so later children inherit it.
    pub fn publish(&self) {
        std::env::set_var(FIFO_ENV_VAR, self.path());
    }

    /// Hand the directory to one child process only.
    pub fn export_to<'a>(&self, command: &'a mut Command) -> &'a mut Command {
        command.env(FIFO_ENV_VAR, self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owned_dir_wins_and_is_published() {
        let (path, publish) = select_dir(
            Some(Path::new("/tmp/owned")),
            Some(OsString::from("/tmp/inherited")),
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/tmp/owned"));
        assert!(publish);
    }

    #[test]
    fn inherited_dir_used_without_owned() {
        let (path, publish) = select_dir(None, Some(OsString::from("/tmp/inherited"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/inherited"));
        assert!(!publish);
    }

    #[test]
    fn nothing_to_go_on_is_not_initialized() {
        assert!(matches!(
            select_dir(None, None),
            Err(LinkError::NotInitialized)
        ));
        assert!(matches!(
            select_dir(Some(Path::new("")), Some(OsString::new())),
            Err(LinkError::NotInitialized)
        ));
    }

    // Only test in this crate that touches LTP_FIFO_PATH.
    #[test]
    fn init_publishes_owned_dir_for_inheritance() {
        let tmp = tempfile::tempdir().unwrap();

        let dir = init(Some(tmp.path())).expect("owned dir should initialize");
        assert_eq!(dir.path(), tmp.path());
        assert_eq!(
            std::env::var_os(FIFO_ENV_VAR).as_deref(),
            Some(tmp.path().as_os_str())
        );

        let inherited = init(None).expect("published dir should be inherited");
        assert_eq!(inherited.path(), tmp.path());
        let from_env = ChannelDir::from_env().expect("from_env should see published dir");
        assert_eq!(from_env.path(), tmp.path());
        assert!(!from_env.is_owned());
    }

    #[test]
    fn export_sets_child_environment() {
        let dir = ChannelDir::new("/tmp/exported").unwrap();
        let mut cmd = Command::new("true");
        dir.export_to(&mut cmd);

        let value = cmd
            .get_envs()
            .find(|(key, _)| *key == FIFO_ENV_VAR)
            .and_then(|(_, value)| value);
        assert_eq!(value, Some(std::ffi::OsStr::new("/tmp/exported")));
    }
}
