use std::collections::BTreeMap;
use std::fs;

use fifolink_transport::create_fifo;
use tracing::{debug, info};

use crate::dir::{validate_name, Access, ChannelDir, ChannelKind};
use crate::error::{LinkError, Result};

/// Mode bits requested for new channels (the process umask still applies).
pub const FIFO_MODE: u32 = 0o777;

/// A link found in the channel directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    pub name: String,
    /// The request channel exists.
    pub request: bool,
    /// The ack channel exists.
    pub ack: bool,
}

impl LinkEntry {
    /// Both channels are present.
    pub fn is_complete(&self) -> bool {
        self.request && self.ack
    }
}

impl ChannelDir {
    /// Create the request and ack channels of link `name`.
    ///
    /// Fails if either channel already exists.
    pub fn create(&self, name: &str) -> Result<()> {
        for kind in [ChannelKind::Request, ChannelKind::Ack] {
            let path = self.resolve(name, kind, None)?;
            create_fifo(&path, FIFO_MODE).map_err(|source| LinkError::Create {
                path: path.clone(),
                source,
            })?;
            debug!(?path, "created channel");
        }
        info!(name, dir = ?self.path(), "created link");
        Ok(())
    }

    /// Remove both channels of link `name`.
    ///
    /// Unless `ignore_errors` is set, both channels must exist and be
    /// readable and writable, and any removal failure is returned.
    pub fn destroy(&self, name: &str, ignore_errors: bool) -> Result<()> {
        let access = (!ignore_errors).then_some(Access::ReadWrite);
        let req = self.resolve(name, ChannelKind::Request, access)?;
        let ack = self.resolve(name, ChannelKind::Ack, access)?;

        for path in [req, ack] {
            if let Err(source) = fs::remove_file(&path) {
                if !ignore_errors {
                    return Err(LinkError::Remove { path, source });
                }
                debug!(?path, %source, "ignoring removal failure");
            }
        }
        info!(name, "destroyed link");
        Ok(())
    }

    /// Destroy-if-exists then create: drops any stale state from earlier use.
    pub fn recreate(&self, name: &str) -> Result<()> {
        self.destroy(name, true)?;
        self.create(name)
    }

    /// Links with at least one channel present, sorted by name.
    pub fn list(&self) -> Result<Vec<LinkEntry>> {
        let read_dir = fs::read_dir(self.path()).map_err(|source| LinkError::ReadDir {
            path: self.path().to_path_buf(),
            source,
        })?;

        let marker = format!("{}_", self.prefix());
        let mut links: BTreeMap<String, LinkEntry> = BTreeMap::new();

        for entry in read_dir {
            let entry = entry.map_err(|source| LinkError::ReadDir {
                path: self.path().to_path_buf(),
                source,
            })?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            let Some((name, kind)) = parse_channel_name(file_name, &marker) else {
                continue;
            };

            let link = links.entry(name.to_string()).or_insert_with(|| LinkEntry {
                name: name.to_string(),
                request: false,
                ack: false,
            });
            match kind {
                ChannelKind::Request => link.request = true,
                ChannelKind::Ack => link.ack = true,
            }
        }

        Ok(links.into_values().collect())
    }
}

fn parse_channel_name<'a>(file_name: &'a str, marker: &str) -> Option<(&'a str, ChannelKind)> {
    let rest = file_name.strip_prefix(marker)?;
    let (name, ext) = rest.rsplit_once('.')?;
    let kind = ChannelKind::from_extension(ext)?;
    validate_name(name).ok()?;
    Some((name, kind))
}
