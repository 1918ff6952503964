//! JSON-file subscriber registry.
//!
//! The file holds a JSON array of chat ids. Every change rewrites it in
//! full: contents go to a sibling temp file which is then renamed over the
//! original, so readers never see a half-written file.

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::domain::id::SubscriberId;
use crate::error::RegistryError;
use crate::port::outbound::registry::SubscriberRegistry;

pub struct FileSubscriberRegistry {
    path: PathBuf,
    subscribers: RwLock<BTreeSet<SubscriberId>>,
}

impl FileSubscriberRegistry {
    /// Open the registry at `path`, creating an empty file if missing.
    ///
    /// An empty (zero-byte) file is treated as an empty set.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RegistryError> {
        let path = path.into();
        let subscribers = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                BTreeSet::new()
            } else {
                serde_json::from_str::<Vec<SubscriberId>>(&raw)?
                    .into_iter()
                    .collect()
            }
        } else {
            BTreeSet::new()
        };

        let registry = Self {
            path,
            subscribers: RwLock::new(subscribers),
        };
        if !registry.path.exists() {
            registry.persist(&registry.subscribers.read())?;
        }

        info!(
            path = %registry.path.display(),
            subscribers = registry.len(),
            "Subscriber registry opened"
        );
        Ok(registry)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, subscribers: &BTreeSet<SubscriberId>) -> Result<(), RegistryError> {
        let ids: Vec<SubscriberId> = subscribers.iter().copied().collect();
        let body = serde_json::to_vec_pretty(&ids)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.temp_path();
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&body)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), count = ids.len(), "Subscribers persisted");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "subscribers.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SubscriberRegistry for FileSubscriberRegistry {
    fn add(&self, id: SubscriberId) -> Result<bool, RegistryError> {
        let mut subscribers = self.subscribers.write();
        if !subscribers.insert(id) {
            return Ok(false);
        }
        if let Err(e) = self.persist(&subscribers) {
            subscribers.remove(&id);
            return Err(e);
        }
        Ok(true)
    }

    fn remove(&self, id: SubscriberId) -> Result<bool, RegistryError> {
        let mut subscribers = self.subscribers.write();
        if !subscribers.remove(&id) {
            return Ok(false);
        }
        if let Err(e) = self.persist(&subscribers) {
            subscribers.insert(id);
            return Err(e);
        }
        Ok(true)
    }

    fn all(&self) -> Vec<SubscriberId> {
        self.subscribers.read().iter().copied().collect()
    }

    fn len(&self) -> usize {
        self.subscribers.read().len()
    }
}
