//! Short-lived, locally scoped handles to downloaded binary content.
//!
//! A [`TransientRef`] is the client-side equivalent of an object URL: it names
//! bytes held in memory until the owner revokes it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct Blob {
    pub bytes: Bytes,
    pub content_type: String,
}

/// Handle to a registered blob. Deliberately not `Clone`: exactly one owner
/// is responsible for revoking it.
#[derive(Debug, PartialEq, Eq)]
pub struct TransientRef {
    id: Uuid,
    uri: String,
    content_type: String,
    len: usize,
}

impl TransientRef {
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[derive(Clone, Default)]
pub struct TransientStore {
    blobs: Arc<Mutex<HashMap<Uuid, Blob>>>,
}

impl TransientStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, bytes: Bytes, content_type: impl Into<String>) -> TransientRef {
        let id = Uuid::new_v4();
        let content_type = content_type.into();
        let handle = TransientRef {
            id,
            uri: format!("blob:jobboard/{}", id),
            content_type: content_type.clone(),
            len: bytes.len(),
        };
        self.blobs
            .lock()
            .expect("transient store mutex poisoned")
            .insert(id, Blob { bytes, content_type });
        debug!("Created transient reference {}", handle.uri);
        handle
    }

    pub fn resolve(&self, handle: &TransientRef) -> Option<Blob> {
        self.resolve_uri(&handle.uri)
    }

    pub fn resolve_uri(&self, uri: &str) -> Option<Blob> {
        let id = uri
            .strip_prefix("blob:jobboard/")
            .and_then(|raw| Uuid::parse_str(raw).ok())?;
        self.blobs
            .lock()
            .expect("transient store mutex poisoned")
            .get(&id)
            .cloned()
    }

    /// Releases the bytes behind `handle`. Returns false if it was already gone.
    pub fn revoke(&self, handle: TransientRef) -> bool {
        let removed = self
            .blobs
            .lock()
            .expect("transient store mutex poisoned")
            .remove(&handle.id)
            .is_some();
        debug!("Revoked transient reference {}", handle.uri);
        removed
    }

    /// Releases every live reference; used when the session ends.
    pub fn revoke_all(&self) -> usize {
        let mut blobs = self.blobs.lock().expect("transient store mutex poisoned");
        let count = blobs.len();
        blobs.clear();
        count
    }

    pub fn live_count(&self) -> usize {
        self.blobs
            .lock()
            .expect("transient store mutex poisoned")
            .len()
    }

    pub fn is_live(&self, handle: &TransientRef) -> bool {
        self.blobs
            .lock()
            .expect("transient store mutex poisoned")
            .contains_key(&handle.id)
    }

    /// Copies the referenced bytes to `dir/file_name` and returns the path.
    pub async fn persist(&self, handle: &TransientRef, dir: &Path, file_name: &str) -> Result<PathBuf> {
        self.persist_uri(&handle.uri, dir, file_name).await
    }

    /// Same as [`persist`](Self::persist), addressed by URI. Only the final
    /// component of `file_name` is used.
    pub async fn persist_uri(&self, uri: &str, dir: &Path, file_name: &str) -> Result<PathBuf> {
        let blob = self
            .resolve_uri(uri)
            .ok_or_else(|| Error::NotFound(format!("Transient reference {} was released", uri)))?;
        let safe_name = Path::new(file_name)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "resume.pdf".into());
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(safe_name);
        tokio::fs::write(&path, &blob.bytes).await?;
        Ok(path)
    }
}
