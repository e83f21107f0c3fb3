use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::future::Future;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::services::api_client::{ApiClient, Document};
use crate::store::transient::{Blob, TransientRef, TransientStore};

enum ViewerState {
    Idle,
    Loading { resource_id: String },
    Ready { resource_id: String, document: TransientRef },
    Failed { resource_id: String, message: String },
}

/// Observable state of a viewer, safe to hand out to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerStatus {
    Idle,
    Loading { resource_id: String },
    Ready { resource_id: String, uri: String, content_type: String },
    Failed { resource_id: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    Opened { uri: String },
    /// Another document was requested or the viewer was closed meanwhile.
    Superseded,
    /// This resource is already being fetched.
    AlreadyLoading,
}

struct Inner {
    view: ViewerState,
    generation: u64,
    /// Fetches in flight per resource, superseded ones included.
    busy: HashMap<String, usize>,
}

impl Inner {
    fn is_loading(&self, resource_id: &str) -> bool {
        matches!(&self.view, ViewerState::Loading { resource_id: current } if current == resource_id)
    }
}

/// Clears the busy flag for one fetch even if the caller abandons it.
struct LoadGuard {
    inner: Arc<Mutex<Inner>>,
    resource_id: String,
    generation: u64,
}

impl Drop for LoadGuard {
    fn drop(&mut self) {
        let mut inner = self.inner.lock().expect("viewer mutex poisoned");
        if let Some(count) = inner.busy.get_mut(&self.resource_id) {
            *count -= 1;
            if *count == 0 {
                inner.busy.remove(&self.resource_id);
            }
        }
        if inner.generation == self.generation
            && matches!(inner.view, ViewerState::Loading { .. })
        {
            inner.view = ViewerState::Idle;
        }
    }
}

/// Lazily loads one binary document at a time into a transient reference.
///
/// `Idle -> Loading -> Ready -> Idle` on close, `Idle -> Loading -> Failed ->
/// Idle` on dismiss. Opening another document releases the one on display.
pub struct DocumentLoader {
    documents: TransientStore,
    inner: Arc<Mutex<Inner>>,
    failure_message: String,
}

impl DocumentLoader {
    pub fn new(documents: TransientStore, failure_message: impl Into<String>) -> Self {
        Self {
            documents,
            inner: Arc::new(Mutex::new(Inner {
                view: ViewerState::Idle,
                generation: 0,
                busy: HashMap::new(),
            })),
            failure_message: failure_message.into(),
        }
    }

    /// A document whose reference was revoked elsewhere, e.g. on logout,
    /// reads as `Idle`.
    pub fn status(&self) -> ViewerStatus {
        let mut inner = self.inner.lock().expect("viewer mutex poisoned");
        self.drop_revoked(&mut inner);
        match &inner.view {
            ViewerState::Idle => ViewerStatus::Idle,
            ViewerState::Loading { resource_id } => ViewerStatus::Loading {
                resource_id: resource_id.clone(),
            },
            ViewerState::Ready {
                resource_id,
                document,
            } => ViewerStatus::Ready {
                resource_id: resource_id.clone(),
                uri: document.uri().to_string(),
                content_type: document.content_type().to_string(),
            },
            ViewerState::Failed {
                resource_id,
                message,
            } => ViewerStatus::Failed {
                resource_id: resource_id.clone(),
                message: message.clone(),
            },
        }
    }

    pub fn is_busy(&self, resource_id: &str) -> bool {
        self.inner
            .lock()
            .expect("viewer mutex poisoned")
            .busy
            .contains_key(resource_id)
    }

    /// Bytes of the document on display, if any.
    pub fn document(&self) -> Option<Blob> {
        let mut inner = self.inner.lock().expect("viewer mutex poisoned");
        self.drop_revoked(&mut inner);
        match &inner.view {
            ViewerState::Ready { document, .. } => self.documents.resolve(document),
            _ => None,
        }
    }

    /// Writes the document on display to `dir/file_name`. `None` when nothing
    /// is on display.
    pub async fn save(&self, dir: &Path, file_name: &str) -> Result<Option<PathBuf>> {
        let uri = {
            let mut inner = self.inner.lock().expect("viewer mutex poisoned");
            self.drop_revoked(&mut inner);
            match &inner.view {
                ViewerState::Ready { document, .. } => document.uri().to_string(),
                _ => return Ok(None),
            }
        };
        let path = self.documents.persist_uri(&uri, dir, file_name).await?;
        Ok(Some(path))
    }

    fn drop_revoked(&self, inner: &mut Inner) {
        if let ViewerState::Ready { document, .. } = &inner.view {
            if !self.documents.is_live(document) {
                debug!("Document {} was released elsewhere", document.uri());
                inner.view = ViewerState::Idle;
            }
        }
    }

    pub async fn open<Fut>(&self, resource_id: &str, fetch: Fut) -> Result<OpenOutcome>
    where
        Fut: Future<Output = Result<Document>>,
    {
        let guard = {
            let mut inner = self.inner.lock().expect("viewer mutex poisoned");
            if inner.is_loading(resource_id) {
                debug!("Document {} is already loading", resource_id);
                return Ok(OpenOutcome::AlreadyLoading);
            }
            *inner.busy.entry(resource_id.to_string()).or_insert(0) += 1;
            inner.generation += 1;
            let previous = std::mem::replace(
                &mut inner.view,
                ViewerState::Loading {
                    resource_id: resource_id.to_string(),
                },
            );
            self.release(previous);
            LoadGuard {
                inner: Arc::clone(&self.inner),
                resource_id: resource_id.to_string(),
                generation: inner.generation,
            }
        };

        let result = fetch.await;

        let mut inner = self.inner.lock().expect("viewer mutex poisoned");
        if inner.generation != guard.generation {
            debug!("Dropped superseded document {}", resource_id);
            drop(inner);
            return Ok(OpenOutcome::Superseded);
        }

        match result {
            Ok(document) => {
                let handle = self.documents.create(document.bytes, document.content_type);
                let uri = handle.uri().to_string();
                inner.view = ViewerState::Ready {
                    resource_id: resource_id.to_string(),
                    document: handle,
                };
                info!("Opened document {} as {}", resource_id, uri);
                drop(inner);
                Ok(OpenOutcome::Opened { uri })
            }
            Err(err) => {
                warn!("Failed to load document {}: {}", resource_id, err);
                inner.view = ViewerState::Failed {
                    resource_id: resource_id.to_string(),
                    message: self.failure_message.clone(),
                };
                drop(inner);
                Err(err)
            }
        }
    }

    pub async fn open_resume(&self, api: &ApiClient, application_id: &str) -> Result<OpenOutcome> {
        self.open(application_id, api.fetch_resume(application_id))
            .await
    }

    /// Dismisses the viewer, releasing whatever it displayed. A fetch still in
    /// flight will be discarded when it lands.
    pub fn close(&self) {
        let mut inner = self.inner.lock().expect("viewer mutex poisoned");
        inner.generation += 1;
        let previous = std::mem::replace(&mut inner.view, ViewerState::Idle);
        self.release(previous);
    }

    fn release(&self, state: ViewerState) {
        if let ViewerState::Ready { document, .. } = state {
            self.documents.revoke(document);
        }
    }
}

impl Drop for DocumentLoader {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.lock() {
            let previous = std::mem::replace(&mut inner.view, ViewerState::Idle);
            if let ViewerState::Ready { document, .. } = previous {
                self.documents.revoke(document);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use bytes::Bytes;
    use tokio::sync::oneshot;

    fn pdf(body: &'static [u8]) -> Document {
        Document {
            bytes: Bytes::from_static(body),
            content_type: "application/pdf".to_string(),
        }
    }

    #[tokio::test]
    async fn open_then_close_releases_reference() {
        let store = TransientStore::new();
        let loader = DocumentLoader::new(store.clone(), "Failed to load resume");

        let first = loader.open("a1", async { Ok(pdf(b"one")) }).await.unwrap();
        let OpenOutcome::Opened { uri: first_uri } = first else {
            panic!("expected document to open");
        };
        assert_eq!(store.live_count(), 1);
        assert_eq!(loader.document().unwrap().bytes, Bytes::from_static(b"one"));

        loader.close();
        assert_eq!(loader.status(), ViewerStatus::Idle);
        assert_eq!(store.live_count(), 0);
        assert!(store.resolve_uri(&first_uri).is_none());

        let second = loader.open("a2", async { Ok(pdf(b"two")) }).await.unwrap();
        let OpenOutcome::Opened { uri: second_uri } = second else {
            panic!("expected document to open");
        };
        assert_ne!(first_uri, second_uri);
        assert_eq!(store.live_count(), 1);
    }

    #[tokio::test]
    async fn opening_another_document_releases_previous() {
        let store = TransientStore::new();
        let loader = DocumentLoader::new(store.clone(), "Failed to load resume");
        loader.open("a1", async { Ok(pdf(b"one")) }).await.unwrap();
        loader.open("a2", async { Ok(pdf(b"two")) }).await.unwrap();
        assert_eq!(store.live_count(), 1);
        assert!(matches!(loader.status(), ViewerStatus::Ready { resource_id, .. } if resource_id == "a2"));
    }

    #[tokio::test]
    async fn failure_leaves_no_reference_and_dismisses_to_idle() {
        let store = TransientStore::new();
        let loader = DocumentLoader::new(store.clone(), "Failed to load resume");
        let err = loader
            .open("a1", async {
                Err::<Document, _>(Error::NotFound("resume missing".into()))
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NotFound);
        assert_eq!(
            loader.status(),
            ViewerStatus::Failed {
                resource_id: "a1".into(),
                message: "Failed to load resume".into()
            }
        );
        assert!(!loader.is_busy("a1"));
        assert_eq!(store.live_count(), 0);

        loader.close();
        assert_eq!(loader.status(), ViewerStatus::Idle);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn busy_state_is_per_resource_and_last_request_wins() {
        let store = TransientStore::new();
        let loader = DocumentLoader::new(store.clone(), "Failed to load resume");
        let (tx_a, rx_a) = oneshot::channel::<Document>();
        let (tx_b, rx_b) = oneshot::channel::<Document>();

        let open_a = loader.open("a", async move { Ok(rx_a.await.unwrap()) });
        let open_b = loader.open("b", async move { Ok(rx_b.await.unwrap()) });
        let drive = async {
            tokio::task::yield_now().await;
            assert!(loader.is_busy("a"));
            assert!(loader.is_busy("b"));
            let duplicate = loader
                .open("b", async { Ok(pdf(b"dup")) })
                .await
                .unwrap();
            assert_eq!(duplicate, OpenOutcome::AlreadyLoading);

            tx_b.send(pdf(b"b")).unwrap();
            while loader.is_busy("b") {
                tokio::task::yield_now().await;
            }
            assert!(loader.is_busy("a"));
            assert!(!loader.is_busy("b"));
            tx_a.send(pdf(b"a")).unwrap();
        };

        let (a, b, ()) = tokio::join!(open_a, open_b, drive);
        assert_eq!(a.unwrap(), OpenOutcome::Superseded);
        assert!(matches!(b.unwrap(), OpenOutcome::Opened { .. }));
        assert!(!loader.is_busy("a"));
        assert_eq!(store.live_count(), 1);
        assert_eq!(loader.document().unwrap().bytes, Bytes::from_static(b"b"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn reopening_a_superseded_document_loads_it_again() {
        let store = TransientStore::new();
        let loader = DocumentLoader::new(store.clone(), "Failed to load resume");
        let (tx_first, rx_first) = oneshot::channel::<Document>();
        let (tx_b, rx_b) = oneshot::channel::<Document>();
        let (tx_again, rx_again) = oneshot::channel::<Document>();

        let first_a = loader.open("a", async move { Ok(rx_first.await.unwrap()) });
        let open_b = loader.open("b", async move { Ok(rx_b.await.unwrap()) });
        let again_a = loader.open("a", async move { Ok(rx_again.await.unwrap()) });
        let drive = async {
            tokio::task::yield_now().await;
            assert_eq!(
                loader.status(),
                ViewerStatus::Loading {
                    resource_id: "a".into()
                }
            );
            tx_first.send(pdf(b"a-first")).unwrap();
            tx_b.send(pdf(b"b")).unwrap();
            tx_again.send(pdf(b"a-again")).unwrap();
        };

        let (first, b, again, ()) = tokio::join!(first_a, open_b, again_a, drive);
        assert_eq!(first.unwrap(), OpenOutcome::Superseded);
        assert_eq!(b.unwrap(), OpenOutcome::Superseded);
        assert!(matches!(again.unwrap(), OpenOutcome::Opened { .. }));
        assert!(matches!(loader.status(), ViewerStatus::Ready { resource_id, .. } if resource_id == "a"));
        assert_eq!(loader.document().unwrap().bytes, Bytes::from_static(b"a-again"));
        assert!(!loader.is_busy("a"));
        assert_eq!(store.live_count(), 1);
    }

    #[tokio::test]
    async fn revoked_elsewhere_reads_as_idle() {
        let store = TransientStore::new();
        let loader = DocumentLoader::new(store.clone(), "Failed to load resume");
        loader.open("a1", async { Ok(pdf(b"one")) }).await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let saved = loader.save(dir.path(), "cv.pdf").await.unwrap().unwrap();
        assert_eq!(std::fs::read(&saved).unwrap(), b"one");

        assert_eq!(store.revoke_all(), 1);
        assert_eq!(loader.status(), ViewerStatus::Idle);
        assert!(loader.document().is_none());
        assert!(loader.save(dir.path(), "cv.pdf").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn dropping_loader_releases_document() {
        let store = TransientStore::new();
        {
            let loader = DocumentLoader::new(store.clone(), "Failed to load resume");
            loader.open("a1", async { Ok(pdf(b"one")) }).await.unwrap();
            assert_eq!(store.live_count(), 1);
        }
        assert_eq!(store.live_count(), 0);
    }
}
