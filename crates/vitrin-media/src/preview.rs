//! Preview handle generation and revocation.
//!
//! A preview handle is a transient, locally-dereferenceable URI used to
//! render a thumbnail before upload. Handles are a scarce resource: the
//! factory that creates one must be told when it is no longer needed, and
//! the [`StagingManager`](crate::staging::StagingManager) is the sole
//! owner and sole revoker of every handle it requests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use uuid::Uuid;

use crate::asset::MediaFile;

/// A transient reference to locally-renderable preview content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewHandle {
    pub id: Uuid,
    pub uri: String,
}

/// Source of preview handles.
///
/// Implementations must tolerate `revoke` for any handle they created,
/// exactly once per handle. The staging manager guarantees the
/// exactly-once part; the factory only has to release the resource.
pub trait PreviewFactory: Send + Sync {
    fn create(&self, file: &MediaFile) -> PreviewHandle;
    fn revoke(&self, handle: &PreviewHandle);
}

/// In-memory factory with full accounting.
///
/// Tracks live handles so tests (and debug assertions in a host app) can
/// verify that a staging session neither leaks handles nor revokes one
/// twice.
#[derive(Debug, Default)]
pub struct InMemoryPreviews {
    created: AtomicUsize,
    revoked: AtomicUsize,
    double_revokes: AtomicUsize,
    live: Mutex<HashSet<Uuid>>,
}

impl InMemoryPreviews {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles created over the factory's lifetime.
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Handles revoked over the factory's lifetime.
    pub fn revoked(&self) -> usize {
        self.revoked.load(Ordering::SeqCst)
    }

    /// Handles currently outstanding (created but not revoked).
    pub fn outstanding(&self) -> usize {
        self.live.lock().expect("preview accounting poisoned").len()
    }

    /// Revocations of handles that were not live. Each one is a defect
    /// in the caller.
    pub fn double_revokes(&self) -> usize {
        self.double_revokes.load(Ordering::SeqCst)
    }
}

impl PreviewFactory for InMemoryPreviews {
    fn create(&self, file: &MediaFile) -> PreviewHandle {
        let id = Uuid::new_v4();
        self.created.fetch_add(1, Ordering::SeqCst);
        self.live
            .lock()
            .expect("preview accounting poisoned")
            .insert(id);

        tracing::trace!(handle = %id, file = %file.name, "preview handle created");
        PreviewHandle {
            id,
            uri: format!("mem://preview/{id}"),
        }
    }

    fn revoke(&self, handle: &PreviewHandle) {
        let was_live = self
            .live
            .lock()
            .expect("preview accounting poisoned")
            .remove(&handle.id);

        if was_live {
            self.revoked.fetch_add(1, Ordering::SeqCst);
            tracing::trace!(handle = %handle.id, "preview handle revoked");
        } else {
            self.double_revokes.fetch_add(1, Ordering::SeqCst);
            tracing::warn!(handle = %handle.id, "revoke of a handle that was not live");
        }
    }
}
