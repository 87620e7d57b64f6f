//! Displayable blob references.
//!
//! A display surface wants a URL-like string it can point at, not a byte
//! buffer. [`DisplayableReference::publish`] parks the encoded bytes in a
//! process-local registry and hands back a `blob:pdfthumb/<uuid>` URL;
//! [`DisplayableReference::resolve`] is the read side used by whatever
//! renders the thumbnail.
//!
//! Ownership of revocation sits with the consumer: the conversion pipeline
//! returns the reference still live, and the component displaying it calls
//! [`DisplayableReference::revoke`] when it is torn down or a newer
//! reference supersedes it. `revoke` consumes the value, so revoking twice
//! or resolving through a revoked handle is unrepresentable. A reference
//! that is dropped without being revoked keeps its blob alive for the rest
//! of the process — a deliberate trade against dangling URLs.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

const URL_PREFIX: &str = "blob:pdfthumb/";

static REGISTRY: Lazy<Mutex<HashMap<Uuid, Arc<[u8]>>>> = Lazy::new(Mutex::default);

fn registry() -> MutexGuard<'static, HashMap<Uuid, Arc<[u8]>>> {
    // A panic while holding this lock leaves only orphaned blobs behind;
    // recover the map rather than poisoning every later conversion.
    REGISTRY.lock().unwrap_or_else(|e| e.into_inner())
}

/// A live, process-local handle to a published blob.
///
/// Deliberately neither `Clone` nor `Drop`: exactly one owner, exactly one
/// possible revocation.
#[derive(Debug)]
pub struct DisplayableReference {
    id: Uuid,
    url: String,
}

impl DisplayableReference {
    /// Register `bytes` and mint a unique URL for them.
    pub fn publish(bytes: &[u8]) -> Self {
        let id = Uuid::new_v4();
        registry().insert(id, Arc::from(bytes));
        debug!("Published blob reference {id} ({} bytes)", bytes.len());
        Self {
            id,
            url: format!("{URL_PREFIX}{id}"),
        }
    }

    /// The URL-like string a display surface uses as an image source.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Look up the bytes behind a reference URL. `None` for unknown,
    /// malformed, or already-revoked URLs.
    pub fn resolve(url: &str) -> Option<Arc<[u8]>> {
        let id = url.strip_prefix(URL_PREFIX)?.parse::<Uuid>().ok()?;
        registry().get(&id).cloned()
    }

    /// Free the underlying blob. Consumes the reference.
    pub fn revoke(self) {
        registry().remove(&self.id);
        debug!("Revoked blob reference {}", self.id);
    }
}
