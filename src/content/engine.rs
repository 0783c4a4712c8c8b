//! Content Store
//!
//! Orchestrates the defaults, the migrator, the merge and both stores:
//!
//! ```text
//! Load:   remote row ──┐
//!           (miss/err) └─► local entry ──┐
//!                            (miss/corrupt) └─► defaults
//!         stored value → migrate → merge over defaults → typed document
//!
//! Save:   normalize → local entry (best effort) → remote upsert (best effort)
//!         → ChangeEvent::Saved
//! ```
//!
//! Neither path returns an error. What happened is described by
//! [`LoadOutcome`] and [`SaveReport`] and logged.

use crate::content::defaults::{default_document, default_value};
use crate::content::document::ContentDocument;
use crate::content::error::{ContentError, ContentResult};
use crate::content::local::{LocalStore, CONTENT_KEY, LEGACY_GALLERY_KEY};
use crate::content::merge::deep_merge;
use crate::content::migrate::{migrate, MigrationStep};
use crate::content::remote::{RemoteError, RemoteStore};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

/// Capacity of the change notification channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Which store is authoritative, fixed when the store is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StorePolicy {
    /// Remote row first, local entry as backup
    RemoteAuthoritative,
    /// Local entry only
    LocalOnly,
}

/// Where a loaded document came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadSource {
    Remote,
    Local,
    Defaults,
}

/// Result of a load
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub document: ContentDocument,
    pub source: LoadSource,
    /// Legacy upgrades applied to the stored value
    pub migrations: Vec<MigrationStep>,
}

/// Outcome of writing to one store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WriteOutcome {
    Written,
    /// Store not in use under the current policy
    Skipped,
    Failed { error: String },
}

impl WriteOutcome {
    fn failed(error: impl ToString) -> Self {
        WriteOutcome::Failed {
            error: error.to_string(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, WriteOutcome::Failed { .. })
    }
}

/// Result of a save
#[derive(Debug, Clone, Serialize)]
pub struct SaveReport {
    pub local: WriteOutcome,
    pub remote: WriteOutcome,
    pub saved_at: DateTime<Utc>,
}

impl SaveReport {
    /// Error from the authoritative store, for the operator
    pub fn remote_error(&self) -> Option<&str> {
        match &self.remote {
            WriteOutcome::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// What caused a change notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOrigin {
    /// This process saved the document
    Saved,
    /// Another process rewrote the local entry
    LocalExternal,
    /// The remote row changed
    Remote,
}

/// Tells renderers to re-load the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    pub origin: ChangeOrigin,
    pub at: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(origin: ChangeOrigin) -> Self {
        Self {
            origin,
            at: Utc::now(),
        }
    }
}

/// Remote half of [`StoreStatus`]
#[derive(Debug, Clone, Serialize)]
pub struct RemoteStatus {
    pub location: String,
    pub connected: bool,
    pub error: Option<String>,
}

/// Snapshot of both stores
#[derive(Debug, Clone, Serialize)]
pub struct StoreStatus {
    pub policy: StorePolicy,
    pub remote: Option<RemoteStatus>,
    pub local_path: Option<PathBuf>,
    pub local_present: bool,
    pub local_bytes: Option<u64>,
    pub local_quota_bytes: usize,
    pub legacy_gallery_present: bool,
}

/// Migrate a stored value, merge it over the defaults and type it.
///
/// Fails only when the stored value is not a document. Sections stored
/// with the wrong shape (a string where the defaults hold a record) are
/// dropped so the default section shows through; mistyped leaves are read
/// leniently by [`ContentDocument`].
pub fn reconcile(mut stored: Value) -> ContentResult<(ContentDocument, Vec<MigrationStep>)> {
    if !stored.is_object() {
        return Err(ContentError::Corrupted(format!(
            "expected a JSON object, found {}",
            json_kind(&stored)
        )));
    }
    let migrations = migrate(&mut stored);
    let defaults = default_value();
    discard_mismatched(&defaults, &mut stored, "");
    let merged = deep_merge(&defaults, &stored);
    let document = ContentDocument::from_value(merged)?;
    Ok((document, migrations))
}

/// Remove stored containers whose shape disagrees with the defaults
fn discard_mismatched(defaults: &Value, stored: &mut Value, path: &str) {
    let (Value::Object(defaults), Value::Object(stored)) = (defaults, stored) else {
        return;
    };

    stored.retain(|key, value| {
        let Some(default) = defaults.get(key) else {
            return true;
        };
        let keep = value.is_null()
            || match default {
                Value::Object(_) => value.is_object(),
                Value::Array(_) => value.is_array(),
                _ => !value.is_object() && !value.is_array(),
            };
        if !keep {
            tracing::warn!(
                "Ignoring stored {path}{key}: expected {}, found {}",
                json_kind(default),
                json_kind(value)
            );
        }
        keep
    });

    for (key, value) in stored.iter_mut() {
        if let Some(default) = defaults.get(key) {
            discard_mismatched(default, value, &format!("{path}{key}."));
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// The site document across defaults, local entry and remote row
pub struct ContentStore {
    local: LocalStore,
    remote: Option<Arc<dyn RemoteStore>>,
    events: broadcast::Sender<ChangeEvent>,
    /// Serializes load-mutate-save cycles
    edit_lock: Mutex<()>,
    /// mtime of the local entry after our own last write
    local_seen: Mutex<Option<SystemTime>>,
    /// Last value we upserted, so the watcher ignores our own writes
    remote_written: Mutex<Option<Value>>,
}

impl ContentStore {
    /// Build a store; a remote makes it [`StorePolicy::RemoteAuthoritative`]
    pub fn new(local: LocalStore, remote: Option<Arc<dyn RemoteStore>>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            local,
            remote,
            events,
            edit_lock: Mutex::new(()),
            local_seen: Mutex::new(None),
            remote_written: Mutex::new(None),
        }
    }

    pub fn local_only(local: LocalStore) -> Self {
        Self::new(local, None)
    }

    pub fn policy(&self) -> StorePolicy {
        if self.remote.is_some() {
            StorePolicy::RemoteAuthoritative
        } else {
            StorePolicy::LocalOnly
        }
    }

    pub fn local(&self) -> &LocalStore {
        &self.local
    }

    /// Receive a [`ChangeEvent`] whenever the document may have changed
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.events.subscribe()
    }

    fn notify(&self, origin: ChangeOrigin) {
        // No subscribers is fine
        let _ = self.events.send(ChangeEvent::new(origin));
    }

    /// Load the current document. Never fails.
    pub async fn load(&self) -> ContentDocument {
        self.load_with_source().await.document
    }

    /// Load the current document and report where it came from
    pub async fn load_with_source(&self) -> LoadOutcome {
        if let Some(remote) = &self.remote {
            match remote.fetch().await {
                Ok(Some(stored)) => match reconcile(stored) {
                    Ok((document, migrations)) => {
                        tracing::debug!(migrations = ?migrations, "Loaded content from remote store");
                        return LoadOutcome {
                            document,
                            source: LoadSource::Remote,
                            migrations,
                        };
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Remote content unusable, falling back to local store");
                    }
                },
                Ok(None) => {
                    tracing::debug!("Remote store has no content, falling back to local store");
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        remote = %remote.describe(),
                        "Remote fetch failed, falling back to local store"
                    );
                }
            }
        }

        match self.read_local().await {
            Ok(Some(stored)) => match reconcile(stored) {
                Ok((document, migrations)) => {
                    tracing::debug!(migrations = ?migrations, "Loaded content from local store");
                    return LoadOutcome {
                        document,
                        source: LoadSource::Local,
                        migrations,
                    };
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Local content unusable, using defaults");
                }
            },
            Ok(None) => {
                tracing::debug!("No stored content, using defaults");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Local content unreadable, using defaults");
            }
        }

        LoadOutcome {
            document: default_document(),
            source: LoadSource::Defaults,
            migrations: Vec::new(),
        }
    }

    /// The stored local value, with the legacy gallery entry filled in
    /// when the main entry has no gallery of its own.
    async fn read_local(&self) -> ContentResult<Option<Value>> {
        let mut stored = match self.local.get(CONTENT_KEY).await? {
            Some(raw) => {
                let value: Value = serde_json::from_str(&raw)?;
                if !value.is_object() {
                    return Err(ContentError::Corrupted(format!(
                        "local entry is {}",
                        json_kind(&value)
                    )));
                }
                Some(value)
            }
            None => None,
        };

        let has_gallery = stored.as_ref().is_some_and(|v| v.get("gallery").is_some());
        if !has_gallery {
            if let Some(images) = self.read_legacy_gallery().await {
                let doc = stored.get_or_insert_with(|| Value::Object(Map::new()));
                if let Value::Object(map) = doc {
                    map.insert("gallery".to_string(), images);
                }
            }
        }

        Ok(stored)
    }

    async fn read_legacy_gallery(&self) -> Option<Value> {
        let raw = match self.local.get(LEGACY_GALLERY_KEY).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(error = %e, "Legacy gallery entry unreadable");
                return None;
            }
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(images @ Value::Array(_)) => Some(images),
            Ok(other) => {
                tracing::warn!(found = json_kind(&other), "Ignoring legacy gallery entry");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Legacy gallery entry is not JSON");
                None
            }
        }
    }

    /// Persist the document to every store in use. Never fails.
    pub async fn save(&self, document: &ContentDocument) -> SaveReport {
        let _guard = self.edit_lock.lock().await;
        self.persist(document).await
    }

    async fn persist(&self, document: &ContentDocument) -> SaveReport {
        let mut document = document.clone();
        document.normalize();

        let value = match document.to_value() {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(error = %e, "Content document could not be serialized");
                self.notify(ChangeOrigin::Saved);
                let remote = match self.remote {
                    Some(_) => WriteOutcome::failed(&e),
                    None => WriteOutcome::Skipped,
                };
                return SaveReport {
                    local: WriteOutcome::failed(&e),
                    remote,
                    saved_at: Utc::now(),
                };
            }
        };

        let local = match self.write_local(&value).await {
            Ok(()) => WriteOutcome::Written,
            Err(e) => {
                tracing::warn!(error = %e, "Local save failed, continuing");
                WriteOutcome::failed(e)
            }
        };

        let remote = match &self.remote {
            Some(remote) => match remote.upsert(&value).await {
                Ok(()) => {
                    *self.remote_written.lock().await = Some(value);
                    WriteOutcome::Written
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        remote = %remote.describe(),
                        "Remote save failed; content kept in local store only"
                    );
                    WriteOutcome::failed(e)
                }
            },
            None => WriteOutcome::Skipped,
        };

        tracing::info!(
            local = ?local,
            remote = ?remote,
            "Content saved"
        );
        self.notify(ChangeOrigin::Saved);

        SaveReport {
            local,
            remote,
            saved_at: Utc::now(),
        }
    }

    async fn write_local(&self, value: &Value) -> ContentResult<()> {
        let raw = serde_json::to_string(value)?;
        let mut seen = self.local_seen.lock().await;
        self.local.set(CONTENT_KEY, &raw).await?;
        *seen = self.local.modified(CONTENT_KEY).await?;
        Ok(())
    }

    /// Load, apply `edit`, save.
    ///
    /// Cycles run one at a time, so indices handed to `edit` refer to the
    /// document it receives. If `edit` fails nothing is saved.
    pub async fn update<T, E, F>(&self, edit: F) -> Result<(T, SaveReport), E>
    where
        F: FnOnce(&mut ContentDocument) -> Result<T, E>,
    {
        let _guard = self.edit_lock.lock().await;
        let mut document = self.load().await;
        let output = edit(&mut document)?;
        let report = self.persist(&document).await;
        Ok((output, report))
    }

    /// Drop the local copy so the next load comes from the remote store.
    ///
    /// Returns whether there was a local copy. Without a remote store the
    /// local copy is the only one, so this fails with `NotConfigured`.
    pub async fn force_resync(&self) -> ContentResult<bool> {
        if self.remote.is_none() {
            return Err(RemoteError::NotConfigured.into());
        }
        let _guard = self.edit_lock.lock().await;
        let mut seen = self.local_seen.lock().await;
        let removed = self.local.remove(CONTENT_KEY).await?;
        *seen = None;
        tracing::info!(removed, "Local content cleared for resync");
        Ok(removed)
    }

    /// Report policy, remote connectivity and local entry state
    pub async fn status(&self) -> StoreStatus {
        let remote = match &self.remote {
            Some(remote) => {
                let ping = remote.ping().await;
                Some(RemoteStatus {
                    location: remote.describe(),
                    connected: ping.is_ok(),
                    error: ping.err().map(|e| e.to_string()),
                })
            }
            None => None,
        };

        let local_bytes = self.local.size(CONTENT_KEY).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not stat local content");
            None
        });
        let legacy_gallery_present = matches!(self.local.size(LEGACY_GALLERY_KEY).await, Ok(Some(_)));

        StoreStatus {
            policy: self.policy(),
            remote,
            local_path: self.local.path_for(CONTENT_KEY).ok(),
            local_present: local_bytes.is_some(),
            local_bytes,
            local_quota_bytes: self.local.quota_bytes(),
            legacy_gallery_present,
        }
    }

    /// Poll the remote row and emit [`ChangeOrigin::Remote`] when another
    /// writer changed it. Returns `None` without a remote store.
    pub fn start_remote_watch(self: &Arc<Self>, interval: Duration) -> Option<JoinHandle<()>> {
        let remote = self.remote.clone()?;
        let store = Arc::clone(self);

        tracing::info!(
            interval_secs = interval.as_secs_f64(),
            remote = %remote.describe(),
            "Starting remote content watch"
        );

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut last_seen: Option<Option<Value>> = None;

            loop {
                ticker.tick().await;

                let current = match remote.fetch().await {
                    Ok(current) => current,
                    Err(e) => {
                        tracing::debug!(error = %e, "Remote watch poll failed");
                        continue;
                    }
                };

                if let Some(previous) = &last_seen {
                    if *previous != current {
                        let ours = *store.remote_written.lock().await == current;
                        if !ours {
                            tracing::info!("Remote content changed");
                            store.notify(ChangeOrigin::Remote);
                        }
                    }
                }
                last_seen = Some(current);
            }
        }))
    }

    /// Poll the local entry and emit [`ChangeOrigin::LocalExternal`] when
    /// another process rewrote or removed it.
    pub fn start_local_watch(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let store = Arc::clone(self);

        tracing::info!(
            interval_secs = interval.as_secs_f64(),
            "Starting local content watch"
        );

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            *store.local_seen.lock().await = store.local.modified(CONTENT_KEY).await.ok().flatten();

            loop {
                ticker.tick().await;

                let mut seen = store.local_seen.lock().await;
                let current = match store.local.modified(CONTENT_KEY).await {
                    Ok(current) => current,
                    Err(e) => {
                        tracing::debug!(error = %e, "Local watch poll failed");
                        continue;
                    }
                };

                if current != *seen {
                    *seen = current;
                    drop(seen);
                    tracing::info!("Local content changed by another process");
                    store.notify(ChangeOrigin::LocalExternal);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::defaults::PLACEHOLDER_HERO_IMAGE;
    use crate::content::local::DEFAULT_QUOTA_BYTES;
    use crate::content::remote::MemoryRemote;
    use serde_json::json;
    use tempfile::tempdir;

    fn local_store(dir: &std::path::Path) -> LocalStore {
        LocalStore::new(dir, DEFAULT_QUOTA_BYTES)
    }

    async fn write_raw(store: &LocalStore, key: &str, raw: &str) {
        store.set(key, raw).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_stores_yield_defaults() {
        let dir = tempdir().unwrap();
        let store = ContentStore::local_only(local_store(dir.path()));

        let outcome = store.load_with_source().await;
        assert_eq!(outcome.source, LoadSource::Defaults);
        assert_eq!(outcome.document, default_document());
    }

    #[tokio::test]
    async fn test_totality_for_partial_and_corrupt_entries() {
        let dir = tempdir().unwrap();
        let local = local_store(dir.path());
        let store = ContentStore::local_only(local.clone());

        for raw in ["{}", "null", "{oops", "[1,2]", "\"text\"", r#"{"hero": "flat"}"#] {
            write_raw(&local, CONTENT_KEY, raw).await;
            let doc = store.load().await;
            assert_eq!(doc.hero.stats.rating, "4.8/5", "input {raw}");
            assert!(!doc.footer.company_name.is_empty(), "input {raw}");
            assert!(!doc.contact.phone.is_empty(), "input {raw}");
        }
    }

    #[tokio::test]
    async fn test_partial_local_document_is_filled_in() {
        let dir = tempdir().unwrap();
        let local = local_store(dir.path());
        write_raw(&local, CONTENT_KEY, r#"{"footer": {"companyName": "Acme"}}"#).await;
        let store = ContentStore::local_only(local);

        let outcome = store.load_with_source().await;
        assert_eq!(outcome.source, LoadSource::Local);
        assert_eq!(outcome.document.footer.company_name, "Acme");
        assert_eq!(
            outcome.document.footer.description,
            default_document().footer.description
        );
        assert_eq!(outcome.document.hero, default_document().hero);
    }

    #[tokio::test]
    async fn test_legacy_local_document_is_migrated() {
        let dir = tempdir().unwrap();
        let local = local_store(dir.path());
        write_raw(
            &local,
            CONTENT_KEY,
            r#"{"hero": {"tagline": "T", "title": "Ti"}, "gallery": [{"url": "u", "title": "t"}]}"#,
        )
        .await;
        let store = ContentStore::local_only(local);

        let outcome = store.load_with_source().await;
        assert_eq!(
            outcome.migrations,
            vec![MigrationStep::HeroSlides, MigrationStep::GalleryAlbums]
        );
        let doc = outcome.document;
        assert_eq!(doc.hero.slides.len(), 1);
        assert_eq!(doc.hero.slides[0].image, PLACEHOLDER_HERO_IMAGE);
        assert_eq!(doc.hero.slides[0].subtitle, "");
        assert_eq!(doc.hero.stats.events_count, "5000+");
        assert!(doc.gallery.albums.is_empty());
        assert_eq!(doc.gallery.recent.len(), 1);
        assert_eq!(doc.gallery.recent[0].url, "u");
    }

    #[tokio::test]
    async fn test_legacy_gallery_entry_fills_missing_gallery() {
        let dir = tempdir().unwrap();
        let local = local_store(dir.path());
        write_raw(&local, LEGACY_GALLERY_KEY, r#"[{"url": "old.jpg", "title": "Old"}]"#).await;
        let store = ContentStore::local_only(local.clone());

        let doc = store.load().await;
        assert!(doc.gallery.albums.is_empty());
        assert_eq!(doc.gallery.recent[0].url, "old.jpg");

        // A gallery in the main entry wins over the legacy entry
        write_raw(&local, CONTENT_KEY, r#"{"gallery": {"albums": [], "recent": []}}"#).await;
        let doc = store.load().await;
        assert!(doc.gallery.recent.is_empty());
    }

    #[tokio::test]
    async fn test_remote_is_authoritative() {
        let dir = tempdir().unwrap();
        let local = local_store(dir.path());
        write_raw(&local, CONTENT_KEY, r#"{"footer": {"companyName": "Local"}}"#).await;
        let remote = Arc::new(MemoryRemote::with_content(
            json!({"footer": {"companyName": "Remote"}}),
        ));
        let store = ContentStore::new(local, Some(remote));

        let outcome = store.load_with_source().await;
        assert_eq!(outcome.source, LoadSource::Remote);
        assert_eq!(outcome.document.footer.company_name, "Remote");
        assert_eq!(store.policy(), StorePolicy::RemoteAuthoritative);
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back_to_local() {
        let dir = tempdir().unwrap();
        let local = local_store(dir.path());
        write_raw(&local, CONTENT_KEY, r#"{"footer": {"companyName": "Local"}}"#).await;
        let remote = Arc::new(MemoryRemote::with_content(json!({})));
        remote.set_available(false);
        let store = ContentStore::new(local, Some(remote));

        let outcome = store.load_with_source().await;
        assert_eq!(outcome.source, LoadSource::Local);
        assert_eq!(outcome.document.footer.company_name, "Local");
    }

    #[tokio::test]
    async fn test_empty_remote_falls_back_to_local() {
        let dir = tempdir().unwrap();
        let local = local_store(dir.path());
        write_raw(&local, CONTENT_KEY, r#"{"certification": {"line1": "L"}}"#).await;
        let store = ContentStore::new(local, Some(Arc::new(MemoryRemote::new())));

        let outcome = store.load_with_source().await;
        assert_eq!(outcome.source, LoadSource::Local);
        assert_eq!(outcome.document.certification.line1, "L");
    }

    #[tokio::test]
    async fn test_legacy_remote_document_is_migrated() {
        let dir = tempdir().unwrap();
        let remote = Arc::new(MemoryRemote::with_content(json!({
            "hero": {"tagline": "T", "yearsExp": "12+"},
            "gallery": [{"url": "r.jpg", "title": "Remote"}]
        })));
        let store = ContentStore::new(local_store(dir.path()), Some(remote));

        let outcome = store.load_with_source().await;
        assert_eq!(outcome.source, LoadSource::Remote);
        assert_eq!(
            outcome.migrations,
            vec![MigrationStep::HeroSlides, MigrationStep::GalleryAlbums]
        );
        let doc = outcome.document;
        assert_eq!(doc.hero.slides.len(), 1);
        assert_eq!(doc.hero.slides[0].tagline, "T");
        assert_eq!(doc.hero.slides[0].image, PLACEHOLDER_HERO_IMAGE);
        assert_eq!(doc.hero.stats.years_exp, "12+");
        assert_eq!(doc.gallery.recent[0].url, "r.jpg");
        assert!(doc.gallery.albums.is_empty());
        assert_eq!(doc.footer, default_document().footer);
    }

    #[tokio::test]
    async fn test_mistyped_remote_fields_keep_remote_edits() {
        let dir = tempdir().unwrap();
        let remote = Arc::new(MemoryRemote::with_content(json!({
            "about": {"title": "Edited on phone"},
            "hero": {"stats": {"yearsExp": 15}},
            "certification": "ISO"
        })));
        let store = ContentStore::new(local_store(dir.path()), Some(remote.clone()));

        let outcome = store.load_with_source().await;
        assert_eq!(outcome.source, LoadSource::Remote);
        assert_eq!(outcome.document.about.title, "Edited on phone");
        assert_eq!(outcome.document.hero.stats.years_exp, "15");
        assert_eq!(
            outcome.document.certification,
            default_document().certification
        );

        store
            .update(|doc| {
                doc.footer.copyright = "2026".to_string();
                Ok::<_, ContentError>(())
            })
            .await
            .unwrap();

        let stored = remote.fetch().await.unwrap().unwrap();
        assert_eq!(stored["about"]["title"], "Edited on phone");
        assert_eq!(stored["hero"]["stats"]["yearsExp"], "15");
        assert_eq!(stored["footer"]["copyright"], "2026");
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let dir = tempdir().unwrap();
        let store = ContentStore::local_only(local_store(dir.path()));

        let mut doc = store.load().await;
        doc.about.title = "New title".to_string();
        doc.contact.phone = "+91 73560 44637".to_string();
        doc.gallery.recent.clear();

        let report = store.save(&doc).await;
        assert_eq!(report.local, WriteOutcome::Written);
        assert_eq!(report.remote, WriteOutcome::Skipped);

        let loaded = store.load_with_source().await;
        assert_eq!(loaded.source, LoadSource::Local);
        assert_eq!(loaded.document.about.title, "New title");
        assert_eq!(loaded.document.contact.phone_raw, "917356044637");
        assert!(loaded.document.gallery.recent.is_empty());

        doc.normalize();
        assert_eq!(loaded.document, doc);
    }

    #[tokio::test]
    async fn test_save_writes_both_stores() {
        let dir = tempdir().unwrap();
        let remote = Arc::new(MemoryRemote::new());
        let store = ContentStore::new(local_store(dir.path()), Some(remote.clone()));

        let report = store.save(&default_document()).await;
        assert_eq!(report.local, WriteOutcome::Written);
        assert_eq!(report.remote, WriteOutcome::Written);
        assert_eq!(remote.upsert_count(), 1);
        assert_eq!(
            remote.fetch().await.unwrap().unwrap()["contact"]["phoneRaw"],
            "7356044637"
        );
    }

    #[tokio::test]
    async fn test_remote_save_failure_keeps_local_copy() {
        let dir = tempdir().unwrap();
        let local = local_store(dir.path());
        let remote = Arc::new(MemoryRemote::new());
        remote.set_available(false);
        let store = ContentStore::new(local.clone(), Some(remote));
        let mut events = store.subscribe();

        let mut doc = default_document();
        doc.about.title = "Offline edit".to_string();
        let report = store.save(&doc).await;

        assert_eq!(report.local, WriteOutcome::Written);
        assert!(report.remote.is_failed());
        assert!(report.remote_error().is_some());
        assert_eq!(events.recv().await.unwrap().origin, ChangeOrigin::Saved);

        let loaded = store.load().await;
        assert_eq!(loaded.about.title, "Offline edit");
    }

    #[tokio::test]
    async fn test_quota_exceeded_still_writes_remote() {
        let dir = tempdir().unwrap();
        let remote = Arc::new(MemoryRemote::new());
        let store = ContentStore::new(LocalStore::new(dir.path(), 16), Some(remote.clone()));

        let report = store.save(&default_document()).await;
        assert!(report.local.is_failed());
        assert_eq!(report.remote, WriteOutcome::Written);
        assert_eq!(remote.upsert_count(), 1);
    }

    #[tokio::test]
    async fn test_update_applies_and_saves() {
        let dir = tempdir().unwrap();
        let store = ContentStore::local_only(local_store(dir.path()));

        let (count, report) = store
            .update(|doc| {
                doc.contact.phone = "(735) 604-4637".to_string();
                Ok::<_, ContentError>(doc.testimonials.len())
            })
            .await
            .unwrap();

        assert_eq!(count, 3);
        assert_eq!(report.local, WriteOutcome::Written);
        assert_eq!(store.load().await.contact.phone_raw, "7356044637");
    }

    #[tokio::test]
    async fn test_failed_update_saves_nothing() {
        let dir = tempdir().unwrap();
        let local = local_store(dir.path());
        let store = ContentStore::local_only(local.clone());

        let result: Result<((), SaveReport), String> = store
            .update(|doc| {
                doc.about.title = "should not persist".to_string();
                Err("missing image".to_string())
            })
            .await;

        assert!(result.is_err());
        assert_eq!(local.get(CONTENT_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_force_resync_drops_local_copy() {
        let dir = tempdir().unwrap();
        let local = local_store(dir.path());
        let remote = Arc::new(MemoryRemote::new());
        let store = ContentStore::new(local.clone(), Some(remote.clone()));

        store.save(&default_document()).await;
        remote
            .replace(Some(json!({"about": {"title": "From cloud"}})))
            .await;

        assert!(store.force_resync().await.unwrap());
        assert!(!store.force_resync().await.unwrap());
        assert_eq!(local.get(CONTENT_KEY).await.unwrap(), None);
        assert_eq!(store.load().await.about.title, "From cloud");
    }

    #[tokio::test]
    async fn test_force_resync_needs_remote() {
        let dir = tempdir().unwrap();
        let local = local_store(dir.path());
        let store = ContentStore::local_only(local.clone());

        store.save(&default_document()).await;
        let err = store.force_resync().await.unwrap_err();
        assert!(matches!(err, ContentError::Remote(RemoteError::NotConfigured)));
        assert!(local.get(CONTENT_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_status() {
        let dir = tempdir().unwrap();
        let remote = Arc::new(MemoryRemote::new());
        let store = ContentStore::new(local_store(dir.path()), Some(remote.clone()));

        let status = store.status().await;
        assert_eq!(status.policy, StorePolicy::RemoteAuthoritative);
        assert!(!status.local_present);
        assert!(status.remote.as_ref().unwrap().connected);

        store.save(&default_document()).await;
        remote.set_available(false);
        let status = store.status().await;
        assert!(status.local_present);
        assert!(status.local_bytes.unwrap() > 0);
        let remote_status = status.remote.unwrap();
        assert!(!remote_status.connected);
        assert!(remote_status.error.is_some());
    }

    #[tokio::test]
    async fn test_local_watch_detects_external_write() {
        let dir = tempdir().unwrap();
        let local = local_store(dir.path());
        let store = Arc::new(ContentStore::local_only(local.clone()));
        let mut events = store.subscribe();

        let handle = store.start_local_watch(Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(60)).await;

        // Written behind the store's back, as another process would
        local.set(CONTENT_KEY, "{}").await.unwrap();

        let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.origin, ChangeOrigin::LocalExternal);
        handle.abort();
    }

    #[tokio::test]
    async fn test_remote_watch_detects_other_writers() {
        let dir = tempdir().unwrap();
        let remote = Arc::new(MemoryRemote::new());
        let store = Arc::new(ContentStore::new(
            local_store(dir.path()),
            Some(remote.clone()),
        ));
        let mut events = store.subscribe();

        let handle = store
            .start_remote_watch(Duration::from_millis(20))
            .unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;

        remote.replace(Some(json!({"about": {"title": "Other device"}}))).await;

        let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.origin, ChangeOrigin::Remote);
        handle.abort();
    }

    #[test]
    fn test_no_remote_watch_without_remote() {
        let dir = tempdir().unwrap();
        let store = Arc::new(ContentStore::local_only(local_store(dir.path())));
        assert!(store.start_remote_watch(Duration::from_secs(1)).is_none());
    }

    #[test]
    fn test_reconcile_drops_mismatched_sections() {
        let (doc, _) = reconcile(json!({
            "contact": ["not", "a", "record"],
            "testimonials": {"quote": "q"},
            "about": {"title": {"nested": true}, "heading": "Who we are"},
            "footer": null
        }))
        .unwrap();

        let defaults = default_document();
        assert_eq!(doc.contact, defaults.contact);
        assert_eq!(doc.testimonials, defaults.testimonials);
        assert_eq!(doc.about.title, defaults.about.title);
        assert_eq!(doc.about.heading, "Who we are");
        assert_eq!(doc.footer.company_name, "");
    }

    #[test]
    fn test_reconcile_rejects_non_objects() {
        assert!(matches!(reconcile(Value::Null), Err(ContentError::Corrupted(_))));
        assert!(matches!(reconcile(json!([])), Err(ContentError::Corrupted(_))));
        let (doc, steps) = reconcile(json!({})).unwrap();
        assert_eq!(doc, default_document());
        assert!(steps.is_empty());
    }
}
