//! Preview state for file fields.
//!
//! Every image selected on a file field gets an object URL from a
//! [`UrlRegistry`]. The URL is owned by a [`PreviewUrl`] handle which revokes
//! it when released or dropped, so previews never outlive their field.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::error::{FormError, Result};
use crate::value::UploadedFile;

/// Creates and revokes object URLs for file previews.
pub trait UrlRegistry: Send + Sync {
    /// Creates a URL pointing at the file's contents.
    fn create(&self, file: &UploadedFile) -> Result<String>;

    /// Revokes a URL previously returned by [`create`](Self::create).
    fn revoke(&self, url: &str) -> Result<()>;
}

/// In-process registry handing out `blob:` URLs.
#[derive(Debug, Default)]
pub struct MemoryUrlRegistry {
    live: Mutex<HashSet<String>>,
    revoked: Mutex<Vec<String>>,
}

impl MemoryUrlRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether `url` was created and not yet revoked.
    pub fn is_live(&self, url: &str) -> bool {
        self.live.lock().is_ok_and(|live| live.contains(url))
    }

    /// Returns the number of URLs currently live.
    pub fn live_count(&self) -> usize {
        self.live.lock().map(|live| live.len()).unwrap_or(0)
    }

    /// Returns every revoked URL, oldest first.
    pub fn revoked(&self) -> Vec<String> {
        self.revoked
            .lock()
            .map(|revoked| revoked.clone())
            .unwrap_or_default()
    }
}

fn blob_token() -> String {
    use rand::RngExt;
    let mut rng = rand::rng();
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

impl UrlRegistry for MemoryUrlRegistry {
    fn create(&self, file: &UploadedFile) -> Result<String> {
        let url = format!("blob:fleet/{}", blob_token());
        self.live
            .lock()
            .map_err(|_| FormError::Preview("url registry poisoned".to_string()))?
            .insert(url.clone());
        debug!(file = %file.name, %url, "created preview url");
        Ok(url)
    }

    fn revoke(&self, url: &str) -> Result<()> {
        let removed = self
            .live
            .lock()
            .map_err(|_| FormError::Preview("url registry poisoned".to_string()))?
            .remove(url);
        if !removed {
            return Err(FormError::Preview(format!("unknown preview url {url}")));
        }
        if let Ok(mut revoked) = self.revoked.lock() {
            revoked.push(url.to_string());
        }
        Ok(())
    }
}

/// An object URL owned by one preview.
pub struct PreviewUrl {
    url: String,
    registry: Arc<dyn UrlRegistry>,
    released: bool,
}

impl PreviewUrl {
    /// Creates a preview URL for `file`.
    pub fn create(registry: Arc<dyn UrlRegistry>, file: &UploadedFile) -> Result<Self> {
        let url = registry.create(file)?;
        Ok(Self {
            url,
            registry,
            released: false,
        })
    }

    /// Returns the URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Revokes the URL. Failures are logged, never returned.
    pub fn release(mut self) {
        self.release_in_place();
    }

    fn release_in_place(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.registry.revoke(&self.url) {
            warn!(url = %self.url, error = %e, "failed to revoke preview url");
        }
    }
}

impl std::fmt::Debug for PreviewUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewUrl")
            .field("url", &self.url)
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

impl Drop for PreviewUrl {
    fn drop(&mut self) {
        self.release_in_place();
    }
}

/// Preview slots of one file field, parallel to the field's file list.
///
/// Slot `i` holds the preview of file `i`, or `None` when that file is not
/// an image.
#[derive(Debug, Default)]
pub struct FilePreviews {
    slots: Vec<Option<PreviewUrl>>,
    dragging: bool,
}

impl FilePreviews {
    /// Creates empty preview state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends slots for newly selected files.
    ///
    /// A failure to create one URL leaves that file without a preview; the
    /// file itself is still kept.
    pub fn append(&mut self, registry: &Arc<dyn UrlRegistry>, files: &[UploadedFile]) {
        for file in files {
            let slot = if file.is_image() {
                match PreviewUrl::create(Arc::clone(registry), file) {
                    Ok(preview) => Some(preview),
                    Err(e) => {
                        warn!(file = %file.name, error = %e, "could not create preview");
                        None
                    }
                }
            } else {
                None
            };
            self.slots.push(slot);
        }
    }

    /// Releases every preview and forgets all slots.
    pub fn clear(&mut self) {
        for preview in self.slots.drain(..).flatten() {
            preview.release();
        }
    }

    /// Returns the live preview URLs in selection order.
    pub fn urls(&self) -> Vec<&str> {
        self.slots.iter().flatten().map(PreviewUrl::url).collect()
    }

    /// Returns the number of live previews.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Returns whether no preview is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes the `index`-th preview, releasing its URL.
    ///
    /// Returns the position of the matching file in the field's file list.
    pub fn remove(&mut self, index: usize) -> Option<usize> {
        let position = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(position, _)| position)
            .nth(index)?;
        if let Some(preview) = self.slots.remove(position) {
            preview.release();
        }
        Some(position)
    }

    /// Returns the URL held for the file at `position`.
    pub fn url_for_file(&self, position: usize) -> Option<&str> {
        self.slots
            .get(position)
            .and_then(Option::as_ref)
            .map(PreviewUrl::url)
    }

    /// Returns whether files are being dragged over the drop target.
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Sets the dragging display flag.
    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingRegistry;

    impl UrlRegistry for FailingRegistry {
        fn create(&self, _file: &UploadedFile) -> Result<String> {
            Ok("blob:fleet/static".to_string())
        }

        fn revoke(&self, _url: &str) -> Result<()> {
            Err(FormError::Preview("revocation unsupported".to_string()))
        }
    }

    fn image(name: &str) -> UploadedFile {
        UploadedFile::new(name, "image/jpeg", vec![0xff, 0xd8])
    }

    #[test]
    fn test_drop_revokes_url() {
        let registry = Arc::new(MemoryUrlRegistry::new());
        let dyn_registry: Arc<dyn UrlRegistry> = registry.clone();
        let preview = PreviewUrl::create(dyn_registry, &image("a.jpg")).unwrap();
        let url = preview.url().to_string();
        assert!(registry.is_live(&url));

        drop(preview);
        assert!(!registry.is_live(&url));
        assert_eq!(registry.revoked(), vec![url]);
    }

    #[test]
    fn test_only_images_get_previews() {
        let registry = Arc::new(MemoryUrlRegistry::new());
        let dyn_registry: Arc<dyn UrlRegistry> = registry.clone();
        let mut previews = FilePreviews::new();
        let pdf = UploadedFile::new("mot.pdf", "application/pdf", vec![1]);

        previews.append(&dyn_registry, &[image("a.jpg"), pdf, image("b.jpg")]);
        assert_eq!(previews.len(), 2);
        assert!(previews.url_for_file(1).is_none());

        // Second preview belongs to the third file.
        assert_eq!(previews.remove(1), Some(2));
        assert_eq!(previews.len(), 1);
        assert_eq!(registry.live_count(), 1);
        assert_eq!(previews.remove(5), None);

        previews.clear();
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_failed_revoke_does_not_abort_removal() {
        let registry: Arc<dyn UrlRegistry> = Arc::new(FailingRegistry);
        let mut previews = FilePreviews::new();
        previews.append(&registry, &[image("a.jpg")]);

        assert_eq!(previews.remove(0), Some(0));
        assert!(previews.is_empty());
    }

    #[test]
    fn test_dragging_flag() {
        let mut previews = FilePreviews::new();
        assert!(!previews.is_dragging());
        previews.set_dragging(true);
        assert!(previews.is_dragging());
        assert!(previews.is_empty());
    }
}
