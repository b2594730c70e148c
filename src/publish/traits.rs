use crate::models::{Listing, NewListing};
use crate::wizard::PendingPhoto;
use anyhow::Result;
use async_trait::async_trait;

/// Persistence, file storage and identity of the hosted backend
#[async_trait]
pub trait ListingBackend: Send + Sync {
    /// Insert a listing and return the stored record
    async fn create_listing(&self, listing: &NewListing) -> Result<Listing>;

    /// Upload one photo under `path` in the listing bucket; returns its public URL
    async fn upload_photo(&self, path: &str, photo: &PendingPhoto) -> Result<String>;

    /// Replace the photo URL list of an existing listing
    async fn attach_photos(&self, listing_id: &str, urls: &[String]) -> Result<()>;

    /// Get the name of the backend
    fn backend_name(&self) -> &'static str;
}
