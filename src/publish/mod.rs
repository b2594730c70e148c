pub mod publisher;
pub mod rest;
pub mod summary;
pub mod traits;

pub use publisher::{build_listing, PublishReceipt, Publisher};
pub use rest::{photo_storage_path, RestBackend, RestBackendConfig};
pub use traits::ListingBackend;
