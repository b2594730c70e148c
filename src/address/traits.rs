use crate::models::AddressSuggestion;
use anyhow::Result;
use async_trait::async_trait;

/// Common trait for address search providers
/// Lets the autocomplete and the publish step run against BAN or a test double
#[async_trait]
pub trait AddressSearch: Send + Sync {
    /// Free-text search. Queries shorter than the minimum length return an
    /// empty list without touching the network.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<AddressSuggestion>>;

    /// Look an identifier up again; `None` when it no longer resolves
    async fn resolve(&self, external_id: &str) -> Result<Option<AddressSuggestion>>;

    /// Get the name of the provider
    fn provider_name(&self) -> &'static str;
}
