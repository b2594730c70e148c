use crate::address::traits::AddressSearch;
use crate::address::types::{is_searchable, FeatureCollection, SearchParams};
use crate::models::AddressSuggestion;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Public endpoint of the Base Adresse Nationale
pub const BAN_BASE_URL: &str = "https://api-adresse.data.gouv.fr";

/// Address search client for the Base Adresse Nationale
pub struct BanClient {
    client: Client,
    base_url: String,
    params: SearchParams,
}

impl BanClient {
    /// Create a client against the public BAN endpoint
    pub fn new() -> Result<Self> {
        Self::with_base_url(BAN_BASE_URL)
    }

    /// Create a client against a custom endpoint (self-hosted BAN, tests)
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Self::with_params(base_url, SearchParams::default())
    }

    pub fn with_params(base_url: &str, params: SearchParams) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("listing-wizard/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            params,
        })
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    async fn fetch(
        &self,
        query: &str,
        limit: usize,
        autocomplete: bool,
    ) -> Result<FeatureCollection> {
        let url = format!("{}/search/", self.base_url);
        let limit = limit.to_string();
        let mut request = self.client.get(&url).query(&[("q", query), ("limit", limit.as_str())]);
        if autocomplete {
            request = request.query(&[("autocomplete", "1")]);
        }

        debug!("BAN search: {} (limit {})", query, limit);

        let response = request.send().await.context("Failed to reach BAN")?;

        if !response.status().is_success() {
            warn!("BAN returned status: {}", response.status());
            anyhow::bail!("BAN API error: {}", response.status());
        }

        response
            .json::<FeatureCollection>()
            .await
            .context("Failed to decode BAN response")
    }
}

#[async_trait]
impl AddressSearch for BanClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<AddressSuggestion>> {
        let query = query.trim();
        if !is_searchable(query) {
            return Ok(Vec::new());
        }

        let collection = self.fetch(query, limit, self.params.autocomplete).await?;
        let suggestions: Vec<AddressSuggestion> = collection
            .features
            .into_iter()
            .map(|feature| feature.into_suggestion())
            .collect();

        debug!("BAN returned {} suggestions for {:?}", suggestions.len(), query);
        Ok(suggestions)
    }

    async fn resolve(&self, external_id: &str) -> Result<Option<AddressSuggestion>> {
        if external_id.trim().is_empty() {
            return Ok(None);
        }

        let collection = self.fetch(external_id, 1, false).await?;
        let found = collection
            .features
            .into_iter()
            .next()
            .map(|feature| feature.into_suggestion())
            .filter(|suggestion| suggestion.external_id == external_id);

        if found.is_none() {
            warn!("BAN identifier {} no longer resolves", external_id);
        }
        Ok(found)
    }

    fn provider_name(&self) -> &'static str {
        "BAN"
    }
}
