use crate::models::{Listing, NewListing};
use crate::publish::traits::ListingBackend;
use crate::wizard::PendingPhoto;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Table holding the listings
const LISTINGS_TABLE: &str = "properties";

/// Connection settings for the hosted backend
#[derive(Debug, Clone)]
pub struct RestBackendConfig {
    pub base_url: String,
    /// Public API key sent as `apikey`
    pub api_key: String,
    /// Signed-in owner's token; the API key is used when absent
    pub access_token: Option<String>,
    pub bucket: String,
}

/// Supabase-style REST backend: PostgREST tables plus object storage
pub struct RestBackend {
    client: Client,
    config: RestBackendConfig,
}

impl RestBackend {
    pub fn new(config: RestBackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(concat!("listing-wizard/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        let config = RestBackendConfig {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            ..config
        };

        Ok(Self { client, config })
    }

    /// Public URL of an object in the listing bucket
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.config.base_url, self.config.bucket, path
        )
    }

    /// Object path of a public URL from this bucket
    pub fn storage_path_from_url(&self, public_url: &str) -> Option<String> {
        let prefix = self.public_url("");
        public_url.strip_prefix(&prefix).map(str::to_string)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self
            .config
            .access_token
            .as_deref()
            .unwrap_or(&self.config.api_key);
        request
            .header("apikey", &self.config.api_key)
            .bearer_auth(token)
    }
}

/// Object path of a new photo: `{owner}/{listing}/{millis}-{random}.{ext}`
pub fn photo_storage_path(owner_id: &str, listing_id: &str, photo: &PendingPhoto) -> String {
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{}/{}/{}-{}.{}",
        owner_id,
        listing_id,
        Utc::now().timestamp_millis(),
        &random[..10],
        photo.extension()
    )
}

#[async_trait]
impl ListingBackend for RestBackend {
    async fn create_listing(&self, listing: &NewListing) -> Result<Listing> {
        let url = format!("{}/rest/v1/{}", self.config.base_url, LISTINGS_TABLE);
        debug!("Inserting listing {:?}", listing.title);

        let response = self
            .authorized(self.client.post(&url))
            .header("Prefer", "return=representation")
            .json(listing)
            .send()
            .await
            .context("Failed to reach backend")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Backend rejected insert: {} {}", status, body);
            anyhow::bail!("Backend rejected listing: {} {}", status, body);
        }

        let mut rows: Vec<Listing> = response
            .json()
            .await
            .context("Failed to decode created listing")?;
        let created = rows.pop().context("Backend returned no listing")?;

        info!("Created listing {} for owner {}", created.id, created.owner_id);
        Ok(created)
    }

    async fn upload_photo(&self, path: &str, photo: &PendingPhoto) -> Result<String> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.config.base_url, self.config.bucket, path
        );

        let response = self
            .authorized(self.client.post(&url))
            .header("Content-Type", &photo.content_type)
            .header("x-upsert", "false")
            .body(photo.bytes.clone())
            .send()
            .await
            .with_context(|| format!("Failed to upload {}", photo.file_name))?;

        if !response.status().is_success() {
            warn!("Upload of {} returned status: {}", photo.file_name, response.status());
            anyhow::bail!("Upload of {} failed: {}", photo.file_name, response.status());
        }

        debug!("Uploaded {} to {}", photo.file_name, path);
        Ok(self.public_url(path))
    }

    async fn attach_photos(&self, listing_id: &str, urls: &[String]) -> Result<()> {
        let url = format!("{}/rest/v1/{}", self.config.base_url, LISTINGS_TABLE);
        let id_filter = format!("eq.{}", listing_id);

        let response = self
            .authorized(self.client.patch(&url))
            .query(&[("id", id_filter.as_str())])
            .json(&json!({ "photos": urls }))
            .send()
            .await
            .context("Failed to reach backend")?;

        if !response.status().is_success() {
            warn!("Backend rejected photo update: {}", response.status());
            anyhow::bail!("Failed to attach photos: {}", response.status());
        }

        info!("Attached {} photos to listing {}", urls.len(), listing_id);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "Supabase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EnergyRating, PropertyType};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(uri: &str) -> RestBackend {
        RestBackend::new(RestBackendConfig {
            base_url: format!("{}/", uri),
            api_key: "anon-key".to_string(),
            access_token: Some("user-token".to_string()),
            bucket: "properties".to_string(),
        })
        .unwrap()
    }

    fn new_listing() -> NewListing {
        NewListing {
            owner_id: "owner-1".to_string(),
            title: "Studio 1 pièce - 20m² - Lille - 550€ CC".to_string(),
            description: "Studio".to_string(),
            price: 550.0,
            rent: 500.0,
            charges: 50.0,
            city: "Lille".to_string(),
            postal_code: "59000".to_string(),
            address_label: "3 Rue Nationale 59000 Lille".to_string(),
            address_provider_id: Some("59350_6320_00003".to_string()),
            property_type: PropertyType::Studio,
            dpe_rating: Some(EnergyRating::E),
            photos: vec![],
            is_draft: false,
        }
    }

    #[tokio::test]
    async fn test_create_listing_returns_row() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/properties"))
            .and(header("apikey", "anon-key"))
            .and(header("Authorization", "Bearer user-token"))
            .and(header("Prefer", "return=representation"))
            .and(body_json(json!({
                "owner_id": "owner-1",
                "title": "Studio 1 pièce - 20m² - Lille - 550€ CC",
                "description": "Studio",
                "price": 550.0,
                "rent_base": 500.0,
                "rent_charges": 50.0,
                "city": "Lille",
                "postal_code": "59000",
                "address_label": "3 Rue Nationale 59000 Lille",
                "address_provider_id": "59350_6320_00003",
                "property_type": "Studio",
                "dpe_rating": "E",
                "photos": [],
                "is_draft": false
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
                "id": "42",
                "owner_id": "owner-1",
                "title": "Studio 1 pièce - 20m² - Lille - 550€ CC",
                "price": 550.0,
                "city": "Lille",
                "photos": [],
                "created_at": "2026-10-19T10:00:00Z"
            }])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let created = backend(&mock_server.uri()).create_listing(&new_listing()).await.unwrap();
        assert_eq!(created.id, "42");
        assert_eq!(created.city, "Lille");
    }

    #[tokio::test]
    async fn test_create_listing_rejection_is_an_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("JWT expired"))
            .mount(&mock_server)
            .await;

        let err = backend(&mock_server.uri())
            .create_listing(&new_listing())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("JWT expired"));
    }

    #[tokio::test]
    async fn test_upload_and_attach() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/storage/v1/object/properties/owner-1/42/photo.png"))
            .and(header("Content-Type", "image/png"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Key": "x" })))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/properties"))
            .and(query_param("id", "eq.42"))
            .and(body_json(json!({ "photos": ["https://cdn/a.png"] })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let backend = backend(&mock_server.uri());
        let photo = PendingPhoto::new("photo.png", vec![0x89, 0x50]);
        let url = backend.upload_photo("owner-1/42/photo.png", &photo).await.unwrap();
        assert_eq!(
            url,
            format!(
                "{}/storage/v1/object/public/properties/owner-1/42/photo.png",
                mock_server.uri()
            )
        );
        assert_eq!(
            backend.storage_path_from_url(&url).as_deref(),
            Some("owner-1/42/photo.png")
        );

        backend
            .attach_photos("42", &["https://cdn/a.png".to_string()])
            .await
            .unwrap();
    }

    #[test]
    fn test_photo_storage_path_layout() {
        let photo = PendingPhoto::new("Salon.JPEG", vec![]);
        let path = photo_storage_path("owner-1", "42", &photo);
        let parts: Vec<&str> = path.split('/').collect();
        assert_eq!(parts[0], "owner-1");
        assert_eq!(parts[1], "42");
        assert!(parts[2].ends_with(".jpeg"));
        assert!(parts[2].contains('-'));
    }
}
