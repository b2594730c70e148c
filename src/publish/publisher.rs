use crate::address::AddressSearch;
use crate::error::{Error, Result};
use crate::models::{Listing, NewListing};
use crate::publish::rest::photo_storage_path;
use crate::publish::summary::{suggested_description, suggested_title};
use crate::publish::traits::ListingBackend;
use crate::wizard::{first_incomplete, KeyValueStore, StepKey, Wizard, WizardFormState};
use std::sync::Arc;
use tracing::{info, warn};

/// What a successful publish produced
#[derive(Debug, Clone)]
pub struct PublishReceipt {
    pub listing_id: String,
    pub title: String,
    pub photo_urls: Vec<String>,
}

/// Turns a completed wizard into a published listing
pub struct Publisher {
    search: Arc<dyn AddressSearch>,
    backend: Arc<dyn ListingBackend>,
}

impl Publisher {
    pub fn new(search: Arc<dyn AddressSearch>, backend: Arc<dyn ListingBackend>) -> Self {
        Self { search, backend }
    }

    /// Validate, create the listing, upload pending photos, attach them and
    /// clear the draft.
    ///
    /// Any error leaves the draft in place so the owner can retry. The id of a
    /// created listing is stored in the draft right away, and each uploaded
    /// photo is recorded as soon as it is stored, so a retry neither creates
    /// the listing twice nor uploads a photo twice.
    pub async fn publish<S: KeyValueStore>(
        &self,
        wizard: &mut Wizard<S>,
        owner_id: &str,
    ) -> Result<PublishReceipt> {
        if let Some((step, reason)) = first_incomplete(wizard.state()) {
            warn!("Publish blocked at step {}: {}", step, reason);
            return Err(Error::Incomplete {
                step,
                reason: reason.to_string(),
            });
        }

        if owner_id.trim().is_empty() {
            return Err(Error::Validation {
                step: StepKey::Review,
                message: "Veuillez vous connecter.".to_string(),
            });
        }

        self.revalidate_address(wizard.state()).await?;

        let new_listing = build_listing(wizard.state(), owner_id)?;
        let title = new_listing.title.clone();

        let (listing_id, resumed) = match wizard.state().listing_id.clone() {
            Some(id) => {
                info!("Resuming photo upload for existing listing {}", id);
                (id, true)
            }
            None => {
                let created: Listing = self
                    .backend
                    .create_listing(&new_listing)
                    .await
                    .map_err(Error::transport)?;
                if let Err(e) = wizard.set_listing_id(&created.id) {
                    warn!("Could not save listing {} in the draft: {}", created.id, e);
                }
                (created.id, false)
            }
        };

        let photo_urls = match self.attach_photos(wizard, owner_id, &listing_id, resumed).await {
            Ok(urls) => urls,
            Err(message) => {
                warn!("Listing {} created without photos: {}", listing_id, message);
                return Err(Error::PhotoAttachment {
                    listing_id,
                    message,
                });
            }
        };

        wizard.clear()?;
        info!("✅ Published listing {} via {}", listing_id, self.backend.backend_name());

        Ok(PublishReceipt {
            listing_id,
            title,
            photo_urls,
        })
    }

    async fn revalidate_address(&self, state: &WizardFormState) -> Result<()> {
        let Some(external_id) = state
            .address
            .as_ref()
            .and_then(|a| a.external_id.clone())
        else {
            return Ok(());
        };

        match self.search.resolve(&external_id).await {
            Ok(Some(_)) => Ok(()),
            Ok(None) => {
                warn!("Address {} is stale", external_id);
                Err(Error::StaleAddress { external_id })
            }
            Err(e) => Err(Error::transport(e)),
        }
    }

    /// Upload pending files and attach the full URL list
    async fn attach_photos<S: KeyValueStore>(
        &self,
        wizard: &mut Wizard<S>,
        owner_id: &str,
        listing_id: &str,
        resumed: bool,
    ) -> std::result::Result<Vec<String>, String> {
        let pending = wizard.state().photos.pending.clone();
        if pending.is_empty() && !resumed {
            // the insert already carried every URL
            return Ok(wizard.state().photos.urls.clone());
        }

        for photo in &pending {
            let path = photo_storage_path(owner_id, listing_id, photo);
            let url = self
                .backend
                .upload_photo(&path, photo)
                .await
                .map_err(|e| format!("{:#}", e))?;
            if let Err(e) = wizard.photo_uploaded(url) {
                warn!("Could not save uploaded photo {}: {}", photo.file_name, e);
            }
        }

        let urls = wizard.state().photos.urls.clone();
        self.backend
            .attach_photos(listing_id, &urls)
            .await
            .map_err(|e| format!("{:#}", e))?;
        Ok(urls)
    }
}

/// Assemble the insert payload from a complete wizard state
pub fn build_listing(state: &WizardFormState, owner_id: &str) -> Result<NewListing> {
    let (Some(address), Some(details), Some(pricing)) =
        (&state.address, &state.details, &state.pricing)
    else {
        let (step, reason) = first_incomplete(state)
            .unwrap_or((StepKey::Review, "Informations manquantes."));
        return Err(Error::Incomplete {
            step,
            reason: reason.to_string(),
        });
    };

    let property_type = details.property_type.ok_or_else(|| Error::Incomplete {
        step: StepKey::Details,
        reason: "Choisissez un type de bien.".to_string(),
    })?;

    let title = details
        .title
        .clone()
        .unwrap_or_else(|| suggested_title(address, details, pricing));
    let description = details
        .description
        .clone()
        .unwrap_or_else(|| suggested_description(address, details, pricing));

    Ok(NewListing {
        owner_id: owner_id.to_string(),
        title,
        description,
        price: pricing.total(),
        rent: pricing.rent.unwrap_or(0.0),
        charges: pricing.charges.unwrap_or(0.0),
        city: address.city.clone().unwrap_or_default(),
        postal_code: address.postal_code.clone().unwrap_or_default(),
        address_label: address.label.clone(),
        address_provider_id: address.external_id.clone(),
        property_type,
        dpe_rating: details.energy_rating,
        photos: state.photos.urls.clone(),
        is_draft: false,
    })
}
