use crate::error::{Error, Result};
use crate::models::{AddressSuggestion, Classification, EnergyRating, PropertyType};
use crate::wizard::steps::StepKey;
use serde::{Deserialize, Serialize};

/// Maximum number of photos on a listing
pub const MAX_PHOTOS: usize = 6;

/// Everything the owner entered so far, section by section.
///
/// Sections stay `None` until their step was visited. Only the photo files
/// waiting for upload are kept out of the persisted record; they live as long
/// as the wizard that owns this state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardFormState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<AddressSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<DetailsSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<PricingSection>,
    pub photos: PhotoSection,
    /// Listing already created by a publish attempt whose photo upload failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_id: Option<String>,
}

/// Selected address plus hand-entered corrections
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressSection {
    /// Provider identifier; `None` while only free text was typed
    pub external_id: Option<String>,
    pub classification: Option<Classification>,
    pub label: String,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Whether the selected suggestion itself carried a postal code
    pub provider_postal_code: bool,
    pub city_edited: bool,
    pub postal_code_edited: bool,
}

impl AddressSection {
    /// The owner has to type a postal code when a coarse result came without one
    pub fn needs_manual_postal_code(&self) -> bool {
        self.classification
            .as_ref()
            .map(|c| c.is_coarse())
            .unwrap_or(false)
            && !self.provider_postal_code
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailsSection {
    pub property_type: Option<PropertyType>,
    /// Living area in m²
    pub surface: Option<f64>,
    pub rooms: Option<u32>,
    pub floor: Option<i32>,
    pub elevator: bool,
    pub furnished: bool,
    pub title: Option<String>,
    pub description: Option<String>,
    pub energy_rating: Option<EnergyRating>,
}

/// Monthly amounts in euros
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSection {
    pub rent: Option<f64>,
    pub charges: Option<f64>,
    pub deposit: Option<f64>,
}

impl PricingSection {
    /// Rent charges included
    pub fn total(&self) -> f64 {
        self.rent.unwrap_or(0.0) + self.charges.unwrap_or(0.0)
    }

    fn is_valid(&self) -> bool {
        [self.rent, self.charges, self.deposit]
            .iter()
            .flatten()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

/// A selected photo file waiting for upload
#[derive(Clone, PartialEq)]
pub struct PendingPhoto {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl PendingPhoto {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Lower-cased extension, `jpg` when the name has none
    pub fn extension(&self) -> String {
        match self.file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_lowercase(),
            _ => "jpg".to_string(),
        }
    }
}

impl std::fmt::Debug for PendingPhoto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingPhoto")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name.rsplit('.').next().unwrap_or("").to_lowercase();
    match ext.as_str() {
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        _ => "image/jpeg",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoSection {
    /// Photos already stored remotely
    pub urls: Vec<String>,
    #[serde(skip)]
    pub pending: Vec<PendingPhoto>,
}

impl PhotoSection {
    pub fn len(&self) -> usize {
        self.urls.len() + self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partial update of the details section; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct DetailsPatch {
    pub property_type: Option<PropertyType>,
    pub surface: Option<f64>,
    pub rooms: Option<u32>,
    pub floor: Option<i32>,
    pub elevator: Option<bool>,
    pub furnished: Option<bool>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub energy_rating: Option<EnergyRating>,
}

/// Partial update of the pricing section
#[derive(Debug, Clone, Default)]
pub struct PricingPatch {
    pub rent: Option<f64>,
    pub charges: Option<f64>,
    pub deposit: Option<f64>,
}

/// Five ASCII digits
pub fn is_valid_postal_code(code: &str) -> bool {
    code.len() == 5 && code.bytes().all(|b| b.is_ascii_digit())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl WizardFormState {
    /// Merge a selected suggestion into the address section.
    ///
    /// City and postal code come from the suggestion when it has them. When it
    /// does not, values the owner typed by hand are kept and values copied
    /// from an earlier suggestion are dropped.
    pub fn select_address(&mut self, suggestion: &AddressSuggestion) -> Result<()> {
        if let Some(reason) = suggestion.rejection_reason() {
            return Err(Error::validation(StepKey::Address, reason));
        }

        let previous = self.address.take().unwrap_or_default();

        let (city, city_edited) = match &suggestion.city {
            Some(city) => (Some(city.clone()), false),
            None if previous.city_edited => (previous.city.clone(), true),
            None => (None, false),
        };
        let (postal_code, postal_code_edited) = match &suggestion.postal_code {
            Some(code) => (Some(code.clone()), false),
            None if previous.postal_code_edited => (previous.postal_code.clone(), true),
            None => (None, false),
        };

        self.address = Some(AddressSection {
            external_id: Some(suggestion.external_id.clone()),
            classification: Some(suggestion.classification.clone()),
            label: suggestion.label.clone(),
            city,
            postal_code,
            lat: suggestion.lat,
            lng: suggestion.lng,
            provider_postal_code: suggestion.postal_code.is_some(),
            city_edited,
            postal_code_edited,
        });
        Ok(())
    }

    /// Free text typed in the address input. Text that no longer matches the
    /// selected label drops the selection.
    pub fn set_address_text(&mut self, text: &str) {
        let section = self.address.get_or_insert_with(AddressSection::default);
        if section.label == text {
            return;
        }
        section.label = text.to_string();
        section.external_id = None;
        section.classification = None;
        section.provider_postal_code = false;
        section.lat = None;
        section.lng = None;
    }

    /// Postal code typed by hand
    pub fn set_postal_code(&mut self, code: &str) -> Result<()> {
        let code = code.trim();
        if !is_valid_postal_code(code) {
            return Err(Error::validation(
                StepKey::Address,
                "Le code postal doit comporter 5 chiffres.",
            ));
        }
        let section = self.address.get_or_insert_with(AddressSection::default);
        section.postal_code = Some(code.to_string());
        section.postal_code_edited = true;
        Ok(())
    }

    /// City typed by hand
    pub fn set_city(&mut self, city: &str) -> Result<()> {
        let city = city.trim();
        if city.is_empty() {
            return Err(Error::validation(StepKey::Address, "La ville est obligatoire."));
        }
        let section = self.address.get_or_insert_with(AddressSection::default);
        section.city = Some(city.to_string());
        section.city_edited = true;
        Ok(())
    }

    pub fn update_details(&mut self, patch: DetailsPatch) -> Result<()> {
        if let Some(surface) = patch.surface {
            if !surface.is_finite() || surface <= 0.0 {
                return Err(Error::validation(
                    StepKey::Details,
                    "La surface doit être supérieure à 0.",
                ));
            }
        }
        if patch.rooms == Some(0) {
            return Err(Error::validation(
                StepKey::Details,
                "Le nombre de pièces doit être au moins 1.",
            ));
        }
        if let Some(floor) = patch.floor {
            if floor < 0 {
                return Err(Error::validation(
                    StepKey::Details,
                    "L'étage ne peut pas être négatif.",
                ));
            }
        }

        let details = self.details.get_or_insert_with(DetailsSection::default);
        if let Some(property_type) = patch.property_type {
            details.property_type = Some(property_type);
        }
        if let Some(surface) = patch.surface {
            details.surface = Some(surface);
        }
        if let Some(rooms) = patch.rooms {
            details.rooms = Some(rooms);
        }
        if let Some(floor) = patch.floor {
            details.floor = Some(floor);
        }
        if let Some(elevator) = patch.elevator {
            details.elevator = elevator;
        }
        if let Some(furnished) = patch.furnished {
            details.furnished = furnished;
        }
        if patch.title.is_some() {
            details.title = non_blank(patch.title);
        }
        if patch.description.is_some() {
            details.description = non_blank(patch.description);
        }
        if let Some(rating) = patch.energy_rating {
            details.energy_rating = Some(rating);
        }
        Ok(())
    }

    pub fn update_pricing(&mut self, patch: PricingPatch) -> Result<()> {
        let amounts = [patch.rent, patch.charges, patch.deposit];
        if amounts.iter().flatten().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(Error::validation(
                StepKey::Pricing,
                "Tous les montants doivent être supérieurs ou égaux à 0.",
            ));
        }

        let pricing = self.pricing.get_or_insert_with(PricingSection::default);
        if patch.rent.is_some() {
            pricing.rent = patch.rent;
        }
        if patch.charges.is_some() {
            pricing.charges = patch.charges;
        }
        if patch.deposit.is_some() {
            pricing.deposit = patch.deposit;
        }
        Ok(())
    }

    pub fn add_photo(&mut self, photo: PendingPhoto) -> Result<()> {
        self.ensure_photo_room()?;
        self.photos.pending.push(photo);
        Ok(())
    }

    pub fn add_photo_url(&mut self, url: &str) -> Result<()> {
        self.ensure_photo_room()?;
        self.photos.urls.push(url.to_string());
        Ok(())
    }

    /// Remove a photo by its position in `urls` followed by `pending`
    pub fn remove_photo(&mut self, index: usize) -> bool {
        if index < self.photos.urls.len() {
            self.photos.urls.remove(index);
            true
        } else if index - self.photos.urls.len() < self.photos.pending.len() {
            self.photos.pending.remove(index - self.photos.urls.len());
            true
        } else {
            false
        }
    }

    fn ensure_photo_room(&self) -> Result<()> {
        if self.photos.len() >= MAX_PHOTOS {
            return Err(Error::validation(
                StepKey::Photos,
                format!("{} photos maximum.", MAX_PHOTOS),
            ));
        }
        Ok(())
    }

    /// Drop sections whose persisted values break the field rules
    pub(crate) fn sanitized(mut self) -> Self {
        if let Some(pricing) = &self.pricing {
            if !pricing.is_valid() {
                self.pricing = None;
            }
        }
        if let Some(details) = &self.details {
            let bad_surface = details.surface.map(|s| !s.is_finite() || s <= 0.0).unwrap_or(false);
            if bad_surface || details.rooms == Some(0) {
                self.details = None;
            }
        }
        if let Some(address) = &mut self.address {
            if address.external_id.as_deref() == Some("") {
                address.external_id = None;
            }
        }
        self.photos.urls.retain(|url| !url.trim().is_empty());
        self.photos.urls.truncate(MAX_PHOTOS);
        self
    }
}
