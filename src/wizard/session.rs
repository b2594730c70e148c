use crate::error::{Error, Result};
use crate::models::AddressSuggestion;
use crate::wizard::state::{DetailsPatch, PendingPhoto, PricingPatch, WizardFormState};
use crate::wizard::steps::{self, StepKey};
use crate::wizard::store::{KeyValueStore, WIZARD_STORAGE_KEY};
use tracing::{debug, info, warn};

/// The listing wizard for one owner session.
///
/// Owns the form state and the photo files waiting for upload. Every mutation
/// is written to the store before it returns, so a reload through
/// [`Wizard::load`] sees everything entered so far (except pending files).
pub struct Wizard<S: KeyValueStore> {
    store: S,
    state: WizardFormState,
}

impl<S: KeyValueStore> Wizard<S> {
    /// Restore the draft from the store. Missing, unreadable or malformed
    /// records give an empty wizard.
    pub fn load(store: S) -> Self {
        let state = match store.get(WIZARD_STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<WizardFormState>(&raw) {
                Ok(state) => state.sanitized(),
                Err(e) => {
                    warn!("Ignoring corrupt wizard draft: {}", e);
                    WizardFormState::default()
                }
            },
            Ok(None) => WizardFormState::default(),
            Err(e) => {
                warn!("Could not read wizard draft: {:#}", e);
                WizardFormState::default()
            }
        };
        Self { store, state }
    }

    pub fn state(&self) -> &WizardFormState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_step_done(&self, step: StepKey) -> bool {
        steps::is_step_done(&self.state, step)
    }

    pub fn progress(&self) -> Vec<(StepKey, bool)> {
        steps::progress(&self.state)
    }

    pub fn can_advance(&self, from: StepKey) -> bool {
        steps::can_advance(&self.state, from)
    }

    pub fn select_address(&mut self, suggestion: &AddressSuggestion) -> Result<()> {
        self.update(|state| state.select_address(suggestion))?;
        info!("Selected address {} ({})", suggestion.label, suggestion.classification);
        Ok(())
    }

    pub fn set_address_text(&mut self, text: &str) -> Result<()> {
        self.update(|state| {
            state.set_address_text(text);
            Ok(())
        })
    }

    pub fn set_postal_code(&mut self, code: &str) -> Result<()> {
        self.update(|state| state.set_postal_code(code))
    }

    pub fn set_city(&mut self, city: &str) -> Result<()> {
        self.update(|state| state.set_city(city))
    }

    pub fn update_details(&mut self, patch: DetailsPatch) -> Result<()> {
        self.update(|state| state.update_details(patch))
    }

    pub fn update_pricing(&mut self, patch: PricingPatch) -> Result<()> {
        self.update(|state| state.update_pricing(patch))
    }

    pub fn add_photo(&mut self, photo: PendingPhoto) -> Result<()> {
        debug!("Adding photo {} ({} bytes)", photo.file_name, photo.bytes.len());
        self.update(|state| state.add_photo(photo))
    }

    pub fn add_photo_url(&mut self, url: &str) -> Result<()> {
        self.update(|state| state.add_photo_url(url))
    }

    pub fn remove_photo(&mut self, index: usize) -> Result<bool> {
        let mut removed = false;
        self.update(|state| {
            removed = state.remove_photo(index);
            Ok(())
        })?;
        Ok(removed)
    }

    /// Remember the listing created for this draft, so a later attempt does
    /// not create it again.
    ///
    /// The listing exists remotely whatever happens locally, so the value is
    /// kept in memory even when writing it to the store fails.
    pub(crate) fn set_listing_id(&mut self, listing_id: &str) -> Result<()> {
        self.record(|state| state.listing_id = Some(listing_id.to_string()))
    }

    /// Move the oldest pending file to the uploaded URLs. Kept in memory even
    /// when the write fails, like [`Wizard::set_listing_id`].
    pub(crate) fn photo_uploaded(&mut self, url: String) -> Result<()> {
        self.record(|state| {
            if !state.photos.pending.is_empty() {
                state.photos.pending.remove(0);
            }
            state.photos.urls.push(url);
        })
    }

    /// Forget the draft entirely (after publish, or on explicit reset)
    pub fn clear(&mut self) -> Result<()> {
        self.store
            .remove(WIZARD_STORAGE_KEY)
            .map_err(|e| Error::Storage(format!("{:#}", e)))?;
        self.state = WizardFormState::default();
        info!("Wizard draft cleared");
        Ok(())
    }

    /// Apply a change to a copy of the state, persist it, then commit.
    /// A rejected change or failed write leaves the state as it was.
    fn update<F>(&mut self, change: F) -> Result<()>
    where
        F: FnOnce(&mut WizardFormState) -> Result<()>,
    {
        let mut next = self.state.clone();
        change(&mut next)?;
        self.persist(&next)?;
        self.state = next;
        Ok(())
    }

    /// Commit a change made remotely, then persist it
    fn record<F>(&mut self, change: F) -> Result<()>
    where
        F: FnOnce(&mut WizardFormState),
    {
        change(&mut self.state);
        self.persist(&self.state)
    }

    fn persist(&self, state: &WizardFormState) -> Result<()> {
        let json = serde_json::to_string(state).map_err(|e| Error::Storage(e.to_string()))?;
        self.store
            .set(WIZARD_STORAGE_KEY, &json)
            .map_err(|e| Error::Storage(format!("{:#}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Classification, EnergyRating, PropertyType};
    use crate::wizard::store::{FileStore, MemoryStore};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn suggestion() -> AddressSuggestion {
        AddressSuggestion {
            external_id: "13055_1234_00010".to_string(),
            classification: Classification::HouseNumber,
            label: "10 Quai du Port 13002 Marseille".to_string(),
            city: Some("Marseille".to_string()),
            postal_code: Some("13002".to_string()),
            lat: Some(43.2965),
            lng: Some(5.3698),
        }
    }

    #[test]
    fn every_update_survives_a_reload() {
        let dir = TempDir::new().unwrap();

        {
            let mut wizard = Wizard::load(FileStore::open(dir.path()).unwrap());
            wizard.select_address(&suggestion()).unwrap();
            wizard
                .update_details(DetailsPatch {
                    property_type: Some(PropertyType::Maison),
                    surface: Some(92.0),
                    rooms: Some(4),
                    energy_rating: Some(EnergyRating::C),
                    ..Default::default()
                })
                .unwrap();
            wizard
                .update_pricing(PricingPatch {
                    rent: Some(1450.0),
                    charges: Some(80.0),
                    deposit: Some(1450.0),
                })
                .unwrap();
            wizard.add_photo_url("https://cdn/1.jpg").unwrap();
        }

        let reloaded = Wizard::load(FileStore::open(dir.path()).unwrap());
        let state = reloaded.state();
        assert_eq!(
            state.address.as_ref().unwrap().external_id.as_deref(),
            Some("13055_1234_00010")
        );
        assert_eq!(state.details.as_ref().unwrap().energy_rating, Some(EnergyRating::C));
        assert_eq!(state.pricing.as_ref().unwrap().deposit, Some(1450.0));
        assert_eq!(state.photos.urls, vec!["https://cdn/1.jpg".to_string()]);
        assert!(reloaded.is_step_done(StepKey::Pricing));
    }

    #[test]
    fn pending_files_do_not_survive_reload() {
        let store = Arc::new(MemoryStore::new());
        let mut wizard = Wizard::load(store.clone());
        wizard.add_photo(PendingPhoto::new("cuisine.jpg", vec![1, 2])).unwrap();
        assert!(wizard.is_step_done(StepKey::Photos));

        let reloaded = Wizard::load(store);
        assert!(!reloaded.is_step_done(StepKey::Photos));
    }

    #[test]
    fn corrupt_record_loads_as_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(WIZARD_STORAGE_KEY, "{not json").unwrap();
        let wizard = Wizard::load(store.clone());
        assert_eq!(wizard.state(), &WizardFormState::default());

        store.set(WIZARD_STORAGE_KEY, "[1, 2, 3]").unwrap();
        assert_eq!(Wizard::load(store).state(), &WizardFormState::default());
    }

    #[test]
    fn unknown_fields_and_invalid_sections_are_dropped() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                WIZARD_STORAGE_KEY,
                r#"{"loyer":{"rent":800},"pricing":{"rent":-5,"charges":10},"photos":{"urls":["https://cdn/a.jpg",""]}}"#,
            )
            .unwrap();
        let wizard = Wizard::load(store);
        assert!(wizard.state().pricing.is_none());
        assert_eq!(wizard.state().photos.urls.len(), 1);
    }

    #[test]
    fn rejected_update_is_not_persisted() {
        let store = Arc::new(MemoryStore::new());
        let mut wizard = Wizard::load(store.clone());
        wizard
            .update_pricing(PricingPatch {
                rent: Some(700.0),
                ..Default::default()
            })
            .unwrap();
        assert!(wizard
            .update_pricing(PricingPatch {
                rent: Some(-700.0),
                ..Default::default()
            })
            .is_err());

        let reloaded = Wizard::load(store);
        assert_eq!(reloaded.state().pricing.as_ref().unwrap().rent, Some(700.0));
    }

    /// Store whose writes fail
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            anyhow::bail!("read-only file system")
        }

        fn remove(&self, _key: &str) -> anyhow::Result<()> {
            anyhow::bail!("read-only file system")
        }
    }

    #[test]
    fn failed_write_rejects_form_edits() {
        let mut wizard = Wizard::load(ReadOnlyStore);
        let err = wizard.select_address(&suggestion()).unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert!(wizard.state().address.is_none());
    }

    #[test]
    fn remote_changes_are_kept_when_the_write_fails() {
        let mut wizard = Wizard::load(ReadOnlyStore);
        wizard.state.photos.pending = vec![
            PendingPhoto::new("a.jpg", vec![1]),
            PendingPhoto::new("b.jpg", vec![2]),
        ];

        assert!(wizard.set_listing_id("42").is_err());
        assert_eq!(wizard.state().listing_id.as_deref(), Some("42"));

        assert!(wizard.photo_uploaded("https://cdn/a.jpg".to_string()).is_err());
        assert_eq!(wizard.state().photos.urls, vec!["https://cdn/a.jpg".to_string()]);
        assert_eq!(wizard.state().photos.pending.len(), 1);
        assert_eq!(wizard.state().photos.pending[0].file_name, "b.jpg");
    }

    #[test]
    fn clear_removes_persisted_record() {
        let store = Arc::new(MemoryStore::new());
        let mut wizard = Wizard::load(store.clone());
        wizard.select_address(&suggestion()).unwrap();
        assert!(store.get(WIZARD_STORAGE_KEY).unwrap().is_some());

        wizard.clear().unwrap();
        assert!(store.get(WIZARD_STORAGE_KEY).unwrap().is_none());
        assert_eq!(wizard.state(), &WizardFormState::default());
    }
}
