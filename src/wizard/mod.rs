pub mod session;
pub mod state;
pub mod steps;
pub mod store;

pub use session::Wizard;
pub use state::{
    AddressSection, DetailsPatch, DetailsSection, PendingPhoto, PhotoSection, PricingPatch,
    PricingSection, WizardFormState, MAX_PHOTOS,
};
pub use steps::{can_advance, first_incomplete, is_step_done, progress, step_issue, StepKey};
pub use store::{FileStore, KeyValueStore, MemoryStore, WIZARD_STORAGE_KEY};
