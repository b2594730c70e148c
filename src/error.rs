use thiserror::Error;

use crate::wizard::StepKey;

/// Errors surfaced to the owner while filling in or publishing a listing.
///
/// None of these clear the wizard state; the owner can always fix the cause
/// and try again.
#[derive(Debug, Error)]
pub enum Error {
    /// A field value was rejected; reported next to the field
    #[error("{message}")]
    Validation { step: StepKey, message: String },

    /// A required step is not complete yet
    #[error("Étape « {step} » incomplète : {reason}")]
    Incomplete { step: StepKey, reason: String },

    /// The selected address no longer resolves at the provider
    #[error("L'adresse sélectionnée n'est plus reconnue, veuillez la sélectionner à nouveau.")]
    StaleAddress { external_id: String },

    /// Network failure or backend rejection
    #[error("Erreur de communication : {0}")]
    Transport(String),

    /// Local wizard storage could not be written
    #[error("Impossible d'enregistrer le brouillon : {0}")]
    Storage(String),

    /// The listing was created but its photos could not be attached
    #[error("Annonce créée ({listing_id}) mais les photos n'ont pas pu être ajoutées : {message}")]
    PhotoAttachment { listing_id: String, message: String },
}

impl Error {
    pub fn validation(step: StepKey, message: impl Into<String>) -> Self {
        Error::Validation {
            step,
            message: message.into(),
        }
    }

    /// Build a transport error from any integration failure, keeping the
    /// whole context chain in the message.
    pub fn transport(err: anyhow::Error) -> Self {
        Error::Transport(format!("{:#}", err))
    }

    /// The wizard step the owner should be sent back to, if any
    pub fn step(&self) -> Option<StepKey> {
        match self {
            Error::Validation { step, .. } | Error::Incomplete { step, .. } => Some(*step),
            Error::StaleAddress { .. } => Some(StepKey::Address),
            Error::PhotoAttachment { .. } => Some(StepKey::Photos),
            Error::Transport(_) | Error::Storage(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
