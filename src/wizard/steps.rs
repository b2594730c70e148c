use crate::wizard::state::{is_valid_postal_code, WizardFormState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wizard steps in the order the owner goes through them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKey {
    Address,
    Details,
    Pricing,
    Photos,
    Review,
}

impl StepKey {
    pub const ALL: [StepKey; 5] = [
        StepKey::Address,
        StepKey::Details,
        StepKey::Pricing,
        StepKey::Photos,
        StepKey::Review,
    ];

    /// Steps that must be done before publishing
    pub const REQUIRED: [StepKey; 4] = [
        StepKey::Address,
        StepKey::Details,
        StepKey::Pricing,
        StepKey::Photos,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StepKey::Address => "Adresse",
            StepKey::Details => "Détails",
            StepKey::Pricing => "Loyer",
            StepKey::Photos => "Photos",
            StepKey::Review => "Récapitulatif",
        }
    }

    pub fn index(&self) -> usize {
        StepKey::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    pub fn next(&self) -> Option<StepKey> {
        StepKey::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(&self) -> Option<StepKey> {
        self.index().checked_sub(1).map(|i| StepKey::ALL[i])
    }
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for StepKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "address" | "adresse" => Ok(StepKey::Address),
            "details" | "détails" => Ok(StepKey::Details),
            "pricing" | "loyer" => Ok(StepKey::Pricing),
            "photos" => Ok(StepKey::Photos),
            "review" | "recap" => Ok(StepKey::Review),
            other => Err(format!("unknown step: {}", other)),
        }
    }
}

/// Why a step is not done yet, or `None` when it is.
///
/// Pure; safe to call on every render.
pub fn step_issue(state: &WizardFormState, step: StepKey) -> Option<&'static str> {
    match step {
        StepKey::Address => {
            let Some(address) = &state.address else {
                return Some("Sélectionnez une adresse dans la liste.");
            };
            if address.external_id.as_deref().map_or(true, str::is_empty) {
                return Some("Sélectionnez une adresse dans la liste.");
            }
            if address.needs_manual_postal_code()
                && !address.postal_code.as_deref().map_or(false, is_valid_postal_code)
            {
                return Some("Saisissez un code postal à 5 chiffres.");
            }
            None
        }
        StepKey::Details => {
            let Some(details) = &state.details else {
                return Some("Renseignez le type de bien, la surface et le nombre de pièces.");
            };
            if details.property_type.is_none() {
                return Some("Choisissez un type de bien.");
            }
            if !details.surface.map_or(false, |s| s > 0.0) {
                return Some("La surface doit être supérieure à 0.");
            }
            if !details.rooms.map_or(false, |r| r >= 1) {
                return Some("Le nombre de pièces doit être au moins 1.");
            }
            None
        }
        StepKey::Pricing => {
            let Some(pricing) = &state.pricing else {
                return Some("Renseignez le loyer et les charges.");
            };
            if !pricing.rent.map_or(false, |r| r > 0.0) {
                return Some("Le loyer doit être supérieur à 0.");
            }
            if !pricing.charges.map_or(false, |c| c >= 0.0) {
                return Some("Renseignez le montant des charges (0 si aucune).");
            }
            None
        }
        StepKey::Photos => {
            if state.photos.is_empty() {
                Some("Ajoutez au moins une photo.")
            } else {
                None
            }
        }
        StepKey::Review => Some("L'annonce n'est pas encore publiée."),
    }
}

/// Whether a step has all its required data
pub fn is_step_done(state: &WizardFormState, step: StepKey) -> bool {
    step_issue(state, step).is_none()
}

/// First required step that is not done, with the reason
pub fn first_incomplete(state: &WizardFormState) -> Option<(StepKey, &'static str)> {
    StepKey::REQUIRED
        .iter()
        .find_map(|step| step_issue(state, *step).map(|reason| (*step, reason)))
}

/// Done flag for every step, for progress indicators
pub fn progress(state: &WizardFormState) -> Vec<(StepKey, bool)> {
    StepKey::ALL
        .iter()
        .map(|step| (*step, is_step_done(state, *step)))
        .collect()
}

/// Forward navigation from `from` is allowed once `from` itself is done
pub fn can_advance(state: &WizardFormState, from: StepKey) -> bool {
    from.next().is_some() && is_step_done(state, from)
}
