use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Granularity of an address returned by the search provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    HouseNumber,
    Street,
    Locality,
    Municipality,
    /// Anything else the provider sends; kept so it can be shown disabled
    Other(String),
}

impl Classification {
    /// Parse a provider type string. Both `housenumber` (BAN) and
    /// `house_number` are accepted.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "housenumber" | "house_number" => Classification::HouseNumber,
            "street" => Classification::Street,
            "locality" => Classification::Locality,
            "municipality" => Classification::Municipality,
            other => Classification::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Classification::HouseNumber => "housenumber",
            Classification::Street => "street",
            Classification::Locality => "locality",
            Classification::Municipality => "municipality",
            Classification::Other(raw) => raw,
        }
    }

    /// Whether a suggestion of this kind may be selected at all
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Classification::Other(_))
    }

    /// Coarse results (a town, a lieu-dit) may come without a postal code,
    /// in which case the owner has to type one.
    pub fn is_coarse(&self) -> bool {
        matches!(self, Classification::Locality | Classification::Municipality)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Classification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Classification {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Classification::parse(&raw))
    }
}

/// One candidate address from the search provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressSuggestion {
    pub external_id: String,
    pub classification: Classification,
    pub label: String,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl AddressSuggestion {
    pub fn is_selectable(&self) -> bool {
        self.rejection_reason().is_none()
    }

    /// Message shown when this suggestion cannot be selected
    pub fn rejection_reason(&self) -> Option<String> {
        if self.external_id.trim().is_empty() {
            Some("Adresse sans identifiant, veuillez en choisir une autre.".to_string())
        } else if !self.classification.is_accepted() {
            Some(format!("Type d'adresse non supporté : {}", self.classification))
        } else {
            None
        }
    }
}

/// Kind of property offered for rent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    Appartement,
    Maison,
    Studio,
    Autre,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Appartement => "Appartement",
            PropertyType::Maison => "Maison",
            PropertyType::Studio => "Studio",
            PropertyType::Autre => "Autre",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "appartement" => Ok(PropertyType::Appartement),
            "maison" => Ok(PropertyType::Maison),
            "studio" => Ok(PropertyType::Studio),
            "autre" => Ok(PropertyType::Autre),
            other => Err(format!("Type de bien inconnu : {}", other)),
        }
    }
}

/// Energy performance rating (DPE)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnergyRating {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl EnergyRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnergyRating::A => "A",
            EnergyRating::B => "B",
            EnergyRating::C => "C",
            EnergyRating::D => "D",
            EnergyRating::E => "E",
            EnergyRating::F => "F",
            EnergyRating::G => "G",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            EnergyRating::A => "Très économe",
            EnergyRating::B => "Économe",
            EnergyRating::C => "Assez économe",
            EnergyRating::D => "Assez énergivore",
            EnergyRating::E => "Énergivore",
            EnergyRating::F => "Très énergivore",
            EnergyRating::G => "Extrêmement énergivore",
        }
    }
}

impl fmt::Display for EnergyRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EnergyRating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(EnergyRating::A),
            "B" => Ok(EnergyRating::B),
            "C" => Ok(EnergyRating::C),
            "D" => Ok(EnergyRating::D),
            "E" => Ok(EnergyRating::E),
            "F" => Ok(EnergyRating::F),
            "G" => Ok(EnergyRating::G),
            other => Err(format!("Classe énergie invalide : {}", other)),
        }
    }
}

/// Insert payload for the `properties` table, keyed by its column names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewListing {
    pub owner_id: String,
    pub title: String,
    pub description: String,
    /// Monthly rent charges included
    pub price: f64,
    #[serde(rename = "rent_base")]
    pub rent: f64,
    #[serde(rename = "rent_charges")]
    pub charges: f64,
    pub city: String,
    pub postal_code: String,
    pub address_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_provider_id: Option<String>,
    pub property_type: PropertyType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dpe_rating: Option<EnergyRating>,
    pub photos: Vec<String>,
    pub is_draft: bool,
}

/// A listing as stored by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub is_draft: bool,
    pub created_at: Option<DateTime<Utc>>,
}
