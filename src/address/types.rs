use crate::models::{AddressSuggestion, Classification};
use serde::{Deserialize, Serialize};

/// Minimum trimmed query length before a search is issued
pub const MIN_QUERY_LEN: usize = 3;

/// Whether a query is long enough to be sent to the provider
pub fn is_searchable(query: &str) -> bool {
    query.trim().chars().count() >= MIN_QUERY_LEN
}

/// Search parameters for the address provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    /// Maximum number of suggestions per query
    pub limit: usize,
    /// Ask the provider for prefix matching
    pub autocomplete: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            limit: 8,
            autocomplete: true,
        }
    }
}

/// GeoJSON feature collection as returned by the BAN search endpoint
#[derive(Debug, Default, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: FeatureProperties,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    /// `[lng, lat]`
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeatureProperties {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub label: Option<String>,
    pub name: Option<String>,
    pub city: Option<String>,
    pub postcode: Option<String>,
    pub citycode: Option<String>,
}

impl Feature {
    /// Normalize a provider feature into a suggestion
    pub fn into_suggestion(self) -> AddressSuggestion {
        let props = self.properties;

        let external_id = props
            .id
            .clone()
            .or(self.id)
            .or_else(|| props.citycode.clone())
            .or_else(|| props.name.clone())
            .or_else(|| props.label.clone())
            .unwrap_or_default();

        let label = props
            .label
            .or(props.name)
            .unwrap_or_default();

        let (lng, lat) = match self.geometry.as_ref().map(|g| g.coordinates.as_slice()) {
            Some([lng, lat, ..]) => (Some(*lng), Some(*lat)),
            _ => (None, None),
        };

        AddressSuggestion {
            external_id,
            classification: Classification::parse(props.kind.as_deref().unwrap_or("")),
            label,
            city: props.city.filter(|c| !c.is_empty()),
            postal_code: props.postcode.filter(|p| !p.is_empty()),
            lat,
            lng,
        }
    }
}

/// Result of one debounced search, as seen by the suggestion list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutcome {
    /// Trimmed query this outcome answers
    pub query: String,
    pub suggestions: Vec<AddressSuggestion>,
    /// Number of suggestions; `None` when the request failed
    pub count: Option<usize>,
}

impl SearchOutcome {
    pub fn found(query: String, suggestions: Vec<AddressSuggestion>) -> Self {
        let count = Some(suggestions.len());
        Self {
            query,
            suggestions,
            count,
        }
    }

    pub fn empty(query: String) -> Self {
        Self::found(query, Vec::new())
    }

    pub fn failed(query: String) -> Self {
        Self {
            query,
            suggestions: Vec::new(),
            count: None,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.count.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_ban_feature_with_lng_lat_order() {
        let raw = json!({
            "features": [{
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [2.331122, 48.864716] },
                "properties": {
                    "id": "75101_7000_00001",
                    "type": "housenumber",
                    "label": "1 Rue de la Paix 75001 Paris",
                    "city": "Paris",
                    "postcode": "75001",
                    "citycode": "75101"
                }
            }]
        });
        let collection: FeatureCollection = serde_json::from_value(raw).unwrap();
        let suggestion = collection.features.into_iter().next().unwrap().into_suggestion();

        assert_eq!(suggestion.external_id, "75101_7000_00001");
        assert_eq!(suggestion.classification, Classification::HouseNumber);
        assert_eq!(suggestion.city.as_deref(), Some("Paris"));
        assert_eq!(suggestion.postal_code.as_deref(), Some("75001"));
        assert_eq!(suggestion.lat, Some(48.864716));
        assert_eq!(suggestion.lng, Some(2.331122));
    }

    #[test]
    fn falls_back_to_citycode_then_name_for_identifier() {
        let raw = json!({
            "properties": { "type": "municipality", "name": "Lyon", "citycode": "69123" }
        });
        let feature: Feature = serde_json::from_value(raw).unwrap();
        let suggestion = feature.into_suggestion();
        assert_eq!(suggestion.external_id, "69123");
        assert_eq!(suggestion.label, "Lyon");
        assert_eq!(suggestion.postal_code, None);
        assert_eq!(suggestion.lat, None);

        let raw = json!({ "properties": { "type": "street", "name": "Rue Neuve" } });
        let feature: Feature = serde_json::from_value(raw).unwrap();
        assert_eq!(feature.into_suggestion().external_id, "Rue Neuve");
    }

    #[test]
    fn unknown_type_is_kept_but_not_selectable() {
        let raw = json!({ "properties": { "id": "x1", "type": "poi", "label": "Tour Eiffel" } });
        let feature: Feature = serde_json::from_value(raw).unwrap();
        let suggestion = feature.into_suggestion();
        assert!(!suggestion.is_selectable());
    }

    #[test]
    fn searchable_queries_need_three_trimmed_chars() {
        assert!(!is_searchable(""));
        assert!(!is_searchable("  ab  "));
        assert!(is_searchable(" abc"));
        assert!(is_searchable("éèà"));
    }
}
