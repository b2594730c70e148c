use crate::wizard::{AddressSection, DetailsSection, PricingSection};

fn rooms_text(rooms: u32) -> String {
    if rooms == 1 {
        "1 pièce".to_string()
    } else {
        format!("{} pièces", rooms)
    }
}

/// Suggested listing title, e.g. `Appartement 2 pièces - 45m² - Paris - 850€ CC`
pub fn suggested_title(
    address: &AddressSection,
    details: &DetailsSection,
    pricing: &PricingSection,
) -> String {
    let property_type = details.property_type.map(|t| t.as_str()).unwrap_or("Logement");
    let city = address.city.as_deref().unwrap_or(&address.label);

    format!(
        "{} {} - {}m² - {} - {}€ CC",
        property_type,
        rooms_text(details.rooms.unwrap_or(1)),
        details.surface.unwrap_or(0.0),
        city,
        pricing.total()
    )
}

/// Suggested listing description in French
pub fn suggested_description(
    address: &AddressSection,
    details: &DetailsSection,
    pricing: &PricingSection,
) -> String {
    let property_type = details.property_type.map(|t| t.as_str()).unwrap_or("Logement");
    let rooms = details.rooms.unwrap_or(1);
    let mut desc = format!(
        "{} de {}m² comprenant {} pièce{}.",
        property_type,
        details.surface.unwrap_or(0.0),
        rooms,
        if rooms > 1 { "s" } else { "" }
    );

    if details.furnished {
        desc.push_str(" Meublé.");
    }
    if let Some(floor) = details.floor {
        if floor == 0 {
            desc.push_str(" Situé au rez-de-chaussée");
        } else {
            let suffix = if floor == 1 { "er" } else { "ème" };
            desc.push_str(&format!(" Situé au {}{} étage", floor, suffix));
            if details.elevator {
                desc.push_str(" avec ascenseur");
            }
        }
        desc.push('.');
    }
    if let Some(rating) = details.energy_rating {
        desc.push_str(&format!(" DPE : {} ({}).", rating, rating.description()));
    }

    desc.push_str(&format!(
        "\n\nAdresse : {}, {} {}",
        address.label,
        address.postal_code.as_deref().unwrap_or(""),
        address.city.as_deref().unwrap_or("")
    ));

    let rent = pricing.rent.unwrap_or(0.0);
    let charges = pricing.charges.unwrap_or(0.0);
    desc.push_str(&format!("\n\nLoyer : {}€ hors charges", rent));
    desc.push_str(&format!("\nCharges : {}€", charges));
    desc.push_str(&format!("\nTotal charges comprises : {}€", pricing.total()));
    if let Some(deposit) = pricing.deposit {
        desc.push_str(&format!("\nDépôt de garantie : {}€", deposit));
    }

    desc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EnergyRating, PropertyType};

    fn sections() -> (AddressSection, DetailsSection, PricingSection) {
        let address = AddressSection {
            external_id: Some("75101_7000_00001".to_string()),
            label: "1 Rue de la Paix".to_string(),
            city: Some("Paris".to_string()),
            postal_code: Some("75001".to_string()),
            ..Default::default()
        };
        let details = DetailsSection {
            property_type: Some(PropertyType::Appartement),
            surface: Some(45.0),
            rooms: Some(2),
            ..Default::default()
        };
        let pricing = PricingSection {
            rent: Some(800.0),
            charges: Some(50.0),
            deposit: Some(800.0),
        };
        (address, details, pricing)
    }

    #[test]
    fn title_uses_total_rent() {
        let (address, details, pricing) = sections();
        assert_eq!(
            suggested_title(&address, &details, &pricing),
            "Appartement 2 pièces - 45m² - Paris - 850€ CC"
        );
    }

    #[test]
    fn title_singular_room() {
        let (address, mut details, pricing) = sections();
        details.property_type = Some(PropertyType::Studio);
        details.rooms = Some(1);
        details.surface = Some(18.5);
        assert_eq!(
            suggested_title(&address, &details, &pricing),
            "Studio 1 pièce - 18.5m² - Paris - 850€ CC"
        );
    }

    #[test]
    fn description_mentions_floor_and_amounts() {
        let (address, mut details, pricing) = sections();
        details.floor = Some(3);
        details.elevator = true;
        details.furnished = true;
        details.energy_rating = Some(EnergyRating::D);

        let desc = suggested_description(&address, &details, &pricing);
        assert!(desc.starts_with(concat!(
            "Appartement de 45m² comprenant 2 pièces. Meublé. ",
            "Situé au 3ème étage avec ascenseur. DPE : D (Assez énergivore)."
        )));
        assert!(desc.contains("Adresse : 1 Rue de la Paix, 75001 Paris"));
        assert!(desc.contains("Total charges comprises : 850€"));
        assert!(desc.ends_with("Dépôt de garantie : 800€"));
    }

    #[test]
    fn description_first_floor_and_ground_floor() {
        let (address, mut details, pricing) = sections();
        details.floor = Some(1);
        assert!(suggested_description(&address, &details, &pricing)
            .contains("Situé au 1er étage."));
        details.floor = Some(0);
        details.elevator = true;
        assert!(suggested_description(&address, &details, &pricing)
            .contains("Situé au rez-de-chaussée."));
    }
}
