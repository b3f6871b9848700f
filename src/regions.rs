use crate::models::Region;

/// Declared lookup order. Egypt and Cyprus sit in two groups each, so the
/// first matching group wins and this order must not change.
pub static TAXONOMY: &[(Region, &[&str])] = &[
    (
        Region::Africa,
        &[
            "Senegal", "Egypt", "South Africa", "Cameroon", "Nigeria", "Ethiopia", "Kenya",
            "Morocco", "Ghana", "Angola", "Tunisia", "Libya", "Sudan", "Uganda", "Ivory Coast",
            "Mali", "Somalia", "Zimbabwe", "Tanzania", "Zambia", "Mozambique", "Rwanda",
            "Madagascar", "Sierra Leone", "Liberia", "Guinea", "Burkina Faso", "Niger", "Chad",
            "Congo", "Mauritania", "Namibia", "Botswana", "Swaziland", "Lesotho",
            "Equatorial Guinea", "Gabon", "Eritrea", "Djibouti", "Comoros",
            "Sao Tome and Principe", "Seychelles", "Mayotte", "Reunion", "Western Sahara",
        ],
    ),
    (Region::Us, &["United States"]),
    (Region::China, &["China", "Taiwan", "Hong Kong", "Macau"]),
    (
        Region::Eu,
        &[
            "France", "Italy", "Germany", "United Kingdom", "Spain", "Netherlands", "Greece",
            "Portugal", "Belgium", "Sweden", "Austria", "Denmark", "Finland", "Ireland",
            "Czech Republic", "Romania", "Poland", "Hungary", "Slovak Republic", "Luxembourg",
            "Bulgaria", "Croatia", "Slovenia", "Lithuania", "Latvia", "Estonia", "Malta",
            "Cyprus", "Monaco",
        ],
    ),
    (Region::Russia, &["Russia"]),
    (Region::Ukraine, &["Ukraine"]),
    (
        Region::MiddleEast,
        &[
            "Egypt", "Iran", "Saudi Arabia", "Iraq", "United Arab Emirates", "Syria", "Yemen",
            "Israel", "Jordan", "Lebanon", "Palestine", "Oman", "Kuwait", "Qatar", "Bahrain",
            "Turkey", "Cyprus",
        ],
    ),
];

/// Exact, case- and whitespace-sensitive match against the taxonomy.
pub fn classify(country: &str) -> Option<Region> {
    TAXONOMY
        .iter()
        .find(|(_, countries)| countries.contains(&country))
        .map(|(region, _)| *region)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn single_membership_countries_map_to_their_region() {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (_, countries) in TAXONOMY {
            for c in countries.iter() {
                *seen.entry(*c).or_default() += 1;
            }
        }
        for (region, countries) in TAXONOMY {
            for c in countries.iter().filter(|c| seen[*c] == 1) {
                assert_eq!(classify(c), Some(*region), "country {c}");
            }
        }
    }

    #[test]
    fn shared_countries_resolve_to_first_declared_region() {
        assert_eq!(classify("Egypt"), Some(Region::Africa));
        assert_eq!(classify("Cyprus"), Some(Region::Eu));
        let middle_east = TAXONOMY.iter().find(|(r, _)| *r == Region::MiddleEast).unwrap().1;
        assert!(middle_east.contains(&"Egypt"));
        assert!(middle_east.contains(&"Cyprus"));
    }

    #[test]
    fn unknown_and_unnormalized_inputs_are_unclassified() {
        assert_eq!(classify("Atlantis"), None);
        assert_eq!(classify(""), None);
        assert_eq!(classify(" Egypt"), None);
        assert_eq!(classify("egypt"), None);
        assert_eq!(classify("USA"), None);
    }

    #[test]
    fn taxonomy_keeps_declared_order() {
        let order: Vec<Region> = TAXONOMY.iter().map(|(r, _)| *r).collect();
        assert_eq!(
            order,
            vec![
                Region::Africa,
                Region::Us,
                Region::China,
                Region::Eu,
                Region::Russia,
                Region::Ukraine,
                Region::MiddleEast
            ]
        );
    }
}
