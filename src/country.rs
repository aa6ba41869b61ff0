use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::matching::token_sort_ratio;

const FUZZY_COUNTRY_THRESHOLD: u8 = 90;

/// Lowercased alias -> canonical country name. Covers ISO-ish codes,
/// common alternate spellings, and cities that show up alone in scraped
/// location strings.
static COUNTRY_TABLE: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let entries: &[(&str, &[&str])] = &[
        ("United States", &["usa", "us", "united states", "united states of america", "america", "new york", "los angeles", "detroit", "chicago", "miami", "brooklyn"]),
        ("United Kingdom", &["uk", "united kingdom", "great britain", "england", "scotland", "wales", "london", "manchester", "bristol", "glasgow"]),
        ("Germany", &["germany", "de", "deutschland", "berlin", "hamburg", "cologne", "munich", "frankfurt"]),
        ("France", &["france", "fr", "paris", "lyon", "marseille"]),
        ("Netherlands", &["netherlands", "nl", "holland", "the netherlands", "amsterdam", "rotterdam", "utrecht"]),
        ("Belgium", &["belgium", "be", "brussels", "antwerp", "ghent"]),
        ("Spain", &["spain", "es", "españa", "barcelona", "madrid", "ibiza", "valencia"]),
        ("Italy", &["italy", "it", "italia", "rome", "milan", "naples", "turin"]),
        ("Sweden", &["sweden", "se", "stockholm", "gothenburg", "malmö"]),
        ("Norway", &["norway", "no", "oslo"]),
        ("Denmark", &["denmark", "dk", "copenhagen"]),
        ("Finland", &["finland", "fi", "helsinki"]),
        ("Portugal", &["portugal", "pt", "lisbon", "porto"]),
        ("Austria", &["austria", "at", "vienna"]),
        ("Switzerland", &["switzerland", "ch", "zurich", "geneva"]),
        ("Poland", &["poland", "pl", "warsaw", "krakow"]),
        ("Czech Republic", &["czech republic", "czechia", "cz", "prague"]),
        ("Hungary", &["hungary", "hu", "budapest"]),
        ("Romania", &["romania", "ro", "bucharest"]),
        ("Greece", &["greece", "gr", "athens"]),
        ("Ireland", &["ireland", "ie", "dublin"]),
        ("Russia", &["russia", "russian federation", "ru", "moscow", "saint petersburg"]),
        ("Ukraine", &["ukraine", "ua", "kyiv", "kiev"]),
        ("Canada", &["canada", "ca", "toronto", "montreal", "vancouver"]),
        ("Mexico", &["mexico", "mx", "méxico", "mexico city"]),
        ("Brazil", &["brazil", "br", "brasil", "são paulo", "sao paulo", "rio de janeiro"]),
        ("Argentina", &["argentina", "ar", "buenos aires"]),
        ("Colombia", &["colombia", "co", "bogotá", "bogota", "medellín", "medellin"]),
        ("Chile", &["chile", "cl", "santiago"]),
        ("Australia", &["australia", "au", "sydney", "melbourne"]),
        ("New Zealand", &["new zealand", "nz", "auckland"]),
        ("Japan", &["japan", "jp", "tokyo", "osaka"]),
        ("South Korea", &["south korea", "korea", "kr", "seoul"]),
        ("India", &["india", "in", "mumbai", "delhi", "goa"]),
        ("Israel", &["israel", "il", "tel aviv"]),
        ("Turkey", &["turkey", "türkiye", "tr", "istanbul"]),
        ("South Africa", &["south africa", "za", "cape town", "johannesburg"]),
        ("Georgia", &["georgia", "ge", "tbilisi"]),
        ("Lithuania", &["lithuania", "lt", "vilnius"]),
        ("Estonia", &["estonia", "ee", "tallinn"]),
    ];
    let mut table = HashMap::new();
    for (canonical, aliases) in entries {
        for alias in *aliases {
            table.insert(*alias, *canonical);
        }
    }
    table
});

/// Canonical country name for a scraped location string.
///
/// Location strings arrive as "City, Country", bare country names, codes
/// or bare cities. Comma-separated parts are scanned from the right, so
/// the country part of "Berlin, Germany" is tried before the city.
pub fn normalize_country(raw: &str) -> Option<String> {
    let parts: Vec<String> = raw
        .split(',')
        .map(|part| part.trim().to_lowercase())
        .filter(|part| !part.is_empty())
        .collect();
    if parts.is_empty() {
        return None;
    }

    for part in parts.iter().rev() {
        if let Some(canonical) = COUNTRY_TABLE.get(part.as_str()) {
            return Some((*canonical).to_string());
        }
    }

    // Misspellings and odd punctuation in the last component.
    let last = parts.last()?;
    COUNTRY_TABLE
        .iter()
        .find(|(alias, _)| token_sort_ratio(last, alias) >= FUZZY_COUNTRY_THRESHOLD)
        .map(|(_, canonical)| (*canonical).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_and_country_resolves_to_country() {
        assert_eq!(
            normalize_country("Berlin, Germany"),
            Some("Germany".to_string())
        );
    }

    #[test]
    fn bare_city_resolves_through_city_table() {
        assert_eq!(normalize_country("Detroit"), Some("United States".to_string()));
    }

    #[test]
    fn country_code_resolves() {
        assert_eq!(normalize_country("UK"), Some("United Kingdom".to_string()));
    }

    #[test]
    fn fuzzy_fallback_catches_misspellings() {
        assert_eq!(normalize_country("Netherland"), Some("Netherlands".to_string()));
    }

    #[test]
    fn unknown_location_yields_none() {
        assert_eq!(normalize_country("Gallifrey"), None);
        assert_eq!(normalize_country(""), None);
    }
}
