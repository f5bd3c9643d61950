//! Static country-code translation tables.
//!
//! The map layer identifies countries by ISO2-style codes. Eurostat speaks a
//! 2-letter dialect with two deviations from ISO (EL for Greece, UK for the
//! United Kingdom) and only covers EU members, EFTA and candidate countries.
//! The World Bank speaks ISO3. Both tables are curated by hand so that
//! unsupported territories are an explicit, testable fact rather than an
//! inference.

use crate::models::Country;

/// The known European countries, as the external geographic dataset reports
/// them: (ISO2 id, display name).
pub const EUROPE: &[(&str, &str)] = &[
    ("AL", "Albania"),
    ("AT", "Austria"),
    ("BA", "Bosnia and Herzegovina"),
    ("BE", "Belgium"),
    ("BG", "Bulgaria"),
    ("BY", "Belarus"),
    ("CH", "Switzerland"),
    ("CY", "Cyprus"),
    ("CZ", "Czech Republic"),
    ("DE", "Germany"),
    ("DK", "Denmark"),
    ("EE", "Estonia"),
    ("ES", "Spain"),
    ("FI", "Finland"),
    ("FR", "France"),
    ("GB", "United Kingdom"),
    ("GR", "Greece"),
    ("HR", "Croatia"),
    ("HU", "Hungary"),
    ("IE", "Ireland"),
    ("IS", "Iceland"),
    ("IT", "Italy"),
    ("LT", "Lithuania"),
    ("LU", "Luxembourg"),
    ("LV", "Latvia"),
    ("MD", "Moldova"),
    ("ME", "Montenegro"),
    ("MK", "North Macedonia"),
    ("MT", "Malta"),
    ("NL", "Netherlands"),
    ("NO", "Norway"),
    ("PL", "Poland"),
    ("PT", "Portugal"),
    ("RO", "Romania"),
    ("RS", "Serbia"),
    ("RU", "Russia"),
    ("SE", "Sweden"),
    ("SI", "Slovenia"),
    ("SK", "Slovakia"),
    ("TR", "Turkey"),
    ("UA", "Ukraine"),
];

/// Countries Eurostat publishes data for: EU members, EFTA and candidate
/// countries, keyed by the external ISO2 id. Greece and the United Kingdom
/// carry Eurostat's deviating codes.
const EUROSTAT_DIALECT: &[(&str, &str)] = &[
    ("AL", "AL"),
    ("AT", "AT"),
    ("BA", "BA"),
    ("BE", "BE"),
    ("BG", "BG"),
    ("CH", "CH"),
    ("CY", "CY"),
    ("CZ", "CZ"),
    ("DE", "DE"),
    ("DK", "DK"),
    ("EE", "EE"),
    ("ES", "ES"),
    ("FI", "FI"),
    ("FR", "FR"),
    ("GB", "UK"), // Eurostat uses UK instead of GB
    ("GR", "EL"), // Eurostat uses EL instead of GR
    ("HR", "HR"),
    ("HU", "HU"),
    ("IE", "IE"),
    ("IS", "IS"),
    ("IT", "IT"),
    ("LT", "LT"),
    ("LU", "LU"),
    ("LV", "LV"),
    ("ME", "ME"),
    ("MK", "MK"),
    ("MT", "MT"),
    ("NL", "NL"),
    ("NO", "NO"),
    ("PL", "PL"),
    ("PT", "PT"),
    ("RO", "RO"),
    ("RS", "RS"),
    ("SE", "SE"),
    ("SI", "SI"),
    ("SK", "SK"),
    ("TR", "TR"),
];

/// Territories deliberately excluded from Eurostat lookups even though a
/// code might resolve: coverage is too sparse to be useful.
const EUROSTAT_EXCLUDED: &[&str] = &["AD", "FO", "GI", "MC", "SM", "VA", "XK"];

/// ISO2 → ISO3 for the World Bank dialect. Accepts both GB and Eurostat's UK
/// spelling since callers occasionally hold the latter.
const ISO2_TO_ISO3: &[(&str, &str)] = &[
    ("AL", "ALB"),
    ("AT", "AUT"),
    ("BA", "BIH"),
    ("BE", "BEL"),
    ("BG", "BGR"),
    ("BY", "BLR"),
    ("CH", "CHE"),
    ("CY", "CYP"),
    ("CZ", "CZE"),
    ("DE", "DEU"),
    ("DK", "DNK"),
    ("EE", "EST"),
    ("EL", "GRC"),
    ("ES", "ESP"),
    ("FI", "FIN"),
    ("FR", "FRA"),
    ("GB", "GBR"),
    ("GR", "GRC"),
    ("HR", "HRV"),
    ("HU", "HUN"),
    ("IE", "IRL"),
    ("IS", "ISL"),
    ("IT", "ITA"),
    ("LT", "LTU"),
    ("LU", "LUX"),
    ("LV", "LVA"),
    ("MD", "MDA"),
    ("ME", "MNE"),
    ("MK", "MKD"),
    ("MT", "MLT"),
    ("NL", "NLD"),
    ("NO", "NOR"),
    ("PL", "POL"),
    ("PT", "PRT"),
    ("RO", "ROU"),
    ("RS", "SRB"),
    ("RU", "RUS"),
    ("SE", "SWE"),
    ("SI", "SVN"),
    ("SK", "SVK"),
    ("TR", "TUR"),
    ("UA", "UKR"),
    ("UK", "GBR"),
];

/// Eurostat dialect code for a country, or `None` when Eurostat does not
/// cover it. Pure lookup, no I/O.
pub fn eurostat_code(country: &Country) -> Option<String> {
    if EUROSTAT_EXCLUDED.contains(&country.id.as_str()) {
        return None;
    }
    EUROSTAT_DIALECT
        .iter()
        .find(|(iso2, _)| *iso2 == country.id)
        .map(|(_, code)| (*code).to_string())
}

/// World Bank ISO3 code for a country, or `None` when absent from the table.
pub fn worldbank_code(country: &Country) -> Option<String> {
    ISO2_TO_ISO3
        .iter()
        .find(|(iso2, _)| *iso2 == country.id)
        .map(|(_, code)| (*code).to_string())
}

/// The full roster as owned `Country` values, for overlay-mode batch calls.
pub fn all_countries() -> Vec<Country> {
    EUROPE
        .iter()
        .map(|(id, name)| Country::new(*id, *name))
        .collect()
}

/// Look a country up by its external id (case-insensitive).
pub fn find_country(id: &str) -> Option<Country> {
    EUROPE
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(id))
        .map(|(code, name)| Country::new(*code, *name))
}
