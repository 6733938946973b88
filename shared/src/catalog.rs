//! Timezone catalog backed by the compiled-in IANA database

use chrono_tz::Tz;

/// All known timezone identifiers, sorted and without duplicates
pub fn list_timezones() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = chrono_tz::TZ_VARIANTS.iter().map(|tz| tz.name()).collect();
    names.sort_unstable();
    names.dedup();
    names
}

/// Search timezones by name (case-insensitive partial match)
pub fn search_timezones(choices: &[&'static str], query: &str) -> Vec<&'static str> {
    let query_lower = query.trim().to_lowercase();
    choices
        .iter()
        .filter(|name| name.to_lowercase().contains(&query_lower))
        .copied()
        .collect()
}

/// Parse a timezone identifier, `None` if it isn't in the database
pub fn parse_timezone(id: &str) -> Option<Tz> {
    id.parse::<Tz>().ok()
}

/// Display names of the cities under `timezone`.
///
/// Covers the zone itself and every zone nested below it. Anything that is not
/// a zone in the database, including bare region prefixes like `"America"`,
/// gives an empty list, matching the clock falling back to local time.
pub fn cities_for(timezone: &str) -> Vec<String> {
    if parse_timezone(timezone).is_none() {
        return Vec::new();
    }
    let nested_prefix = format!("{}/", timezone);

    let mut cities: Vec<String> = Vec::new();
    for name in list_timezones() {
        if name != timezone && !name.starts_with(&nested_prefix) {
            continue;
        }
        let city = city_name(name);
        if !cities.contains(&city) {
            cities.push(city);
        }
    }
    cities
}

fn city_name(zone: &str) -> String {
    zone.rsplit('/').next().unwrap_or(zone).replace('_', " ")
}
