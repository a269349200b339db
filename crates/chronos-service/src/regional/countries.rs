//! Supported-country enumeration for the regional holiday overlay.
//!
//! Fixed table of two-letter codes mapped to the upstream feed's calendar
//! slug and a display name. User region codes are validated against the same
//! table.

use crate::error::{ServiceError, ServiceResult};

/// (code, upstream feed slug, display name)
const COUNTRIES: &[(&str, &str, &str)] = &[
    ("au", "australian", "Australia"),
    ("at", "austrian", "Austria"),
    ("br", "brazilian", "Brazil"),
    ("bg", "bulgarian", "Bulgaria"),
    ("ca", "canadian", "Canada"),
    ("cn", "china", "China"),
    ("hr", "croatian", "Croatia"),
    ("cz", "czech", "Czech Republic"),
    ("dk", "danish", "Denmark"),
    ("fi", "finnish", "Finland"),
    ("fr", "french", "France"),
    ("de", "german", "Germany"),
    ("gb", "uk", "United Kingdom"),
    ("gr", "greek", "Greece"),
    ("hk", "hong_kong", "Hong Kong"),
    ("hu", "hungarian", "Hungary"),
    ("in", "indian", "India"),
    ("id", "indonesian", "Indonesia"),
    ("ie", "irish", "Ireland"),
    ("il", "jewish", "Israel"),
    ("it", "italian", "Italy"),
    ("jp", "japanese", "Japan"),
    ("lv", "latvian", "Latvia"),
    ("lt", "lithuanian", "Lithuania"),
    ("my", "malaysia", "Malaysia"),
    ("mx", "mexican", "Mexico"),
    ("nl", "dutch", "Netherlands"),
    ("nz", "new_zealand", "New Zealand"),
    ("no", "norwegian", "Norway"),
    ("ph", "philippines", "Philippines"),
    ("pl", "polish", "Poland"),
    ("pt", "portuguese", "Portugal"),
    ("ro", "romanian", "Romania"),
    ("sa", "saudiarabian", "Saudi Arabia"),
    ("sg", "singapore", "Singapore"),
    ("sk", "slovak", "Slovakia"),
    ("si", "slovenian", "Slovenia"),
    ("kr", "south_korea", "South Korea"),
    ("es", "spain", "Spain"),
    ("se", "swedish", "Sweden"),
    ("tw", "taiwan", "Taiwan"),
    ("tl", "thai", "Thailand"),
    ("tr", "turkish", "Turkey"),
    ("ua", "ukrainian", "Ukraine"),
    ("us", "usa", "United States"),
    ("vn", "vietnamese", "Vietnam"),
];

/// Lowercases and trims a country code. The literal string "ukraine" maps to
/// its code; everything else passes through for the support check.
///
/// ## Errors
/// Returns a validation error for an empty code.
pub fn normalize(country_code: &str) -> ServiceResult<String> {
    let normalized = country_code.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(ServiceError::ValidationError(
            "Country code is required".to_owned(),
        ));
    }
    if normalized == "ukraine" {
        return Ok("ua".to_owned());
    }
    Ok(normalized)
}

#[must_use]
pub fn is_supported(code: &str) -> bool {
    COUNTRIES.iter().any(|(c, _, _)| *c == code)
}

/// Upstream calendar identifier for a normalized code.
///
/// ## Errors
/// Returns a validation error for an unsupported code.
pub fn feed_calendar_id(code: &str) -> ServiceResult<String> {
    COUNTRIES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, slug, _)| format!("en.{slug}#holiday@group.v.calendar.google.com"))
        .ok_or_else(|| {
            ServiceError::ValidationError(format!("Country \"{code}\" is not supported"))
        })
}

#[must_use]
pub fn display_name(code: &str) -> String {
    COUNTRIES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map_or_else(|| code.to_uppercase(), |(_, _, name)| (*name).to_owned())
}
