//! Extraction of venues from the explore endpoint's JSON payload.
//!
//! The payload is walked as a plain [`Value`]: every field along
//! `response.groups[0].items[*].venue` may be absent, and absence is
//! answered with an empty value rather than a failure wherever a result can
//! still be produced.

use serde_json::Value;

use crate::{constants::*, error::SearchError, venue::Venue};

/// Check the status embedded in the payload, on top of the HTTP status.
///
/// Both the top-level `cod` field and the `meta.code` envelope are honoured.
/// Either may be a string or a number; an absent or null code counts as success.
pub fn check_status(root: &Value) -> Result<(), SearchError> {
    if let Some(code) = root.get("cod") {
        if !is_success_code(code) {
            let message = str_at(root, "message").unwrap_or_default();
            return Err(SearchError::ApiError(message.to_string()));
        }
    }
    if let Some(meta) = root.get("meta") {
        if let Some(code) = meta.get("code") {
            if !is_success_code(code) {
                let message = str_at(meta, "errorDetail")
                    .or_else(|| str_at(meta, "errorType"))
                    .unwrap_or_default();
                return Err(SearchError::ApiError(message.to_string()));
            }
        }
    }
    Ok(())
}

fn is_success_code(code: &Value) -> bool {
    match code {
        Value::Null => true,
        Value::String(code) => code == &API_SUCCESS_CODE.to_string(),
        Value::Number(code) => code.as_f64() == Some(API_SUCCESS_CODE as f64),
        _ => false,
    }
}

/// Venue objects of the first group, in payload order.
///
/// A missing `response` object means nothing can be produced and is an error.
/// Missing or empty `groups`/`items` simply mean zero venues.
pub fn venue_entries(root: &Value) -> Result<Vec<&Value>, SearchError> {
    let response = root
        .get("response")
        .filter(|response| response.is_object())
        .ok_or(SearchError::MissingField("response"))?;
    let items = response
        .get("groups")
        .and_then(Value::as_array)
        .and_then(|groups| groups.first())
        .and_then(|group| group.get("items"))
        .and_then(Value::as_array);
    Ok(items
        .into_iter()
        .flatten()
        .filter_map(|item| item.get("venue"))
        .filter(|venue| venue.is_object())
        .collect())
}

/// Status check followed by venue extraction.
pub fn parse_venues(root: &Value) -> Result<Vec<Venue>, SearchError> {
    check_status(root)?;
    Ok(venue_entries(root)?.into_iter().map(parse_venue).collect())
}

/// Flatten a single venue object into a [`Venue`].
pub fn parse_venue(venue: &Value) -> Venue {
    let (id, uri) = venue_id(venue);
    let category = first_category(venue);
    let category_icon = category
        .and_then(|category| category.get("icon"))
        .and_then(|icon| sized_url(icon, CATEGORY_ICON_SIZE))
        .unwrap_or_default();
    let location = venue.get("location");
    let address = compose_address(
        location.and_then(|location| str_at(location, "address")),
        location.and_then(|location| str_at(location, "crossStreet")),
    );
    let venue_photo = featured_photo(venue).unwrap_or_else(|| category_icon.clone());

    Venue {
        id,
        title: str_at(venue, "name").unwrap_or_default().to_string(),
        category_name: category
            .and_then(|category| str_at(category, "name"))
            .unwrap_or_default()
            .to_string(),
        category_icon,
        address,
        venue_photo,
        uri,
    }
}

/// Numeric id (0 when not numeric) and the id as the API spelled it.
fn venue_id(venue: &Value) -> (u64, String) {
    match venue.get("id") {
        Some(Value::String(id)) => (id.parse().unwrap_or(0), id.clone()),
        Some(Value::Number(id)) => (id.as_u64().unwrap_or(0), id.to_string()),
        _ => (0, String::new()),
    }
}

/// The first listed category. Venues normally carry exactly one.
pub fn first_category(venue: &Value) -> Option<&Value> {
    venue
        .get("categories")
        .and_then(Value::as_array)
        .and_then(|categories| categories.first())
}

/// `"<address> (<cross street>)"`, or whichever part is present.
pub fn compose_address(address: Option<&str>, cross_street: Option<&str>) -> String {
    let address = address.filter(|address| !address.is_empty());
    let cross_street = cross_street.filter(|cross_street| !cross_street.is_empty());
    match (address, cross_street) {
        (Some(address), Some(cross_street)) => format!("{address} ({cross_street})"),
        (Some(address), None) => address.to_string(),
        (None, Some(cross_street)) => cross_street.to_string(),
        (None, None) => String::new(),
    }
}

/// URL of the first featured photo at [`VENUE_PHOTO_SIZE`].
pub fn featured_photo(venue: &Value) -> Option<String> {
    venue
        .get("featuredPhotos")
        .and_then(|photos| photos.get("items"))
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .and_then(|photo| sized_url(photo, VENUE_PHOTO_SIZE))
}

/// Join an image's `prefix` and `suffix` around a size token.
pub fn sized_url(image: &Value, size: &str) -> Option<String> {
    let prefix = str_at(image, "prefix")?;
    let suffix = str_at(image, "suffix")?;
    Some(format!("{prefix}{size}{suffix}"))
}

fn str_at<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}
