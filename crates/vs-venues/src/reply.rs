use std::{collections::BTreeMap, sync::LazyLock};

use serde::Serialize;
use serde_json::{json, Value};

use crate::{error::SearchError, venue::Venue};

/// Grid of small horizontal cards: title, art and the venue category as subtitle.
pub static VENUES_TEMPLATE: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "schema-version": 1,
        "template": {
            "category-layout": "grid",
            "card-layout": "horizontal",
            "card-size": "small"
        },
        "components": {
            "title": "title",
            "art": {
                "field": "art"
            },
            "subtitle": "category"
        }
    })
});

/// Declarative layout telling the host how to draw a category's results.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryRenderer(Value);

impl CategoryRenderer {
    pub fn template(&self) -> &Value {
        &self.0
    }
}

impl Default for CategoryRenderer {
    fn default() -> Self {
        Self(VENUES_TEMPLATE.clone())
    }
}

/// Handle returned by [`SearchReply::register_category`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Category {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub renderer: CategoryRenderer,
}

/// A displayable result, tied to a registered category.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategorisedResult {
    pub category: String,
    pub uri: String,
    pub title: String,
    pub art: String,
    pub attributes: BTreeMap<String, String>,
}

impl CategorisedResult {
    pub fn new(category: &Category) -> Self {
        Self {
            category: category.id.clone(),
            uri: String::new(),
            title: String::new(),
            art: String::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Result for `venue`, with the category icon as art.
    pub fn from_venue(category: &Category, venue: &Venue) -> Self {
        let mut result = Self::new(category);
        result.uri = venue.uri.clone();
        result.title = venue.title.clone();
        result.art = venue.category_icon.clone();
        result.set("category", &venue.category_name);
        result.set("address", &venue.address);
        result.set("venue_photo", &venue.venue_photo);
        result
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.attributes.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Reply channel supplied by the host for one query.
pub trait SearchReply {
    fn register_category(
        &mut self,
        id: &str,
        title: &str,
        icon: &str,
        renderer: CategoryRenderer,
    ) -> Category;

    /// Hand a result to the host. `false` means the host stopped listening.
    fn push(&mut self, result: CategorisedResult) -> bool;

    fn report_error(&mut self, error: SearchError);
}
