use serde::Serialize;

/// One venue discovered by the explore endpoint, flattened for display.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct Venue {
    /// Numeric venue id, or 0 when the API id is absent or not numeric.
    pub id: u64,
    pub title: String,
    pub category_name: String,
    pub category_icon: String,
    pub address: String,
    pub venue_photo: String,
    /// The API's own venue id, used by the host to resolve a selected result.
    pub uri: String,
}

/// Venues in the order the API returned them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Venues(Vec<Venue>);

impl Venues {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Venue> {
        self.0.iter()
    }
}

impl From<Vec<Venue>> for Venues {
    fn from(venues: Vec<Venue>) -> Self {
        Venues(venues)
    }
}

impl IntoIterator for Venues {
    type Item = Venue;
    type IntoIter = std::vec::IntoIter<Venue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Venues {
    type Item = &'a Venue;
    type IntoIter = std::slice::Iter<'a, Venue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
