//! Attribute/value/unit metadata triples

use serde::{Deserialize, Serialize};

/// A single metadata annotation on a store object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Avu {
    pub attribute: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

impl Avu {
    #[must_use]
    pub fn new(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
            units: None,
        }
    }

    #[must_use]
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }
}

/// All annotations carried by one object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataSet(Vec<Avu>);

impl MetadataSet {
    #[must_use]
    pub fn new(avus: Vec<Avu>) -> Self {
        Self(avus)
    }

    /// Whether an annotation `attribute = value` is present, units ignored
    #[must_use]
    pub fn contains(&self, attribute: &str, value: &str) -> bool {
        self.0
            .iter()
            .any(|avu| avu.attribute == attribute && avu.value == value)
    }

    /// Values recorded under `attribute`
    pub fn values_of<'a>(&'a self, attribute: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |avu| avu.attribute == attribute)
            .map(|avu| avu.value.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Avu> {
        self.0.iter()
    }
}

impl FromIterator<Avu> for MetadataSet {
    fn from_iter<T: IntoIterator<Item = Avu>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a MetadataSet {
    type Item = &'a Avu;
    type IntoIter = std::slice::Iter<'a, Avu>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
