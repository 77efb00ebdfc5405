use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const VIN: &str = "VIN";
pub const CITY: &str = "City";
pub const STATE: &str = "State";
pub const MODEL_YEAR: &str = "ModelYear";
pub const MAKE: &str = "Make";
pub const MODEL: &str = "Model";
pub const VEHICLE_TYPE: &str = "VehicleType";
pub const LATITUDE: &str = "Latitude";
pub const LONGITUDE: &str = "Longitude";

/// Columns the EV population dataset is expected to carry.
pub const KNOWN_FIELDS: [&str; 9] = [
    VIN,
    CITY,
    STATE,
    MODEL_YEAR,
    MAKE,
    MODEL,
    VEHICLE_TYPE,
    LATITUDE,
    LONGITUDE,
];

/// One CSV row: header name → raw string value.
///
/// The mapping is open, so columns beyond [`KNOWN_FIELDS`] are kept under
/// their original header names. Values are never coerced; `Latitude` stays
/// `"47.6"`, not `47.6`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to `value`, returning the previous value if the column was
    /// already present.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate `(name, value)` pairs ordered by column name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn vin(&self) -> Option<&str> {
        self.get(VIN)
    }

    pub fn city(&self) -> Option<&str> {
        self.get(CITY)
    }

    pub fn state(&self) -> Option<&str> {
        self.get(STATE)
    }

    pub fn model_year(&self) -> Option<&str> {
        self.get(MODEL_YEAR)
    }

    pub fn make(&self) -> Option<&str> {
        self.get(MAKE)
    }

    pub fn model(&self) -> Option<&str> {
        self.get(MODEL)
    }

    pub fn vehicle_type(&self) -> Option<&str> {
        self.get(VEHICLE_TYPE)
    }

    pub fn latitude(&self) -> Option<&str> {
        self.get(LATITUDE)
    }

    pub fn longitude(&self) -> Option<&str> {
        self.get(LONGITUDE)
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
