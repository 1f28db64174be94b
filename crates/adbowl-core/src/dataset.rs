//! The persisted ad dataset and its JSON file round-trip.

use std::path::Path;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write dataset {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dataset {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize dataset: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// One ad in the dataset, kept as the JSON object it was read as.
///
/// Records are never rewritten by this tool, so the object is stored whole
/// and written back untouched: key order, curator-added keys, and absent
/// curated fields all survive a save. Only `videoId`, `brand` and `adTitle`
/// are required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct AdRecord {
    video_id: String,
    fields: Map<String, Value>,
}

impl AdRecord {
    /// A freshly discovered record with empty curated fields.
    #[must_use]
    pub fn discovered(video_id: &str, brand: &str, ad_title: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("videoId".to_string(), Value::from(video_id));
        fields.insert("brand".to_string(), Value::from(brand));
        fields.insert("adTitle".to_string(), Value::from(ad_title));
        fields.insert("category".to_string(), Value::from(""));
        fields.insert("celebrity".to_string(), Value::Null);
        Self {
            video_id: video_id.to_string(),
            fields,
        }
    }

    #[must_use]
    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    #[must_use]
    pub fn brand(&self) -> &str {
        self.text("brand").unwrap_or_default()
    }

    #[must_use]
    pub fn ad_title(&self) -> &str {
        self.text("adTitle").unwrap_or_default()
    }

    /// Empty until a curator sets it.
    #[must_use]
    pub fn category(&self) -> &str {
        self.text("category").unwrap_or_default()
    }

    #[must_use]
    pub fn celebrity(&self) -> Option<&str> {
        self.text("celebrity")
    }

    /// The record's JSON object in its stored key order.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

impl TryFrom<Map<String, Value>> for AdRecord {
    type Error = String;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let video_id = match fields.get("videoId") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            _ => return Err("ad record needs a non-empty string `videoId`".to_string()),
        };
        for key in ["brand", "adTitle"] {
            if !matches!(fields.get(key), Some(Value::String(_))) {
                return Err(format!("ad record {video_id} needs a string `{key}`"));
            }
        }
        Ok(Self { video_id, fields })
    }
}

impl From<AdRecord> for Map<String, Value> {
    fn from(record: AdRecord) -> Self {
        record.fields
    }
}

/// The dataset document.
///
/// The modeled keys are lifted out of the loaded object, which is kept as
/// `layout` with those slots nulled. Saving writes the modeled values back
/// into their original slots, so top-level key order and unknown keys are
/// preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Dataset {
    pub event: String,
    pub year: i32,
    pub last_updated: NaiveDate,
    pub ads: Vec<AdRecord>,
    layout: Map<String, Value>,
}

const EVENT_KEY: &str = "event";
const YEAR_KEY: &str = "year";
const LAST_UPDATED_KEY: &str = "lastUpdated";
const ADS_KEY: &str = "ads";

impl Dataset {
    #[must_use]
    pub fn empty(event: &str, year: i32, today: NaiveDate) -> Self {
        Self {
            event: event.to_string(),
            year,
            last_updated: today,
            ads: Vec::new(),
            layout: Map::new(),
        }
    }

    /// Append merged records and stamp the update date.
    pub fn append(&mut self, new_ads: Vec<AdRecord>, today: NaiveDate) {
        if new_ads.is_empty() {
            return;
        }
        self.ads.extend(new_ads);
        self.last_updated = today;
    }
}

fn take_field<T: DeserializeOwned>(layout: &mut Map<String, Value>, key: &str) -> Result<T, String> {
    let slot = layout
        .get_mut(key)
        .ok_or_else(|| format!("missing field `{key}`"))?;
    serde_json::from_value(slot.take()).map_err(|e| format!("invalid field `{key}`: {e}"))
}

impl TryFrom<Map<String, Value>> for Dataset {
    type Error = String;

    fn try_from(mut layout: Map<String, Value>) -> Result<Self, Self::Error> {
        Ok(Self {
            event: take_field(&mut layout, EVENT_KEY)?,
            year: take_field(&mut layout, YEAR_KEY)?,
            last_updated: take_field(&mut layout, LAST_UPDATED_KEY)?,
            ads: take_field(&mut layout, ADS_KEY)?,
            layout,
        })
    }
}

impl From<Dataset> for Map<String, Value> {
    fn from(dataset: Dataset) -> Self {
        // Existing keys keep their position on insert; new ones append.
        let mut map = dataset.layout;
        map.insert(EVENT_KEY.to_string(), Value::String(dataset.event));
        map.insert(YEAR_KEY.to_string(), Value::from(dataset.year));
        map.insert(
            LAST_UPDATED_KEY.to_string(),
            Value::String(dataset.last_updated.format("%Y-%m-%d").to_string()),
        );
        map.insert(
            ADS_KEY.to_string(),
            Value::Array(
                dataset
                    .ads
                    .into_iter()
                    .map(|ad| Value::Object(ad.into()))
                    .collect(),
            ),
        );
        map
    }
}

/// Read the dataset file into memory.
///
/// # Errors
///
/// Returns [`DatasetError::Read`] if the file cannot be read and
/// [`DatasetError::Parse`] if it is not a valid dataset document.
pub fn load_dataset(path: &Path) -> Result<Dataset, DatasetError> {
    let content = std::fs::read_to_string(path).map_err(|e| DatasetError::Read {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| DatasetError::Parse {
        path: path.display().to_string(),
        source: e,
    })
}

/// Render the dataset as two-space indented JSON with a trailing newline.
///
/// # Errors
///
/// Returns [`DatasetError::Serialize`] if serialization fails.
pub fn render_dataset(dataset: &Dataset) -> Result<String, DatasetError> {
    let mut out = serde_json::to_string_pretty(dataset).map_err(DatasetError::Serialize)?;
    out.push('\n');
    Ok(out)
}

/// Rewrite the dataset file in a single write.
///
/// # Errors
///
/// Returns [`DatasetError::Write`] if the file cannot be written.
pub fn save_dataset(path: &Path, dataset: &Dataset) -> Result<(), DatasetError> {
    let rendered = render_dataset(dataset)?;
    std::fs::write(path, rendered).map_err(|e| DatasetError::Write {
        path: path.display().to_string(),
        source: e,
    })
}
