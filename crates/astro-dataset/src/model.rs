use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row as returned by the archive: field name to string/number/null.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// A single exoplanet host star after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstronomicalObject {
    /// 1-based position of the source row in the fetched batch.
    pub id: u32,
    pub name: String,
    pub constellation: String,
    /// Apparent V-band magnitude; smaller is brighter.
    pub magnitude: f64,
    /// Distance in light years, rounded to 3 decimal places.
    pub distance_ly: f64,
    pub spectral_type: String,
}

/// Where the objects of a [`Dataset`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetSource {
    /// Fetched from the archive during this process lifetime.
    Remote,
    /// Read from an unexpired durable cache payload.
    Cache,
    /// Read from a cache payload after the archive failed; may be expired.
    StaleCache,
}

/// The normalized snapshot shared by every reader.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub objects: Vec<AstronomicalObject>,
    /// When the underlying raw records were fetched from the archive.
    pub fetched_at: DateTime<Utc>,
    pub source: DatasetSource,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[AstronomicalObject] {
        &self.objects
    }
}
