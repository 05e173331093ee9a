use astro_dataset::AstronomicalObject;
use astro_dataset::catalog::{ObjectFilter, Stats};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// A single exoplanet host star.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ObjectResponse {
    pub id: u32,
    pub name: String,
    /// Number of stars in the system, as text; `"Unknown"` when absent.
    pub constellation: String,
    /// Apparent V-band magnitude; smaller is brighter.
    pub magnitude: f64,
    /// Distance in light years.
    pub distance_ly: f64,
    pub spectral_type: String,
}

impl From<&AstronomicalObject> for ObjectResponse {
    fn from(o: &AstronomicalObject) -> Self {
        Self {
            id: o.id,
            name: o.name.clone(),
            constellation: o.constellation.clone(),
            magnitude: o.magnitude,
            distance_ly: o.distance_ly,
            spectral_type: o.spectral_type.clone(),
        }
    }
}

/// Query parameters for `GET /objects`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ObjectQuery {
    /// Include objects with magnitude >= this value.
    pub magnitude_min: Option<f64>,
    /// Include objects with magnitude <= this value.
    pub magnitude_max: Option<f64>,
    /// Minimum distance in light years.
    pub distance_min: Option<f64>,
    /// Maximum distance in light years.
    pub distance_max: Option<f64>,
    /// Exact match, case-insensitive.
    pub constellation: Option<String>,
    /// Exact spectral class, case-insensitive.
    pub spectral_type: Option<String>,
    /// Substring match against name or constellation.
    pub search: Option<String>,
    /// Page number, 1-indexed (default 1).
    pub page: Option<i64>,
    /// Rows per page, 1..=100 (default 25).
    pub page_size: Option<i64>,
}

impl ObjectQuery {
    pub const DEFAULT_PAGE_SIZE: i64 = 25;
    pub const MAX_PAGE_SIZE: i64 = 100;

    pub fn filter(&self) -> ObjectFilter {
        ObjectFilter {
            magnitude_min: self.magnitude_min,
            magnitude_max: self.magnitude_max,
            distance_min: self.distance_min,
            distance_max: self.distance_max,
            constellation: self.constellation.clone(),
            spectral_type: self.spectral_type.clone(),
            search: self.search.clone(),
        }
    }

    /// Validated `(page, page_size)`.
    pub fn pagination(&self) -> Result<(usize, usize), String> {
        let page = self.page.unwrap_or(1);
        if page < 1 {
            return Err(format!("page must be >= 1, got {page}"));
        }
        let page_size = self.page_size.unwrap_or(Self::DEFAULT_PAGE_SIZE);
        if !(1..=Self::MAX_PAGE_SIZE).contains(&page_size) {
            return Err(format!(
                "page_size must be between 1 and {}, got {page_size}",
                Self::MAX_PAGE_SIZE
            ));
        }
        Ok((page as usize, page_size as usize))
    }
}

/// One page of filtered objects.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginatedObjectsResponse {
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub pages: usize,
    pub items: Vec<ObjectResponse>,
}

/// Summary statistics over the whole dataset.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub count: usize,
    pub magnitude_min: Option<f64>,
    pub magnitude_max: Option<f64>,
    pub magnitude_avg: Option<f64>,
    pub brightest_object: Option<ObjectResponse>,
    pub dimmest_object: Option<ObjectResponse>,
}

impl From<Stats> for StatsResponse {
    fn from(s: Stats) -> Self {
        Self {
            count: s.count,
            magnitude_min: s.magnitude_min,
            magnitude_max: s.magnitude_max,
            magnitude_avg: s.magnitude_avg,
            brightest_object: s.brightest_object.as_ref().map(ObjectResponse::from),
            dimmest_object: s.dimmest_object.as_ref().map(ObjectResponse::from),
        }
    }
}
