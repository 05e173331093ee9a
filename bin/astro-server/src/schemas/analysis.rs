use astro_dataset::catalog::{Correlation, Histogram};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use utoipa::{IntoParams, ToSchema};

/// Query parameters for the distribution endpoints.
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BinsQuery {
    /// Number of bins, 5..=50 (default 10).
    pub bins: Option<i64>,
}

impl BinsQuery {
    pub const DEFAULT_BINS: i64 = 10;
    pub const MIN_BINS: i64 = 5;
    pub const MAX_BINS: i64 = 50;

    pub fn bins(&self) -> Result<usize, String> {
        let bins = self.bins.unwrap_or(Self::DEFAULT_BINS);
        if !(Self::MIN_BINS..=Self::MAX_BINS).contains(&bins) {
            return Err(format!(
                "bins must be between {} and {}, got {bins}",
                Self::MIN_BINS,
                Self::MAX_BINS
            ));
        }
        Ok(bins as usize)
    }
}

/// Histogram with bin-centre labels.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DistributionResponse {
    pub bins: Vec<f64>,
    pub counts: Vec<usize>,
}

impl From<Histogram> for DistributionResponse {
    fn from(h: Histogram) -> Self {
        Self {
            bins: h.bins,
            counts: h.counts,
        }
    }
}

/// Paired series for a magnitude/distance scatter plot.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CorrelationResponse {
    pub magnitudes: Vec<f64>,
    pub distances: Vec<f64>,
}

impl From<Correlation> for CorrelationResponse {
    fn from(c: Correlation) -> Self {
        Self {
            magnitudes: c.magnitudes,
            distances: c.distances,
        }
    }
}

/// Spectral type to count, serialized as a JSON object whose keys keep the
/// most-common-first order.
#[derive(Debug, Clone, Default)]
pub struct SpectralBreakdown(pub Vec<(String, usize)>);

impl Serialize for SpectralBreakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (spectral_type, count) in &self.0 {
            map.serialize_entry(spectral_type, count)?;
        }
        map.end()
    }
}
