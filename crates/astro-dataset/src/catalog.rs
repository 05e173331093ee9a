//! Read-only queries over a loaded snapshot: filtering, pagination,
//! summary statistics and histograms.

use std::collections::HashMap;

use serde::Serialize;

use crate::model::AstronomicalObject;

/// Optional filters; `None` means "don't filter on this".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectFilter {
    pub magnitude_min: Option<f64>,
    pub magnitude_max: Option<f64>,
    pub distance_min: Option<f64>,
    pub distance_max: Option<f64>,
    /// Exact match, case-insensitive.
    pub constellation: Option<String>,
    /// Exact match, case-insensitive.
    pub spectral_type: Option<String>,
    /// Case-insensitive substring over name and constellation.
    pub search: Option<String>,
}

impl ObjectFilter {
    pub fn matches(&self, obj: &AstronomicalObject) -> bool {
        if self.magnitude_min.is_some_and(|min| obj.magnitude < min) {
            return false;
        }
        if self.magnitude_max.is_some_and(|max| obj.magnitude > max) {
            return false;
        }
        if self.distance_min.is_some_and(|min| obj.distance_ly < min) {
            return false;
        }
        if self.distance_max.is_some_and(|max| obj.distance_ly > max) {
            return false;
        }
        if let Some(c) = non_blank(&self.constellation) {
            if obj.constellation.to_lowercase() != c.to_lowercase() {
                return false;
            }
        }
        if let Some(s) = non_blank(&self.spectral_type) {
            if obj.spectral_type.to_lowercase() != s.to_lowercase() {
                return false;
            }
        }
        if let Some(q) = non_blank(&self.search) {
            let haystack = format!("{} {}", obj.name, obj.constellation).to_lowercase();
            if !haystack.contains(&q.to_lowercase()) {
                return false;
            }
        }
        true
    }

    /// Objects passing every filter, in snapshot order.
    pub fn apply<'a>(&self, objects: &'a [AstronomicalObject]) -> Vec<&'a AstronomicalObject> {
        objects.iter().filter(|o| self.matches(o)).collect()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// One page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    /// Total number of pages; `0` when there are no items.
    pub pages: usize,
}

/// Slice out 1-based `page` of `page_size` items.
///
/// Pages beyond the end are empty but still report the real totals.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let total = items.len();
    if total == 0 || page_size == 0 {
        return Page {
            items: Vec::new(),
            total,
            pages: 0,
        };
    }

    let pages = total.div_ceil(page_size);
    let start = page.saturating_sub(1).saturating_mul(page_size);
    let items = if start >= total {
        Vec::new()
    } else {
        items[start..(start + page_size).min(total)].to_vec()
    };
    Page {
        items,
        total,
        pages,
    }
}

/// Summary of the whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub count: usize,
    pub magnitude_min: Option<f64>,
    pub magnitude_max: Option<f64>,
    pub magnitude_avg: Option<f64>,
    pub brightest_object: Option<AstronomicalObject>,
    pub dimmest_object: Option<AstronomicalObject>,
}

pub fn compute_stats(objects: &[AstronomicalObject]) -> Stats {
    // First minimum and first maximum win on ties.
    let brightest = objects
        .iter()
        .reduce(|best, o| if o.magnitude < best.magnitude { o } else { best });
    let dimmest = objects
        .iter()
        .reduce(|worst, o| if o.magnitude > worst.magnitude { o } else { worst });
    let magnitude_avg = (!objects.is_empty())
        .then(|| objects.iter().map(|o| o.magnitude).sum::<f64>() / objects.len() as f64);

    Stats {
        count: objects.len(),
        magnitude_min: brightest.map(|o| o.magnitude),
        magnitude_max: dimmest.map(|o| o.magnitude),
        magnitude_avg,
        brightest_object: brightest.cloned(),
        dimmest_object: dimmest.cloned(),
    }
}

/// Equal-width histogram: bin centre labels and per-bin counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Histogram {
    pub bins: Vec<f64>,
    pub counts: Vec<usize>,
}

/// Bin `values` into `bins` equal-width buckets spanning `[min, max]`.
///
/// Labels are bucket centres rounded to `label_decimals`. The maximum value
/// lands in the last bucket, as does everything when all values are equal.
pub fn histogram(values: &[f64], bins: usize, label_decimals: i32) -> Histogram {
    if values.is_empty() || bins == 0 {
        return Histogram::default();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = (max - min) / bins as f64;

    let labels = (0..bins)
        .map(|i| {
            let lo = min + i as f64 * width;
            let hi = min + (i + 1) as f64 * width;
            round_to((lo + hi) / 2.0, label_decimals)
        })
        .collect();

    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = if v == max || width == 0.0 {
            bins - 1
        } else {
            (((v - min) / width) as usize).min(bins - 1)
        };
        counts[idx] += 1;
    }

    Histogram {
        bins: labels,
        counts,
    }
}

pub fn magnitude_distribution(objects: &[AstronomicalObject], bins: usize) -> Histogram {
    let values: Vec<f64> = objects.iter().map(|o| o.magnitude).collect();
    histogram(&values, bins, 2)
}

pub fn distance_distribution(objects: &[AstronomicalObject], bins: usize) -> Histogram {
    let values: Vec<f64> = objects.iter().map(|o| o.distance_ly).collect();
    histogram(&values, bins, 1)
}

/// Count objects per spectral type, most common first.
///
/// Ties keep first-seen order.
pub fn spectral_breakdown(objects: &[AstronomicalObject]) -> Vec<(String, usize)> {
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for obj in objects.iter().filter(|o| !o.spectral_type.is_empty()) {
        match index.get(obj.spectral_type.as_str()) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(obj.spectral_type.as_str(), order.len());
                order.push((obj.spectral_type.clone(), 1));
            }
        }
    }
    // Stable sort keeps first-seen order among equal counts.
    order.sort_by(|a, b| b.1.cmp(&a.1));
    order
}

/// Paired magnitude and distance series for a scatter plot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Correlation {
    pub magnitudes: Vec<f64>,
    pub distances: Vec<f64>,
}

pub fn magnitude_distance_correlation(objects: &[AstronomicalObject]) -> Correlation {
    Correlation {
        magnitudes: objects.iter().map(|o| o.magnitude).collect(),
        distances: objects.iter().map(|o| o.distance_ly).collect(),
    }
}

fn round_to(v: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (v * factor).round() / factor
}
