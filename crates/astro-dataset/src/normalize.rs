//! Conversion of raw archive rows into [`AstronomicalObject`]s.

use serde_json::Value;

use crate::model::{AstronomicalObject, RawRecord};

/// Parsecs to light years.
pub const DISTANCE_PC_TO_LY: f64 = 3.26156;

const FIELD_MAGNITUDE: &str = "sy_vmag";
const FIELD_DISTANCE_PC: &str = "sy_dist";
const FIELD_PLANET_NAME: &str = "pl_name";
const FIELD_HOST_NAME: &str = "hostname";
const FIELD_SYSTEM_STARS: &str = "sy_snum";
const FIELD_SPECTRAL_TYPE: &str = "st_spectype";

const UNKNOWN: &str = "Unknown";

/// Normalize one raw row.
///
/// Returns `None` when magnitude or distance is missing or unparseable; the
/// caller skips that index without treating it as an error.
pub fn normalize(raw: &RawRecord, index: u32) -> Option<AstronomicalObject> {
    let magnitude = raw.get(FIELD_MAGNITUDE).and_then(parse_number)?;
    let distance_pc = raw.get(FIELD_DISTANCE_PC).and_then(parse_number)?;

    let name = non_empty_text(raw.get(FIELD_PLANET_NAME))
        .or_else(|| non_empty_text(raw.get(FIELD_HOST_NAME)))
        .unwrap_or_else(|| format!("Object {index}"));
    let constellation =
        non_empty_text(raw.get(FIELD_SYSTEM_STARS)).unwrap_or_else(|| UNKNOWN.to_owned());
    let spectral_type =
        non_empty_text(raw.get(FIELD_SPECTRAL_TYPE)).unwrap_or_else(|| UNKNOWN.to_owned());

    Some(AstronomicalObject {
        id: index,
        name,
        constellation,
        magnitude,
        distance_ly: round3(distance_pc * DISTANCE_PC_TO_LY),
        spectral_type,
    })
}

/// Normalize a fetched batch, assigning ids `1..=N` in fetch order.
///
/// Dropped rows still consume their index, so ids may have gaps.
pub fn normalize_all(records: &[RawRecord]) -> Vec<AstronomicalObject> {
    records
        .iter()
        .zip(1u32..)
        .filter_map(|(raw, index)| normalize(raw, index))
        .collect()
}

/// Read a JSON value as a finite number.
///
/// Numbers pass through; strings are trimmed and parsed. Null, empty or
/// non-numeric strings, non-finite values and any other JSON kind are absent.
pub fn parse_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                s.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Coerce a scalar to trimmed text; `None` for null, containers and blanks.
fn non_empty_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_owned(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    fn kepler_22() -> RawRecord {
        record(json!({
            "pl_name": "Kepler-22 b",
            "hostname": "Kepler-22",
            "sy_snum": "1",
            "sy_vmag": "11.664",
            "sy_dist": "195.0",
            "st_spectype": "G5",
        }))
    }

    #[test]
    fn converts_a_complete_record() {
        let obj = normalize(&kepler_22(), 1).expect("record should normalize");
        assert_eq!(obj.id, 1);
        assert_eq!(obj.name, "Kepler-22 b");
        assert_eq!(obj.constellation, "1");
        assert_eq!(obj.spectral_type, "G5");
        assert!((obj.magnitude - 11.664).abs() < 1e-9);
        assert_eq!(obj.distance_ly, 636.004);
    }

    #[test]
    fn distance_is_converted_and_rounded_to_three_places() {
        for pc in [1.0, 1.3012, 8.6, 42.123456, 0.0] {
            let raw = record(json!({ "sy_vmag": 1.0, "sy_dist": pc }));
            let obj = normalize(&raw, 1).unwrap();
            let expected = (pc * DISTANCE_PC_TO_LY * 1000.0).round() / 1000.0;
            assert_eq!(obj.distance_ly, expected, "pc = {pc}");
        }
    }

    #[test]
    fn missing_magnitude_or_distance_yields_none() {
        let cases = [
            json!({ "sy_dist": "10" }),
            json!({ "sy_vmag": "1.2" }),
            json!({ "sy_vmag": null, "sy_dist": "10" }),
            json!({ "sy_vmag": "", "sy_dist": "10" }),
            json!({ "sy_vmag": "1.2", "sy_dist": "  " }),
            json!({ "sy_vmag": "bright", "sy_dist": "10" }),
            json!({ "sy_vmag": "1.2", "sy_dist": "NaN" }),
            json!({ "sy_vmag": [1.2], "sy_dist": "10" }),
        ];
        for case in cases {
            assert!(normalize(&record(case.clone()), 3).is_none(), "{case}");
        }
    }

    #[test]
    fn name_prefers_planet_name() {
        let obj = normalize(&kepler_22(), 5).unwrap();
        assert_eq!(obj.name, "Kepler-22 b");
    }

    #[test]
    fn name_falls_back_to_host_name() {
        let raw = record(json!({
            "pl_name": "   ",
            "hostname": "  HD 209458 ",
            "sy_vmag": 7.65,
            "sy_dist": 48.3,
        }));
        assert_eq!(normalize(&raw, 5).unwrap().name, "HD 209458");
    }

    #[test]
    fn name_falls_back_to_index_label() {
        let raw = record(json!({ "pl_name": null, "sy_vmag": 7.65, "sy_dist": 48.3 }));
        assert_eq!(normalize(&raw, 42).unwrap().name, "Object 42");
    }

    #[test]
    fn defaults_for_missing_descriptive_fields() {
        let raw = record(json!({ "sy_vmag": 7.65, "sy_dist": 48.3, "st_spectype": "" }));
        let obj = normalize(&raw, 1).unwrap();
        assert_eq!(obj.constellation, "Unknown");
        assert_eq!(obj.spectral_type, "Unknown");
    }

    #[test]
    fn numeric_system_count_is_coerced_to_text() {
        let raw = record(json!({ "sy_vmag": 7.65, "sy_dist": 48.3, "sy_snum": 2 }));
        assert_eq!(normalize(&raw, 1).unwrap().constellation, "2");
    }

    #[test]
    fn dropped_records_still_consume_their_index() {
        let records = vec![
            record(json!({ "pl_name": "a", "sy_vmag": 1.0, "sy_dist": 1.0 })),
            record(json!({ "pl_name": "b", "sy_vmag": null, "sy_dist": 1.0 })),
            record(json!({ "pl_name": "c", "sy_vmag": 3.0, "sy_dist": 1.0 })),
        ];
        let objects = normalize_all(&records);
        let ids: Vec<(u32, &str)> = objects.iter().map(|o| (o.id, o.name.as_str())).collect();
        assert_eq!(ids, vec![(1, "a"), (3, "c")]);
    }
}
