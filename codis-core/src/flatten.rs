//! Flattening of one nested CODiS observation into the fixed tabular schema.
//!
//! The upstream payload is loosely shaped: statistical groups are optional and
//! leaf values arrive as numbers or strings depending on the field and the
//! month. Every extraction is therefore a tolerant lookup coerced to text;
//! absent or wrong-shaped groups degrade to empty columns instead of failing
//! the record.

use crate::model::ObservationRecord;
use serde_json::Value;

/// Extraction table: upstream group key, then (sub-field key, output column).
const GROUPS: &[(&str, &[(&str, &str)])] = &[
    (
        "AirTemperature",
        &[
            ("Maximum", "MaxAirTemperature"),
            ("Mean", "MeanAirTemperature"),
            ("Minimum", "MinAirTemperature"),
            ("MaximumTime", "MaxAirTemperatureTime"),
            ("MinimumTime", "MinAirTemperatureTime"),
        ],
    ),
    ("WindSpeed", &[("Mean", "WindSpeed")]),
    ("WindDirection", &[("Prevailing", "WindDirection")]),
    (
        "StationPressure",
        &[
            ("Maximum", "MaxStationPressure"),
            ("Minimum", "MinStationPressure"),
            ("Mean", "MeanStationPressure"),
            ("MaximumTime", "MaxStationPressureTime"),
            ("MinimumTime", "MinStationPressureTime"),
        ],
    ),
    (
        "RelativeHumidity",
        &[
            ("Maximum", "MaxRelativeHumidity"),
            ("Minimum", "MinRelativeHumidity"),
            ("Mean", "MeanRelativeHumidity"),
            ("MaximumTime", "MaxRelativeHumidityTime"),
            ("MinimumTime", "MinRelativeHumidityTime"),
        ],
    ),
    (
        "PeakGust",
        &[
            ("Maximum", "MaxPeakGust"),
            ("MaximumTime", "MaxPeakGustTime"),
            ("Direction", "MaxPeakGustDirection"),
        ],
    ),
    (
        "Precipitation",
        &[
            ("Accumulation", "AccumulationPrecipitation"),
            ("HourlyMaximum", "HourlyMaxPrecipitation"),
            ("HourlyMaximumTime", "HourlyMaxPrecipitationTime"),
            ("MeltFlag", "MeltFlagPrecipitation"),
        ],
    ),
    ("SunshineDuration", &[("Total", "SunshineDuration")]),
    (
        "GlobalSolarRadiation",
        &[
            ("Accumulation", "AccumulationGlobalSolarRadiation"),
            ("HourlyMaximum", "HourlyMaximumGlobalSolarRadiation"),
            ("HourlyMaximumTime", "HourlyMaximumGlobalSolarRadiationTime"),
        ],
    ),
];

/// Map one raw observation object to a flat record.
pub fn flatten(raw: &Value) -> ObservationRecord {
    let mut record = ObservationRecord::default();
    for &(group_key, fields) in GROUPS {
        let Some(group) = raw.get(group_key).and_then(Value::as_object) else {
            continue;
        };
        for &(sub_key, column) in fields {
            if let Some(text) = stringify(group.get(sub_key)) {
                record.set(column, text);
            }
        }
    }
    if let Some(text) = stringify(raw.get("DataDate")) {
        record.set("DataDate", text);
    }
    record
}

/// Uniform coercion of a mixed numeric/string leaf to its display form.
/// Absent and explicit-null both count as missing.
fn stringify(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CSV_COLUMNS;
    use serde_json::json;

    #[test]
    fn sparse_observation_fills_only_its_columns() {
        let raw = json!({
            "AirTemperature": { "Mean": 21.3 },
            "DataDate": "2023-01-01"
        });
        let record = flatten(&raw);

        assert_eq!(record.get("MeanAirTemperature"), "21.3");
        assert_eq!(record.get("DataDate"), "2023-01-01");
        for column in CSV_COLUMNS {
            if column != "MeanAirTemperature" && column != "DataDate" {
                assert_eq!(record.get(column), "", "column {column} should be empty");
            }
        }
    }

    #[test]
    fn every_schema_column_is_readable_from_an_empty_observation() {
        let record = flatten(&json!({}));
        for column in CSV_COLUMNS {
            assert_eq!(record.get(column), "");
        }
    }

    #[test]
    fn mixed_leaf_types_all_coerce_to_text() {
        let raw = json!({
            "AirTemperature": {
                "Maximum": 33,
                "Mean": "21.3",
                "Minimum": 12.5,
                "MaximumTime": "2023-01-12T13:10:00"
            },
            "Precipitation": { "MeltFlag": 0 }
        });
        let record = flatten(&raw);

        assert_eq!(record.get("MaxAirTemperature"), "33");
        assert_eq!(record.get("MeanAirTemperature"), "21.3");
        assert_eq!(record.get("MinAirTemperature"), "12.5");
        assert_eq!(record.get("MaxAirTemperatureTime"), "2023-01-12T13:10:00");
        assert_eq!(record.get("MeltFlagPrecipitation"), "0");
    }

    #[test]
    fn wrong_shaped_group_degrades_to_empty_columns() {
        // A group that is a scalar instead of a nested mapping must not abort
        // the record.
        let raw = json!({
            "WindSpeed": 5.1,
            "WindDirection": { "Prevailing": 180 },
            "DataDate": "2022-07-01"
        });
        let record = flatten(&raw);

        assert_eq!(record.get("WindSpeed"), "");
        assert_eq!(record.get("WindDirection"), "180");
        assert_eq!(record.get("DataDate"), "2022-07-01");
    }

    #[test]
    fn null_leaves_count_as_missing() {
        let raw = json!({
            "SunshineDuration": { "Total": null },
            "DataDate": null
        });
        let record = flatten(&raw);

        assert_eq!(record.get("SunshineDuration"), "");
        assert_eq!(record.get("DataDate"), "");
        assert_eq!(record.populated(), 0);
    }

    #[test]
    fn full_observation_populates_every_group() {
        let raw = json!({
            "AirTemperature": {
                "Maximum": 30.1, "Mean": 24.9, "Minimum": 19.2,
                "MaximumTime": "t1", "MinimumTime": "t2"
            },
            "WindSpeed": { "Mean": 2.4 },
            "WindDirection": { "Prevailing": 90 },
            "StationPressure": {
                "Maximum": 1013.2, "Minimum": 1002.8, "Mean": 1008.0,
                "MaximumTime": "t3", "MinimumTime": "t4"
            },
            "RelativeHumidity": {
                "Maximum": 98, "Minimum": 55, "Mean": 77,
                "MaximumTime": "t5", "MinimumTime": "t6"
            },
            "PeakGust": { "Maximum": 17.3, "MaximumTime": "t7", "Direction": 225 },
            "Precipitation": {
                "Accumulation": 120.5, "HourlyMaximum": 35.0,
                "HourlyMaximumTime": "t8", "MeltFlag": 0
            },
            "SunshineDuration": { "Total": 180.4 },
            "GlobalSolarRadiation": {
                "Accumulation": 450.2, "HourlyMaximum": 2.9, "HourlyMaximumTime": "t9"
            },
            "DataDate": "2021-06-01"
        });
        let record = flatten(&raw);

        assert_eq!(record.populated(), CSV_COLUMNS.len());
        for column in CSV_COLUMNS {
            assert_ne!(record.get(column), "", "column {column} should be set");
        }
    }
}
