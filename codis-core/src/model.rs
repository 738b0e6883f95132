use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

/// Column order of the exported CSV. Every row carries exactly these columns,
/// with an empty string wherever the upstream payload had no value.
pub const CSV_COLUMNS: [&str; 29] = [
    "DataDate",
    "WindSpeed",
    "WindDirection",
    "SunshineDuration",
    "MaxAirTemperature",
    "MeanAirTemperature",
    "MinAirTemperature",
    "MaxAirTemperatureTime",
    "MinAirTemperatureTime",
    "MaxStationPressure",
    "MinStationPressure",
    "MeanStationPressure",
    "MaxStationPressureTime",
    "MinStationPressureTime",
    "MaxRelativeHumidity",
    "MinRelativeHumidity",
    "MeanRelativeHumidity",
    "MaxRelativeHumidityTime",
    "MinRelativeHumidityTime",
    "MaxPeakGust",
    "MaxPeakGustTime",
    "MaxPeakGustDirection",
    "AccumulationPrecipitation",
    "HourlyMaxPrecipitation",
    "HourlyMaxPrecipitationTime",
    "MeltFlagPrecipitation",
    "AccumulationGlobalSolarRadiation",
    "HourlyMaximumGlobalSolarRadiation",
    "HourlyMaximumGlobalSolarRadiationTime",
];

#[derive(Debug, Error, PartialEq, Eq)]
#[error("start date {start} is after end date {end}")]
pub struct InvalidRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// One export request: a station and an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationQuery {
    pub station_id: String,
    pub range_start: NaiveDate,
    pub range_end: NaiveDate,
}

impl StationQuery {
    pub fn new(
        station_id: impl Into<String>,
        range_start: NaiveDate,
        range_end: NaiveDate,
    ) -> Result<Self, InvalidRange> {
        if range_start > range_end {
            return Err(InvalidRange { start: range_start, end: range_end });
        }
        Ok(Self { station_id: station_id.into(), range_start, range_end })
    }
}

/// One flattened observation. Only columns actually extracted from the payload
/// are stored; everything else reads back as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservationRecord {
    fields: HashMap<&'static str, String>,
}

impl ObservationRecord {
    pub fn set(&mut self, column: &'static str, value: String) {
        self.fields.insert(column, value);
    }

    /// Value for `column`, or `""` when the upstream payload had none.
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }

    /// Number of columns that actually carry a value.
    pub fn populated(&self) -> usize {
        self.fields.len()
    }
}

/// Station metadata as served by the station-list endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StationItem {
    #[serde(rename = "stationID")]
    pub station_id: String,
    pub station_name: String,
    pub country_name: String,
    pub area: String,
    #[serde(default)]
    pub station_start_date: String,
    /// Empty for stations that are still in service.
    #[serde(default)]
    pub station_end_date: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn query_rejects_reversed_range() {
        let err = StationQuery::new("C0A520", date(2023, 5, 1), date(2023, 4, 1)).unwrap_err();
        assert_eq!(err, InvalidRange { start: date(2023, 5, 1), end: date(2023, 4, 1) });
    }

    #[test]
    fn query_accepts_single_day_range() {
        let query = StationQuery::new("C0A520", date(2023, 5, 1), date(2023, 5, 1)).unwrap();
        assert_eq!(query.range_start, query.range_end);
    }

    #[test]
    fn record_reads_empty_for_unset_columns() {
        let mut record = ObservationRecord::default();
        record.set("WindSpeed", "3.4".to_string());

        assert_eq!(record.get("WindSpeed"), "3.4");
        assert_eq!(record.get("DataDate"), "");
        assert_eq!(record.populated(), 1);
    }

    #[test]
    fn station_item_deserializes_upstream_field_names() {
        let json = r#"{
            "stationID": "C0A520",
            "stationName": "山佳",
            "countryName": "新北市",
            "area": "北部",
            "stationStartDate": "2012-01-01"
        }"#;
        let item: StationItem = serde_json::from_str(json).unwrap();

        assert_eq!(item.station_id, "C0A520");
        assert_eq!(item.country_name, "新北市");
        assert!(item.station_end_date.is_empty());
    }
}
