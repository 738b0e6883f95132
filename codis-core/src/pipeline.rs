//! Range chunking and orchestration: split a long query into sub-ranges the
//! upstream accepts, fetch them in order, and write the merged result as CSV.

use crate::client::{ApiError, ReportSource};
use crate::export;
use crate::model::{ObservationRecord, StationQuery};
use anyhow::Context;
use chrono::{Duration, Local, NaiveDate};
use log::info;
use std::path::PathBuf;

/// Longest range the upstream accepts in a single report query.
pub const MAX_RANGE_DAYS: i64 = 366;

/// Retrieve all observations for `query` and write them to a CSV file in the
/// current working directory. Returns the path of the written file.
///
/// Any fetch failure aborts the whole run; nothing is written in that case.
pub async fn run(source: &dyn ReportSource, query: &StationQuery) -> anyhow::Result<PathBuf> {
    let records = fetch_range(source, query, Local::now().date_naive())
        .await
        .with_context(|| format!("retrieving observations for station {}", query.station_id))?;

    let path = output_path(query);
    export::write_csv(&path, &records)
        .with_context(|| format!("writing {}", path.display()))?;
    info!("saved {} records to {}", records.len(), path.display());
    Ok(path)
}

/// Fetch the full range in 366-day strides, concatenated chronologically.
/// Strides that start after `today` are skipped outright; the upstream would
/// reject a future-dated request.
pub async fn fetch_range(
    source: &dyn ReportSource,
    query: &StationQuery,
    today: NaiveDate,
) -> Result<Vec<ObservationRecord>, ApiError> {
    let total_days = (query.range_end - query.range_start).num_days();
    if total_days <= MAX_RANGE_DAYS {
        return source
            .monthly_report(&query.station_id, query.range_start, query.range_end)
            .await;
    }

    let mut merged = Vec::new();
    let mut offset = 0;
    while offset < total_days {
        let sub_start = query.range_start + Duration::days(offset);
        offset += MAX_RANGE_DAYS;
        if sub_start > today {
            continue;
        }
        let sub_end = (query.range_start + Duration::days(offset)).min(query.range_end);

        info!("station {}: fetching {sub_start} to {sub_end}", query.station_id);
        let records = source
            .monthly_report(&query.station_id, sub_start, sub_end)
            .await?;
        info!("station {}: merged {} records", query.station_id, records.len());
        merged.extend(records);
    }
    Ok(merged)
}

/// `{stationID}_{start:YYYYMMDD}_{end:YYYYMMDD}.csv`
pub fn output_path(query: &StationQuery) -> PathBuf {
    PathBuf::from(format!(
        "{}_{}_{}.csv",
        query.station_id,
        query.range_start.format("%Y%m%d"),
        query.range_end.format("%Y%m%d"),
    ))
}
