use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use codis_core::{StationClient, StationItem, StationQuery, dates, pipeline};

use crate::menu;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "codis", version, about = "CODiS historical station-data exporter")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download observations for one station and write them as CSV.
    Fetch {
        /// Station code, e.g. "C0A520".
        station: String,

        /// Range start date (YYYY-MM-DD or YYYY/MM/DD).
        start: String,

        /// Range end date (YYYY-MM-DD or YYYY/MM/DD).
        end: String,
    },

    /// List the automatic stations known to the upstream service.
    Stations {
        /// Only stations in this area, e.g. "北部".
        #[arg(long)]
        area: Option<String>,

        /// Only stations in this county.
        #[arg(long)]
        county: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let client = StationClient::new();
        match self.command {
            Some(Command::Fetch { station, start, end }) => {
                fetch(&client, &station, &start, &end).await
            }
            Some(Command::Stations { area, county }) => list_stations(&client, area, county).await,
            None => menu::main_menu(&client).await,
        }
    }
}

async fn fetch(client: &StationClient, station: &str, start: &str, end: &str) -> anyhow::Result<()> {
    let range_start = dates::parse_flexible(start)?;
    let range_end = dates::parse_flexible(end)?;
    let query = StationQuery::new(station, range_start, range_end)?;

    let stations = client
        .station_list()
        .await
        .context("loading the station list")?;
    let Some(item) = stations.iter().find(|s| s.station_id == station) else {
        bail!("unknown station code '{station}'; see `codis stations` for valid codes");
    };
    if let Ok(commissioned) = dates::parse_flexible(&item.station_start_date) {
        if range_start < commissioned {
            bail!(
                "start date {range_start} precedes the station's commissioning date {}",
                item.station_start_date
            );
        }
    }
    println!(
        "station {} - {} ({} {})",
        item.station_id, item.station_name, item.country_name, item.area
    );

    let path = pipeline::run(client, &query).await?;
    println!("saved {}", path.display());
    Ok(())
}

async fn list_stations(
    client: &StationClient,
    area: Option<String>,
    county: Option<String>,
) -> anyhow::Result<()> {
    let stations = client
        .station_list()
        .await
        .context("loading the station list")?;

    let matches: Vec<&StationItem> = stations
        .iter()
        .filter(|s| area.as_deref().is_none_or(|a| s.area == a))
        .filter(|s| county.as_deref().is_none_or(|c| s.country_name == c))
        .collect();
    if matches.is_empty() {
        println!("no stations matched");
        return Ok(());
    }

    println!("{:<10} {:<20} {:<10} {:<10}", "StationID", "StationName", "County", "Area");
    for s in matches {
        println!(
            "{:<10} {:<20} {:<10} {:<10}",
            s.station_id, s.station_name, s.country_name, s.area
        );
    }
    Ok(())
}
