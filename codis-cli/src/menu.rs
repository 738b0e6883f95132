//! Interactive mode: pick a station (by code or by browsing), enter a date
//! range, run the export. Esc at any prompt steps back to the previous one,
//! so corrections never require restarting the program.

use anyhow::{Context, Result};
use codis_core::{StationClient, StationItem, StationQuery, dates, pipeline};
use inquire::{InquireError, Select, Text};
use std::fmt;

const MANUAL: &str = "Enter a station code";
const BROWSE: &str = "Browse stations by area";
const QUIT: &str = "Quit";

pub async fn main_menu(client: &StationClient) -> Result<()> {
    let stations = client
        .station_list()
        .await
        .context("loading the station list")?;

    loop {
        let choice = match Select::new("CODiS observation export", vec![MANUAL, BROWSE, QUIT])
            .prompt()
        {
            Ok(choice) => choice,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let picked = match choice {
            MANUAL => pick_by_code(&stations)?,
            BROWSE => browse(&stations)?,
            _ => return Ok(()),
        };
        let Some(station) = picked else { continue };

        println!(
            "station {} - {} ({} {})",
            station.station_id, station.station_name, station.country_name, station.area
        );
        let Some(query) = prompt_range(&station)? else { continue };

        match pipeline::run(client, &query).await {
            Ok(path) => println!("saved {}", path.display()),
            Err(err) => eprintln!("export failed: {err:#}"),
        }
    }
}

/// Free-text station code entry. Re-prompts on unknown codes; Esc goes back
/// to the main menu.
fn pick_by_code(stations: &[StationItem]) -> Result<Option<StationItem>> {
    loop {
        let Some(code) = prompt_text("Station code:")? else {
            return Ok(None);
        };
        match stations.iter().find(|s| s.station_id == code.trim()) {
            Some(station) => return Ok(Some(station.clone())),
            None => eprintln!("no such station code, try again"),
        }
    }
}

/// Guided selection: area, then county, then station. Esc steps back one
/// level at a time.
fn browse(stations: &[StationItem]) -> Result<Option<StationItem>> {
    'area: loop {
        let Some(area) = select_one("Area:", unique(stations.iter().map(|s| &s.area)))? else {
            return Ok(None);
        };

        loop {
            let counties = unique(
                stations
                    .iter()
                    .filter(|s| s.area == area)
                    .map(|s| &s.country_name),
            );
            let Some(county) = select_one("County:", counties)? else {
                continue 'area;
            };

            let in_county: Vec<StationOption<'_>> = stations
                .iter()
                .filter(|s| s.area == area && s.country_name == county)
                .map(StationOption)
                .collect();
            match Select::new("Station:", in_county).prompt() {
                Ok(option) => return Ok(Some(option.0.clone())),
                Err(InquireError::OperationCanceled) => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }
}

/// Start/end date prompts with validation. Esc from the start date abandons
/// the query; Esc from the end date returns to the start date.
fn prompt_range(station: &StationItem) -> Result<Option<StationQuery>> {
    let commissioned = dates::parse_flexible(&station.station_start_date).ok();

    'start: loop {
        let Some(text) = prompt_text("Start date (YYYY-MM-DD):")? else {
            return Ok(None);
        };
        let start = match dates::parse_flexible(&text) {
            Ok(date) => date,
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        };
        if let Some(commissioned) = commissioned {
            if start < commissioned {
                eprintln!(
                    "start date precedes the station's commissioning date ({})",
                    station.station_start_date
                );
                continue;
            }
        }

        loop {
            let Some(text) = prompt_text("End date (YYYY-MM-DD):")? else {
                continue 'start;
            };
            let end = match dates::parse_flexible(&text) {
                Ok(date) => date,
                Err(err) => {
                    eprintln!("{err}");
                    continue;
                }
            };
            if start > end {
                eprintln!("start date is after end date");
                continue 'start;
            }
            return Ok(Some(StationQuery::new(station.station_id.clone(), start, end)?));
        }
    }
}

struct StationOption<'a>(&'a StationItem);

impl fmt::Display for StationOption<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} ({})",
            self.0.station_id, self.0.station_name, self.0.country_name
        )
    }
}

/// None means the prompt was cancelled with Esc.
fn prompt_text(prompt: &str) -> Result<Option<String>> {
    match Text::new(prompt).prompt() {
        Ok(text) => Ok(Some(text)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn select_one(prompt: &str, options: Vec<String>) -> Result<Option<String>> {
    match Select::new(prompt, options).prompt() {
        Ok(choice) => Ok(Some(choice)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// First-seen order, no duplicates; mirrors how the station list groups
/// naturally by region.
fn unique<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen = Vec::new();
    for value in values {
        if !seen.contains(value) {
            seen.push(value.clone());
        }
    }
    seen
}
