//! Source record loading and normalization.
//!
//! Four flat files feed the pipeline:
//!
//! - **election results** - per-candidate vote counts, with the office,
//!   state code, and district packed into a raw race code that needs parsing
//! - **toplines** - FiveThirtyEight House/Senate forecasts in wide format
//!   (one column set per party seat slot), filtered here to the final
//!   deluxe forecast
//! - **name mappings** - a crosswalk between result names and forecast
//!   candidate names
//! - **stances** - election-stance annotations per candidate, filtered to
//!   congressional offices
//!
//! Each loader normalizes its source into a flat record type; the join
//! logic lives in [`crate::model`].

use std::{fmt, fs::File, io::Read, path::Path};

use log::debug;
use serde::Deserialize;

use crate::error::EtlError;

/// The office a race elects for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Office {
    House,
    Senate,
}

impl fmt::Display for Office {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Office::House => write!(f, "House"),
            Office::Senate => write!(f, "Senate"),
        }
    }
}

/// One normalized election result row.
#[derive(Debug, Clone)]
pub struct ElectionResult {
    pub state: String,
    pub state_code: String,
    pub cycle: u16,
    pub office: Office,
    pub district: String,
    pub first_name: Option<String>,
    pub last_name: String,
    pub total_votes: u64,
    pub percent_total_vote: f64,
    pub political_party: Option<String>,
    pub is_incumbent: Option<bool>,
    pub is_winner: Option<bool>,
}

/// One candidate forecast from the final toplines.
#[derive(Debug, Clone)]
pub struct Prediction {
    pub candidate: String,
    pub chance_of_winning: f64,
    pub average_voteshare: f64,
    pub forecast_date: String,
    pub state_code: String,
    pub district: String,
}

/// One crosswalk row between result names and forecast candidate names.
#[derive(Debug, Clone, Deserialize)]
pub struct NameMapping {
    #[serde(default)]
    pub nbc_first_name: Option<String>,
    pub nbc_last_name: String,
    pub combined_toplines_candidate: String,
    #[serde(default)]
    pub election_deniers_candidate: Option<String>,
    pub state_code: String,
    pub district: String,
}

/// One election-stance annotation.
#[derive(Debug, Clone, Deserialize)]
pub struct Stance {
    pub candidate: String,
    pub office: String,
    pub stance: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// The election cycle all sources describe.
pub const CYCLE: u16 = 2022;

/// The final forecast date the toplines are filtered to, normalized.
pub const FINAL_FORECAST_DATE: &str = "2022-11-08";

/// Last names that are race markers rather than people; they repeat across
/// races and need the race key appended to stay unique.
const AMBIGUOUS_LAST_NAMES: [&str; 2] = ["Write-ins", "None of these candidates"];

/// The toplines' per-seat column slots (`name_D1`, `winner_D1`, ...).
const SEAT_SLOTS: [&str; 10] = ["D1", "D2", "D3", "D4", "R1", "R2", "R3", "R4", "I1", "O1"];

/// The stance offices that map onto congressional races.
const SELECTED_OFFICES: [&str; 3] = ["Senator", "Representative", "Senator (unexpired term)"];

/// Extracts the two-letter state code prefix from a raw race code such as
/// `"NV Senate"` or `"NY-22"`.
pub fn parse_state_code(raw: &str) -> String {
    raw.chars().take(2).collect()
}

/// Classifies a raw race code into House or Senate.
pub fn parse_office(raw: &str) -> Office {
    if raw.contains("House") {
        Office::House
    } else {
        Office::Senate
    }
}

/// Parses the district out of a raw race code: the first digit run for House
/// races, the `S3` senate-class default otherwise. The one 2022 special
/// election (`Oklahoma Seat 2`) lands in class `S2`.
pub fn parse_district(raw: &str, office: Office, race_name: Option<&str>) -> String {
    if race_name == Some("Oklahoma Seat 2") {
        return "S2".to_string();
    }
    match office {
        Office::House => first_digit_run(raw).unwrap_or_default(),
        Office::Senate => "S3".to_string(),
    }
}

/// Appends the race key to last names that repeat across races.
pub fn disambiguate_last_name(last_name: &str, state_code: &str, district: &str) -> String {
    if AMBIGUOUS_LAST_NAMES.contains(&last_name) {
        format!("{last_name}-{state_code}-{district}")
    } else {
        last_name.to_string()
    }
}

fn first_digit_run(raw: &str) -> Option<String> {
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    let run: String = raw[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    Some(run)
}

/// Interprets the loosely-typed boolean cells flat files carry.
fn parse_bool(raw: Option<&str>) -> Option<bool> {
    match raw?.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" => Some(true),
        "false" | "f" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Returns true when a raw date cell denotes the final forecast date, in
/// either `m/d/yy`, `m/d/yyyy`, or `yyyy-mm-dd` form.
fn is_final_forecast_date(raw: &str) -> bool {
    let raw = raw.trim();
    if raw == FINAL_FORECAST_DATE {
        return true;
    }
    let parts: Vec<&str> = raw.split('/').collect();
    if let [month, day, year] = parts.as_slice() {
        return month.trim_start_matches('0') == "11"
            && day.trim_start_matches('0') == "8"
            && (*year == "22" || *year == "2022");
    }
    false
}

#[derive(Debug, Deserialize)]
struct RawResultRow {
    state: String,
    state_code: String,
    #[serde(default)]
    race_name: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    last_name: String,
    total_votes: u64,
    percent_total_vote: f64,
    #[serde(default)]
    political_party: Option<String>,
    #[serde(default)]
    is_incumbent: Option<String>,
    #[serde(default)]
    is_winner: Option<String>,
}

/// Reads and normalizes election results from CSV.
pub fn read_results<R: Read>(reader: R) -> Result<Vec<ElectionResult>, EtlError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut results = Vec::new();
    for record in rdr.deserialize::<RawResultRow>() {
        let raw = record?;
        let office = parse_office(&raw.state_code);
        let district = parse_district(&raw.state_code, office, raw.race_name.as_deref());
        results.push(ElectionResult {
            state: raw.state,
            state_code: parse_state_code(&raw.state_code),
            cycle: CYCLE,
            office,
            district,
            first_name: raw.first_name.filter(|name| !name.is_empty()),
            last_name: raw.last_name,
            total_votes: raw.total_votes,
            percent_total_vote: raw.percent_total_vote,
            political_party: raw.political_party.filter(|party| !party.is_empty()),
            is_incumbent: parse_bool(raw.is_incumbent.as_deref()),
            is_winner: parse_bool(raw.is_winner.as_deref()),
        });
    }
    debug!(rows = results.len(); "Loaded election results");
    Ok(results)
}

/// Reads one wide toplines file and flattens the final deluxe forecast into
/// per-candidate predictions.
///
/// The wide format carries one `name_X`/`winner_X`/`voteshare_mean_X` column
/// triple per seat slot; slots the file does not carry are skipped.
pub fn read_predictions<R: Read>(reader: R) -> Result<Vec<Prediction>, EtlError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();
    let position = |name: &str| headers.iter().position(|header| header == name);
    let required = |name: &str| {
        position(name).ok_or_else(|| EtlError::MissingColumn(name.to_string()))
    };

    let forecast_date = required("forecastdate")?;
    let expression = required("expression")?;
    let district = required("district")?;

    let mut slots = Vec::new();
    for slot in SEAT_SLOTS {
        let name = position(&format!("name_{slot}"));
        let winner = position(&format!("winner_{slot}"));
        let voteshare = position(&format!("voteshare_mean_{slot}"));
        if let (Some(name), Some(winner), Some(voteshare)) = (name, winner, voteshare) {
            slots.push((name, winner, voteshare));
        }
    }

    let mut predictions = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if record.get(expression).map(str::trim) != Some("_deluxe") {
            continue;
        }
        if !is_final_forecast_date(record.get(forecast_date).unwrap_or("")) {
            continue;
        }

        let raw_district = record.get(district).unwrap_or("").trim();
        let state_code = parse_state_code(raw_district);
        let district_number: String = raw_district.chars().skip(3).collect();

        for &(name, winner, voteshare) in &slots {
            let candidate = record.get(name).unwrap_or("").trim();
            if candidate.is_empty() {
                continue;
            }
            let chance_of_winning = record
                .get(winner)
                .and_then(|cell| cell.trim().parse().ok())
                .unwrap_or(0.0);
            let average_voteshare = record
                .get(voteshare)
                .and_then(|cell| cell.trim().parse().ok())
                .unwrap_or(0.0);

            predictions.push(Prediction {
                candidate: candidate.to_string(),
                chance_of_winning,
                average_voteshare,
                forecast_date: FINAL_FORECAST_DATE.to_string(),
                state_code: state_code.clone(),
                district: district_number.clone(),
            });
        }
    }
    debug!(rows = predictions.len(); "Flattened toplines into predictions");
    Ok(predictions)
}

/// Reads the name-mapping crosswalk from CSV.
pub fn read_name_mappings<R: Read>(reader: R) -> Result<Vec<NameMapping>, EtlError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut mappings = Vec::new();
    for record in rdr.deserialize::<NameMapping>() {
        let mut mapping = record?;
        mapping.nbc_first_name = mapping.nbc_first_name.filter(|name| !name.is_empty());
        mapping.election_deniers_candidate = mapping
            .election_deniers_candidate
            .filter(|name| !name.is_empty());
        mappings.push(mapping);
    }
    debug!(rows = mappings.len(); "Loaded name mappings");
    Ok(mappings)
}

/// Reads stance annotations from CSV, lowercasing the headers and keeping
/// only congressional offices.
pub fn read_stances<R: Read>(reader: R) -> Result<Vec<Stance>, EtlError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let lowered: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|header| header.to_lowercase())
        .collect();
    rdr.set_headers(csv::StringRecord::from(lowered));

    let mut stances = Vec::new();
    for record in rdr.deserialize::<Stance>() {
        let stance = record?;
        if SELECTED_OFFICES.contains(&stance.office.as_str()) {
            stances.push(stance);
        }
    }
    debug!(rows = stances.len(); "Loaded stances");
    Ok(stances)
}

/// File-path convenience wrapper around [`read_results`].
pub fn load_results(path: impl AsRef<Path>) -> Result<Vec<ElectionResult>, EtlError> {
    read_results(File::open(path)?)
}

/// File-path convenience wrapper around [`read_predictions`].
pub fn load_predictions(path: impl AsRef<Path>) -> Result<Vec<Prediction>, EtlError> {
    read_predictions(File::open(path)?)
}

/// File-path convenience wrapper around [`read_name_mappings`].
pub fn load_name_mappings(path: impl AsRef<Path>) -> Result<Vec<NameMapping>, EtlError> {
    read_name_mappings(File::open(path)?)
}

/// File-path convenience wrapper around [`read_stances`].
pub fn load_stances(path: impl AsRef<Path>) -> Result<Vec<Stance>, EtlError> {
    read_stances(File::open(path)?)
}
