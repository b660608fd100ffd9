//! The normalized election model and the joins that build it.
//!
//! [`stage`] joins the four source record sets into one wide per-candidate
//! view, then [`ElectionSet::from_staged`] splits that view into
//! deduplicated races, predictions, results, mappings, and stances, and
//! derives each race's categorical forecast from its candidates' summed
//! win probabilities.

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use log::debug;

use crate::records::{
    ElectionResult, NameMapping, Prediction, Stance, disambiguate_last_name,
};

/// The categorical race call derived from summed win probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceForecast {
    SolidR,
    LikelyR,
    LeanR,
    SolidD,
    LikelyD,
    LeanD,
    TossUp,
}

impl RaceForecast {
    /// Buckets summed Republican and Democratic win probabilities, checking
    /// the Republican thresholds first.
    pub fn from_chances(rep: f64, dem: f64) -> Self {
        if rep >= 0.95 {
            RaceForecast::SolidR
        } else if rep >= 0.75 {
            RaceForecast::LikelyR
        } else if rep >= 0.60 {
            RaceForecast::LeanR
        } else if dem >= 0.95 {
            RaceForecast::SolidD
        } else if dem >= 0.75 {
            RaceForecast::LikelyD
        } else if dem >= 0.60 {
            RaceForecast::LeanD
        } else {
            RaceForecast::TossUp
        }
    }
}

impl fmt::Display for RaceForecast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RaceForecast::SolidR => "Solid-R",
            RaceForecast::LikelyR => "Likely-R",
            RaceForecast::LeanR => "Lean-R",
            RaceForecast::SolidD => "Solid-D",
            RaceForecast::LikelyD => "Likely-D",
            RaceForecast::LeanD => "Lean-D",
            RaceForecast::TossUp => "Toss-Up",
        };
        write!(f, "{label}")
    }
}

/// One row of the staged per-candidate view: the result of joining name
/// mappings against predictions, results, and stances.
#[derive(Debug, Clone)]
pub struct StagedCandidate {
    pub state: String,
    pub state_code: String,
    pub cycle: u16,
    pub office: String,
    pub district: String,
    pub first_name: Option<String>,
    pub last_name: String,
    pub total_votes: u64,
    pub percent_total_vote: f64,
    pub political_party: Option<String>,
    pub is_incumbent: Option<bool>,
    pub is_winner: Option<bool>,
    pub candidate: Option<String>,
    pub chance_of_winning: f64,
    pub average_voteshare: f64,
    pub forecast_date: Option<String>,
    pub stance: Option<String>,
    pub source: Option<String>,
    pub url: Option<String>,
}

/// Joins the four sources into the staged per-candidate view.
///
/// Name mappings drive the join: each mapping row is matched against a
/// result (inner join on null-safe first name, last name, state code, and
/// district), a prediction (left join on candidate, state code, and
/// district; missing chance/voteshare default to 0), and a stance (left
/// join on the deniers candidate name). The catch-all `all others` forecast
/// candidate is disambiguated per race.
pub fn stage(
    results: &[ElectionResult],
    predictions: &[Prediction],
    mappings: &[NameMapping],
    stances: &[Stance],
) -> Vec<StagedCandidate> {
    let prediction_index: IndexMap<(&str, &str, &str), &Prediction> = predictions
        .iter()
        .map(|p| {
            (
                (p.candidate.as_str(), p.state_code.as_str(), p.district.as_str()),
                p,
            )
        })
        .collect();

    let result_index: IndexMap<(&str, &str, &str, &str), &ElectionResult> = results
        .iter()
        .map(|r| {
            (
                (
                    r.first_name.as_deref().unwrap_or(""),
                    r.last_name.as_str(),
                    r.state_code.as_str(),
                    r.district.as_str(),
                ),
                r,
            )
        })
        .collect();

    let stance_index: IndexMap<&str, &Stance> =
        stances.iter().map(|s| (s.candidate.as_str(), s)).collect();

    let mut staged = Vec::new();
    for mapping in mappings {
        let result_key = (
            mapping.nbc_first_name.as_deref().unwrap_or(""),
            mapping.nbc_last_name.as_str(),
            mapping.state_code.as_str(),
            mapping.district.as_str(),
        );
        // inner join against results; unmatched mappings drop out
        let Some(result) = result_index.get(&result_key) else {
            continue;
        };

        let prediction = prediction_index
            .get(&(
                mapping.combined_toplines_candidate.as_str(),
                mapping.state_code.as_str(),
                mapping.district.as_str(),
            ))
            .copied();

        let candidate = if mapping.combined_toplines_candidate == "all others" {
            Some(format!(
                "all others-{}-{}",
                mapping.state_code, mapping.district
            ))
        } else {
            prediction.map(|p| p.candidate.clone())
        };

        let stance = mapping
            .election_deniers_candidate
            .as_deref()
            .and_then(|name| stance_index.get(name))
            .copied();

        staged.push(StagedCandidate {
            state: result.state.clone(),
            state_code: result.state_code.clone(),
            cycle: result.cycle,
            office: result.office.to_string(),
            district: result.district.clone(),
            first_name: result.first_name.clone(),
            last_name: disambiguate_last_name(
                &result.last_name,
                &result.state_code,
                &result.district,
            ),
            total_votes: result.total_votes,
            percent_total_vote: result.percent_total_vote,
            political_party: result.political_party.clone(),
            is_incumbent: result.is_incumbent,
            is_winner: result.is_winner,
            candidate,
            chance_of_winning: prediction.map_or(0.0, |p| p.chance_of_winning),
            average_voteshare: prediction.map_or(0.0, |p| p.average_voteshare),
            forecast_date: prediction.map(|p| p.forecast_date.clone()),
            stance: stance.map(|s| s.stance.clone()),
            source: stance.and_then(|s| s.source.clone()),
            url: stance.and_then(|s| s.url.clone()),
        });
    }

    debug!(rows = staged.len(); "Staged candidate view built");
    staged
}

/// One deduplicated race.
#[derive(Debug, Clone)]
pub struct Race {
    pub race_id: usize,
    pub state: String,
    pub state_code: String,
    pub cycle: u16,
    pub office: String,
    pub district: String,
    pub race_forecast: Option<RaceForecast>,
}

/// One deduplicated candidate prediction.
#[derive(Debug, Clone)]
pub struct PredictionRow {
    pub prediction_id: usize,
    pub candidate: String,
    pub chance_of_winning: f64,
    pub average_voteshare: f64,
    pub forecast_date: Option<String>,
}

/// One deduplicated candidate result.
#[derive(Debug, Clone)]
pub struct ResultRow {
    pub result_id: usize,
    pub first_name: Option<String>,
    pub last_name: String,
    pub total_votes: u64,
    pub percent_total_vote: f64,
    pub political_party: Option<String>,
    pub is_incumbent: Option<bool>,
    pub is_winner: Option<bool>,
}

/// The link between one race, one prediction, and one result.
#[derive(Debug, Clone, Copy)]
pub struct ElectionMapping {
    pub election_mapping_id: usize,
    pub result_id: usize,
    pub prediction_id: usize,
    pub race_id: usize,
}

/// One stance annotation attached to a mapping.
#[derive(Debug, Clone)]
pub struct StanceRow {
    pub stance_id: usize,
    pub election_mapping_id: usize,
    pub stance: String,
    pub source: Option<String>,
    pub url: Option<String>,
}

/// The normalized election model.
#[derive(Debug, Clone, Default)]
pub struct ElectionSet {
    pub races: Vec<Race>,
    pub predictions: Vec<PredictionRow>,
    pub results: Vec<ResultRow>,
    pub mappings: Vec<ElectionMapping>,
    pub stances: Vec<StanceRow>,
}

impl ElectionSet {
    /// Splits the staged view into deduplicated tables and derives each
    /// race's forecast.
    ///
    /// Dedup keys: races by state code + district + office, predictions by
    /// candidate + forecast date, results by first + last name, mappings by
    /// the full id triple. Staged rows without a forecast candidate still
    /// register their race but produce no prediction, mapping, or stance.
    pub fn from_staged(staged: &[StagedCandidate]) -> Self {
        let mut races: IndexMap<(String, String, String), Race> = IndexMap::new();
        let mut predictions: IndexMap<(String, Option<String>), PredictionRow> = IndexMap::new();
        let mut results: IndexMap<(String, String), ResultRow> = IndexMap::new();
        let mut mappings: IndexMap<(usize, usize, usize), ElectionMapping> = IndexMap::new();
        let mut stanced_mappings: IndexSet<usize> = IndexSet::new();
        let mut stances: Vec<StanceRow> = Vec::new();

        for row in staged {
            let race_key = (
                row.state_code.clone(),
                row.district.clone(),
                row.office.clone(),
            );
            let next_race_id = races.len() + 1;
            let race_id = races
                .entry(race_key)
                .or_insert_with(|| Race {
                    race_id: next_race_id,
                    state: row.state.clone(),
                    state_code: row.state_code.clone(),
                    cycle: row.cycle,
                    office: row.office.clone(),
                    district: row.district.clone(),
                    race_forecast: None,
                })
                .race_id;

            let Some(candidate) = &row.candidate else {
                continue;
            };

            let prediction_key = (candidate.clone(), row.forecast_date.clone());
            let next_prediction_id = predictions.len() + 1;
            let prediction_id = predictions
                .entry(prediction_key)
                .or_insert_with(|| PredictionRow {
                    prediction_id: next_prediction_id,
                    candidate: candidate.clone(),
                    chance_of_winning: row.chance_of_winning,
                    average_voteshare: row.average_voteshare,
                    forecast_date: row.forecast_date.clone(),
                })
                .prediction_id;

            let result_key = (
                row.first_name.clone().unwrap_or_default(),
                row.last_name.clone(),
            );
            let next_result_id = results.len() + 1;
            let result_id = results
                .entry(result_key)
                .or_insert_with(|| ResultRow {
                    result_id: next_result_id,
                    first_name: row.first_name.clone(),
                    last_name: row.last_name.clone(),
                    total_votes: row.total_votes,
                    percent_total_vote: row.percent_total_vote,
                    political_party: row.political_party.clone(),
                    is_incumbent: row.is_incumbent,
                    is_winner: row.is_winner,
                })
                .result_id;

            let next_mapping_id = mappings.len() + 1;
            let mapping_id = mappings
                .entry((result_id, prediction_id, race_id))
                .or_insert_with(|| ElectionMapping {
                    election_mapping_id: next_mapping_id,
                    result_id,
                    prediction_id,
                    race_id,
                })
                .election_mapping_id;

            if let Some(stance) = &row.stance {
                if stanced_mappings.insert(mapping_id) {
                    stances.push(StanceRow {
                        stance_id: stances.len() + 1,
                        election_mapping_id: mapping_id,
                        stance: stance.clone(),
                        source: row.source.clone(),
                        url: row.url.clone(),
                    });
                }
            }
        }

        let mut set = ElectionSet {
            races: races.into_values().collect(),
            predictions: predictions.into_values().collect(),
            results: results.into_values().collect(),
            mappings: mappings.into_values().collect(),
            stances,
        };
        set.derive_forecasts();
        debug!(
            races = set.races.len(),
            predictions = set.predictions.len(),
            results = set.results.len();
            "Election model built"
        );
        set
    }

    /// Sums party win probabilities per race through the mappings and
    /// buckets them. Races with no mapped predictions keep no forecast.
    fn derive_forecasts(&mut self) {
        let mut sums: IndexMap<usize, (f64, f64)> = IndexMap::new();
        for mapping in &self.mappings {
            let prediction = &self.predictions[mapping.prediction_id - 1];
            let result = &self.results[mapping.result_id - 1];
            let entry = sums.entry(mapping.race_id).or_insert((0.0, 0.0));
            match result.political_party.as_deref() {
                Some("Rep") => entry.0 += prediction.chance_of_winning,
                Some("Dem") => entry.1 += prediction.chance_of_winning,
                _ => {}
            }
        }
        for race in &mut self.races {
            if let Some((rep, dem)) = sums.get(&race.race_id) {
                race.race_forecast = Some(RaceForecast::from_chances(*rep, *dem));
            }
        }
    }

    /// Looks a race up by id. Ids are 1-based; 0 is never a valid id.
    pub fn race(&self, race_id: usize) -> Option<&Race> {
        self.races.get(race_id.checked_sub(1)?)
    }

    /// Looks a prediction up by id.
    pub fn prediction(&self, prediction_id: usize) -> Option<&PredictionRow> {
        self.predictions.get(prediction_id.checked_sub(1)?)
    }

    /// Looks a result up by id.
    pub fn result(&self, result_id: usize) -> Option<&ResultRow> {
        self.results.get(result_id.checked_sub(1)?)
    }
}
