//! Dotgrid ETL - election data harmonization for dot-grid charts.
//!
//! This crate loads four flat election data files (results, forecast
//! toplines, a name-mapping crosswalk, and stance annotations), harmonizes
//! their schemas, joins them into a normalized [`model::ElectionSet`], and
//! can materialize the joined per-candidate view as a
//! [`dotgrid_core::frame::Frame`] ready for charting.
//!
//! The whole pipeline is an in-memory, one-shot pass: load, stage, split,
//! derive. Re-running it over the same files produces the same model.

pub mod model;
pub mod records;

mod error;

pub use error::EtlError;

use std::path::PathBuf;

use log::info;

use dotgrid_core::frame::{Frame, Value};

use model::ElectionSet;

/// The source file locations the pipeline reads from.
#[derive(Debug, Clone)]
pub struct SourcePaths {
    pub results: PathBuf,
    pub name_mappings: PathBuf,
    pub house_toplines: PathBuf,
    pub senate_toplines: PathBuf,
    pub stances: PathBuf,
}

/// The one-shot election ETL pipeline.
///
/// # Examples
///
/// ```no_run
/// use dotgrid_etl::{ElectionPipeline, SourcePaths};
///
/// let pipeline = ElectionPipeline::new(SourcePaths {
///     results: "data/results.csv".into(),
///     name_mappings: "data/name_mappings.csv".into(),
///     house_toplines: "data/house_district_toplines_2022.csv".into(),
///     senate_toplines: "data/senate_state_toplines_2022.csv".into(),
///     stances: "data/stances.csv".into(),
/// });
/// let set = pipeline.run().expect("pipeline failed");
/// let frame = pipeline.to_frame(&set).expect("frame build failed");
/// ```
#[derive(Debug, Clone)]
pub struct ElectionPipeline {
    paths: SourcePaths,
}

impl ElectionPipeline {
    /// Creates a pipeline over the given source files.
    pub fn new(paths: SourcePaths) -> Self {
        Self { paths }
    }

    /// Loads all sources, joins them, and builds the normalized model.
    pub fn run(&self) -> Result<ElectionSet, EtlError> {
        info!("Running election pipeline");

        let results = records::load_results(&self.paths.results)?;
        let name_mappings = records::load_name_mappings(&self.paths.name_mappings)?;
        let stances = records::load_stances(&self.paths.stances)?;

        // House and Senate toplines share the wide format; flatten both.
        let mut predictions = records::load_predictions(&self.paths.house_toplines)?;
        predictions.extend(records::load_predictions(&self.paths.senate_toplines)?);

        let staged = model::stage(&results, &predictions, &name_mappings, &stances);
        let set = ElectionSet::from_staged(&staged);

        info!(
            races = set.races.len(),
            candidates = set.mappings.len();
            "Election pipeline complete"
        );
        Ok(set)
    }

    /// Materializes the joined per-candidate view as a frame: one row per
    /// race/prediction/result mapping, carrying the columns charts group
    /// and order by.
    pub fn to_frame(&self, set: &ElectionSet) -> Result<Frame, EtlError> {
        let mut frame = Frame::new([
            "candidate",
            "party",
            "chance_of_winning",
            "average_voteshare",
            "office",
            "state_code",
            "district",
            "race_forecast",
            "is_winner",
        ])?;

        for mapping in &set.mappings {
            let (Some(prediction), Some(result), Some(race)) = (
                set.prediction(mapping.prediction_id),
                set.result(mapping.result_id),
                set.race(mapping.race_id),
            ) else {
                continue;
            };

            frame.push_row(vec![
                Value::from(prediction.candidate.clone()),
                result
                    .political_party
                    .clone()
                    .map_or(Value::Null, Value::from),
                Value::from(prediction.chance_of_winning),
                Value::from(prediction.average_voteshare),
                Value::from(race.office.clone()),
                Value::from(race.state_code.clone()),
                Value::from(race.district.clone()),
                race.race_forecast
                    .map_or(Value::Null, |f| Value::from(f.to_string())),
                result.is_winner.map_or(Value::Null, Value::from),
            ])?;
        }

        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{ElectionSet, stage};
    use records::{ElectionResult, NameMapping, Office, Prediction};

    fn sample_set() -> ElectionSet {
        let results = vec![
            ElectionResult {
                state: "Nevada".to_string(),
                state_code: "NV".to_string(),
                cycle: 2022,
                office: Office::Senate,
                district: "S3".to_string(),
                first_name: Some("Adam".to_string()),
                last_name: "Laxalt".to_string(),
                total_votes: 490000,
                percent_total_vote: 48.0,
                political_party: Some("Rep".to_string()),
                is_incumbent: Some(false),
                is_winner: Some(false),
            },
        ];
        let predictions = vec![Prediction {
            candidate: "Adam Laxalt".to_string(),
            chance_of_winning: 0.46,
            average_voteshare: 47.9,
            forecast_date: "2022-11-08".to_string(),
            state_code: "NV".to_string(),
            district: "S3".to_string(),
        }];
        let mappings = vec![NameMapping {
            nbc_first_name: Some("Adam".to_string()),
            nbc_last_name: "Laxalt".to_string(),
            combined_toplines_candidate: "Adam Laxalt".to_string(),
            election_deniers_candidate: None,
            state_code: "NV".to_string(),
            district: "S3".to_string(),
        }];

        let staged = stage(&results, &predictions, &mappings, &[]);
        ElectionSet::from_staged(&staged)
    }

    #[test]
    fn test_to_frame_columns_and_rows() {
        let set = sample_set();
        let pipeline = ElectionPipeline::new(SourcePaths {
            results: "unused".into(),
            name_mappings: "unused".into(),
            house_toplines: "unused".into(),
            senate_toplines: "unused".into(),
            stances: "unused".into(),
        });

        let frame = pipeline.to_frame(&set).unwrap();
        assert_eq!(frame.len(), 1);
        assert!(frame.has_column("party"));
        assert!(frame.has_column("chance_of_winning"));
        assert!(frame.has_column("race_forecast"));

        let row = &frame.rows()[0];
        let candidate_index = frame.column_index("candidate").unwrap();
        assert_eq!(
            row.get(candidate_index).unwrap().as_text(),
            Some("Adam Laxalt")
        );
    }
}
