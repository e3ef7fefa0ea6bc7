//! Dataset loading and the preprocessing clean-up pass.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::constants::survey::{NOT_ANSWERED, OTHER_LANGUAGES};
use crate::data::Respondent;
use crate::errors::SurveyError;

/// Parse a JSON array of respondents.
pub fn from_reader(reader: impl Read) -> Result<Vec<Respondent>, SurveyError> {
    let records: Vec<Respondent> = serde_json::from_reader(reader)?;
    Ok(records)
}

/// Load the dataset file. Any failure aborts initialization.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Vec<Respondent>, SurveyError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| SurveyError::DatasetUnavailable {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;
    let records = from_reader(BufReader::new(file))?;
    info!(
        path = %path.display(),
        respondents = records.len(),
        "[surveyscope:ingest] dataset read"
    );
    Ok(records)
}

/// Write respondents as a JSON array, absent answers as the `"NA"` sentinel.
pub fn write_dataset(records: &[Respondent], writer: impl Write) -> Result<(), SurveyError> {
    serde_json::to_writer(writer, records)?;
    Ok(())
}

/// Outcome of [`clean_records`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    /// Respondents read.
    pub total: usize,
    /// Respondents that survived cleaning.
    pub kept: usize,
}

/// True when no field the charts need carries the `"NA"` sentinel.
///
/// Free-text answers such as `"Less than 1 year"` count as answered.
pub fn is_complete(respondent: &Respondent) -> bool {
    let only = |labels: &[String], marker: &str| labels.len() == 1 && labels[0] == marker;
    respondent.answered_age()
        && respondent.answered_compensation()
        && respondent.answered_years_code_pro()
        && !respondent.country.is_empty()
        && respondent.country != NOT_ANSWERED
        && !only(&respondent.language_worked_with, OTHER_LANGUAGES)
        && !only(&respondent.language_worked_with, NOT_ANSWERED)
        && !only(&respondent.gender, NOT_ANSWERED)
}

/// Drop respondents with unanswered fields, keeping dataset order.
pub fn clean_records(records: Vec<Respondent>) -> (Vec<Respondent>, CleanReport) {
    let total = records.len();
    let kept: Vec<Respondent> = records.into_iter().filter(is_complete).collect();
    let report = CleanReport {
        total,
        kept: kept.len(),
    };
    info!(
        kept = report.kept,
        total = report.total,
        "[surveyscope:ingest] created a data set with {} rows out of {}",
        report.kept,
        report.total
    );
    (kept, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"Age": "29", "ConvertedComp": "52000", "YearsCodePro": "5", "Country": "Canada",
         "Gender": ["Man"], "LanguageWorkedWith": ["Rust", "Python"]},
        {"Age": "NA", "ConvertedComp": "12000", "YearsCodePro": "1", "Country": "India",
         "Gender": ["Woman"], "LanguageWorkedWith": ["Java"]},
        {"Age": "41", "ConvertedComp": "90000", "YearsCodePro": "15", "Country": "Japan",
         "Gender": ["NA"], "LanguageWorkedWith": ["C++"]},
        {"Age": "35", "ConvertedComp": "70000", "YearsCodePro": "9", "Country": "Brazil",
         "Gender": ["Man"], "LanguageWorkedWith": ["Other(s):"]}
    ]"#;

    #[test]
    fn clean_drops_incomplete_respondents() {
        let records = from_reader(SAMPLE.as_bytes()).unwrap();
        let (kept, report) = clean_records(records);
        assert_eq!(report, CleanReport { total: 4, kept: 1 });
        assert_eq!(kept[0].country, "Canada");
    }

    #[test]
    fn clean_keeps_free_text_years() {
        let json = r#"[
            {"Age": "29", "ConvertedComp": "52000", "YearsCodePro": "Less than 1 year",
             "Country": "Canada", "Gender": ["Man"], "LanguageWorkedWith": ["Rust"]},
            {"Age": "33", "ConvertedComp": "80000", "YearsCodePro": "NA",
             "Country": "Canada", "Gender": ["Woman"], "LanguageWorkedWith": ["Go"]}
        ]"#;
        let (kept, report) = clean_records(from_reader(json.as_bytes()).unwrap());
        assert_eq!(report, CleanReport { total: 2, kept: 1 });
        assert_eq!(kept[0].years_code_pro, None);

        let mut written = Vec::new();
        write_dataset(&kept, &mut written).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&written).unwrap();
        assert_eq!(value[0]["YearsCodePro"], "Less than 1 year");
        assert_eq!(from_reader(written.as_slice()).unwrap(), kept);
    }

    #[test]
    fn load_dataset_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_dataset(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, SurveyError::DatasetUnavailable { .. }));
    }

    #[test]
    fn write_then_load_keeps_absent_answers_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.json");
        let records = from_reader(SAMPLE.as_bytes()).unwrap();
        write_dataset(&records, File::create(&path).unwrap()).unwrap();
        let reloaded = load_dataset(&path).unwrap();
        assert_eq!(reloaded, records);
        assert_eq!(reloaded[1].age, None);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            from_reader("{not json".as_bytes()),
            Err(SurveyError::Json(_))
        ));
    }
}
