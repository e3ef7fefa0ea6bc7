use serde::Serialize;
use tracing::{debug, info};

use crate::constants::survey::{FIELD_AGE, FIELD_COMPENSATION};
use crate::data::{CountryName, GenderLabel, LanguageLabel, Respondent, ValueRange};
use crate::errors::SurveyError;
use crate::filter::{FilterState, FilterUpdate, filter_records, validate_age, validate_compensation};
use crate::utils::distinct_labels;

/// Full-dataset bounds and label sets, fixed at load time.
///
/// Seeds the filter state and bounds the slider ranges; nothing mutates it
/// after [`RecordStore::new`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Domain {
    age: ValueRange,
    compensation: ValueRange,
    genders: Vec<GenderLabel>,
    languages: Vec<LanguageLabel>,
    countries: Vec<CountryName>,
}

impl Domain {
    /// Derive the domain from every record in the dataset.
    pub fn from_records(records: &[Respondent]) -> Result<Self, SurveyError> {
        if records.is_empty() {
            return Err(SurveyError::EmptyDataset);
        }
        let age = answered_extent(records.iter().map(|r| r.age)).ok_or_else(|| {
            SurveyError::DegenerateDomain {
                field: FIELD_AGE.to_string(),
            }
        })?;
        let compensation = answered_extent(records.iter().map(|r| r.converted_comp))
            .ok_or_else(|| SurveyError::DegenerateDomain {
                field: FIELD_COMPENSATION.to_string(),
            })?;
        Ok(Self {
            age,
            compensation,
            genders: distinct_labels(records.iter().flat_map(|r| r.gender.iter())),
            languages: distinct_labels(records.iter().flat_map(|r| r.language_worked_with.iter())),
            countries: distinct_labels(records.iter().map(|r| &r.country)),
        })
    }

    /// Full-dataset age extent.
    pub fn age(&self) -> ValueRange {
        self.age
    }

    /// Full-dataset compensation extent.
    pub fn compensation(&self) -> ValueRange {
        self.compensation
    }

    /// Gender labels in first-occurrence order.
    pub fn genders(&self) -> &[GenderLabel] {
        &self.genders
    }

    /// Language labels in first-occurrence order.
    pub fn languages(&self) -> &[LanguageLabel] {
        &self.languages
    }

    /// Language labels sorted alphabetically, the order the charts lay them out in.
    pub fn languages_sorted(&self) -> Vec<LanguageLabel> {
        let mut sorted = self.languages.clone();
        sorted.sort();
        sorted
    }

    /// Every country in dataset order.
    pub fn countries(&self) -> &[CountryName] {
        &self.countries
    }

    /// Filter state matching this domain: full ranges, every gender included, no threshold.
    pub fn default_filter_state(&self) -> FilterState {
        FilterState {
            age: self.age,
            compensation: self.compensation,
            genders: self
                .genders
                .iter()
                .map(|gender| (gender.clone(), true))
                .collect(),
            min_responses: 0,
        }
    }
}

fn answered_extent(values: impl Iterator<Item = Option<f64>>) -> Option<ValueRange> {
    values.flatten().fold(None, |extent, value| match extent {
        None => Some(ValueRange::new(value, value)),
        Some(range) => Some(ValueRange::new(range.min.min(value), range.max.max(value))),
    })
}

/// Owns the raw dataset and the current filter state.
///
/// Mutators only write state; filtered views are recomputed on the next call
/// to [`RecordStore::filtered_records`].
#[derive(Clone, Debug)]
pub struct RecordStore {
    records: Vec<Respondent>,
    domain: Domain,
    filter: FilterState,
}

impl RecordStore {
    /// Take ownership of the dataset and seed the filters from its domain.
    pub fn new(records: Vec<Respondent>) -> Result<Self, SurveyError> {
        let domain = Domain::from_records(&records)?;
        let filter = domain.default_filter_state();
        info!(
            respondents = records.len(),
            languages = domain.languages.len(),
            genders = domain.genders.len(),
            countries = domain.countries.len(),
            "[surveyscope:store] dataset loaded"
        );
        Ok(Self {
            records,
            domain,
            filter,
        })
    }

    /// Every record, unfiltered.
    pub fn records(&self) -> &[Respondent] {
        &self.records
    }

    /// Domain computed at load.
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Current filter state.
    pub fn filter_state(&self) -> &FilterState {
        &self.filter
    }

    /// Current per-group response threshold.
    pub fn min_responses(&self) -> u64 {
        self.filter.min_responses
    }

    /// Records passing the record-level filters, in dataset order.
    ///
    /// Returns an empty vector when nothing matches.
    pub fn filtered_records(&self) -> Vec<&Respondent> {
        let filtered = filter_records(&self.records, &self.filter);
        debug!(
            kept = filtered.len(),
            total = self.records.len(),
            "[surveyscope:store] filtered records"
        );
        filtered
    }

    /// Set the age range; inverted ranges are rejected and leave the state untouched.
    pub fn set_age_range(&mut self, range: ValueRange) -> Result<(), SurveyError> {
        self.filter.age = validate_age(range, &self.domain.age)?;
        Ok(())
    }

    /// Set the compensation range; inverted ranges are rejected and leave the state untouched.
    pub fn set_compensation_range(&mut self, range: ValueRange) -> Result<(), SurveyError> {
        self.filter.compensation = validate_compensation(range, &self.domain.compensation)?;
        Ok(())
    }

    /// Include or exclude one gender label. Unknown labels are rejected with `UnknownGender`.
    pub fn set_gender_included(&mut self, label: &str, included: bool) -> Result<(), SurveyError> {
        match self.filter.genders.get_mut(label) {
            Some(flag) => {
                *flag = included;
                Ok(())
            }
            None => Err(SurveyError::UnknownGender(label.to_string())),
        }
    }

    /// Set the per-group response threshold. Never affects record filtering.
    pub fn set_min_responses(&mut self, threshold: u64) {
        self.filter.min_responses = threshold;
    }

    /// Apply one update; a failed update writes nothing.
    pub fn apply(&mut self, update: FilterUpdate) -> Result<(), SurveyError> {
        match update {
            FilterUpdate::Age(range) => self.set_age_range(range),
            FilterUpdate::Compensation(range) => self.set_compensation_range(range),
            FilterUpdate::Gender { label, included } => self.set_gender_included(&label, included),
            FilterUpdate::MinResponses(threshold) => {
                self.set_min_responses(threshold);
                Ok(())
            }
        }
    }

    /// Restore the filters derived from the domain.
    pub fn reset_filters(&mut self) {
        self.filter = self.domain.default_filter_state();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn respondent(age: Option<f64>, comp: Option<f64>, gender: &[&str], langs: &[&str]) -> Respondent {
        Respondent {
            age,
            converted_comp: comp,
            years_code_pro: Some(2.0),
            country: "Kenya".to_string(),
            gender: gender.iter().map(|g| g.to_string()).collect(),
            language_worked_with: langs.iter().map(|l| l.to_string()).collect(),
            ..Respondent::default()
        }
    }

    fn store() -> RecordStore {
        RecordStore::new(vec![
            respondent(Some(25.0), Some(30_000.0), &["Man"], &["Rust", "C"]),
            respondent(None, Some(90_000.0), &["Woman"], &["Go"]),
            respondent(Some(41.0), None, &["Non-binary"], &["Rust"]),
            respondent(Some(33.0), Some(12_000.0), &["Woman", "Man"], &["Python"]),
        ])
        .unwrap()
    }

    #[test]
    fn domain_ignores_absent_values() {
        let store = store();
        assert_eq!(store.domain().age(), ValueRange::new(25.0, 41.0));
        assert_eq!(store.domain().compensation(), ValueRange::new(12_000.0, 90_000.0));
        assert_eq!(store.domain().genders(), ["Man", "Woman", "Non-binary"]);
        assert_eq!(store.domain().languages(), ["Rust", "C", "Go", "Python"]);
        assert_eq!(store.domain().languages_sorted(), vec!["C", "Go", "Python", "Rust"]);
    }

    #[test]
    fn default_filters_include_everything_answered() {
        let store = store();
        assert_eq!(store.min_responses(), 0);
        assert!(store.filter_state().genders.values().all(|included| *included));
        // Records with an absent age or compensation never pass the range checks.
        assert_eq!(store.filtered_records().len(), 2);
    }

    #[test]
    fn inverted_range_leaves_state_intact() {
        let mut store = store();
        let before = store.filter_state().clone();
        assert!(store.set_compensation_range(ValueRange::new(5.0, 1.0)).is_err());
        assert_eq!(store.filter_state(), &before);
    }

    #[test]
    fn unknown_gender_is_rejected() {
        let mut store = store();
        let err = store.set_gender_included("Robot", false).unwrap_err();
        assert!(matches!(err, SurveyError::UnknownGender(label) if label == "Robot"));
    }

    #[test]
    fn empty_and_unanswered_datasets_fail() {
        assert!(matches!(RecordStore::new(Vec::new()), Err(SurveyError::EmptyDataset)));
        let unanswered = vec![respondent(None, Some(1.0), &["Man"], &["Rust"])];
        assert!(matches!(
            RecordStore::new(unanswered),
            Err(SurveyError::DegenerateDomain { field }) if field == "Age"
        ));
    }

    #[test]
    fn narrow_range_yields_empty_view() {
        let mut store = store();
        store.set_age_range(ValueRange::new(26.0, 27.0)).unwrap();
        assert!(store.filtered_records().is_empty());
    }
}
