//! Group-by aggregation over filtered respondents.
//!
//! A key extractor maps each respondent to zero, one, or many group labels.
//! Every label observed gets one [`GroupSummary`] built from a closed set of
//! reducers. Output follows first-occurrence order; callers that need a
//! stable layout sort explicitly with [`sort_alphabetically`].

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::data::{GroupSummary, Respondent};

/// Reducers applied to the values contributed to a group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reducer {
    /// Number of contributed values.
    Count,
    /// Middle value; the mean of the two middle values for even counts.
    Median,
    /// Arithmetic mean.
    Mean,
}

impl Reducer {
    /// Reduce `values`; `Median` and `Mean` return `None` for an empty slice.
    pub fn reduce(&self, values: &[f64]) -> Option<f64> {
        match self {
            Reducer::Count => Some(values.len() as f64),
            Reducer::Median => median(values),
            Reducer::Mean => mean(values),
        }
    }
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Built-in grouping keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    /// Every language a respondent worked with (multi-valued).
    Language,
    /// The respondent's country (single-valued). A missing country groups
    /// under the empty label so every record lands in exactly one group.
    Country,
}

impl GroupBy {
    /// Labels the respondent contributes to.
    pub fn labels<'a>(&self, respondent: &'a Respondent) -> Vec<&'a str> {
        match self {
            GroupBy::Language => respondent
                .language_worked_with
                .iter()
                .map(String::as_str)
                .collect::<IndexSet<&str>>()
                .into_iter()
                .collect(),
            GroupBy::Country => vec![respondent.country.as_str()],
        }
    }
}

#[derive(Default)]
struct GroupAccumulator {
    count: usize,
    last_record: Option<usize>,
    compensation: Vec<f64>,
    years_code_pro: Vec<f64>,
}

impl GroupAccumulator {
    fn push(&mut self, record_idx: usize, respondent: &Respondent) {
        // One contribution per record even if the extractor repeats a label.
        if self.last_record == Some(record_idx) {
            return;
        }
        self.last_record = Some(record_idx);
        self.count += 1;
        self.compensation.extend(respondent.converted_comp);
        self.years_code_pro.extend(respondent.years_code_pro);
    }

    fn finish(self, label: &str) -> GroupSummary {
        GroupSummary {
            label: label.to_string(),
            respondent_count: self.count,
            median_compensation: Reducer::Median.reduce(&self.compensation),
            avg_years_code_pro: Reducer::Mean.reduce(&self.years_code_pro),
        }
    }
}

/// Summarize `records` per label produced by `key`.
///
/// Labels with no contributing record never appear.
pub fn summarize<'a, I, F>(records: I, key: F) -> Vec<GroupSummary>
where
    I: IntoIterator<Item = &'a Respondent>,
    F: Fn(&'a Respondent) -> Vec<&'a str>,
{
    let mut groups: IndexMap<&'a str, GroupAccumulator> = IndexMap::new();
    for (idx, respondent) in records.into_iter().enumerate() {
        for label in key(respondent) {
            groups.entry(label).or_default().push(idx, respondent);
        }
    }
    groups
        .into_iter()
        .map(|(label, group)| group.finish(label))
        .collect()
}

/// Summarize with one of the built-in grouping keys.
pub fn summarize_by<'a, I>(records: I, group_by: GroupBy) -> Vec<GroupSummary>
where
    I: IntoIterator<Item = &'a Respondent>,
{
    summarize(records, |respondent| group_by.labels(respondent))
}

/// Sort summaries by label, the order both charts lay their groups out in.
pub fn sort_alphabetically(summaries: &mut [GroupSummary]) {
    summaries.sort_by(|a, b| a.label.cmp(&b.label));
}

/// Sum of respondent counts across groups.
pub fn total_contributions(summaries: &[GroupSummary]) -> usize {
    summaries.iter().map(|summary| summary.respondent_count).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn respondent(comp: Option<f64>, years: Option<f64>, country: &str, langs: &[&str]) -> Respondent {
        Respondent {
            age: Some(30.0),
            converted_comp: comp,
            years_code_pro: years,
            country: country.to_string(),
            gender: vec!["Man".to_string()],
            language_worked_with: langs.iter().map(|l| l.to_string()).collect(),
            ..Respondent::default()
        }
    }

    #[test]
    fn median_handles_odd_and_even_counts() {
        assert_eq!(Reducer::Median.reduce(&[30.0, 10.0, 20.0]), Some(20.0));
        assert_eq!(Reducer::Median.reduce(&[20.0, 10.0]), Some(15.0));
        assert_eq!(Reducer::Median.reduce(&[]), None);
    }

    #[test]
    fn mean_and_count_reduce() {
        assert_eq!(Reducer::Mean.reduce(&[1.0, 2.0, 6.0]), Some(3.0));
        assert_eq!(Reducer::Mean.reduce(&[]), None);
        assert_eq!(Reducer::Count.reduce(&[4.0, 4.0]), Some(2.0));
    }

    #[test]
    fn groups_follow_first_occurrence_order() {
        let records = vec![
            respondent(Some(10.0), Some(1.0), "Spain", &["Rust", "C"]),
            respondent(Some(20.0), Some(3.0), "Italy", &["Go", "Rust"]),
            respondent(Some(30.0), None, "Spain", &["Rust"]),
        ];
        let summaries = summarize_by(&records, GroupBy::Language);
        let labels: Vec<&str> = summaries.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Rust", "C", "Go"]);

        let rust = &summaries[0];
        assert_eq!(rust.respondent_count, 3);
        assert_eq!(rust.median_compensation, Some(20.0));
        assert_eq!(rust.avg_years_code_pro, Some(2.0));
    }

    #[test]
    fn all_absent_statistics_stay_absent() {
        let records = vec![respondent(None, None, "Peru", &["Elm"])];
        let summaries = summarize_by(&records, GroupBy::Country);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].respondent_count, 1);
        assert_eq!(summaries[0].median_compensation, None);
        assert_eq!(summaries[0].avg_years_code_pro, None);
    }

    #[test]
    fn missing_country_still_counts_once() {
        let mut records = vec![
            respondent(Some(5.0), Some(1.0), "Chad", &["Rust"]),
            respondent(Some(7.0), Some(1.0), "", &["Rust"]),
        ];
        records.push(serde_json::from_str(r#"{"Age": 20, "ConvertedComp": 9}"#).unwrap());
        let summaries = summarize_by(&records, GroupBy::Country);
        assert_eq!(total_contributions(&summaries), records.len());
        let missing = summaries.iter().find(|s| s.label.is_empty()).unwrap();
        assert_eq!(missing.respondent_count, 2);
        assert_eq!(missing.median_compensation, Some(8.0));
    }

    #[test]
    fn repeated_labels_count_once_per_record() {
        let records = vec![respondent(Some(5.0), Some(1.0), "Chad", &["Rust", "Rust"])];
        let summaries = summarize(&records, |r| {
            r.language_worked_with.iter().map(String::as_str).collect()
        });
        assert_eq!(summaries[0].respondent_count, 1);
        assert_eq!(summaries[0].median_compensation, Some(5.0));
    }

    #[test]
    fn explicit_sort_is_alphabetical() {
        let records = vec![respondent(Some(5.0), Some(1.0), "Chad", &["Swift", "Ada", "Kotlin"])];
        let mut summaries = summarize_by(&records, GroupBy::Language);
        sort_alphabetically(&mut summaries);
        let labels: Vec<&str> = summaries.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Ada", "Kotlin", "Swift"]);
    }

    #[test]
    fn empty_input_yields_no_groups() {
        let records: Vec<Respondent> = Vec::new();
        assert!(summarize_by(&records, GroupBy::Country).is_empty());
    }
}
