//! Scale domains derived from group summaries.

use serde::Serialize;

use crate::config::ScatterPadding;
use crate::data::{GroupSummary, ValueRange};
use crate::errors::SurveyError;

/// `[min(values) * padding_low, max(values) * padding_high]`.
///
/// Fails with [`SurveyError::EmptyGroupSet`] when `values` is empty; callers
/// skip their scale-dependent output in that case.
pub fn compute_range(
    values: &[f64],
    padding_low: f64,
    padding_high: f64,
) -> Result<ValueRange, SurveyError> {
    let (min, max) = extent(values.iter().copied())
        .ok_or_else(|| SurveyError::empty_group_set("range over zero values"))?;
    Ok(ValueRange::new(min * padding_low, max * padding_high))
}

fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, value| match acc {
        None => Some((value, value)),
        Some((min, max)) => Some((min.min(value), max.max(value))),
    })
}

/// Unpadded `[min count, max count]` for bubble sizes.
pub fn radius_domain(summaries: &[GroupSummary]) -> Result<ValueRange, SurveyError> {
    let counts: Vec<f64> = summaries
        .iter()
        .map(|summary| summary.respondent_count as f64)
        .collect();
    compute_range(&counts, 1.0, 1.0)
        .map_err(|_| SurveyError::empty_group_set("radius domain over zero groups"))
}

/// Radius domain for a logarithmic scale.
///
/// Zero-count groups are left out so the lower bound stays strictly positive.
pub fn log_radius_domain(summaries: &[GroupSummary]) -> Result<ValueRange, SurveyError> {
    let counts: Vec<f64> = summaries
        .iter()
        .filter(|summary| summary.respondent_count > 0)
        .map(|summary| summary.respondent_count as f64)
        .collect();
    compute_range(&counts, 1.0, 1.0)
        .map_err(|_| SurveyError::empty_group_set("log radius domain over zero non-empty groups"))
}

/// The three scatterplot domains.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScatterDomains {
    /// Average years of professional coding.
    pub x: ValueRange,
    /// Median compensation.
    pub y: ValueRange,
    /// Respondent count.
    pub r: ValueRange,
}

/// Domains for the scatterplot axes and bubble sizes.
///
/// Groups with an absent statistic are skipped for that axis only.
pub fn scatter_domains(
    summaries: &[GroupSummary],
    padding: &ScatterPadding,
) -> Result<ScatterDomains, SurveyError> {
    let years: Vec<f64> = summaries
        .iter()
        .filter_map(|summary| summary.avg_years_code_pro)
        .collect();
    let compensation: Vec<f64> = summaries
        .iter()
        .filter_map(|summary| summary.median_compensation)
        .collect();
    Ok(ScatterDomains {
        x: compute_range(&years, padding.x_low, padding.x_high)?,
        y: compute_range(&compensation, padding.y_low, padding.y_high)?,
        r: radius_domain(summaries)?,
    })
}

/// Choropleth colour domain: `[min median, mean of medians * mean_multiplier]`.
pub fn color_domain(
    summaries: &[GroupSummary],
    mean_multiplier: f64,
) -> Result<ValueRange, SurveyError> {
    let medians: Vec<f64> = summaries
        .iter()
        .filter_map(|summary| summary.median_compensation)
        .collect();
    let (min, _) = extent(medians.iter().copied())
        .ok_or_else(|| SurveyError::empty_group_set("colour domain over zero groups"))?;
    let mean = medians.iter().sum::<f64>() / medians.len() as f64;
    Ok(ValueRange::new(min, mean * mean_multiplier))
}

/// Map `value` from `domain` into `[range_min, range_max]` linearly.
///
/// A zero-width domain maps everything to the middle of the range.
pub fn scale_linear(value: f64, domain: &ValueRange, range_min: f64, range_max: f64) -> f64 {
    let width = domain.max - domain.min;
    if width == 0.0 {
        return (range_min + range_max) / 2.0;
    }
    range_min + (value - domain.min) / width * (range_max - range_min)
}

/// Map `value` from `domain` into `[range_min, range_max]` on a log scale.
///
/// Returns `None` for non-positive values, which have no logarithm.
pub fn scale_log(value: f64, domain: &ValueRange, range_min: f64, range_max: f64) -> Option<f64> {
    if value <= 0.0 || domain.min <= 0.0 {
        return None;
    }
    let log_domain = ValueRange::new(domain.min.ln(), domain.max.ln());
    Some(scale_linear(value.ln(), &log_domain, range_min, range_max))
}
