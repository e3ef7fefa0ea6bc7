//! View models for the three slideshow charts.
//!
//! Each model implements [`View`]: on every broadcast it aggregates the
//! filtered records, applies the minimum-response suppression, computes its
//! scale domains, and stores the resulting frame. An optional sink receives
//! every frame, which is where a renderer plugs in.

use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use crate::aggregate::{GroupBy, sort_alphabetically, summarize_by};
use crate::config::{PipelineConfig, RadiusScale};
use crate::controller::View;
use crate::data::{CountryName, GroupLabel, GroupSummary, Respondent, ValueRange};
use crate::domain::{
    ScatterDomains, color_domain, log_radius_domain, scale_linear, scale_log, scatter_domains,
};
use crate::errors::SurveyError;
use crate::format::{
    format_currency, format_decimals, format_percent, format_signed_percent, format_thousands,
};
use crate::geo::{CountryAliases, CountryNames};
use crate::metrics::{GroupShare, group_shares, share_divergence};
use crate::store::Domain;
use crate::suppression::{meets_threshold, suppress_by_threshold, visible_summaries};
use crate::types::CountryId;

/// Receiver for frames produced by a view model.
pub type FrameSink<T> = Box<dyn FnMut(&T) + Send>;

/// One bar per known language.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Bar {
    /// Language name.
    pub label: GroupLabel,
    /// Filtered respondents working with the language.
    pub count: usize,
    /// Share of filtered respondents, scaled by `bar_percent_scale`.
    pub share: f64,
    /// False when the group is below the response threshold.
    pub visible: bool,
    /// Text drawn on the bar, e.g. `42%`.
    pub text: String,
}

/// Bars for one broadcast.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BarChartFrame {
    /// Filtered respondents the shares are relative to.
    pub total: usize,
    /// Threshold the bars were suppressed with.
    pub min_responses: u64,
    /// One bar per language, alphabetical.
    pub bars: Vec<Bar>,
}

impl BarChartFrame {
    /// Bar texts while hovering `reference`.
    ///
    /// Every other bar shows its signed point difference to the hovered one
    /// (`+5%`, `-12%`); the hovered bar keeps its own text. `None` when no bar
    /// carries `reference`.
    pub fn divergence(&self, reference: &str) -> Option<Vec<(GroupLabel, String)>> {
        let shares: Vec<GroupShare> = self
            .bars
            .iter()
            .map(|bar| GroupShare {
                label: bar.label.clone(),
                count: bar.count,
                share: bar.share,
                visible: bar.visible,
            })
            .collect();
        let divergence = share_divergence(&shares, reference)?;
        Some(
            divergence
                .into_iter()
                .zip(&self.bars)
                .map(|((label, difference), bar)| {
                    let text = match difference {
                        Some(points) => format_signed_percent(points),
                        None => bar.text.clone(),
                    };
                    (label, text)
                })
                .collect(),
        )
    }
}

/// Share of respondents per language, one bar per language in the dataset.
pub struct BarChartModel {
    config: PipelineConfig,
    languages: Vec<GroupLabel>,
    last_frame: Option<BarChartFrame>,
    sink: Option<FrameSink<BarChartFrame>>,
}

impl BarChartModel {
    /// Model with an empty language universe until initialized.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            languages: Vec::new(),
            last_frame: None,
            sink: None,
        }
    }

    /// Send every frame to `sink`.
    pub fn with_sink(mut self, sink: impl FnMut(&BarChartFrame) + Send + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Alphabetical language universe fixed at initialization.
    pub fn languages(&self) -> &[GroupLabel] {
        &self.languages
    }

    /// Frame from the most recent broadcast.
    pub fn last_frame(&self) -> Option<&BarChartFrame> {
        self.last_frame.as_ref()
    }

    /// Build a frame without storing it.
    pub fn frame(&self, records: &[&Respondent], min_responses: u64) -> BarChartFrame {
        let mut summaries = summarize_by(records.iter().copied(), GroupBy::Language);
        sort_alphabetically(&mut summaries);
        let slots = suppress_by_threshold(summaries, &self.languages, min_responses);
        let bars = group_shares(&slots, records.len(), self.config.bar_percent_scale)
            .into_iter()
            .map(|share| Bar {
                text: format_percent(share.share),
                label: share.label,
                count: share.count,
                share: share.share,
                visible: share.visible,
            })
            .collect();
        BarChartFrame {
            total: records.len(),
            min_responses,
            bars,
        }
    }
}

impl View for BarChartModel {
    fn name(&self) -> &str {
        "bar_chart"
    }

    fn initialize(&mut self, dataset: &[Respondent]) -> Result<(), SurveyError> {
        self.languages = Domain::from_records(dataset)?.languages_sorted();
        Ok(())
    }

    fn render(&mut self, records: &[&Respondent], min_responses: u64) {
        let frame = self.frame(records, min_responses);
        if let Some(sink) = self.sink.as_mut() {
            sink(&frame);
        }
        self.last_frame = Some(frame);
    }
}

/// One bubble per known language.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScatterPoint {
    /// Language name.
    pub label: GroupLabel,
    /// Filtered respondents working with the language.
    pub respondent_count: usize,
    /// Average years of professional coding.
    pub x: Option<f64>,
    /// Median compensation.
    pub y: Option<f64>,
    /// Bubble radius in pixels; `None` when the point is hidden or unscaled.
    pub radius: Option<f64>,
    /// False when the group is below the response threshold.
    pub visible: bool,
}

/// Points and scale domains for one broadcast.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScatterFrame {
    /// Threshold the points were suppressed with.
    pub min_responses: u64,
    /// `None` when no visible group had the statistics to scale against.
    pub domains: Option<ScatterDomains>,
    /// One point per language, alphabetical.
    pub points: Vec<ScatterPoint>,
}

/// Median compensation against average experience, sized by respondent count.
pub struct ScatterplotModel {
    config: PipelineConfig,
    languages: Vec<GroupLabel>,
    last_frame: Option<ScatterFrame>,
    sink: Option<FrameSink<ScatterFrame>>,
}

impl ScatterplotModel {
    /// Model with an empty language universe until initialized.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            languages: Vec::new(),
            last_frame: None,
            sink: None,
        }
    }

    /// Send every frame to `sink`.
    pub fn with_sink(mut self, sink: impl FnMut(&ScatterFrame) + Send + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Frame from the most recent broadcast.
    pub fn last_frame(&self) -> Option<&ScatterFrame> {
        self.last_frame.as_ref()
    }

    /// Build a frame without storing it.
    pub fn frame(&self, records: &[&Respondent], min_responses: u64) -> ScatterFrame {
        let mut summaries = summarize_by(records.iter().copied(), GroupBy::Language);
        sort_alphabetically(&mut summaries);
        let slots = suppress_by_threshold(summaries, &self.languages, min_responses);
        let visible = visible_summaries(&slots);

        let domains = match scatter_domains(&visible, &self.config.scatter_padding) {
            Ok(domains) => Some(domains),
            Err(err) => {
                warn!(error = %err, "[surveyscope:scatterplot] skipping scales");
                None
            }
        };
        let radius_domain = match self.config.radius_scale {
            RadiusScale::Linear => domains.map(|domains| domains.r),
            RadiusScale::Log => log_radius_domain(&visible).ok(),
        };

        let points = slots
            .into_iter()
            .map(|slot| {
                let count = slot.respondent_count();
                let radius = match (slot.visible, radius_domain.as_ref()) {
                    (true, Some(domain)) => self.radius_for(count as f64, domain),
                    _ => None,
                };
                ScatterPoint {
                    respondent_count: count,
                    x: slot.summary.as_ref().and_then(|s| s.avg_years_code_pro),
                    y: slot.summary.as_ref().and_then(|s| s.median_compensation),
                    radius,
                    visible: slot.visible,
                    label: slot.label,
                }
            })
            .collect();

        ScatterFrame {
            min_responses,
            domains,
            points,
        }
    }

    fn radius_for(&self, count: f64, domain: &ValueRange) -> Option<f64> {
        let (min_px, max_px) = (self.config.radius_px_min, self.config.radius_px_max);
        match self.config.radius_scale {
            RadiusScale::Linear => Some(scale_linear(count, domain, min_px, max_px)),
            RadiusScale::Log => scale_log(count, domain, min_px, max_px),
        }
    }
}

impl View for ScatterplotModel {
    fn name(&self) -> &str {
        "scatterplot"
    }

    fn initialize(&mut self, dataset: &[Respondent]) -> Result<(), SurveyError> {
        self.languages = Domain::from_records(dataset)?.languages_sorted();
        Ok(())
    }

    fn render(&mut self, records: &[&Respondent], min_responses: u64) {
        let frame = self.frame(records, min_responses);
        if let Some(sink) = self.sink.as_mut() {
            sink(&frame);
        }
        self.last_frame = Some(frame);
    }
}

/// A boundary feature with a known name.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MapFeature {
    /// Numeric feature id from the boundary data.
    pub id: CountryId,
    /// Name from the boundary data's name table.
    pub name: CountryName,
    /// Name as spelled by survey respondents.
    pub survey_name: CountryName,
}

/// Statistics drawn on one country.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CountryRegion {
    /// Feature id.
    pub id: CountryId,
    /// Boundary-data name.
    pub name: CountryName,
    /// Respondents from this country; zero when unmatched or suppressed.
    pub responses: usize,
    /// Median compensation of the country, if anyone answered.
    pub median_compensation: Option<f64>,
    /// Mean years of professional coding.
    pub avg_years_code_pro: Option<f64>,
    /// False when the country is below the response threshold.
    pub visible: bool,
    /// Value fed into the colour scale: the median when visible, otherwise zero.
    pub color_value: f64,
    /// Hover text.
    pub tooltip: String,
}

/// Regions and colour domain for one broadcast.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChoroplethFrame {
    /// Threshold the regions were suppressed with.
    pub min_responses: u64,
    /// `None` when no country had an answered compensation.
    pub color_domain: Option<ValueRange>,
    /// One region per named feature.
    pub regions: Vec<CountryRegion>,
}

/// Median compensation per country on a world map.
pub struct ChoroplethModel {
    config: PipelineConfig,
    feature_ids: Vec<CountryId>,
    names: CountryNames,
    aliases: CountryAliases,
    features: Vec<MapFeature>,
    last_frame: Option<ChoroplethFrame>,
    sink: Option<FrameSink<ChoroplethFrame>>,
}

impl ChoroplethModel {
    /// `feature_ids` are the ids of the boundary features, in drawing order.
    pub fn new(config: PipelineConfig, feature_ids: Vec<CountryId>, names: CountryNames) -> Self {
        Self {
            config,
            feature_ids,
            names,
            aliases: CountryAliases::default(),
            features: Vec::new(),
            last_frame: None,
            sink: None,
        }
    }

    /// Send every frame to `sink`.
    pub fn with_sink(mut self, sink: impl FnMut(&ChoroplethFrame) + Send + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Features that survived the name join; unnamed ids are dropped.
    pub fn features(&self) -> &[MapFeature] {
        &self.features
    }

    /// Frame from the most recent broadcast.
    pub fn last_frame(&self) -> Option<&ChoroplethFrame> {
        self.last_frame.as_ref()
    }

    fn join_features(&mut self) {
        self.features = self
            .feature_ids
            .iter()
            .filter_map(|id| {
                let name = self.names.name(id)?;
                Some(MapFeature {
                    id: id.clone(),
                    name: name.to_string(),
                    survey_name: self.aliases.survey_name(name).to_string(),
                })
            })
            .collect();
    }

    /// Build a frame without storing it.
    pub fn frame(&self, records: &[&Respondent], min_responses: u64) -> ChoroplethFrame {
        let summaries = summarize_by(records.iter().copied(), GroupBy::Country);
        let color_domain = match color_domain(&summaries, self.config.color_mean_multiplier) {
            Ok(domain) => Some(domain),
            Err(err) => {
                warn!(error = %err, "[surveyscope:choropleth] skipping colour scale");
                None
            }
        };
        let by_country: HashMap<&str, &GroupSummary> = summaries
            .iter()
            .map(|summary| (summary.label.as_str(), summary))
            .collect();

        let regions = self
            .features
            .iter()
            .map(|feature| {
                let summary = by_country.get(feature.survey_name.as_str()).copied();
                let count = summary.map(|s| s.respondent_count).unwrap_or(0);
                let visible = meets_threshold(count, min_responses);
                let median = summary.and_then(|s| s.median_compensation);
                let years = summary.and_then(|s| s.avg_years_code_pro);
                let responses = if visible { count } else { 0 };
                CountryRegion {
                    id: feature.id.clone(),
                    name: feature.name.clone(),
                    responses,
                    median_compensation: median,
                    avg_years_code_pro: years,
                    visible,
                    color_value: if visible { median.unwrap_or(0.0) } else { 0.0 },
                    tooltip: region_tooltip(&feature.name, responses, median, years),
                }
            })
            .collect();

        ChoroplethFrame {
            min_responses,
            color_domain,
            regions,
        }
    }
}

fn region_tooltip(
    name: &str,
    responses: usize,
    median: Option<f64>,
    years: Option<f64>,
) -> String {
    format!(
        "{name}\nResponses: {}\nMedian Compensation: {}\nAverage Years of Professional Coding: {}",
        format_thousands(responses as f64),
        format_currency(median.unwrap_or(0.0)),
        format_decimals(years.unwrap_or(0.0), 2),
    )
}

impl View for ChoroplethModel {
    fn name(&self) -> &str {
        "choropleth"
    }

    fn initialize(&mut self, _dataset: &[Respondent]) -> Result<(), SurveyError> {
        self.join_features();
        Ok(())
    }

    fn render(&mut self, records: &[&Respondent], min_responses: u64) {
        let frame = self.frame(records, min_responses);
        if let Some(sink) = self.sink.as_mut() {
            sink(&frame);
        }
        self.last_frame = Some(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn respondent(comp: f64, years: f64, country: &str, langs: &[&str]) -> Respondent {
        Respondent {
            age: Some(30.0),
            converted_comp: Some(comp),
            years_code_pro: Some(years),
            country: country.to_string(),
            gender: vec!["Woman".to_string()],
            language_worked_with: langs.iter().map(|l| l.to_string()).collect(),
            ..Respondent::default()
        }
    }

    fn dataset() -> Vec<Respondent> {
        vec![
            respondent(100.0, 2.0, "United States", &["Rust", "Go"]),
            respondent(50.0, 4.0, "United States", &["Rust"]),
            respondent(10.0, 6.0, "Iran", &["C"]),
        ]
    }

    #[test]
    fn bar_chart_keeps_every_language_slot() {
        let data = dataset();
        let mut model = BarChartModel::new(PipelineConfig::default());
        model.initialize(&data).unwrap();
        let filtered: Vec<&Respondent> = data.iter().take(2).collect();
        model.render(&filtered, 0);
        let frame = model.last_frame().unwrap();
        let labels: Vec<&str> = frame.bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["C", "Go", "Rust"]);
        assert_eq!(frame.bars[0].count, 0);
        assert!(!frame.bars[0].visible);
        assert_eq!(frame.bars[2].share, 100.0);
        assert_eq!(frame.bars[1].text, "50%");
    }

    #[test]
    fn bar_hover_shows_signed_differences() {
        let data = dataset();
        let mut model = BarChartModel::new(PipelineConfig::default());
        model.initialize(&data).unwrap();
        let filtered: Vec<&Respondent> = data.iter().take(2).collect();
        model.render(&filtered, 0);
        let frame = model.last_frame().unwrap();

        let hover = frame.divergence("Go").unwrap();
        assert_eq!(
            hover,
            vec![
                ("C".to_string(), "-50%".to_string()),
                ("Go".to_string(), "50%".to_string()),
                ("Rust".to_string(), "+50%".to_string()),
            ]
        );
        assert!(frame.divergence("Zig").is_none());
    }

    #[test]
    fn scatter_hidden_points_have_no_radius() {
        let data = dataset();
        let mut model = ScatterplotModel::new(PipelineConfig::default());
        model.initialize(&data).unwrap();
        let filtered: Vec<&Respondent> = data.iter().collect();
        let frame = model.frame(&filtered, 2);
        let rust = frame.points.iter().find(|p| p.label == "Rust").unwrap();
        assert!(rust.visible);
        assert_eq!(rust.radius, Some(10.0));
        let go = frame.points.iter().find(|p| p.label == "Go").unwrap();
        assert!(!go.visible);
        assert_eq!(go.radius, None);
        let domains = frame.domains.unwrap();
        assert!((domains.x.min - 2.7).abs() < 1e-9);
    }

    #[test]
    fn scatter_without_visible_groups_skips_domains() {
        let data = dataset();
        let mut model = ScatterplotModel::new(PipelineConfig::default());
        model.initialize(&data).unwrap();
        let frame = model.frame(&[], 0);
        assert_eq!(frame.domains, None);
        assert_eq!(frame.points.len(), 3);
        assert!(frame.points.iter().all(|p| !p.visible));
    }

    #[test]
    fn choropleth_joins_names_through_aliases() {
        let data = dataset();
        let names = CountryNames::from_pairs([
            ("840", "United States of America"),
            ("364", "Iran (Islamic Republic of)"),
            ("250", "France"),
        ]);
        let ids = vec!["840".to_string(), "364".to_string(), "250".to_string(), "-99".to_string()];
        let mut model = ChoroplethModel::new(PipelineConfig::default(), ids, names);
        model.initialize(&data).unwrap();
        assert_eq!(model.features().len(), 3);

        let filtered: Vec<&Respondent> = data.iter().collect();
        model.render(&filtered, 2);
        let frame = model.last_frame().unwrap();
        let usa = &frame.regions[0];
        assert_eq!(usa.responses, 2);
        assert_eq!(usa.median_compensation, Some(75.0));
        assert!(usa.visible);
        let iran = &frame.regions[1];
        assert_eq!(iran.responses, 0);
        assert!(!iran.visible);
        assert_eq!(iran.color_value, 0.0);
        let france = &frame.regions[2];
        assert_eq!(france.responses, 0);
        assert_eq!(france.median_compensation, None);
        assert!(france.tooltip.contains("Median Compensation: $0"));
        // min 10, mean of medians (75 + 10) / 2 doubled.
        assert_eq!(frame.color_domain, Some(ValueRange::new(10.0, 85.0)));
    }
}
