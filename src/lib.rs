#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Group-by aggregation and reducers.
pub mod aggregate;
/// Command-line runners shared by the demo binaries.
pub mod apps;
/// Pipeline configuration types.
pub mod config;
/// Centralized constants used across ingestion, filters, and scales.
pub mod constants;
/// Filter ownership and render broadcasting.
pub mod controller;
/// Respondent, range, and summary types.
pub mod data;
/// Scale domain computation.
pub mod domain;
/// Record-level filter state.
pub mod filter;
/// Label and tooltip number formatting.
pub mod format;
/// Country name tables for the map join.
pub mod geo;
/// Dataset loading and cleaning.
pub mod ingest;
/// Per-group share helpers.
pub mod metrics;
/// Dataset ownership and filtered views.
pub mod store;
/// Post-aggregation minimum-response suppression.
pub mod suppression;
/// Deterministic synthetic survey data.
pub mod synthetic;
/// Shared type aliases.
pub mod types;
/// Label normalization helpers.
pub mod utils;
/// Chart view models.
pub mod views;

mod errors;

pub use aggregate::{GroupBy, Reducer, sort_alphabetically, summarize, summarize_by};
pub use config::{PipelineConfig, RadiusScale, ScatterPadding};
pub use controller::{CallbackView, CyclePhase, FilterController, FilterRequests, View};
pub use data::{GroupSummary, Respondent, TextAnswers, ValueRange};
pub use domain::{ScatterDomains, compute_range, log_radius_domain, radius_domain};
pub use errors::SurveyError;
pub use filter::{FilterState, FilterUpdate, filter_records};
pub use geo::{COUNTRY_ALIASES, CountryAliases, CountryNames};
pub use store::{Domain, RecordStore};
pub use suppression::{GroupSlot, suppress_by_threshold};
pub use types::{CountryId, CountryName, GenderLabel, GroupLabel, LanguageLabel};
pub use views::{BarChartModel, ChoroplethModel, ScatterplotModel};
