use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::{Parser, ValueEnum, error::ErrorKind};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::aggregate::{GroupBy, sort_alphabetically, summarize_by};
use crate::config::PipelineConfig;
use crate::controller::FilterController;
use crate::data::{Respondent, ValueRange};
use crate::filter::FilterUpdate;
use crate::geo::CountryNames;
use crate::ingest::{clean_records, load_dataset, write_dataset};
use crate::store::RecordStore;
use crate::suppression::{GroupSlot, suppress_by_threshold};
use crate::synthetic::{SyntheticSurvey, generate};
use crate::views::{BarChartModel, ChoroplethModel, ScatterplotModel};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GroupArg {
    Language,
    Country,
}

impl From<GroupArg> for GroupBy {
    fn from(value: GroupArg) -> Self {
        match value {
            GroupArg::Language => GroupBy::Language,
            GroupArg::Country => GroupBy::Country,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "summarize_survey",
    disable_help_subcommand = true,
    about = "Print per-group survey statistics as JSON",
    long_about = "Load a survey dataset, apply filters, aggregate per language or country, and print the suppressed group slots.",
    after_help = "Without --dataset a deterministic synthetic survey is used."
)]
struct SummarizeCli {
    #[arg(long, value_name = "PATH", help = "Survey dataset (JSON array)")]
    dataset: Option<PathBuf>,
    #[arg(long = "group-by", value_enum, default_value = "language")]
    group_by: GroupArg,
    #[arg(
        long,
        value_name = "MIN,MAX",
        value_parser = parse_range_arg,
        help = "Inclusive age range"
    )]
    age: Option<ValueRange>,
    #[arg(
        long,
        value_name = "MIN,MAX",
        value_parser = parse_range_arg,
        help = "Inclusive compensation range"
    )]
    compensation: Option<ValueRange>,
    #[arg(
        long = "exclude-gender",
        value_name = "LABEL",
        help = "Gender label to exclude, repeat as needed"
    )]
    excluded_genders: Vec<String>,
    #[arg(long = "min-responses", default_value_t = 0)]
    min_responses: u64,
    #[arg(long, help = "Seed for the synthetic survey")]
    seed: Option<u64>,
}

#[derive(Debug, Parser)]
#[command(
    name = "clean_survey",
    disable_help_subcommand = true,
    about = "Drop respondents with unanswered fields"
)]
struct CleanCli {
    #[arg(long, value_name = "PATH")]
    input: PathBuf,
    #[arg(long, value_name = "PATH")]
    output: PathBuf,
}

#[derive(Debug, Parser)]
#[command(
    name = "filter_walkthrough",
    disable_help_subcommand = true,
    about = "Drive all three chart models through a sequence of filter changes"
)]
struct WalkthroughCli {
    #[arg(long, default_value_t = 400)]
    respondents: usize,
    #[arg(long, default_value_t = 2019)]
    seed: u64,
    #[arg(long, value_name = "PATH", help = "Optional pipeline config (JSON)")]
    config: Option<PathBuf>,
    #[arg(
        long = "country-names",
        value_name = "PATH",
        help = "Optional id,name table for the map features"
    )]
    country_names: Option<PathBuf>,
}

#[derive(Serialize)]
struct SummaryOutput {
    total: usize,
    min_responses: u64,
    groups: Vec<GroupSlot>,
}

/// Install a `tracing` subscriber honouring `RUST_LOG` (defaults to `info`).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Run the `summarize_survey` command with `args_iter` (program name excluded).
pub fn run_summarize<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let Some(cli) =
        parse_cli::<SummarizeCli, _>(std::iter::once("summarize_survey".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    let records = match &cli.dataset {
        Some(path) => load_dataset(path)?,
        None => generate(&SyntheticSurvey {
            seed: cli.seed.unwrap_or(SyntheticSurvey::default().seed),
            ..SyntheticSurvey::default()
        }),
    };
    let mut controller = FilterController::new(RecordStore::new(records)?);
    for update in cli_updates(&cli) {
        controller.apply_filter(update)?;
    }

    let group_by = GroupBy::from(cli.group_by);
    let store = controller.store();
    let filtered = store.filtered_records();
    let mut summaries = summarize_by(filtered.iter().copied(), group_by);
    sort_alphabetically(&mut summaries);
    let universe = match group_by {
        GroupBy::Language => store.domain().languages_sorted(),
        GroupBy::Country => {
            let mut countries = store.domain().countries().to_vec();
            countries.sort();
            countries
        }
    };
    let output = SummaryOutput {
        total: filtered.len(),
        min_responses: store.min_responses(),
        groups: suppress_by_threshold(summaries, &universe, store.min_responses()),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn cli_updates(cli: &SummarizeCli) -> Vec<FilterUpdate> {
    let mut updates = Vec::new();
    if let Some(range) = cli.age {
        updates.push(FilterUpdate::Age(range));
    }
    if let Some(range) = cli.compensation {
        updates.push(FilterUpdate::Compensation(range));
    }
    for label in &cli.excluded_genders {
        updates.push(FilterUpdate::Gender {
            label: label.clone(),
            included: false,
        });
    }
    if cli.min_responses > 0 {
        updates.push(FilterUpdate::MinResponses(cli.min_responses));
    }
    updates
}

/// Run the `clean_survey` command.
pub fn run_clean<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let Some(cli) =
        parse_cli::<CleanCli, _>(std::iter::once("clean_survey".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };
    let (kept, report) = clean_records(load_dataset(&cli.input)?);
    let mut writer = BufWriter::new(File::create(&cli.output)?);
    write_dataset(&kept, &mut writer)?;
    writer.flush()?;
    println!(
        "kept {} of {} respondents -> {}",
        report.kept,
        report.total,
        cli.output.display()
    );
    Ok(())
}

/// Run the `filter_walkthrough` command: three chart models driven through a fixed filter sequence.
pub fn run_filter_walkthrough<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let Some(cli) = parse_cli::<WalkthroughCli, _>(
        std::iter::once("filter_walkthrough".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };
    let config = match &cli.config {
        Some(path) => PipelineConfig::from_json_path(path)?,
        None => PipelineConfig::default(),
    };
    let names = match &cli.country_names {
        Some(path) => CountryNames::load(path)?,
        None => CountryNames::from_pairs([
            ("840", "United States of America"),
            ("276", "Germany"),
            ("356", "India"),
            ("826", "United Kingdom of Great Britain and Northern Ireland"),
            ("76", "Brazil"),
            ("410", "Korea (Republic of)"),
            ("364", "Iran (Islamic Republic of)"),
            ("124", "Canada"),
            ("250", "France"),
        ]),
    };
    let feature_ids = ["840", "276", "356", "826", "76", "410", "364", "124", "250"]
        .iter()
        .map(|id| id.to_string())
        .collect();

    let records: Vec<Respondent> = generate(&SyntheticSurvey {
        seed: cli.seed,
        respondents: cli.respondents,
        ..SyntheticSurvey::default()
    });
    let mut controller = FilterController::new(RecordStore::new(records)?);

    let bar_lines = Arc::new(Mutex::new(Vec::new()));
    let bar_sink = Arc::clone(&bar_lines);
    controller.register_view(Box::new(BarChartModel::new(config.clone()).with_sink(
        move |frame| {
            let line = frame
                .bars
                .iter()
                .filter(|bar| bar.visible)
                .map(|bar| format!("{} {}", bar.label, bar.text))
                .collect::<Vec<_>>()
                .join(", ");
            if let Ok(mut lines) = bar_sink.lock() {
                lines.push(format!("[{} respondents] {line}", frame.total));
            }
        },
    )))?;
    controller.register_view(Box::new(ScatterplotModel::new(config.clone()).with_sink(
        |frame| {
            let plotted = frame.points.iter().filter(|point| point.visible).count();
            tracing::info!(plotted, domains = ?frame.domains, "[surveyscope:demo] scatterplot frame");
        },
    )))?;
    controller.register_view(Box::new(
        ChoroplethModel::new(config, feature_ids, names).with_sink(|frame| {
            let shaded = frame.regions.iter().filter(|region| region.visible).count();
            tracing::info!(shaded, color_domain = ?frame.color_domain, "[surveyscope:demo] choropleth frame");
        }),
    ))?;

    controller.refresh();
    controller.apply_filter(FilterUpdate::Age(ValueRange::new(25.0, 40.0)))?;
    controller.apply_filter(FilterUpdate::MinResponses(40))?;
    if let Some(first) = controller.store().domain().genders().first().cloned() {
        controller.apply_filter(FilterUpdate::Gender {
            label: first,
            included: false,
        })?;
    }
    if let Err(err) = controller.apply_filter(FilterUpdate::Age(ValueRange::new(50.0, 20.0))) {
        println!("rejected: {err}");
    }
    controller.reset();

    let lines = bar_lines.lock().map_err(|_| "bar chart sink poisoned")?;
    for (idx, line) in lines.iter().enumerate() {
        println!("broadcast {}: {line}", idx + 1);
    }
    println!("{} broadcasts", controller.broadcasts());
    Ok(())
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

fn parse_range_arg(raw: &str) -> Result<ValueRange, String> {
    let Some((min, max)) = raw.split_once(',') else {
        return Err("range expects MIN,MAX".to_string());
    };
    let min = min
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid minimum '{}': must be a number", min.trim()))?;
    let max = max
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid maximum '{}': must be a number", max.trim()))?;
    Ok(ValueRange::new(min, max))
}
