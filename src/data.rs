use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::survey::NOT_ANSWERED;
use crate::utils::normalize_label;

pub use crate::types::{CountryName, GenderLabel, GroupLabel, LanguageLabel};

/// One row of the survey dataset.
///
/// Numeric answers are `None` when the respondent did not answer (the `"NA"`
/// sentinel or `null`) and when the answer is free text that is not a number
/// such as `"Less than 1 year"`. Absent values are excluded from aggregation
/// and are never read as zero. Free text is kept verbatim in
/// [`Respondent::text_answers`] so cleaning and re-export do not lose it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRespondent", into = "RawRespondent")]
pub struct Respondent {
    /// Age in years.
    pub age: Option<f64>,
    /// Yearly compensation converted to USD.
    pub converted_comp: Option<f64>,
    /// Years of professional coding.
    pub years_code_pro: Option<f64>,
    /// Country as spelled in the survey; empty when the field is missing.
    pub country: CountryName,
    /// Every gender the respondent reported.
    pub gender: Vec<GenderLabel>,
    /// Every language the respondent reported working with.
    pub language_worked_with: Vec<LanguageLabel>,
    /// Non-numeric answers to the numeric questions.
    pub text_answers: TextAnswers,
}

impl Respondent {
    /// True when the age question was answered, numerically or in words.
    pub fn answered_age(&self) -> bool {
        self.age.is_some() || self.text_answers.age.is_some()
    }

    /// True when the compensation question was answered.
    pub fn answered_compensation(&self) -> bool {
        self.converted_comp.is_some() || self.text_answers.converted_comp.is_some()
    }

    /// True when the professional-coding question was answered.
    pub fn answered_years_code_pro(&self) -> bool {
        self.years_code_pro.is_some() || self.text_answers.years_code_pro.is_some()
    }
}

/// Free-text answers (for example `"More than 50 years"`) to questions that
/// are otherwise numeric. Never holds the `"NA"` sentinel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextAnswers {
    /// Verbatim `Age` text.
    pub age: Option<String>,
    /// Verbatim `ConvertedComp` text.
    pub converted_comp: Option<String>,
    /// Verbatim `YearsCodePro` text.
    pub years_code_pro: Option<String>,
}

/// Inclusive numeric bounds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    /// Lower bound, included.
    pub min: f64,
    /// Upper bound, included.
    pub max: f64,
}

impl ValueRange {
    /// Build a range as given; store setters validate and clamp it.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// True when `value` lies within the bounds, both ends included.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Clamp both ends into `outer`, keeping `min <= max`.
    pub fn clamp_to(&self, outer: &ValueRange) -> ValueRange {
        let min = self.min.clamp(outer.min, outer.max);
        let max = self.max.clamp(outer.min, outer.max);
        ValueRange { min, max }
    }
}

/// Aggregate statistics for one language or country.
///
/// Produced fresh on every render and replaced wholesale; nothing mutates a
/// summary after [`crate::aggregate::summarize`] returns it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Language or country the statistics belong to.
    pub label: GroupLabel,
    /// Number of filtered respondents contributing this label.
    pub respondent_count: usize,
    /// Median compensation over contributors that answered; `None` if nobody did.
    pub median_compensation: Option<f64>,
    /// Mean years of professional coding over contributors that answered.
    pub avg_years_code_pro: Option<f64>,
}

/// Parse a single survey answer, returning `None` for unanswered or non-numeric text.
pub fn parse_answer(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed == NOT_ANSWERED {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Wire shape of a respondent row.
#[derive(Serialize, Deserialize)]
struct RawRespondent {
    #[serde(rename = "Age", default)]
    age: RawAnswer,
    #[serde(rename = "ConvertedComp", default)]
    converted_comp: RawAnswer,
    #[serde(rename = "YearsCodePro", default)]
    years_code_pro: RawAnswer,
    #[serde(rename = "Country", default)]
    country: CountryName,
    #[serde(rename = "Gender", default, deserialize_with = "label_list")]
    gender: Vec<GenderLabel>,
    #[serde(
        rename = "LanguageWorkedWith",
        default,
        deserialize_with = "label_list"
    )]
    language_worked_with: Vec<LanguageLabel>,
}

#[derive(Default, Serialize, Deserialize)]
#[serde(untagged)]
enum RawAnswer {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl RawAnswer {
    fn split(self) -> (Option<f64>, Option<String>) {
        match self {
            RawAnswer::Number(value) if value.is_finite() => (Some(value), None),
            RawAnswer::Text(text) => match parse_answer(&text) {
                Some(value) => (Some(value), None),
                None if text.trim() == NOT_ANSWERED => (None, None),
                None => (None, Some(text)),
            },
            _ => (None, None),
        }
    }

    fn join(value: Option<f64>, text: Option<String>) -> Self {
        match (value, text) {
            (Some(value), _) => RawAnswer::Number(value),
            (None, Some(text)) => RawAnswer::Text(text),
            (None, None) => RawAnswer::Text(NOT_ANSWERED.to_string()),
        }
    }
}

impl From<RawRespondent> for Respondent {
    fn from(raw: RawRespondent) -> Self {
        let (age, age_text) = raw.age.split();
        let (converted_comp, comp_text) = raw.converted_comp.split();
        let (years_code_pro, years_text) = raw.years_code_pro.split();
        Self {
            age,
            converted_comp,
            years_code_pro,
            country: raw.country,
            gender: raw.gender,
            language_worked_with: raw.language_worked_with,
            text_answers: TextAnswers {
                age: age_text,
                converted_comp: comp_text,
                years_code_pro: years_text,
            },
        }
    }
}

impl From<Respondent> for RawRespondent {
    fn from(respondent: Respondent) -> Self {
        let TextAnswers {
            age,
            converted_comp,
            years_code_pro,
        } = respondent.text_answers;
        Self {
            age: RawAnswer::join(respondent.age, age),
            converted_comp: RawAnswer::join(respondent.converted_comp, converted_comp),
            years_code_pro: RawAnswer::join(respondent.years_code_pro, years_code_pro),
            country: respondent.country,
            gender: respondent.gender,
            language_worked_with: respondent.language_worked_with,
        }
    }
}

/// Multi-valued answers arrive either as arrays or as the raw `;`-joined export string.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLabels {
    Many(Vec<String>),
    Joined(String),
}

fn label_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawLabels>::deserialize(deserializer)?;
    let labels: Vec<String> = match raw {
        Some(RawLabels::Many(values)) => values,
        Some(RawLabels::Joined(joined)) => joined.split(';').map(str::to_string).collect(),
        None => Vec::new(),
    };
    Ok(labels
        .into_iter()
        .map(normalize_label)
        .filter(|label| !label.is_empty())
        .collect())
}
