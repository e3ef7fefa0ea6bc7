//! Country reference data for the choropleth join.
//!
//! Boundary features carry numeric ids; the name table turns ids into
//! country names and the alias table turns those names into the spelling
//! survey respondents used.

use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use indexmap::IndexMap;

use crate::data::CountryName;
use crate::errors::SurveyError;
use crate::types::CountryId;

/// Boundary-data country names mapped to the survey's spelling.
///
/// Kept exactly as shipped with the slideshow, including the repeated Congo
/// key (the later entry wins) and the Mauritania entry.
pub const COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("Bolivia (Plurinational State of)", "Bolivia"),
    ("Congo (Democratic Republic of the)", "Congo, Republic of the..."),
    (
        "Korea (Democratic People's Republic of)",
        "Democratic People's Republic of Korea",
    ),
    (
        "Congo (Democratic Republic of the)",
        "Democratic Republic of the Congo",
    ),
    ("Iran (Islamic Republic of)", "Iran"),
    ("Libya", "Libyan Arab Jamahiriya"),
    ("Mauritania", "Mauritius"),
    ("Korea (Republic of)", "Republic of Korea"),
    ("Moldova (Republic of)", "Republic of Moldova"),
    ("Taiwan, Province of China", "Taiwan"),
    (
        "Macedonia (the former Yugoslav Republic of)",
        "The former Yugoslav Republic of Macedonia",
    ),
    (
        "United Kingdom of Great Britain and Northern Ireland",
        "United Kingdom",
    ),
    ("Tanzania, United Republic of", "United Republic of Tanzania"),
    ("United States of America", "United States"),
    (
        "Venezuela (Bolivarian Republic of)",
        "Venezuela, Bolivarian Republic of...",
    ),
];

/// Lookup from boundary-data names to survey names.
#[derive(Clone, Debug)]
pub struct CountryAliases {
    aliases: HashMap<&'static str, &'static str>,
}

impl Default for CountryAliases {
    fn default() -> Self {
        // Later duplicates overwrite earlier ones on insert.
        Self {
            aliases: COUNTRY_ALIASES.iter().copied().collect(),
        }
    }
}

impl CountryAliases {
    /// Survey spelling for `name`, or `name` itself when no alias exists.
    pub fn survey_name<'a>(&self, name: &'a str) -> &'a str {
        match self.aliases.get(name) {
            Some(alias) => *alias,
            None => name,
        }
    }
}

/// Country id → name table for the boundary data.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CountryNames {
    names: IndexMap<CountryId, CountryName>,
}

impl CountryNames {
    /// Build a table from `(id, name)` pairs, keeping their order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<CountryId>,
        V: Into<CountryName>,
    {
        Self {
            names: pairs
                .into_iter()
                .map(|(id, name)| (id.into(), name.into()))
                .collect(),
        }
    }

    /// Parse a JSON object of `{"id": "name"}` entries.
    pub fn from_json_reader(reader: impl Read) -> Result<Self, SurveyError> {
        let names: IndexMap<CountryId, CountryName> = serde_json::from_reader(reader)?;
        Ok(Self { names })
    }

    /// Parse `id,name` lines with an optional header row.
    ///
    /// Names may be wrapped in double quotes so they can contain commas.
    pub fn from_id_name_lines(text: &str) -> Result<Self, SurveyError> {
        let mut names = IndexMap::new();
        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || (line_no == 0 && line.eq_ignore_ascii_case("id,name")) {
                continue;
            }
            let Some((id, name)) = line.split_once(',') else {
                return Err(SurveyError::Configuration(format!(
                    "country name line {} has no ',' separator",
                    line_no + 1
                )));
            };
            names.insert(id.trim().to_string(), unquote(name.trim()));
        }
        Ok(Self { names })
    }

    /// Load a table from disk, choosing the parser by file extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SurveyError> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_reader(fs::File::open(path)?)
        } else {
            Self::from_id_name_lines(&fs::read_to_string(path)?)
        }
    }

    /// Name for feature `id`, if known.
    pub fn name(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Number of ids in the table.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn unquote(raw: &str) -> String {
    match raw.strip_prefix('"').and_then(|inner| inner.strip_suffix('"')) {
        Some(inner) => inner.replace("\"\"", "\""),
        None => raw.to_string(),
    }
}
