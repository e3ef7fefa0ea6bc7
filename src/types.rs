/// Label of an aggregation group (a language or a country).
/// Examples: `Rust`, `Python`, `Germany`
pub type GroupLabel = String;
/// Programming language reported under `LanguageWorkedWith`.
/// Examples: `Rust`, `Bash/Shell/PowerShell`, `C#`
pub type LanguageLabel = String;
/// Gender label reported under `Gender`.
/// Examples: `Man`, `Woman`, `Non-binary, genderqueer, or gender non-conforming`
pub type GenderLabel = String;
/// Country name as written by respondents.
/// Examples: `United States`, `Republic of Korea`, `Iran`
pub type CountryName = String;
/// Numeric geography feature id used by the boundary data.
/// Examples: `840`, `276`, `4`
pub type CountryId = String;
/// Name of a filter dimension used in error reports.
/// Examples: `age`, `compensation`
pub type FilterName = String;
