//! Deterministic synthetic survey data for demos and tests.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::data::Respondent;

const LANGUAGES: &[&str] = &[
    "Bash/Shell/PowerShell",
    "C",
    "C#",
    "C++",
    "Go",
    "Java",
    "JavaScript",
    "Kotlin",
    "Python",
    "Rust",
    "SQL",
    "TypeScript",
];
const COUNTRIES: &[&str] = &[
    "United States",
    "Germany",
    "India",
    "United Kingdom",
    "Brazil",
    "Republic of Korea",
    "Iran",
    "Canada",
];
const GENDERS: &[&str] = &[
    "Man",
    "Woman",
    "Non-binary, genderqueer, or gender non-conforming",
];

/// Knobs for [`generate`].
#[derive(Clone, Debug)]
pub struct SyntheticSurvey {
    /// RNG seed.
    pub seed: u64,
    /// Number of respondents to generate.
    pub respondents: usize,
    /// Probability that a numeric answer is left unanswered.
    pub unanswered_rate: f64,
}

impl Default for SyntheticSurvey {
    fn default() -> Self {
        Self {
            seed: 2019,
            respondents: 500,
            unanswered_rate: 0.05,
        }
    }
}

/// Generate respondents; the same settings always produce the same dataset.
pub fn generate(settings: &SyntheticSurvey) -> Vec<Respondent> {
    let mut rng = StdRng::seed_from_u64(settings.seed);
    let rate = settings.unanswered_rate.clamp(0.0, 1.0);
    (0..settings.respondents)
        .map(|_| {
            let age = rng.gen_range(18..=70) as f64;
            let years = rng.gen_range(0..=((age as u32 - 16).min(40))) as f64;
            let compensation = (rng.gen_range(8_000..=60_000) as f64) * (1.0 + years / 10.0);
            let language_count = rng.gen_range(1..=4);
            let languages = LANGUAGES
                .choose_multiple(&mut rng, language_count)
                .map(|language| language.to_string())
                .collect();
            let mut gender = vec![GENDERS.choose(&mut rng).copied().unwrap_or("Man").to_string()];
            if rng.gen_bool(0.02) {
                gender.push(GENDERS[2].to_string());
                gender.dedup();
            }
            Respondent {
                age: (!rng.gen_bool(rate)).then_some(age),
                converted_comp: (!rng.gen_bool(rate)).then_some(compensation.round()),
                years_code_pro: (!rng.gen_bool(rate)).then_some(years),
                country: COUNTRIES
                    .choose(&mut rng)
                    .copied()
                    .unwrap_or("United States")
                    .to_string(),
                gender,
                language_worked_with: languages,
                ..Respondent::default()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_dataset() {
        let settings = SyntheticSurvey {
            respondents: 50,
            ..SyntheticSurvey::default()
        };
        assert_eq!(generate(&settings), generate(&settings));
        assert_eq!(generate(&settings).len(), 50);
    }

    #[test]
    fn fully_answered_when_rate_is_zero() {
        let settings = SyntheticSurvey {
            respondents: 40,
            unanswered_rate: 0.0,
            ..SyntheticSurvey::default()
        };
        let data = generate(&settings);
        assert!(data.iter().all(|r| r.age.is_some()
            && r.converted_comp.is_some()
            && r.years_code_pro.is_some()));
        assert!(data.iter().all(|r| !r.language_worked_with.is_empty()));
    }
}
