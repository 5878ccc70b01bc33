use regex::Regex;

use super::error::ClaimError;

/// Whole-word substitutions, applied in order.
const RULES: &[(&str, &str)] = &[(r"\bis\b", "appears to be"), (r"\bhas\b", "reportedly has")];

/// Lexical paraphraser used to diversify retrieval queries.
#[derive(Debug, Clone)]
pub struct Paraphraser {
    rules: Vec<(Regex, &'static str)>,
}

impl Paraphraser {
    pub fn new() -> Result<Self, ClaimError> {
        let rules = RULES
            .iter()
            .map(|&(pattern, replacement)| -> Result<_, ClaimError> {
                Ok((Regex::new(pattern)?, replacement))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Replaces the whole words `is` and `has`; matching is case-sensitive.
    pub fn paraphrase(&self, claim: &str, _language: &str) -> String {
        self.rules
            .iter()
            .fold(claim.to_string(), |text, (re, replacement)| {
                re.replace_all(&text, *replacement).into_owned()
            })
    }
}
