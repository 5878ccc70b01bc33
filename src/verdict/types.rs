use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    True,
    Misleading,
    Unverified,
    False,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::True => "true",
            Self::Misleading => "misleading",
            Self::Unverified => "unverified",
            Self::False => "false",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of [`aggregate`](super::aggregate).
#[derive(Debug, Clone, PartialEq)]
pub struct VerdictOutcome {
    pub verdict: Verdict,
    pub explanation: String,
    /// Distance of `base` from the 0.5 midpoint, scaled to `[0, 1]`.
    pub confidence: f64,
    /// Unclamped weighted score the verdict was bucketed from.
    pub base: f64,
}
