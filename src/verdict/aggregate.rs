use crate::constants::{
    BIAS_WEIGHT, FACTUALITY_WEIGHT, MAX_EXPLANATION_FACTORS, SENSATIONALISM_WEIGHT,
    TOXICITY_PENALTY_THRESHOLD, TOXICITY_WEIGHT, VERDICT_MIDPOINT, VERDICT_MISLEADING_THRESHOLD,
    VERDICT_TRUE_THRESHOLD, VERDICT_UNVERIFIED_THRESHOLD,
};
use crate::scoring::ScoreSet;

use super::types::{Verdict, VerdictOutcome};

/// Buckets a weighted score. Thresholds are inclusive on the lower bound.
pub fn verdict_for(base: f64) -> Verdict {
    if base >= VERDICT_TRUE_THRESHOLD {
        Verdict::True
    } else if base >= VERDICT_MISLEADING_THRESHOLD {
        Verdict::Misleading
    } else if base >= VERDICT_UNVERIFIED_THRESHOLD {
        Verdict::Unverified
    } else {
        Verdict::False
    }
}

pub fn confidence_for(base: f64) -> f64 {
    ((base - VERDICT_MIDPOINT).abs() * 2.0).min(1.0)
}

/// Reduces a score set to a verdict, a confidence and an explanation.
///
/// Sentiment does not take part. Toxicity only counts above 0.5, and its
/// factor is always the fourth, so it never survives the three-factor cut
/// in the explanation.
pub fn aggregate(scores: &ScoreSet) -> VerdictOutcome {
    let factuality = scores.factuality;
    let bias = scores.bias;
    let sensationalism = scores.sensationalism;
    let toxicity = scores.toxicity;

    let mut factors = Vec::with_capacity(4);

    let mut base = factuality * FACTUALITY_WEIGHT;
    factors.push(format!(
        "Factuality: {:.2} (weight: {})",
        factuality, FACTUALITY_WEIGHT
    ));

    let bias_penalty = bias * BIAS_WEIGHT;
    base -= bias_penalty;
    factors.push(format!("Bias penalty: -{:.2}", bias_penalty));

    let sensationalism_penalty = sensationalism * SENSATIONALISM_WEIGHT;
    base -= sensationalism_penalty;
    factors.push(format!("Sensationalism penalty: -{:.2}", sensationalism_penalty));

    if toxicity > TOXICITY_PENALTY_THRESHOLD {
        let toxicity_penalty = toxicity * TOXICITY_WEIGHT;
        base -= toxicity_penalty;
        factors.push(format!("Toxicity penalty: -{:.2}", toxicity_penalty));
    }

    let verdict = verdict_for(base);
    factors.truncate(MAX_EXPLANATION_FACTORS);
    let explanation = format!("Verdict '{}' based on: {}", verdict, factors.join("; "));

    VerdictOutcome {
        verdict,
        explanation,
        confidence: confidence_for(base),
        base,
    }
}
