use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, info, instrument, warn};

use crate::claim::{ClaimExtractor, Summarizer};
use crate::constants::{DEFAULT_TOP_K, MODEL_VERSION};
use crate::entities::RecognizerRegistry;
use crate::index::FactCheckIndex;
use crate::language::resolve_language;
use crate::scoring::{DegradedSignal, SignalKind, TextScorer, score_text};
use crate::verdict::aggregate;

use super::cancel::CancelToken;
use super::error::PipelineError;
use super::types::{TextInput, VerdictResult};

/// Runs the full analysis: language, claim, scores, entities, retrieval, verdict.
///
/// Built once at startup and shared; every call is independent.
pub struct Analyzer {
    extractor: ClaimExtractor,
    scorer: Arc<dyn TextScorer>,
    recognizers: Arc<RecognizerRegistry>,
    index: Arc<FactCheckIndex>,
    top_k: usize,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("extractor", &self.extractor)
            .field("recognizers", &self.recognizers)
            .field("index", &self.index)
            .field("top_k", &self.top_k)
            .finish()
    }
}

impl Analyzer {
    pub fn new(
        index: Arc<FactCheckIndex>,
        scorer: Arc<dyn TextScorer>,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            extractor: ClaimExtractor::new()?,
            scorer,
            recognizers: Arc::new(RecognizerRegistry::new()),
            index,
            top_k: DEFAULT_TOP_K,
        })
    }

    pub fn with_recognizers(mut self, recognizers: RecognizerRegistry) -> Self {
        self.recognizers = Arc::new(recognizers);
        self
    }

    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.extractor = self.extractor.with_summarizer(summarizer);
        self
    }

    /// Number of source candidates to retrieve. Values below 1 are raised to 1.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn index(&self) -> &Arc<FactCheckIndex> {
        &self.index
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub async fn analyze(&self, input: &TextInput) -> Result<VerdictResult, PipelineError> {
        self.analyze_with_cancel(input, &CancelToken::new()).await
    }

    /// Like [`analyze`](Self::analyze), stopping at the next stage boundary
    /// once `cancel` fires.
    #[instrument(skip_all, fields(chars = input.text().len(), language = input.language()))]
    pub async fn analyze_with_cancel(
        &self,
        input: &TextInput,
        cancel: &CancelToken,
    ) -> Result<VerdictResult, PipelineError> {
        let text = input.text();
        let language = resolve_language(input.language(), text);

        let claim = self.extractor.extract(text, &language).await;
        checkpoint(cancel)?;

        let (report, extraction) = {
            let scorer = self.scorer.clone();
            let recognizers = self.recognizers.clone();
            let text = text.to_string();
            let language = language.clone();
            run_blocking(move || {
                let report = score_text(scorer.as_ref(), &text, &language)?;
                let extraction = recognizers.extract(&text, &language)?;
                Ok((report, extraction))
            })
            .await?
        };
        let mut degraded = report.degraded;
        if let Some(reason) = extraction.degraded {
            degraded.push(DegradedSignal {
                signal: SignalKind::Entities,
                reason,
            });
        }
        checkpoint(cancel)?;

        let source_candidates = {
            let index = self.index.clone();
            let query = claim.claim.clone();
            let top_k = self.top_k;
            run_blocking(move || Ok(index.search(&query, top_k)?)).await?
        };
        checkpoint(cancel)?;

        let outcome = aggregate(&report.scores);

        if !degraded.is_empty() {
            warn!(
                degraded = degraded.len(),
                "Analysis completed with degraded signals"
            );
        }
        info!(
            verdict = %outcome.verdict,
            confidence = outcome.confidence,
            candidates = source_candidates.len(),
            entities = extraction.entities.len(),
            summarized = claim.summarized,
            "Analysis complete"
        );

        Ok(VerdictResult {
            claim: claim.claim,
            paraphrase: claim.paraphrase,
            entities: extraction.entities,
            scores: report.scores,
            source_candidates,
            verdict: outcome.verdict,
            explanation: outcome.explanation,
            confidence: outcome.confidence,
            language,
            source_url: input.url().map(str::to_string),
            degraded_signals: degraded,
            model_version: MODEL_VERSION.to_string(),
        })
    }

    /// Analyzes every input concurrently; model inference for each item runs
    /// on the blocking pool. Results keep input order and one failure never
    /// affects the others.
    #[instrument(skip_all, fields(count = inputs.len()))]
    pub async fn analyze_batch(
        &self,
        inputs: &[TextInput],
    ) -> Vec<Result<VerdictResult, PipelineError>> {
        let results = join_all(inputs.iter().map(|input| self.analyze(input))).await;

        let failed = results.iter().filter(|r| r.is_err()).count();
        debug!(total = results.len(), failed, "Batch analyzed");

        results
    }
}

/// Runs synchronous model work off the async executor.
async fn run_blocking<T, F>(work: F) -> Result<T, PipelineError>
where
    F: FnOnce() -> Result<T, PipelineError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| PipelineError::Worker(e.to_string()))?
}

fn checkpoint(cancel: &CancelToken) -> Result<(), PipelineError> {
    if cancel.is_cancelled() {
        debug!("Analysis cancelled between stages");
        return Err(PipelineError::Cancelled);
    }
    Ok(())
}
