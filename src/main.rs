//! Satya HTTP server entrypoint.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use satya::claim::GenAiSummarizer;
use satya::config::Config;
use satya::embedding::{EncoderConfig, SentenceEncoder};
use satya::entities::{BertEntityRecognizer, EntityRecognizer, RecognizerRegistry};
use satya::gateway::{AppState, create_router_with_state};
use satya::index::FactCheckIndex;
use satya::pipeline::Analyzer;
use satya::scoring::{BertTextClassifier, ClassifierConfig, ModelScorer, TextClassifier};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        version = satya::constants::MODEL_VERSION,
        "Satya starting"
    );

    let encoder_config = if let Some(path) = &config.embedding_model_path {
        EncoderConfig::new(path.clone())
    } else {
        tracing::warn!("No SATYA_EMBEDDING_MODEL_PATH configured, running embedder in stub mode");
        EncoderConfig::stub()
    };
    let embedder = Arc::new(SentenceEncoder::load(encoder_config)?);

    let index = Arc::new(FactCheckIndex::new(embedder, config.index_metric));
    if let Some(path) = &config.index_snapshot_path {
        if path.exists() {
            index.load_snapshot(path)?;
        } else {
            tracing::info!(path = %path.display(), "No index snapshot yet, starting empty");
        }
    }

    let scorer = build_scorer(&config)?;
    let recognizers = build_recognizers(&config)?;

    let mut analyzer = Analyzer::new(index.clone(), Arc::new(scorer))?
        .with_recognizers(recognizers)
        .with_top_k(config.top_k);
    if let Some(model) = &config.summarizer_model {
        tracing::info!(model = %model, "Abstractive summarization enabled");
        analyzer = analyzer.with_summarizer(Arc::new(GenAiSummarizer::new(model.clone())));
    }

    if config.api_key.is_none() {
        tracing::warn!("No SATYA_API_KEY configured, every /api request will be rejected");
    }
    let state = AppState::new(Arc::new(analyzer), config.api_key.as_deref());
    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(index, config.index_snapshot_path.clone()))
        .await?;

    tracing::info!("Satya shutdown complete");
    Ok(())
}

fn load_classifier(
    name: &str,
    path: Option<&PathBuf>,
) -> anyhow::Result<Option<Arc<dyn TextClassifier>>> {
    match path {
        Some(path) => {
            let classifier = BertTextClassifier::load(name, ClassifierConfig::new(path.clone()))?;
            Ok(Some(Arc::new(classifier)))
        }
        None => {
            tracing::warn!(classifier = name, "No model configured, signal will degrade");
            Ok(None)
        }
    }
}

fn build_scorer(config: &Config) -> anyhow::Result<ModelScorer> {
    let mut scorer = ModelScorer::new();
    if let Some(c) = load_classifier("sentiment", config.sentiment_model_path.as_ref())? {
        scorer = scorer.with_sentiment(c);
    }
    if let Some(c) = load_classifier("bias", config.bias_model_path.as_ref())? {
        scorer = scorer.with_bias(c);
    }
    if let Some(c) = load_classifier("toxicity", config.toxicity_model_path.as_ref())? {
        scorer = scorer.with_toxicity(c);
    }
    Ok(scorer)
}

fn build_recognizers(config: &Config) -> anyhow::Result<RecognizerRegistry> {
    let english: Option<Arc<dyn EntityRecognizer>> = match &config.ner_model_path {
        Some(path) => Some(Arc::new(BertEntityRecognizer::load(path)?)),
        None => None,
    };
    let multilingual: Option<Arc<dyn EntityRecognizer>> =
        match &config.ner_multilingual_model_path {
            Some(path) => Some(Arc::new(BertEntityRecognizer::load(path)?)),
            None => None,
        };

    match (&english, &multilingual) {
        (None, None) => {
            tracing::warn!("No NER model configured, entity extraction will degrade");
        }
        (Some(_), None) => {
            tracing::info!("No multilingual NER model, English model serves all languages");
        }
        _ => {}
    }

    Ok(RecognizerRegistry::from_models(english, multilingual))
}

fn run_health_check() -> i32 {
    let port = std::env::var("SATYA_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(Config::default().port);

    let url = format!("http://127.0.0.1:{}/health", port);

    let Ok(rt) = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    else {
        return 1;
    };

    rt.block_on(async {
        let Ok(client) = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
        else {
            return 1;
        };

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal(index: Arc<FactCheckIndex>, snapshot_path: Option<PathBuf>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }

    if let Some(path) = snapshot_path {
        tracing::info!(path = %path.display(), "Saving index snapshot...");
        if let Err(e) = index.save_snapshot(&path) {
            tracing::error!("Failed to save index snapshot: {}", e);
        }
    }
}
