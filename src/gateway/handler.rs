use axum::{
    Json,
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::gateway::error::GatewayError;
use crate::gateway::state::AppState;
use crate::index::SourceMetadata;
use crate::pipeline::{TextInput, VerdictResult};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

impl AnalyzeRequest {
    fn into_input(self) -> Result<TextInput, GatewayError> {
        let mut input = TextInput::new(self.text)?;
        if let Some(url) = self.url.filter(|u| !u.trim().is_empty()) {
            input = input.with_url(url);
        }
        if let Some(language) = self.language {
            input = input.with_language(language);
        }
        Ok(input)
    }
}

#[derive(Debug, Deserialize)]
pub struct BatchAnalyzeRequest {
    pub items: Vec<AnalyzeRequest>,
}

#[derive(Debug, Serialize)]
pub struct BatchItem {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<VerdictResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItem {
    fn from_result(result: Result<VerdictResult, GatewayError>) -> Self {
        match result {
            Ok(data) => Self {
                success: true,
                data: Some(data),
                error: None,
            },
            Err(e) => Self {
                success: false,
                data: None,
                error: Some(e.to_string()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchAnalyzeResponse {
    pub results: Vec<BatchItem>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct IndexRequest {
    pub texts: Vec<String>,
    pub sources: Vec<SourceMetadata>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IndexResponse {
    pub inserted: usize,
    pub total: usize,
}

fn parse_body<T: serde::de::DeserializeOwned>(body: serde_json::Value) -> Result<T, GatewayError> {
    serde_json::from_value(body)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request schema: {}", e)))
}

fn with_request_id(mut response: Response) -> Response {
    let id = uuid::Uuid::new_v4();
    tracing::Span::current().record("request_id", tracing::field::display(&id));
    if let Ok(value) = HeaderValue::from_str(&id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[instrument(skip_all, fields(request_id = tracing::field::Empty))]
pub async fn analyze_handler(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, GatewayError> {
    let request: AnalyzeRequest = parse_body(body)?;
    let input = request.into_input()?;

    let result = state.analyzer.analyze(&input).await?;
    debug!(verdict = %result.verdict, "Analyze request served");

    Ok(with_request_id((StatusCode::OK, Json(result)).into_response()))
}

#[instrument(skip_all, fields(request_id = tracing::field::Empty, items = tracing::field::Empty))]
pub async fn analyze_batch_handler(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, GatewayError> {
    let request: BatchAnalyzeRequest = parse_body(body)?;
    tracing::Span::current().record("items", request.items.len());

    // Invalid items fail in place; only the valid ones reach the analyzer.
    let mut prepared = Vec::with_capacity(request.items.len());
    let mut inputs = Vec::new();
    for item in request.items {
        match item.into_input() {
            Ok(input) => {
                prepared.push(Ok(inputs.len()));
                inputs.push(input);
            }
            Err(e) => prepared.push(Err(e)),
        }
    }

    let mut analyzed: Vec<Option<Result<VerdictResult, GatewayError>>> = state
        .analyzer
        .analyze_batch(&inputs)
        .await
        .into_iter()
        .map(|r| Some(r.map_err(GatewayError::from)))
        .collect();

    let results: Vec<BatchItem> = prepared
        .into_iter()
        .map(|slot| {
            let result = match slot {
                Ok(i) => analyzed[i].take().unwrap_or_else(|| {
                    Err(GatewayError::Internal("missing batch result".to_string()))
                }),
                Err(e) => Err(e),
            };
            BatchItem::from_result(result)
        })
        .collect();

    let failed = results.iter().filter(|r| !r.success).count();
    info!(total = results.len(), failed, "Batch request served");

    let total = results.len();
    Ok(with_request_id(
        (StatusCode::OK, Json(BatchAnalyzeResponse { results, total })).into_response(),
    ))
}

#[instrument(skip_all, fields(request_id = tracing::field::Empty))]
pub async fn index_handler(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, GatewayError> {
    let request: IndexRequest = parse_body(body)?;
    let inserted = request.texts.len();
    let texts: Vec<&str> = request.texts.iter().map(String::as_str).collect();

    let total = state.index().insert(&texts, request.sources)?;
    info!(inserted, total, "Fact-check entries indexed");

    Ok(with_request_id(
        (StatusCode::OK, Json(IndexResponse { inserted, total })).into_response(),
    ))
}
