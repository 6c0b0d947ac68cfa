use serde::Serialize;
use serde_json::Value;

use super::{CommandSpec, LoadingObserver, NoParams, ServiceContext};
use crate::envelope::Envelope;
use crate::error::ServiceError;
use crate::models::ExtractedWord;
use crate::poller::BatchProgressPoller;
use crate::progress::BatchAnalysisProgress;

pub const GET_PROGRESS_COMMAND: &str = "get_batch_analysis_progress";
pub const CANCEL_COMMAND: &str = "cancel_batch_analysis";

const EXTRACT: CommandSpec = CommandSpec::new("extract_words_from_text")
    .require(&["text"])
    .rename(&[("minLength", "min_length"), ("maxWords", "max_words")]);
const ANALYZE: CommandSpec = CommandSpec::new("analyze_extracted_words")
    .require(&["words"])
    .rename(&[("bookId", "book_id"), ("batchSize", "batch_size")]);
const GET_PROGRESS: CommandSpec = CommandSpec::new(GET_PROGRESS_COMMAND);
const CANCEL: CommandSpec = CommandSpec::new(CANCEL_COMMAND);

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_words: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub words: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,
}

/// AI word extraction and batch analysis.
#[derive(Debug, Clone)]
pub struct WordAnalysisService {
    ctx: ServiceContext,
}

impl WordAnalysisService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub fn with_loading(&self, observer: LoadingObserver) -> Self {
        Self::new(self.ctx.with_loading(observer))
    }

    pub async fn extract_words_from_text(
        &self,
        request: &ExtractionRequest,
    ) -> Envelope<Vec<ExtractedWord>> {
        self.ctx
            .execute(async {
                if request.text.trim().is_empty() {
                    return Err(ServiceError::MissingField("text".into()));
                }
                self.ctx.call(&EXTRACT, request).await
            })
            .await
    }

    /// Kick off the backend batch job. Track it with [`WordAnalysisService::poller`].
    pub async fn analyze_extracted_words(&self, request: &AnalysisRequest) -> Envelope<Value> {
        self.ctx
            .execute(async {
                if request.words.is_empty() {
                    return Err(ServiceError::MissingField("words".into()));
                }
                if request.batch_size == Some(0) {
                    return Err(ServiceError::out_of_range("batchSize", "must be at least 1"));
                }
                self.ctx.call(&ANALYZE, request).await
            })
            .await
    }

    pub async fn get_batch_analysis_progress(&self) -> Envelope<BatchAnalysisProgress> {
        self.ctx.dispatch(&GET_PROGRESS, &NoParams {}).await
    }

    pub async fn cancel_batch_analysis(&self) -> Envelope<Value> {
        self.ctx.dispatch(&CANCEL, &NoParams {}).await
    }

    /// New poller bound to this service's client.
    pub fn poller(&self) -> BatchProgressPoller {
        BatchProgressPoller::new(self.ctx.client().clone())
    }
}
