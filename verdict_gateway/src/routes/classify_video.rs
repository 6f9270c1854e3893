use crate::{server::SharedState, telemetry::Metrics};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use clip_verdict::{Pipeline, PipelineError, Verdict};
use serde::Serialize;
use std::io::Write;
use std::time::Instant;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::instrument;

// The reference deployment classifies AVI uploads; the suffix is only a
// container hint for the decoder.
const UPLOAD_SUFFIX: &str = ".avi";

#[derive(Error, Debug)]
pub enum ClassifyVideoError {
    #[error("failed to spool upload to disk: {0}")]
    Spool(std::io::Error),
    #[error("video could not be opened: {0}")]
    Unreadable(String),
    #[error("classification task failed: {0}")]
    TaskFailed(String),
}

impl IntoResponse for ClassifyVideoError {
    fn into_response(self) -> Response {
        let status = match self {
            ClassifyVideoError::Unreadable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ClassifyVideoError::Spool(_) | ClassifyVideoError::TaskFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    /// Winning label, or null when no frame could be classified.
    pub verdict: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Writes the upload into a temp file that is removed when the returned
/// handle drops, whichever way the caller exits.
fn spool_upload(video_data: &[u8]) -> Result<NamedTempFile, std::io::Error> {
    let mut spooled = tempfile::Builder::new()
        .suffix(UPLOAD_SUFFIX)
        .tempfile()?;
    spooled.write_all(video_data)?;
    spooled.flush()?;
    Ok(spooled)
}

fn verdict_response(verdict: Verdict, metrics: &Metrics) -> ClassifyResponse {
    match verdict {
        Verdict::Label(label) => {
            tracing::info!("Final prediction: {}", label.name);
            metrics.record_verdict(&label.name);
            ClassifyResponse {
                verdict: Some(label.name),
                detail: None,
            }
        }
        Verdict::NoVerdict => {
            tracing::info!("No frames were classified");
            metrics.record_verdict("none");
            ClassifyResponse {
                verdict: None,
                detail: Some("no frames could be classified, try another video".to_string()),
            }
        }
    }
}

#[instrument(skip(state, video_data))]
pub async fn classify_video(
    State(state): State<SharedState>,
    video_data: Bytes,
) -> Result<Response, ClassifyVideoError> {
    state.metrics.record_request("/classify");
    let started = Instant::now();

    let pipeline = Pipeline::new(state.classifier.clone(), &state.sampling);

    // The pipeline is blocking end to end, so it runs off the runtime.
    // The spooled file lives exactly as long as the closure: dropped
    // (and removed) on success, on error, and on panic alike.
    let verdict = tokio::task::spawn_blocking(move || {
        let spooled = spool_upload(&video_data).map_err(ClassifyVideoError::Spool)?;

        pipeline.run_file(spooled.path()).map_err(|e| match e {
            PipelineError::SourceUnreadable(msg) => ClassifyVideoError::Unreadable(msg),
        })
    })
    .await
    .map_err(|e| ClassifyVideoError::TaskFailed(e.to_string()))??;

    state
        .metrics
        .record_pipeline_duration(started.elapsed().as_millis() as u64, "/classify");

    let response = verdict_response(verdict, &state.metrics);

    Ok(Json(response).into_response())
}
