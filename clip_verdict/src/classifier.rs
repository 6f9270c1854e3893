use crate::label::Label;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("failed to initialize model session: {0}")]
    Init(String),
    #[error("failed to decode image: {0}")]
    ImageDecode(String),
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("model predicts {model} classes but {configured} labels are configured")]
    LabelCountMismatch { model: usize, configured: usize },
    #[error("model output is malformed: {0}")]
    MalformedOutput(String),
}

/// The external classification capability: one label from the closed set
/// per frame, synchronously, with no temporal state between calls.
pub trait FrameClassifier: Send + Sync + 'static {
    fn classify(&self, image_data: &[u8]) -> Result<Label, ClassifierError>;
}
