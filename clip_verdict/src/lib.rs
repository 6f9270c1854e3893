mod aggregator;
mod classifier;
mod label;
mod ort_classifier;
mod pipeline;
mod sampler;
mod source;

pub mod config;

pub use aggregator::majority_vote;
pub use classifier::{ClassifierError, FrameClassifier};
pub use label::{Label, LabelSet, LabelSetError, Verdict};
pub use ort_classifier::OrtClassifier;
pub use pipeline::{Pipeline, PipelineError};
pub use sampler::{FrameSampler, SampledFrame};
pub use source::{DecodeError, FrameSource, VideoFile};
