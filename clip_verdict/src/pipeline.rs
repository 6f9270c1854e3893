use crate::{
    aggregator::majority_vote,
    classifier::FrameClassifier,
    config::SamplingConfig,
    label::{Label, Verdict},
    sampler::FrameSampler,
    source::{FrameSource, VideoFile},
};
use std::num::NonZeroU32;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("video source could not be opened: {0}")]
    SourceUnreadable(String),
}

/// One sampling-classifier pipeline: sample every Nth frame, classify
/// each sample, majority-vote the results.
///
/// The classifier is caller-owned and injected; a pipeline holds no
/// other state, so each invocation is independent of every other.
pub struct Pipeline<C: FrameClassifier + ?Sized> {
    classifier: Arc<C>,
    interval: NonZeroU32,
}

impl<C: FrameClassifier + ?Sized> Pipeline<C> {
    pub fn new(classifier: Arc<C>, sampling: &SamplingConfig) -> Self {
        Self {
            classifier,
            interval: sampling.interval,
        }
    }

    /// Opens a video file and classifies it. Only an unopenable source is
    /// fatal; everything downstream degrades toward `NoVerdict`.
    pub fn run_file(&self, path: &Path) -> Result<Verdict, PipelineError> {
        let source =
            VideoFile::open(path).map_err(|e| PipelineError::SourceUnreadable(e.to_string()))?;
        Ok(self.run(source))
    }

    /// Drains an already-open source. A per-frame classification failure
    /// skips that frame; a mid-stream decode failure stops sampling and
    /// aggregates whatever was collected up to that point.
    pub fn run<S: FrameSource>(&self, source: S) -> Verdict {
        let mut sampler = FrameSampler::new(source, self.interval);
        let mut predictions: Vec<Label> = Vec::new();

        loop {
            match sampler.next_sample() {
                Ok(Some(frame)) => match self.classifier.classify(&frame.image_data) {
                    Ok(label) => predictions.push(label),
                    Err(e) => {
                        tracing::warn!(
                            "classification failed for frame {}, skipping it: {}",
                            frame.ordinal,
                            e
                        );
                    }
                },
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(
                        "decode interrupted, aggregating the {} frames classified so far: {}",
                        predictions.len(),
                        e
                    );
                    break;
                }
            }
        }

        majority_vote(&predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierError;
    use crate::label::LabelSet;
    use crate::source::DecodeError;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn labels() -> LabelSet {
        LabelSet::new(vec![
            "Normal".to_string(),
            "Violence".to_string(),
            "Weaponized".to_string(),
        ])
        .unwrap()
    }

    /// Source whose frames each carry the class index the mock classifier
    /// should report for them.
    struct ScriptedSource {
        classes: Vec<u8>,
        fail_at: Option<usize>,
        cursor: usize,
    }

    impl ScriptedSource {
        fn new(classes: &[u8]) -> Self {
            Self {
                classes: classes.to_vec(),
                fail_at: None,
                cursor: 0,
            }
        }
    }

    impl FrameSource for ScriptedSource {
        fn next_frame(&mut self) -> Result<Option<Vec<u8>>, DecodeError> {
            if Some(self.cursor) == self.fail_at {
                return Err(DecodeError::Unreadable("scripted failure".to_string()));
            }
            match self.classes.get(self.cursor) {
                Some(&class) => {
                    self.cursor += 1;
                    Ok(Some(vec![class]))
                }
                None => Ok(None),
            }
        }
    }

    /// Classifier that reads the class index straight out of the frame
    /// payload, optionally failing on marked frames.
    struct MockClassifier {
        labels: LabelSet,
        fail_on: Option<u8>,
    }

    impl MockClassifier {
        fn new() -> Self {
            Self {
                labels: labels(),
                fail_on: None,
            }
        }
    }

    impl FrameClassifier for MockClassifier {
        fn classify(&self, image_data: &[u8]) -> Result<Label, ClassifierError> {
            let class = image_data[0];
            if Some(class) == self.fail_on {
                return Err(ClassifierError::Inference("scripted failure".to_string()));
            }
            Ok(self.labels.get(class as usize).unwrap().clone())
        }
    }

    fn pipeline(interval: u32) -> Pipeline<MockClassifier> {
        let sampling = SamplingConfig {
            interval: NonZeroU32::new(interval).unwrap(),
        };
        Pipeline::new(Arc::new(MockClassifier::new()), &sampling)
    }

    #[test]
    fn majority_label_wins() {
        // Sampled ordinals 0, 2, 4 with interval 2: Normal, Normal, Violence.
        let verdict = pipeline(2).run(ScriptedSource::new(&[0, 2, 0, 2, 1]));
        assert_eq!(verdict, Verdict::Label(labels().get(0).unwrap().clone()));
    }

    #[test]
    fn empty_video_is_no_verdict() {
        let verdict = pipeline(10).run(ScriptedSource::new(&[]));
        assert_eq!(verdict, Verdict::NoVerdict);
    }

    #[test]
    fn failed_frames_are_skipped_not_fatal() {
        let mut classifier = MockClassifier::new();
        classifier.fail_on = Some(1);
        let sampling = SamplingConfig {
            interval: NonZeroU32::new(1).unwrap(),
        };
        let pipeline = Pipeline::new(Arc::new(classifier), &sampling);

        // Violence frames fail classification and drop out, leaving
        // Weaponized the plurality.
        let verdict = pipeline.run(ScriptedSource::new(&[1, 2, 1, 2, 0]));
        assert_eq!(verdict, Verdict::Label(labels().get(2).unwrap().clone()));
    }

    #[test]
    fn all_frames_failing_degrades_to_no_verdict() {
        let mut classifier = MockClassifier::new();
        classifier.fail_on = Some(1);
        let sampling = SamplingConfig {
            interval: NonZeroU32::new(1).unwrap(),
        };
        let pipeline = Pipeline::new(Arc::new(classifier), &sampling);

        let verdict = pipeline.run(ScriptedSource::new(&[1, 1, 1]));
        assert_eq!(verdict, Verdict::NoVerdict);
    }

    #[test]
    fn decode_interruption_keeps_earlier_predictions() {
        // 30 frames, interval 10, decode fails at ordinal 13: only
        // ordinals 0 and 10 are classified.
        let mut source = ScriptedSource::new(&[1; 30]);
        source.classes[0] = 2;
        source.classes[10] = 2;
        source.fail_at = Some(13);

        let verdict = pipeline(10).run(source);
        assert_eq!(verdict, Verdict::Label(labels().get(2).unwrap().clone()));
    }

    #[test]
    fn predictions_follow_sampled_order_for_tie_break() {
        // Interval 1, sequence [Violence, Weaponized]: a tie broken by
        // first occurrence, so sampling order decides.
        let verdict = pipeline(1).run(ScriptedSource::new(&[1, 2]));
        assert_eq!(verdict, Verdict::Label(labels().get(1).unwrap().clone()));
    }

    #[test]
    fn unreadable_path_is_fatal() {
        let pipeline = pipeline(10);
        let result = pipeline.run_file(Path::new("/nonexistent/clip.avi"));
        assert!(matches!(result, Err(PipelineError::SourceUnreadable(_))));
    }

    /// Source wrapper that records when it is dropped, so tests can
    /// assert the decode handle is released on a given exit path.
    struct DropProbeSource {
        inner: ScriptedSource,
        released: Arc<AtomicBool>,
    }

    impl FrameSource for DropProbeSource {
        fn next_frame(&mut self) -> Result<Option<Vec<u8>>, DecodeError> {
            self.inner.next_frame()
        }
    }

    impl Drop for DropProbeSource {
        fn drop(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    fn released_after_run(source: ScriptedSource, classifier: MockClassifier) -> bool {
        let released = Arc::new(AtomicBool::new(false));
        let probe = DropProbeSource {
            inner: source,
            released: released.clone(),
        };
        let sampling = SamplingConfig {
            interval: NonZeroU32::new(1).unwrap(),
        };
        let _ = Pipeline::new(Arc::new(classifier), &sampling).run(probe);
        released.load(Ordering::SeqCst)
    }

    #[test]
    fn source_is_released_after_normal_completion() {
        let source = ScriptedSource::new(&[0, 1, 2]);
        assert!(released_after_run(source, MockClassifier::new()));
    }

    #[test]
    fn source_is_released_after_decode_interruption() {
        let mut source = ScriptedSource::new(&[0, 1, 2]);
        source.fail_at = Some(1);
        assert!(released_after_run(source, MockClassifier::new()));
    }

    #[test]
    fn source_is_released_when_every_frame_fails() {
        let mut classifier = MockClassifier::new();
        classifier.fail_on = Some(1);
        assert!(released_after_run(ScriptedSource::new(&[1, 1, 1]), classifier));
    }
}
