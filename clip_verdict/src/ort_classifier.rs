use crate::{
    classifier::{ClassifierError, FrameClassifier},
    config::ModelConfig,
    label::{Label, LabelSet},
};
use image::{imageops::FilterType, GenericImageView};
use ndarray::{Array, Ix4};
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::TensorRef,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

fn image_to_tensor(image_data: &[u8], side: u32) -> Result<Array<f32, Ix4>, ClassifierError> {
    let reader = image::ImageReader::new(std::io::Cursor::new(image_data))
        .with_guessed_format()
        .map_err(|e| ClassifierError::ImageDecode(e.to_string()))?;

    let img = reader
        .decode()
        .map_err(|e| ClassifierError::ImageDecode(e.to_string()))?;

    let img = img.resize_exact(side, side, FilterType::CatmullRom);
    let side = side as usize;

    let mut input = Array::zeros((1, 3, side, side));
    for pixel in img.pixels() {
        let x = pixel.0 as usize;
        let y = pixel.1 as usize;
        let [r, g, b, _] = pixel.2 .0;
        input[[0, 0, y, x]] = (r as f32) / 255.;
        input[[0, 1, y, x]] = (g as f32) / 255.;
        input[[0, 2, y, x]] = (b as f32) / 255.;
    }

    Ok(input)
}

/// ONNX Runtime implementation of the classification capability.
///
/// Owns a small pool of sessions handed out round-robin, so one loaded
/// model can serve any number of pipeline invocations. The caller builds
/// it once at startup and injects it wherever a pipeline is run.
pub struct OrtClassifier {
    sessions: Vec<Mutex<Session>>,
    counter: AtomicUsize,
    labels: LabelSet,
    input_size: u32,
}

impl OrtClassifier {
    pub fn new(model_config: &ModelConfig, labels: LabelSet) -> Result<Self, ClassifierError> {
        ort::init()
            .commit()
            .map_err(|e| ClassifierError::Init(e.to_string()))?;

        let sessions = (0..model_config.num_instances)
            .map(|_| {
                let session = Session::builder()?
                    .with_optimization_level(GraphOptimizationLevel::Level3)?
                    .commit_from_file(model_config.get_path())?;
                Ok(Mutex::new(session))
            })
            .collect::<Result<Vec<_>, ort::Error>>()
            .map_err(|e| ClassifierError::Init(e.to_string()))?;

        tracing::info!("Created {} ONNX sessions", sessions.len());

        Ok(Self {
            sessions,
            counter: AtomicUsize::new(0),
            labels,
            input_size: model_config.input_size,
        })
    }

    /// Runs one forward pass and returns the class-probability row.
    fn run_inference(&self, input: &Array<f32, Ix4>) -> Result<Vec<f32>, ClassifierError> {
        let index = self.counter.fetch_add(1, Ordering::SeqCst) % self.sessions.len();
        let mut session = self.sessions[index]
            .lock()
            .map_err(|e| ClassifierError::Inference(format!("session mutex poisoned: {}", e)))?;

        tracing::debug!("Handling frame with session {}", index);

        let tensor_ref = TensorRef::from_array_view(input.view())
            .map_err(|e| ClassifierError::Inference(format!("failed to build tensor: {}", e)))?;

        let outputs = session
            .run(ort::inputs![tensor_ref])
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let (shape, data) = outputs["output0"]
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Inference(format!("failed to extract tensor: {}", e)))?;

        let num_classes = shape
            .last()
            .copied()
            .filter(|&n| n > 0)
            .ok_or_else(|| ClassifierError::MalformedOutput(format!("output shape {:?}", shape)))?
            as usize;
        if data.len() != num_classes {
            return Err(ClassifierError::MalformedOutput(format!(
                "expected a single row of {} probabilities, got {} values",
                num_classes,
                data.len()
            )));
        }

        Ok(data.to_vec())
    }
}

impl FrameClassifier for OrtClassifier {
    fn classify(&self, image_data: &[u8]) -> Result<Label, ClassifierError> {
        let input = image_to_tensor(image_data, self.input_size)?;
        let probs = self.run_inference(&input)?;

        if probs.len() != self.labels.len() {
            return Err(ClassifierError::LabelCountMismatch {
                model: probs.len(),
                configured: self.labels.len(),
            });
        }

        let (top1, _) = probs
            .iter()
            .copied()
            .enumerate()
            .reduce(|accum, row| if row.1 > accum.1 { row } else { accum })
            .ok_or_else(|| ClassifierError::MalformedOutput("empty output row".to_string()))?;

        // In-range by the mismatch check above.
        self.labels
            .get(top1)
            .cloned()
            .ok_or_else(|| ClassifierError::MalformedOutput(format!("class index {}", top1)))
    }
}
