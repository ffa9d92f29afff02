use {
    crate::{
        analysis::FeatureVector,
        config::FEATURES,
        errors::{VolError, VolResult},
        models::artifact::ModelArtifact,
    },
    ort::{session::Session, value::Tensor},
    std::{fmt, path::Path, sync::Mutex},
};

fn load_error(e: impl fmt::Display) -> VolError {
    VolError::ModelLoad(e.to_string())
}

fn inference_error(e: impl fmt::Display) -> VolError {
    VolError::Inference(e.to_string())
}

/// ONNX model served through ONNX Runtime.
///
/// `Session::run` needs exclusive access, so concurrent predictions
/// serialise on the mutex.
pub struct FrozenModel {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    input_width: usize,
}

impl fmt::Debug for FrozenModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrozenModel")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("input_width", &self.input_width)
            .finish_non_exhaustive()
    }
}

impl FrozenModel {
    pub fn load(path: &Path) -> VolResult<Self> {
        let artifact = ModelArtifact::read(path)?;
        let model = Self::from_artifact(&artifact)
            .map_err(|e| match e {
                VolError::ModelLoad(reason) => {
                    VolError::ModelLoad(format!("{}: {}", path.display(), reason))
                }
                other => other,
            })?;
        log::info!(
            "Loaded ONNX model from {} ({} -> {})",
            path.display(),
            model.input_name,
            model.output_name
        );
        Ok(model)
    }

    /// Arity is checked twice: on the declared graph shapes, then on what the
    /// runtime actually exposes.
    pub fn from_artifact(artifact: &ModelArtifact) -> VolResult<Self> {
        artifact.validate(FEATURES.width, 1)?;

        let session = Session::builder()
            .map_err(load_error)?
            .with_intra_threads(1)
            .map_err(load_error)?
            .commit_from_memory(&artifact.to_bytes())
            .map_err(load_error)?;

        if session.inputs.len() != 1 || session.outputs.len() != 1 {
            return Err(VolError::ModelShapeMismatch {
                expected_inputs: FEATURES.width,
                expected_outputs: 1,
                found_inputs: session.inputs.len(),
                found_outputs: session.outputs.len(),
            });
        }
        let input_name = session.inputs[0].name.clone();
        let output_name = session.outputs[0].name.clone();

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            input_width: artifact.input_width(),
        })
    }

    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    pub fn predict_batch(&self, rows: &[FeatureVector]) -> VolResult<Vec<f64>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let flat: Vec<f32> = rows
            .iter()
            .flat_map(|f| f.to_array())
            .map(|v| v as f32)
            .collect();
        let input = Tensor::from_array(([rows.len(), self.input_width], flat))
            .map_err(inference_error)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| VolError::Inference("session lock poisoned".to_string()))?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input])
            .map_err(inference_error)?;
        let output = outputs.get(self.output_name.as_str()).ok_or_else(|| {
            VolError::Inference(format!("graph produced no `{}`", self.output_name))
        })?;
        let (_, values) = output.try_extract_tensor::<f32>().map_err(inference_error)?;

        if values.len() != rows.len() {
            return Err(VolError::Inference(format!(
                "expected {} forecasts, got {}",
                rows.len(),
                values.len()
            )));
        }
        let forecasts: Vec<f64> = values.iter().map(|&v| v as f64).collect();
        Ok(forecasts)
    }

    pub fn predict(&self, features: &FeatureVector) -> VolResult<f64> {
        self.predict_batch(std::slice::from_ref(features))?
            .first()
            .copied()
            .ok_or_else(|| VolError::Inference("graph produced an empty output".to_string()))
    }
}
