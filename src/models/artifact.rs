//! Portable inference artifact.
//!
//! A fitted [`Mlp`] frozen into an ONNX model: one `input` tensor of shape
//! `[batch_size, 2]`, one `output` tensor of shape `[batch_size, 1]`, and a
//! chain of `Gemm`/`Relu` nodes whose f32 weights live in the graph
//! initializers. The batch axis is symbolic, so any runtime can feed it any
//! number of rows.

use {
    super::onnx::{GraphProto, ModelProto, NodeProto, OperatorSetIdProto, TensorProto, ValueInfoProto},
    crate::{
        errors::{VolError, VolResult},
        models::network::Mlp,
    },
    prost::Message,
    std::{fs, path::Path},
};

pub const INPUT_TENSOR: &str = "input";
pub const OUTPUT_TENSOR: &str = "output";
pub const BATCH_AXIS: &str = "batch_size";
pub const ONNX_IR_VERSION: i64 = 8;
pub const ONNX_OPSET: i64 = 13;

#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifact {
    proto: ModelProto,
}

impl ModelArtifact {
    /// Freeze `network`. `reference_input_width` is the width of the feature
    /// rows the network was trained on and becomes the declared input arity.
    pub fn export(network: &Mlp, reference_input_width: usize) -> VolResult<Self> {
        if network.input_width() != reference_input_width || network.output_width() != 1 {
            return Err(VolError::ModelShapeMismatch {
                expected_inputs: reference_input_width,
                expected_outputs: 1,
                found_inputs: network.input_width(),
                found_outputs: network.output_width(),
            });
        }

        let last = network.layers().len().saturating_sub(1);
        let mut nodes = Vec::with_capacity(network.layers().len() * 2);
        let mut initializers = Vec::with_capacity(network.layers().len() * 2);
        let mut current = INPUT_TENSOR.to_string();

        for (idx, layer) in network.layers().iter().enumerate() {
            let weight = format!("layer{}.weight", idx);
            let bias = format!("layer{}.bias", idx);
            // iter() walks logical (row-major) order regardless of memory layout
            initializers.push(TensorProto::f32(
                &weight,
                &[layer.input_size(), layer.output_size()],
                layer.weights().iter().map(|&w| w as f32).collect(),
            ));
            initializers.push(TensorProto::f32(
                &bias,
                &[layer.output_size()],
                layer.biases().iter().map(|&b| b as f32).collect(),
            ));

            let gemm_out = if idx == last && !layer.has_relu() {
                OUTPUT_TENSOR.to_string()
            } else {
                format!("layer{}.gemm", idx)
            };
            nodes.push(NodeProto::op(
                "Gemm",
                &format!("Gemm_{}", idx),
                &[current.as_str(), weight.as_str(), bias.as_str()],
                &gemm_out,
            ));
            current = gemm_out;

            if layer.has_relu() {
                let relu_out = if idx == last {
                    OUTPUT_TENSOR.to_string()
                } else {
                    format!("layer{}.relu", idx)
                };
                nodes.push(NodeProto::op(
                    "Relu",
                    &format!("Relu_{}", idx),
                    &[current.as_str()],
                    &relu_out,
                ));
                current = relu_out;
            }
        }

        let graph = GraphProto {
            node: nodes,
            name: "ratio_vol".to_string(),
            initializer: initializers,
            input: vec![ValueInfoProto::batched_f32(
                INPUT_TENSOR,
                BATCH_AXIS,
                reference_input_width,
            )],
            output: vec![ValueInfoProto::batched_f32(
                OUTPUT_TENSOR,
                BATCH_AXIS,
                network.output_width(),
            )],
        };

        Ok(Self {
            proto: ModelProto {
                ir_version: ONNX_IR_VERSION,
                producer_name: env!("CARGO_PKG_NAME").to_string(),
                producer_version: env!("CARGO_PKG_VERSION").to_string(),
                model_version: 1,
                graph: Some(graph),
                opset_import: vec![OperatorSetIdProto {
                    domain: String::new(),
                    version: ONNX_OPSET,
                }],
            },
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> VolResult<Self> {
        let proto = ModelProto::decode(bytes).map_err(|e| VolError::ModelLoad(e.to_string()))?;
        Ok(Self { proto })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.proto.encode_to_vec()
    }

    /// Write the serialized ONNX model, creating parent directories.
    pub fn save(&self, path: &Path) -> VolResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_bytes())
            .map_err(|e| VolError::ModelExport(format!("{}: {}", path.display(), e)))?;
        log::info!("📦 Model exported to {}", path.display());
        Ok(())
    }

    pub fn read(path: &Path) -> VolResult<Self> {
        let bytes =
            fs::read(path).map_err(|e| VolError::ModelLoad(format!("{}: {}", path.display(), e)))?;
        let proto = ModelProto::decode(bytes.as_slice())
            .map_err(|e| VolError::ModelLoad(format!("{}: {}", path.display(), e)))?;
        Ok(Self { proto })
    }

    pub fn graph(&self) -> Option<&GraphProto> {
        self.proto.graph.as_ref()
    }

    /// Graph inputs fed at run time. Older exporters also list every
    /// initializer as an input; those are skipped.
    pub fn inputs(&self) -> Vec<&ValueInfoProto> {
        self.graph().map_or_else(Vec::new, |g| {
            g.input
                .iter()
                .filter(|i| !g.initializer.iter().any(|t| t.name == i.name))
                .collect()
        })
    }

    pub fn outputs(&self) -> Vec<&ValueInfoProto> {
        self.graph().map_or_else(Vec::new, |g| g.output.iter().collect())
    }

    pub fn input_width(&self) -> usize {
        self.inputs().first().map_or(0, |i| i.width())
    }

    pub fn output_width(&self) -> usize {
        self.outputs().first().map_or(0, |o| o.width())
    }

    /// The graph must declare exactly one input of `inputs` columns and one
    /// output of `outputs` columns.
    pub fn validate(&self, inputs: usize, outputs: usize) -> VolResult<()> {
        let declared_inputs = self.inputs();
        let declared_outputs = self.outputs();
        let mismatch = |found_inputs, found_outputs| VolError::ModelShapeMismatch {
            expected_inputs: inputs,
            expected_outputs: outputs,
            found_inputs,
            found_outputs,
        };

        if declared_inputs.len() != 1 || declared_outputs.len() != 1 {
            return Err(mismatch(declared_inputs.len(), declared_outputs.len()));
        }
        if self.input_width() != inputs || self.output_width() != outputs {
            return Err(mismatch(self.input_width(), self.output_width()));
        }
        Ok(())
    }
}
