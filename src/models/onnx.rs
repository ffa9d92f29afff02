//! Subset of the ONNX protobuf schema (`onnx.proto`, IR v8).
//!
//! Only the messages and fields a dense feed-forward graph needs are
//! declared. Tags match the upstream schema, so files written here open in
//! any ONNX runtime and files from other exporters decode with their
//! unknown fields skipped. Upstream `oneof`s are flattened into optional
//! fields, which is wire-identical.

use prost::Message;

/// `TensorProto.DataType.FLOAT`
pub const DATA_TYPE_FLOAT: i32 = 1;

#[derive(Clone, PartialEq, Message)]
pub struct ModelProto {
    #[prost(int64, tag = "1")]
    pub ir_version: i64,
    #[prost(string, tag = "2")]
    pub producer_name: String,
    #[prost(string, tag = "3")]
    pub producer_version: String,
    #[prost(int64, tag = "5")]
    pub model_version: i64,
    #[prost(message, optional, tag = "7")]
    pub graph: Option<GraphProto>,
    #[prost(message, repeated, tag = "8")]
    pub opset_import: Vec<OperatorSetIdProto>,
}

#[derive(Clone, PartialEq, Message)]
pub struct OperatorSetIdProto {
    /// Empty string is the default `ai.onnx` domain
    #[prost(string, tag = "1")]
    pub domain: String,
    #[prost(int64, tag = "2")]
    pub version: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct GraphProto {
    #[prost(message, repeated, tag = "1")]
    pub node: Vec<NodeProto>,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(message, repeated, tag = "5")]
    pub initializer: Vec<TensorProto>,
    #[prost(message, repeated, tag = "11")]
    pub input: Vec<ValueInfoProto>,
    #[prost(message, repeated, tag = "12")]
    pub output: Vec<ValueInfoProto>,
}

#[derive(Clone, PartialEq, Message)]
pub struct NodeProto {
    #[prost(string, repeated, tag = "1")]
    pub input: Vec<String>,
    #[prost(string, repeated, tag = "2")]
    pub output: Vec<String>,
    #[prost(string, tag = "3")]
    pub name: String,
    #[prost(string, tag = "4")]
    pub op_type: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct TensorProto {
    #[prost(int64, repeated, tag = "1")]
    pub dims: Vec<i64>,
    #[prost(int32, tag = "2")]
    pub data_type: i32,
    #[prost(float, repeated, tag = "4")]
    pub float_data: Vec<f32>,
    #[prost(string, tag = "8")]
    pub name: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct ValueInfoProto {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub r#type: Option<TypeProto>,
}

#[derive(Clone, PartialEq, Message)]
pub struct TypeProto {
    #[prost(message, optional, tag = "1")]
    pub tensor_type: Option<TensorTypeProto>,
}

#[derive(Clone, PartialEq, Message)]
pub struct TensorTypeProto {
    #[prost(int32, tag = "1")]
    pub elem_type: i32,
    #[prost(message, optional, tag = "2")]
    pub shape: Option<TensorShapeProto>,
}

#[derive(Clone, PartialEq, Message)]
pub struct TensorShapeProto {
    #[prost(message, repeated, tag = "1")]
    pub dim: Vec<Dimension>,
}

/// Either a fixed size or a symbolic (dynamic) name.
#[derive(Clone, PartialEq, Message)]
pub struct Dimension {
    #[prost(int64, optional, tag = "1")]
    pub dim_value: Option<i64>,
    #[prost(string, optional, tag = "2")]
    pub dim_param: Option<String>,
}

impl Dimension {
    pub fn fixed(size: usize) -> Self {
        Self {
            dim_value: Some(size as i64),
            dim_param: None,
        }
    }

    pub fn dynamic(name: &str) -> Self {
        Self {
            dim_value: None,
            dim_param: Some(name.to_string()),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        self.dim_value.is_none()
    }
}

impl ValueInfoProto {
    /// f32 tensor of shape `[batch, width]` with a symbolic batch axis.
    pub fn batched_f32(name: &str, batch_axis: &str, width: usize) -> Self {
        Self {
            name: name.to_string(),
            r#type: Some(TypeProto {
                tensor_type: Some(TensorTypeProto {
                    elem_type: DATA_TYPE_FLOAT,
                    shape: Some(TensorShapeProto {
                        dim: vec![Dimension::dynamic(batch_axis), Dimension::fixed(width)],
                    }),
                }),
            }),
        }
    }

    pub fn dims(&self) -> &[Dimension] {
        self.r#type
            .as_ref()
            .and_then(|t| t.tensor_type.as_ref())
            .and_then(|t| t.shape.as_ref())
            .map(|s| s.dim.as_slice())
            .unwrap_or(&[])
    }

    /// Fixed trailing width of a rank-2 tensor, or 0 when it has none.
    pub fn width(&self) -> usize {
        match self.dims() {
            [_, last] => last.dim_value.map_or(0, |v| v.max(0) as usize),
            _ => 0,
        }
    }
}

impl TensorProto {
    pub fn f32(name: &str, dims: &[usize], values: Vec<f32>) -> Self {
        Self {
            dims: dims.iter().map(|&d| d as i64).collect(),
            data_type: DATA_TYPE_FLOAT,
            float_data: values,
            name: name.to_string(),
        }
    }
}

impl NodeProto {
    pub fn op(op_type: &str, name: &str, inputs: &[&str], output: &str) -> Self {
        Self {
            input: inputs.iter().map(|s| s.to_string()).collect(),
            output: vec![output.to_string()],
            name: name.to_string(),
            op_type: op_type.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batched_value_info_has_symbolic_batch_and_fixed_width() {
        let info = ValueInfoProto::batched_f32("input", "batch_size", 2);
        assert_eq!(info.dims().len(), 2);
        assert!(info.dims()[0].is_dynamic());
        assert_eq!(info.dims()[0].dim_param.as_deref(), Some("batch_size"));
        assert_eq!(info.width(), 2);
    }

    #[test]
    fn missing_shape_has_no_width() {
        let info = ValueInfoProto {
            name: "x".to_string(),
            r#type: None,
        };
        assert!(info.dims().is_empty());
        assert_eq!(info.width(), 0);
    }

    #[test]
    fn decoding_skips_fields_outside_the_subset() {
        let mut bytes = ModelProto {
            ir_version: 8,
            producer_name: "pytorch".to_string(),
            ..ModelProto::default()
        }
        .encode_to_vec();
        // field 6 (doc_string), length-delimited, "hi"
        bytes.extend_from_slice(&[0x32, 0x02, b'h', b'i']);

        let model = ModelProto::decode(bytes.as_slice()).unwrap();
        assert_eq!(model.ir_version, 8);
        assert_eq!(model.producer_name, "pytorch");
    }
}
