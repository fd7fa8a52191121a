//! Synthetic safetensors files for the header benchmarks.

use serde_json::{Map, Value, json};

/// Build a complete file with `n_tensors` packed F32 tensors of shape
/// `[rows, 64]` and `n_metadata` string entries. Tensor data is zeroed.
pub fn synthetic_file(n_tensors: usize, n_metadata: usize, rows: u64) -> Vec<u8> {
    let mut header = Map::new();

    let metadata: Map<String, Value> = (0..n_metadata)
        .map(|i| (format!("key.{i}"), Value::String(format!("value {i}"))))
        .collect();
    header.insert("__metadata__".into(), Value::Object(metadata));

    let tensor_bytes = rows * 64 * 4;
    for i in 0..n_tensors as u64 {
        let start = i * tensor_bytes;
        header.insert(
            format!("model.layers.{i}.weight"),
            json!({
                "dtype": "F32",
                "shape": [rows, 64],
                "data_offsets": [start, start + tensor_bytes],
            }),
        );
    }

    let json = Value::Object(header).to_string();
    let data_len = n_tensors as u64 * tensor_bytes;

    let mut buf = Vec::with_capacity(8 + json.len() + data_len as usize);
    buf.extend_from_slice(&(json.len() as u64).to_le_bytes());
    buf.extend_from_slice(json.as_bytes());
    buf.resize(buf.len() + data_len as usize, 0);
    buf
}
