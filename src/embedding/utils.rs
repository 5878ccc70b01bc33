use std::io;
use std::path::Path;
use tokenizers::{Tokenizer, TruncationParams};

/// Loads `tokenizer.json` from a model directory (or an explicit tokenizer path)
/// with truncation at `max_len` tokens.
pub fn load_tokenizer(model_path: &Path, max_len: usize) -> io::Result<Tokenizer> {
    load_windowed_tokenizer(model_path, max_len, 0)
}

/// Like [`load_tokenizer`], but text past `max_len` is kept as overflowing
/// windows that repeat the last `stride` tokens of the previous window.
pub fn load_windowed_tokenizer(
    model_path: &Path,
    max_len: usize,
    stride: usize,
) -> io::Result<Tokenizer> {
    let tokenizer_path = if model_path.is_dir() {
        model_path.join("tokenizer.json")
    } else {
        model_path.to_path_buf()
    };

    let mut tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(io::Error::other)?;

    let truncation = TruncationParams {
        max_length: max_len,
        stride,
        ..Default::default()
    };

    tokenizer
        .with_truncation(Some(truncation))
        .map_err(|e| io::Error::other(format!("Failed to configure truncation: {}", e)))?;

    Ok(tokenizer)
}

/// Scales `vector` to unit length in place (zero vectors are left unchanged).
pub fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}
