use thiserror::Error;

pub type MeshResult<T> = Result<T, MeshError>;

/// Failures raised while building a structured mesh. Only `DegenerateGeometry` is ever recovered
/// from; the pipeline absorbs it with a fallback value at the call site. Everything else aborts
/// the request before anything is exported.
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("out of bounds: {axis} offset {offset:.4} exceeds available room {room:.4}")]
    OutOfBounds {
        axis: &'static str,
        offset: f64,
        room: f64,
    },

    #[error("invalid contour: {0}")]
    InvalidContour(String),

    #[error("meshing kernel rejected {operation}: {details}")]
    KernelFailure {
        operation: &'static str,
        details: String,
    },

    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MeshError {
    pub fn kernel(operation: &'static str, details: impl Into<String>) -> Self {
        MeshError::KernelFailure {
            operation,
            details: details.into(),
        }
    }
}
