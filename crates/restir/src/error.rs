use derive_more::Display;

/// Structural failures. Numerical degeneracies never end up here: they are absorbed where they
/// are detected and turn into zero contributions.
#[derive(Debug, Display, derive_more::Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[display("the scene has no geometry, no scene oracle can be built")]
    EmptyScene,
    #[display("invalid raster dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[display("expected {expected} surface interactions, got {got}")]
    FrameSizeMismatch { expected: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
