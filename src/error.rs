use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BvhError {
    #[error("unknown BVH split mode \"{0}\", expected \"spatial\" or \"linear\"")]
    UnknownSplitMode(String),

    #[error("BVH max depth must be at least 1")]
    InvalidMaxDepth,
}

pub type Result<T, E = BvhError> = std::result::Result<T, E>;
