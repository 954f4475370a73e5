/// Convenience result type used across tavox.
pub type TavoxResult<T> = Result<T, TavoxError>;

/// Top-level error taxonomy used by the compilation pipeline.
///
/// Every variant is fatal to a compilation run; the project document is only written once
/// all stages have succeeded.
#[derive(thiserror::Error, Debug)]
pub enum TavoxError {
    /// Invalid user input: missing PDF, unresolved slide, unusable output path, bad voice setup.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("synthesis error (voice '{voice}'): {source}")]
    Synthesis {
        voice: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("integrity error: {0}")]
    Integrity(String),

    /// Explicit frame durations cannot be reconciled with the available screen time.
    #[error("timing error: {0}")]
    Timing(String),

    /// The timeline has a shape the current stage cannot handle.
    #[error("structural error: {0}")]
    Structural(String),

    /// An external collaborator (rasterizer, probe, renderer) failed.
    #[error("external tool error: {0}")]
    Tool(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TavoxError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn synthesis(voice: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Synthesis {
            voice: voice.into(),
            source,
        }
    }

    pub fn integrity(msg: impl Into<String>) -> Self {
        Self::Integrity(msg.into())
    }

    pub fn timing(msg: impl Into<String>) -> Self {
        Self::Timing(msg.into())
    }

    pub fn structural(msg: impl Into<String>) -> Self {
        Self::Structural(msg.into())
    }

    pub fn tool(msg: impl Into<String>) -> Self {
        Self::Tool(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
