//! Error taxonomy for context acquisition and shader program creation.
//!
//! All of these are terminal for the demo instance that hit them: there is no
//! retry path and no degraded rendering mode.

use std::fmt;

/// Programmable pipeline stage a shader source belongs to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GfxError {
    /// The rendering context (surface, adapter or device) could not be acquired.
    #[error("rendering context unavailable: {reason}")]
    ContextUnavailable { reason: String },

    /// A single shader stage failed to parse or validate.
    #[error("failed to compile {stage} shader:\n{log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    /// Both stages compiled but do not form a usable program.
    #[error("failed to link shader program: {log}")]
    ShaderLink { log: String },
}

impl GfxError {
    pub fn context_unavailable(reason: impl Into<String>) -> Self {
        Self::ContextUnavailable { reason: reason.into() }
    }

    pub(crate) fn link(log: impl Into<String>) -> Self {
        Self::ShaderLink { log: log.into() }
    }

    /// Diagnostic log produced by the shader front end, if any.
    pub fn diagnostic_log(&self) -> Option<&str> {
        match self {
            GfxError::ContextUnavailable { .. } => None,
            GfxError::ShaderCompile { log, .. } | GfxError::ShaderLink { log } => Some(log),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_error_mentions_stage_and_log() {
        let err = GfxError::ShaderCompile {
            stage: ShaderStage::Fragment,
            log: "expected `;`".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("fragment"));
        assert!(text.contains("expected `;`"));
        assert_eq!(err.diagnostic_log(), Some("expected `;`"));
    }

    #[test]
    fn context_error_has_no_diagnostic_log() {
        let err = GfxError::context_unavailable("no adapter");
        assert_eq!(err.to_string(), "rendering context unavailable: no adapter");
        assert!(err.diagnostic_log().is_none());
    }
}
