use thiserror::Error;

/// Failures raised while bringing up the effect surfaces.
///
/// None of these are fatal to the page: the front-end logs them, disables
/// the engine and keeps running without visual effects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FxError {
    #[error("no compatible GPU context: {0}")]
    ContextUnavailable(String),
    #[error("effect shader failed to compile: {0}")]
    ShaderCompile(String),
    #[error("effect pipeline failed to link: {0}")]
    ProgramLink(String),
    #[error("required drawable `{0}` was not supplied")]
    SurfaceMissing(&'static str),
}

pub type FxResult<T> = Result<T, FxError>;
