//! Error types for the motion core.

/// Errors surfaced by engine setup. Nothing here is raised while ticking:
/// per-frame work degrades to "nothing happens" instead of failing.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum MotionError {
    #[error("carousel has no slides")]
    EmptyCarousel,

    #[error("text rotator has no words")]
    EmptyRotator,

    #[error("engine is already bound to a page")]
    AlreadyBound,

    #[error("engine has been torn down")]
    TornDown,

    #[error("unknown carousel: {0}")]
    UnknownCarousel(u32),

    #[error("config parse error: {0}")]
    Config(String),
}
