//! Error types for the site widgets.

/// Why a qualification form submission was refused. The `Display` text is
/// what the visitor sees.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FormError {
    #[error("Please fill in all required fields.")]
    MissingFields(Vec<String>),

    #[error("Please enter a valid email address.")]
    InvalidEmail,

    #[error("A submission is already in progress.")]
    Pending,
}

/// Failure of one analytics sink. Never fatal: the dispatcher logs it and
/// moves on to the next sink.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SinkError {
    #[error("sink {0} is not available")]
    Unavailable(String),

    #[error("sink {sink} threw: {message}")]
    Threw { sink: String, message: String },

    #[error("payload for {sink} could not be built: {message}")]
    Payload { sink: String, message: String },
}

/// Errors surfaced while configuring or binding a [`Site`](crate::Site).
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SiteError {
    #[error("site is already bound to a page")]
    AlreadyBound,

    #[error("site has been torn down")]
    TornDown,

    #[error("config parse error: {0}")]
    Config(String),
}
