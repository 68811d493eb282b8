use thiserror::Error;

/// Client-side failure taxonomy. Nothing is retried automatically; every
/// failure is a value the caller reduces to a status message.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad credentials. Deliberately generic — the server collapses unknown
    /// email, wrong password, and passwordless accounts into one outcome.
    #[error("Invalid email or password")]
    Auth,

    /// Caught client-side before any request is issued.
    #[error("{0}")]
    Validation(String),

    /// The transport failed (DNS, refused connection, timeout).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered non-2xx. `detail` is the server-supplied message
    /// when one was present, else a generic fallback.
    #[error("Server error ({status}): {detail}")]
    Server { status: u16, detail: String },

    /// A chat request is already streaming; a second send is rejected.
    #[error("A chat request is already in flight")]
    Busy,
}

pub type Result<T> = std::result::Result<T, Error>;
