use thiserror::Error;

/// Errors that can occur when talking to the remote content store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The requested path does not exist in the store
    #[error("Not found: {0}")]
    NotFound(String),

    /// The store API rejected the request
    #[error("Store API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Network or connection error reaching the store
    #[error("Connection error: {0}")]
    Connection(String),

    /// The store returned a payload we could not decode
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Errors surfaced by the image library operations.
#[derive(Debug, Clone, Error)]
pub enum LibraryError {
    /// Error from the content store
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A required request field is missing or empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Request payload could not be interpreted (e.g. bad base64 content)
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// A folder exists but contains nothing servable
    #[error("No files found in folder: {0}")]
    EmptyFolder(String),
}

/// Errors that can occur while rendering a QR code.
#[derive(Debug, Clone, Error)]
pub enum QrError {
    /// The payload is too long to fit in a QR code
    #[error("Payload cannot be encoded as a QR code: {0}")]
    Encode(String),

    /// PNG serialization failed
    #[error("Failed to render QR code PNG: {0}")]
    Render(String),
}
