//! Filegate Processing Library
//!
//! Content inspection for uploads: the file type is decided from the leading
//! bytes of the stream, never from client-declared metadata.

pub mod validator;

pub use validator::{ContentValidator, DetectedType, RejectionReason, ValidationError};
