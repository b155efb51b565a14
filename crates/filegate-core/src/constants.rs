//! Constants shared across Filegate crates.

/// Number of leading bytes inspected when sniffing a file's real type.
///
/// 261 bytes covers the deepest standard signature (tar's `ustar` marker at offset 257).
pub const SNIFF_WINDOW_BYTES: usize = 261;

/// Multipart field that carries the uploaded file.
pub const UPLOAD_FIELD_NAME: &str = "uploadFile";

/// Header used to propagate the per-request correlation identifier.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Reported when magic-byte sniffing cannot classify the content.
pub const UNKNOWN_CONTENT_TYPE: &str = "unknown";
