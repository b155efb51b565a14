//! Shared key generation for storage backends.

use std::path::Path;
use uuid::Uuid;

const MAX_EXTENSION_LEN: usize = 10;

/// Generate a fresh object key for a client filename: `{uuid}{.ext}`.
///
/// Only the extension of the client filename survives, and only when it is
/// short and ASCII alphanumeric. Anything else yields a bare UUID key.
pub fn generate_object_key(filename: &str) -> String {
    let id = Uuid::new_v4();
    match safe_extension(filename) {
        Some(ext) => format!("{}.{}", id, ext),
        None => id.to_string(),
    }
}

fn safe_extension(filename: &str) -> Option<&str> {
    // Browsers on Windows may send full paths; only the last component counts.
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let ext = Path::new(name).extension()?.to_str()?;

    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }

    Some(ext)
}
