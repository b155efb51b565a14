//! Byte fixtures and multipart builders.

use axum_test::multipart::{MultipartForm, Part};

pub const UPLOAD_FIELD: &str = "uploadFile";

/// PNG signature followed by an IHDR chunk header and filler up to `len` bytes.
pub fn png_bytes(len: usize) -> Vec<u8> {
    let mut data = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR".to_vec();
    data.extend((0..len.saturating_sub(data.len())).map(|i| (i % 256) as u8));
    data.truncate(len);
    data
}

/// JPEG SOI + APP0 marker followed by filler.
pub fn jpeg_bytes(len: usize) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];
    data.resize(len.max(data.len()), 0x42);
    data
}

pub fn file_part(data: Vec<u8>, filename: &str, mime: &str) -> Part {
    Part::bytes(bytes::Bytes::from(data))
        .file_name(filename.to_string())
        .mime_type(mime.to_string())
}

/// Form carrying one `uploadFile` part.
pub fn upload_form(data: Vec<u8>, filename: &str, mime: &str) -> MultipartForm {
    MultipartForm::new().add_part(UPLOAD_FIELD, file_part(data, filename, mime))
}
