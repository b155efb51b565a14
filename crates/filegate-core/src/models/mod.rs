pub mod upload;

pub use upload::{UploadContext, UploadMetadata, UploadResult};
