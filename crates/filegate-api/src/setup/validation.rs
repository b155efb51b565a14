//! Configuration validation
//!
//! Validates configuration at startup to catch misconfigurations early.

use anyhow::Result;
use filegate_core::{Config, StorageBackend};

/// Validate configuration values, failing fast on anything that would
/// break uploads at request time.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_production() && config.storage_backend() == StorageBackend::Mock {
        return Err(anyhow::anyhow!(
            "STORAGE_BACKEND=mock is not allowed in production; uploads would not be persisted"
        ));
    }

    Ok(())
}
