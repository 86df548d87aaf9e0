//! Saving and loading persisted aggregates to files.
//!
//! Files hold exactly one versioned aggregate. Every error raised here
//! carries the path of the file involved.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use strata_foundation::{Error, PersistConfig, Result};

use crate::codec::{Decoder, Encoder, Persist};
use crate::registry::AttributeRegistry;

/// Writes `value` to the file at `path`, replacing any previous content.
///
/// # Errors
///
/// Returns an error if the file (or its directory) cannot be created or
/// written to, or if encoding fails.
pub fn save_to_file<P: Persist + ?Sized>(
    value: &P,
    path: &Path,
    config: &PersistConfig,
) -> Result<()> {
    let source = path.display().to_string();
    if config.create_directories {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                Error::io(format!(
                    "failed to create directory '{}': {e}",
                    parent.display()
                ))
                .with_source(source.clone())
            })?;
        }
    }

    let file = File::create(path)
        .map_err(|e| Error::io(format!("failed to create file: {e}")).with_source(source.clone()))?;
    let mut writer = BufWriter::with_capacity(config.buffer_capacity, file);
    value
        .write_to(&mut Encoder::new(&mut writer))
        .map_err(|e| e.with_source(source.clone()))?;
    writer
        .flush()
        .map_err(|e| Error::io(format!("failed to flush file: {e}")).with_source(source.clone()))?;

    log::debug!("saved {source}");
    Ok(())
}

/// Replaces `value` with the aggregate stored in the file at `path`.
///
/// The whole file must be consumed; leftover bytes are a format error.
///
/// # Errors
///
/// Returns an error if the file cannot be read, if decoding fails, or if
/// the file holds more than one aggregate.
pub fn load_from_file<P: Persist + ?Sized>(
    value: &mut P,
    path: &Path,
    registry: &AttributeRegistry,
) -> Result<()> {
    let source = path.display().to_string();
    let bytes = fs::read(path)
        .map_err(|e| Error::io(format!("failed to read file: {e}")).with_source(source.clone()))?;

    let mut reader = bytes.as_slice();
    value
        .read_from(&mut Decoder::new(&mut reader, registry))
        .map_err(|e| e.with_source(source.clone()))?;
    if !reader.is_empty() {
        return Err(Error::serialization(format!(
            "{} trailing bytes after aggregate",
            reader.len()
        ))
        .with_source(source));
    }

    log::debug!("loaded {source}");
    Ok(())
}
