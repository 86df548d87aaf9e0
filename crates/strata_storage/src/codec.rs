//! Versioned binary envelopes.
//!
//! Every persisted aggregate is preceded by a version tag. The tag is a
//! `MessagePack` unsigned integer (a single byte below 128), followed by a
//! payload whose shape is defined by the reader for that version.
//!
//! Two wrappers exist:
//! - [`DefaultGrowable`] for types that have never changed shape. It writes
//!   tag `1` and reads with a single caller-supplied function.
//! - [`Growable`] for types with history. It holds one reader per version
//!   (at least two) and optional migrations run after reading an old version.
//!
//! Envelopes nest: an aggregate containing other persisted aggregates writes
//! its own tag, then lets each child write its own.

use std::io::{Read, Write};

use serde::Serialize;
use serde::de::DeserializeOwned;
use strata_foundation::{Error, ErrorKind, Result};

use crate::registry::AttributeRegistry;

/// The version tag written by [`DefaultGrowable`].
pub const FIRST_VERSION: u32 = 1;

/// Streaming writer for persisted aggregates.
pub struct Encoder<'a> {
    writer: &'a mut dyn Write,
}

impl<'a> Encoder<'a> {
    /// Creates an encoder writing to `writer`.
    pub fn new(writer: &'a mut dyn Write) -> Self {
        Self { writer }
    }

    /// Writes a version tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying stream fails.
    pub fn write_version(&mut self, version: u32) -> Result<()> {
        self.write(&version)
    }

    /// Writes one serde value.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the underlying stream fails.
    pub fn write<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        rmp_serde::encode::write(&mut self.writer, value)
            .map_err(|e| Error::serialization(e.to_string()))
    }

    /// Writes a collection length.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying stream fails.
    pub fn write_len(&mut self, len: usize) -> Result<()> {
        self.write(&(len as u64))
    }
}

/// Streaming reader for persisted aggregates.
///
/// Carries the [`AttributeRegistry`] used to rebuild type-erased attribute
/// columns.
pub struct Decoder<'a> {
    reader: &'a mut dyn Read,
    registry: &'a AttributeRegistry,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder reading from `reader`.
    pub fn new(reader: &'a mut dyn Read, registry: &'a AttributeRegistry) -> Self {
        Self { reader, registry }
    }

    /// Returns the attribute registry of this decoder.
    #[must_use]
    pub fn registry(&self) -> &'a AttributeRegistry {
        self.registry
    }

    /// Reads a version tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is truncated or holds no integer.
    pub fn read_version(&mut self) -> Result<u32> {
        self.read()
    }

    /// Reads one serde value.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is truncated or corrupted.
    pub fn read<T: DeserializeOwned>(&mut self) -> Result<T> {
        rmp_serde::decode::from_read(&mut self.reader)
            .map_err(|e| Error::serialization(e.to_string()))
    }

    /// Reads a collection length.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is truncated or the length does not
    /// fit in memory addressing.
    pub fn read_len(&mut self) -> Result<usize> {
        let len: u64 = self.read()?;
        usize::try_from(len).map_err(|_| Error::serialization(format!("invalid length {len}")))
    }
}

/// An aggregate that can be written to and read back from a stream.
///
/// Reading happens in place: the aggregate is constructed first (usually
/// with `Default`) and then overwritten by the stream content.
pub trait Persist {
    /// Writes the aggregate, including its version envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    fn write_to(&self, encoder: &mut Encoder<'_>) -> Result<()>;

    /// Replaces the aggregate with the content read from the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is truncated, corrupted, or carries an
    /// unknown version.
    fn read_from(&mut self, decoder: &mut Decoder<'_>) -> Result<()>;
}

/// Envelope for types that have a single on-disk shape.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultGrowable;

impl DefaultGrowable {
    /// Writes tag `1` then the payload.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn write<T: ?Sized>(
        encoder: &mut Encoder<'_>,
        object: &T,
        payload: impl FnOnce(&mut Encoder<'_>, &T) -> Result<()>,
    ) -> Result<()> {
        encoder.write_version(FIRST_VERSION)?;
        payload(encoder, object)
    }

    /// Reads the tag then the payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the tag is not `1` or the payload fails to read.
    pub fn read<T: ?Sized>(
        decoder: &mut Decoder<'_>,
        object: &mut T,
        payload: impl FnOnce(&mut Decoder<'_>, &mut T) -> Result<()>,
    ) -> Result<()> {
        let version = decoder.read_version()?;
        if version != FIRST_VERSION {
            return Err(Error::unsupported_version(version, FIRST_VERSION));
        }
        payload(decoder, object)
    }

    /// Reads the tag then builds a new value from the payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the tag is not `1` or the payload fails to read.
    pub fn decode<T>(
        decoder: &mut Decoder<'_>,
        payload: impl FnOnce(&mut Decoder<'_>) -> Result<T>,
    ) -> Result<T> {
        let version = decoder.read_version()?;
        if version != FIRST_VERSION {
            return Err(Error::unsupported_version(version, FIRST_VERSION));
        }
        payload(decoder)
    }
}

/// Writes the current shape of `T`.
pub type WriteFn<T> = fn(&T, &mut Encoder<'_>) -> Result<()>;

/// Reads one historical shape of `T` into an existing object.
pub type ReadFn<T> = fn(&mut T, &mut Decoder<'_>) -> Result<()>;

/// Backfills fields an older shape of `T` did not carry.
pub type MigrateFn<T> = fn(&mut T) -> Result<()>;

/// Envelope for types whose on-disk shape changed across releases.
///
/// `readers[i]` reads version `i + 1`. When migrations are present,
/// `migrations[i]` runs after `readers[i]` for every version older than the
/// latest.
pub struct Growable<T> {
    writer: WriteFn<T>,
    readers: Vec<ReadFn<T>>,
    migrations: Vec<MigrateFn<T>>,
}

impl<T> Growable<T> {
    /// Creates an envelope without migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two readers are given.
    pub fn new(writer: WriteFn<T>, readers: Vec<ReadFn<T>>) -> Result<Self> {
        Self::with_migrations(writer, readers, Vec::new())
    }

    /// Creates an envelope with one migration per historical version.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two readers are given, or if the
    /// migration count is neither zero nor the number of readers minus one.
    pub fn with_migrations(
        writer: WriteFn<T>,
        readers: Vec<ReadFn<T>>,
        migrations: Vec<MigrateFn<T>>,
    ) -> Result<Self> {
        if readers.len() <= FIRST_VERSION as usize {
            return Err(Error::new(ErrorKind::InvalidCodec(
                "provide at least 2 readers or use DefaultGrowable".to_string(),
            )));
        }
        if !migrations.is_empty() && migrations.len() != readers.len() - 1 {
            return Err(Error::new(ErrorKind::InvalidCodec(format!(
                "expected {} migrations (or none), got {}",
                readers.len() - 1,
                migrations.len()
            ))));
        }
        Ok(Self {
            writer,
            readers,
            migrations,
        })
    }

    /// Returns the current (latest) version.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn version(&self) -> u32 {
        self.readers.len() as u32
    }

    /// Writes the current version tag then the current shape.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn write(&self, encoder: &mut Encoder<'_>, object: &T) -> Result<()> {
        encoder.write_version(self.version())?;
        (self.writer)(object, encoder)
    }

    /// Reads a tagged payload with the matching reader, then migrates it.
    ///
    /// # Errors
    ///
    /// Returns an error if the tag is outside `[1, version()]` or the
    /// reader or migration fails.
    pub fn read(&self, decoder: &mut Decoder<'_>, object: &mut T) -> Result<()> {
        let version = decoder.read_version()?;
        if version < FIRST_VERSION || version > self.version() {
            return Err(Error::unsupported_version(version, self.version()));
        }
        let slot = (version - 1) as usize;
        (self.readers[slot])(object, decoder)?;
        if !self.migrations.is_empty() && version < self.version() {
            (self.migrations[slot])(object)?;
        }
        Ok(())
    }
}

impl<T> std::fmt::Debug for Growable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Growable")
            .field("version", &self.version())
            .field("migrations", &self.migrations.len())
            .finish()
    }
}
