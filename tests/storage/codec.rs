//! Integration tests for versioned envelopes
//!
//! Tests a type whose on-disk shape changed across two releases.

use strata_foundation::{ErrorKind, Result};
use strata_storage::{
    AttributeRegistry, Decoder, DefaultGrowable, Encoder, Growable, MigrateFn, Persist, ReadFn,
};

#[derive(Debug, Default, PartialEq)]
struct Settings {
    name: String,
    tolerance: f64,
}

impl Settings {
    fn write(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        encoder.write(&self.name)?;
        encoder.write(&self.tolerance)
    }

    fn read_name_only(&mut self, decoder: &mut Decoder<'_>) -> Result<()> {
        self.name = decoder.read()?;
        Ok(())
    }

    fn read_current(&mut self, decoder: &mut Decoder<'_>) -> Result<()> {
        self.name = decoder.read()?;
        self.tolerance = decoder.read()?;
        Ok(())
    }

    fn default_tolerance(&mut self) -> Result<()> {
        self.tolerance = 1e-6;
        Ok(())
    }

    fn codec() -> Growable<Self> {
        Growable::with_migrations(
            Self::write,
            vec![Self::read_name_only as ReadFn<Self>, Self::read_current],
            vec![Self::default_tolerance as MigrateFn<Self>],
        )
        .unwrap()
    }
}

impl Persist for Settings {
    fn write_to(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        Self::codec().write(encoder, self)
    }

    fn read_from(&mut self, decoder: &mut Decoder<'_>) -> Result<()> {
        Self::codec().read(decoder, self)
    }
}

/// An aggregate nesting a versioned child inside a fixed envelope.
#[derive(Debug, Default, PartialEq)]
struct Project {
    settings: Settings,
    revision: u64,
}

impl Persist for Project {
    fn write_to(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        DefaultGrowable::write(encoder, self, |encoder, project| {
            project.settings.write_to(encoder)?;
            encoder.write(&project.revision)
        })
    }

    fn read_from(&mut self, decoder: &mut Decoder<'_>) -> Result<()> {
        DefaultGrowable::read(decoder, self, |decoder, project| {
            project.settings.read_from(decoder)?;
            project.revision = decoder.read()?;
            Ok(())
        })
    }
}

fn read<P: Persist + Default>(bytes: &[u8]) -> Result<P> {
    let registry = AttributeRegistry::default();
    let mut reader = bytes;
    let mut value = P::default();
    value.read_from(&mut Decoder::new(&mut reader, &registry))?;
    Ok(value)
}

#[test]
fn current_version_round_trips() {
    let settings = Settings {
        name: "fine".to_string(),
        tolerance: 0.5,
    };
    let mut bytes = Vec::new();
    settings.write_to(&mut Encoder::new(&mut bytes)).unwrap();
    assert_eq!(bytes[0], 2);
    assert_eq!(read::<Settings>(&bytes).unwrap(), settings);
}

#[test]
fn old_version_is_migrated() {
    let mut bytes = Vec::new();
    let mut encoder = Encoder::new(&mut bytes);
    encoder.write_version(1).unwrap();
    encoder.write("legacy").unwrap();

    let settings = read::<Settings>(&bytes).unwrap();
    assert_eq!(settings.name, "legacy");
    assert!((settings.tolerance - 1e-6).abs() < f64::EPSILON);
}

#[test]
fn future_version_is_rejected() {
    let mut bytes = Vec::new();
    let mut encoder = Encoder::new(&mut bytes);
    encoder.write_version(3).unwrap();
    encoder.write("future").unwrap();

    let err = read::<Settings>(&bytes).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnsupportedVersion { found: 3, latest: 2 }));
}

#[test]
fn envelopes_nest() {
    let project = Project {
        settings: Settings {
            name: "nested".to_string(),
            tolerance: 2.0,
        },
        revision: 17,
    };
    let mut bytes = Vec::new();
    project.write_to(&mut Encoder::new(&mut bytes)).unwrap();
    assert_eq!(&bytes[..2], &[1, 2]);
    assert_eq!(read::<Project>(&bytes).unwrap(), project);
}

#[test]
fn fixed_envelope_rejects_other_tags() {
    let mut bytes = Vec::new();
    Encoder::new(&mut bytes).write_version(2).unwrap();
    let err = read::<Project>(&bytes).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnsupportedVersion { found: 2, latest: 1 }));
}
