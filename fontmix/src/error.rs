//! Errors and non-fatal glyph outcomes

use std::{fmt, io, path::PathBuf};

use write_fonts::{tables::cmap::CmapConflict, BuilderError};

use crate::contour::Contour;

/// Why a glyph came back without contours.
///
/// None of these abort a run: the letter is simply blank for the source
/// (or, after mixing, for the output font).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EmptyReason {
    /// The source has neither `glyf` nor `CFF `/`CFF2` outlines.
    UnsupportedFormat,
    /// The source has no glyph with this name.
    MissingGlyph(String),
    /// The source could not be read or parsed.
    Unreadable(String),
    /// Every contour collapsed while building polygons.
    DegenerateGeometry,
    /// No source had ink for the letter.
    NoInk,
}

/// The result of extracting or mixing a single glyph.
#[derive(Clone, Debug, PartialEq)]
pub enum GlyphOutcome {
    Contours(Vec<Contour>),
    Empty(EmptyReason),
}

impl GlyphOutcome {
    /// Wrap a list of contours, treating an empty list as degenerate.
    pub fn from_contours(contours: Vec<Contour>, reason: EmptyReason) -> Self {
        if contours.is_empty() {
            GlyphOutcome::Empty(reason)
        } else {
            GlyphOutcome::Contours(contours)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, GlyphOutcome::Empty(_))
    }

    pub fn contours(&self) -> &[Contour] {
        match self {
            GlyphOutcome::Contours(contours) => contours,
            GlyphOutcome::Empty(_) => &[],
        }
    }

    pub fn into_contours(self) -> Vec<Contour> {
        match self {
            GlyphOutcome::Contours(contours) => contours,
            GlyphOutcome::Empty(_) => Vec::new(),
        }
    }

    pub fn empty_reason(&self) -> Option<&EmptyReason> {
        match self {
            GlyphOutcome::Empty(reason) => Some(reason),
            GlyphOutcome::Contours(_) => None,
        }
    }
}

/// An error encountered while building the output font binary.
#[derive(Debug)]
pub enum AssembleError {
    /// A glyph outline could not be encoded.
    Glyph {
        letter: char,
        inner: write_fonts::error::Error,
    },
    Cmap(CmapConflict),
    Table(BuilderError),
}

/// The output font could not be written to either location.
#[derive(Debug)]
pub struct PersistError {
    pub requested: PathBuf,
    pub alternate: PathBuf,
    pub inner: io::Error,
}

/// An error loading or validating a [`MixConfig`](crate::config::MixConfig).
#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Json(serde_json::Error),
    Invalid(String),
}

/// A failure that aborts a whole generation run.
#[derive(Debug)]
pub enum GenerateError {
    /// Fewer than two usable sources, or otherwise unusable input.
    Precondition(String),
    Config(ConfigError),
    Assemble(AssembleError),
    Persist(PersistError),
    /// The run was cancelled between letters.
    Cancelled,
    /// The worker thread panicked.
    Worker,
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyReason::UnsupportedFormat => write!(f, "no glyf or CFF outlines"),
            EmptyReason::MissingGlyph(name) => write!(f, "no glyph named '{name}'"),
            EmptyReason::Unreadable(msg) => write!(f, "unreadable source: {msg}"),
            EmptyReason::DegenerateGeometry => write!(f, "degenerate geometry"),
            EmptyReason::NoInk => write!(f, "no source had ink"),
        }
    }
}

impl fmt::Display for AssembleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssembleError::Glyph { letter, inner } => {
                write!(f, "failed to encode glyph '{letter}': {inner}")
            }
            AssembleError::Cmap(conflict) => conflict.fmt(f),
            AssembleError::Table(err) => {
                write!(f, "failed to compile '{}': {}", err.tag, err.inner)
            }
        }
    }
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "could not write '{}' or '{}': {}",
            self.requested.display(),
            self.alternate.display(),
            self.inner
        )
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "failed to read config: {err}"),
            ConfigError::Json(err) => write!(f, "malformed config: {err}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::Precondition(msg) => write!(f, "precondition failed: {msg}"),
            GenerateError::Config(err) => err.fmt(f),
            GenerateError::Assemble(err) => err.fmt(f),
            GenerateError::Persist(err) => err.fmt(f),
            GenerateError::Cancelled => write!(f, "generation cancelled"),
            GenerateError::Worker => write!(f, "generation worker panicked"),
        }
    }
}

impl std::error::Error for EmptyReason {}

impl std::error::Error for AssembleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssembleError::Glyph { inner, .. } => Some(inner),
            AssembleError::Cmap(inner) => Some(inner),
            AssembleError::Table(_) => None,
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.inner)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(inner) => Some(inner),
            ConfigError::Json(inner) => Some(inner),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl std::error::Error for GenerateError {}

impl From<CmapConflict> for AssembleError {
    fn from(value: CmapConflict) -> Self {
        AssembleError::Cmap(value)
    }
}

impl From<BuilderError> for AssembleError {
    fn from(value: BuilderError) -> Self {
        AssembleError::Table(value)
    }
}

impl From<io::Error> for ConfigError {
    fn from(value: io::Error) -> Self {
        ConfigError::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        ConfigError::Json(value)
    }
}

impl From<ConfigError> for GenerateError {
    fn from(value: ConfigError) -> Self {
        GenerateError::Config(value)
    }
}

impl From<AssembleError> for GenerateError {
    fn from(value: AssembleError) -> Self {
        GenerateError::Assemble(value)
    }
}

impl From<PersistError> for GenerateError {
    fn from(value: PersistError) -> Self {
        GenerateError::Persist(value)
    }
}
