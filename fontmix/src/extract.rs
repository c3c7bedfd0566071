//! Reading glyph contours out of source fonts
//!
//! Each call opens the source, parses it, extracts one glyph and drops the
//! parsed font again; nothing is cached between letters.

mod cff;
mod glyf;

use std::{
    borrow::Cow,
    path::{Path, PathBuf},
    sync::Arc,
};

use skrifa::{
    raw::{FontRef, TableProvider},
    GlyphId, MetadataProvider,
};

pub use glyf::MAX_COMPOSITE_DEPTH;

use crate::{
    error::{EmptyReason, GlyphOutcome},
    pens::FlatteningPen,
};

/// Something that can produce the contours of a named glyph.
pub trait GlyphSource {
    /// A name for this source, used in log messages.
    fn label(&self) -> Cow<'_, str>;

    /// Extract the flattened, unnormalized contours of a glyph.
    fn extract(&self, glyph_name: &str) -> GlyphOutcome;
}

/// The outline flavour of a font.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutlineFormat {
    /// `glyf` and `loca`
    TrueType,
    /// `CFF ` or `CFF2`
    PostScript,
}

impl OutlineFormat {
    pub fn detect(font: &FontRef) -> Option<Self> {
        if font.glyf().is_ok() && font.loca(None).is_ok() {
            Some(OutlineFormat::TrueType)
        } else if font.cff().is_ok() || font.cff2().is_ok() {
            Some(OutlineFormat::PostScript)
        } else {
            None
        }
    }
}

/// A source font, either on disk or already in memory.
#[derive(Clone, Debug)]
pub enum SourceFont {
    Path(PathBuf),
    Bytes { label: String, data: Arc<[u8]> },
}

impl SourceFont {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        SourceFont::Path(path.into())
    }

    pub fn from_bytes(label: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        SourceFont::Bytes {
            label: label.into(),
            data: data.into(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            SourceFont::Path(path) => Some(path),
            SourceFont::Bytes { .. } => None,
        }
    }

    fn load(&self) -> Result<Cow<'_, [u8]>, EmptyReason> {
        match self {
            SourceFont::Path(path) => std::fs::read(path)
                .map(Cow::Owned)
                .map_err(|err| EmptyReason::Unreadable(format!("{}: {err}", path.display()))),
            SourceFont::Bytes { data, .. } => Ok(Cow::Borrowed(data)),
        }
    }

    /// Run `f` against a freshly parsed copy of the font.
    pub fn with_font<R>(&self, f: impl FnOnce(&FontRef) -> R) -> Result<R, EmptyReason> {
        let data = self.load()?;
        let font = FontRef::new(&data).map_err(|err| EmptyReason::Unreadable(err.to_string()))?;
        Ok(f(&font))
    }

    /// Check that the source parses and has outlines we can read.
    pub fn outline_format(&self) -> Result<OutlineFormat, EmptyReason> {
        self.with_font(OutlineFormat::detect)?
            .ok_or(EmptyReason::UnsupportedFormat)
    }
}

impl GlyphSource for SourceFont {
    fn label(&self) -> Cow<'_, str> {
        match self {
            SourceFont::Path(path) => path.to_string_lossy(),
            SourceFont::Bytes { label, .. } => Cow::Borrowed(label),
        }
    }

    fn extract(&self, glyph_name: &str) -> GlyphOutcome {
        match self.with_font(|font| extract_contours(font, glyph_name)) {
            Ok(outcome) => outcome,
            Err(reason) => {
                log::warn!("skipping {}: {reason}", self.label());
                GlyphOutcome::Empty(reason)
            }
        }
    }
}

/// Find a glyph by its `post`/`CFF` name, falling back to the character map
/// for single-character names.
pub fn find_glyph(font: &FontRef, glyph_name: &str) -> Option<GlyphId> {
    let by_name = font
        .glyph_names()
        .iter()
        .find(|(_, name)| !name.is_synthesized() && name.as_str() == glyph_name)
        .map(|(gid, _)| gid);
    by_name.or_else(|| {
        let mut chars = glyph_name.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => font.charmap().map(ch),
            _ => None,
        }
    })
}

/// Extract the contours of a glyph as closed polylines.
///
/// Quadratic spans and cubic segments are flattened at a fixed step count
/// and components are resolved recursively. The winding of the result is
/// whatever the font uses.
pub fn extract_contours(font: &FontRef, glyph_name: &str) -> GlyphOutcome {
    let Some(format) = OutlineFormat::detect(font) else {
        return GlyphOutcome::Empty(EmptyReason::UnsupportedFormat);
    };
    let Some(gid) = find_glyph(font, glyph_name) else {
        log::debug!("no glyph named '{glyph_name}'");
        return GlyphOutcome::Empty(EmptyReason::MissingGlyph(glyph_name.to_owned()));
    };
    match format {
        OutlineFormat::TrueType => {
            let Some(outlines) = glyf::GlyfOutlines::new(font) else {
                return GlyphOutcome::Empty(EmptyReason::UnsupportedFormat);
            };
            let mut pen = FlatteningPen::new();
            if let Err(err) = outlines.draw(gid, &mut pen) {
                log::warn!("failed to read '{glyph_name}': {err}");
                return GlyphOutcome::Empty(EmptyReason::Unreadable(err.to_string()));
            }
            GlyphOutcome::from_contours(pen.into_contours(), EmptyReason::DegenerateGeometry)
        }
        OutlineFormat::PostScript => cff::extract(font, gid, glyph_name),
    }
}
