//! PostScript (CFF/CFF2) outlines

use skrifa::{
    outline::DrawSettings,
    prelude::{LocationRef, Size},
    raw::FontRef,
    GlyphId, MetadataProvider,
};

use crate::{
    error::{EmptyReason, GlyphOutcome},
    pens::FlatteningPen,
};

/// Draw a PostScript glyph unhinted, in font units, at the default location.
pub(crate) fn extract(font: &FontRef, gid: GlyphId, glyph_name: &str) -> GlyphOutcome {
    let outlines = font.outline_glyphs();
    let Some(glyph) = outlines.get(gid) else {
        return GlyphOutcome::Empty(EmptyReason::MissingGlyph(glyph_name.to_owned()));
    };
    let mut pen = FlatteningPen::new();
    let settings = DrawSettings::unhinted(Size::unscaled(), LocationRef::default());
    if let Err(err) = glyph.draw(settings, &mut pen) {
        log::warn!("failed to draw '{glyph_name}': {err}");
        return GlyphOutcome::Empty(EmptyReason::Unreadable(err.to_string()));
    }
    GlyphOutcome::from_contours(pen.into_contours(), EmptyReason::DegenerateGeometry)
}
