//! Mixing glyph outlines from several fonts into a new font.
//!
//! Each letter of the Latin alphabet is extracted from every source font,
//! flattened to polygons and scaled into a common 1000 unit square. The
//! square is cut into rows (and optionally columns), each cell is filled
//! from one source, and the cells are joined back into one glyph. The 26
//! mixed letters are then written out as a TrueType font.
//!
//! The pieces can be used on their own:
//!
//! - [`extract`] reads flattened contours out of `glyf` or `CFF` outlines
//! - [`polygon`] turns contours into regions and normalizes them
//! - [`cut`] splits regions along an axis
//! - [`mix`] combines regions on a grid
//! - [`assemble`] compiles letters into a font binary
//! - [`generate`] runs the whole pipeline from a [`MixConfig`]

#![forbid(unsafe_code)]

pub mod assemble;
pub mod config;
pub mod contour;
pub mod cut;
pub mod error;
pub mod extract;
pub mod generate;
pub mod mix;
pub mod pens;
pub mod persist;
pub mod polygon;

pub use assemble::{assemble_font, FontAssembler};
pub use config::{CutMethod, MixConfig};
pub use contour::{Contour, LETTERS};
pub use error::{
    AssembleError, ConfigError, EmptyReason, GenerateError, GlyphOutcome, PersistError,
};
pub use extract::{extract_contours, GlyphSource, SourceFont};
pub use generate::{Generated, Generator, GeneratorHandle, Progress};
pub use mix::{mix_letter, CutMode, EmptyUnionPolicy, LetterSettings};
pub use polygon::Region;
