//! A hand-encoded font with PostScript outlines

use write_fonts::{
    tables::{
        cmap::Cmap,
        head::Head,
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        maxp::Maxp,
    },
    types::{FWord, GlyphId, Tag, UfWord},
    FontBuilder,
};

// Type 2 charstring operators
const RLINETO: u8 = 5;
const RRCURVETO: u8 = 8;
const ENDCHAR: u8 = 14;
const RMOVETO: u8 = 21;

// Top DICT operators
const CHARSTRINGS: u8 = 17;
const PRIVATE: u8 = 18;

/// A Type 2 charstring number, as a 16 bit integer.
fn cs_number(value: i16) -> [u8; 3] {
    let [hi, lo] = value.to_be_bytes();
    [28, hi, lo]
}

/// A DICT operand in the fixed five byte form.
fn dict_number(value: i32) -> [u8; 5] {
    let [b0, b1, b2, b3] = value.to_be_bytes();
    [29, b0, b1, b2, b3]
}

fn charstring(ops: &[(&[i16], u8)]) -> Vec<u8> {
    let mut out = Vec::new();
    for (args, op) in ops {
        for arg in *args {
            out.extend(cs_number(*arg));
        }
        out.push(*op);
    }
    out
}

/// A CFF INDEX with one byte offsets.
fn index(items: &[&[u8]]) -> Vec<u8> {
    let mut out = (items.len() as u16).to_be_bytes().to_vec();
    if items.is_empty() {
        return out;
    }
    out.push(1);
    let mut offset = 1usize;
    out.push(offset as u8);
    for item in items {
        offset += item.len();
        out.push(u8::try_from(offset).expect("index data fits one byte offsets"));
    }
    for item in items {
        out.extend_from_slice(item);
    }
    out
}

fn top_dict(charstrings_offset: usize, private_offset: usize) -> Vec<u8> {
    let mut dict = Vec::new();
    dict.extend(dict_number(charstrings_offset as i32));
    dict.push(CHARSTRINGS);
    // an empty Private DICT: size, then offset
    dict.extend(dict_number(0));
    dict.extend(dict_number(private_offset as i32));
    dict.push(PRIVATE);
    dict
}

/// The glyph mapped to 'A': a rectangle whose top right corner is rounded
/// off by one cubic curve.
///
/// Absolute points: move to (100, 0), lines to (500, 0) and (500, 300), a
/// curve through (500, 500) and (400, 600) to (200, 600), a line to
/// (100, 600), and the implied close back to the start.
fn rounded_corner() -> Vec<u8> {
    charstring(&[
        (&[100, 0], RMOVETO),
        (&[400, 0, 0, 300], RLINETO),
        (&[0, 200, -100, 100, -200, 0], RRCURVETO),
        (&[-100, 0], RLINETO),
        (&[], ENDCHAR),
    ])
}

/// The bare `CFF ` table: header, Name, Top DICT, String and Global Subr
/// INDEXes, then the CharStrings INDEX.
pub fn cff_table() -> Vec<u8> {
    let header = [1u8, 0, 4, 1];
    let names = index(&[b"FontMixTest".as_slice()]);
    let strings = index(&[]);
    let global_subrs = index(&[]);
    let notdef = charstring(&[(&[], ENDCHAR)]);
    let glyph = rounded_corner();
    let charstrings = index(&[notdef.as_slice(), glyph.as_slice()]);

    // the Top DICT has a fixed size, so offsets can be computed up front
    let top_dict_len = top_dict(0, 0).len();
    let top_dicts_len = index(&[vec![0u8; top_dict_len].as_slice()]).len();
    let charstrings_offset =
        header.len() + names.len() + top_dicts_len + strings.len() + global_subrs.len();
    let private_offset = charstrings_offset + charstrings.len();
    let top_dicts = index(&[top_dict(charstrings_offset, private_offset).as_slice()]);

    let mut table = header.to_vec();
    for part in [names, top_dicts, strings, global_subrs, charstrings] {
        table.extend(part);
    }
    table
}

/// A font with a `CFF ` table instead of `glyf`, with 'A' mapped to the
/// shape described on [`rounded_corner`]. There is no `post` table, so the
/// glyph is only reachable through `cmap`.
pub fn cff_font() -> Vec<u8> {
    let head = Head {
        units_per_em: 1000,
        ..Default::default()
    };
    let maxp = Maxp {
        num_glyphs: 2,
        ..Default::default()
    };
    let hhea = Hhea {
        ascender: FWord::new(800),
        descender: FWord::new(-200),
        line_gap: FWord::new(0),
        advance_width_max: UfWord::new(600),
        min_left_side_bearing: FWord::new(0),
        min_right_side_bearing: FWord::new(0),
        x_max_extent: FWord::new(500),
        caret_slope_rise: 1,
        caret_slope_run: 0,
        caret_offset: 0,
        number_of_h_metrics: 2,
    };
    let hmtx = Hmtx {
        h_metrics: vec![
            LongMetric {
                advance: 500,
                side_bearing: 0,
            },
            LongMetric {
                advance: 600,
                side_bearing: 100,
            },
        ],
        left_side_bearings: Vec::new(),
    };
    let cmap = Cmap::from_mappings([('A', GlyphId::new(1))]).unwrap();

    let mut builder = FontBuilder::new();
    builder
        .add_table(&head)
        .unwrap()
        .add_table(&hhea)
        .unwrap()
        .add_table(&maxp)
        .unwrap()
        .add_table(&hmtx)
        .unwrap()
        .add_table(&cmap)
        .unwrap()
        .add_raw(Tag::new(b"CFF "), cff_table());
    builder.build()
}
