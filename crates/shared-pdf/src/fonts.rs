//! Font resources: names, glyph widths, vertical metrics and text decoding
//!
//! Metrics are expressed in text-space units per unit of font size (the PDF
//! `/Widths` values divided by 1000).

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object};

use crate::cmap::ToUnicode;
use crate::coords::number;
use crate::objects::{get, name_of, resolve, resolve_dict, stream_bytes};

/// Approximate glyph width as a fraction of font size when the font carries
/// no width table (the standard 14 fonts usually don't).
const APPROX_CHAR_WIDTH_RATIO: f32 = 0.5;

const DEFAULT_ASCENT: f32 = 0.8;
const DEFAULT_DESCENT: f32 = -0.2;

/// One decoded character code
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub text: String,
    /// Advance width in units of font size
    pub width: f32,
    /// Single-byte code 32, which receives word spacing
    pub is_space: bool,
}

/// A font resource as used by one page
#[derive(Debug, Clone)]
pub struct FontInfo {
    /// Base font name with any subset tag (`ABCDEF+`) removed
    pub base_font: String,
    pub ascent: f32,
    pub descent: f32,
    composite: bool,
    first_char: u32,
    widths: Vec<f32>,
    cid_widths: HashMap<u32, f32>,
    default_width: f32,
    to_unicode: Option<ToUnicode>,
}

impl FontInfo {
    /// Stand-in for a `Tf` that names a font missing from the resources
    pub fn fallback(resource_name: &[u8]) -> Self {
        Self {
            base_font: String::from_utf8_lossy(resource_name).into_owned(),
            ascent: DEFAULT_ASCENT,
            descent: DEFAULT_DESCENT,
            composite: false,
            first_char: 0,
            widths: Vec::new(),
            cid_widths: HashMap::new(),
            default_width: APPROX_CHAR_WIDTH_RATIO,
            to_unicode: None,
        }
    }

    pub fn load(doc: &Document, resource_name: &[u8], dict: &Dictionary) -> Self {
        let mut font = Self::fallback(resource_name);

        let subtype = get(doc, dict, b"Subtype").and_then(name_of);
        font.composite = subtype.as_deref() == Some("Type0");

        if let Some(name) = get(doc, dict, b"BaseFont").and_then(name_of) {
            font.base_font = strip_subset_tag(&name).to_string();
        } else if let Some(name) = get(doc, dict, b"Name").and_then(name_of) {
            font.base_font = name;
        }

        // Composite fonts keep metrics on the descendant CIDFont.
        let metrics_dict = if font.composite {
            descendant(doc, dict).unwrap_or(dict)
        } else {
            dict
        };

        if font.composite {
            font.default_width = get(doc, metrics_dict, b"DW")
                .and_then(number)
                .map_or(1.0, |w| w / 1000.0);
            if let Some(Object::Array(w)) = get(doc, metrics_dict, b"W") {
                font.cid_widths = parse_cid_widths(doc, w);
            }
        } else {
            font.first_char = get(doc, dict, b"FirstChar")
                .and_then(number)
                .map_or(0, |c| c.max(0.0) as u32);
            if let Some(Object::Array(w)) = get(doc, dict, b"Widths") {
                font.widths = w
                    .iter()
                    .map(|obj| number(resolve(doc, obj)).unwrap_or(0.0) / 1000.0)
                    .collect();
            }
        }

        if let Some(descriptor) = get(doc, metrics_dict, b"FontDescriptor")
            .and_then(|obj| resolve_dict(doc, obj))
        {
            if let Some(ascent) = get(doc, descriptor, b"Ascent").and_then(number) {
                if ascent > 0.0 {
                    font.ascent = ascent / 1000.0;
                }
            }
            if let Some(descent) = get(doc, descriptor, b"Descent").and_then(number) {
                if descent != 0.0 {
                    font.descent = -(descent.abs() / 1000.0);
                }
            }
            if !font.composite {
                if let Some(missing) = get(doc, descriptor, b"MissingWidth").and_then(number) {
                    if missing > 0.0 {
                        font.default_width = missing / 1000.0;
                    }
                }
            }
        }

        if let Some(Object::Stream(stream)) = get(doc, dict, b"ToUnicode") {
            if let Some(data) = stream_bytes(stream) {
                let cmap = ToUnicode::parse(&data);
                if !cmap.is_empty() {
                    font.to_unicode = Some(cmap);
                }
            }
        }

        font
    }

    /// Bytes per character code. Type0 fonts follow their ToUnicode source
    /// codes and default to two.
    fn code_len(&self) -> usize {
        if !self.composite {
            return 1;
        }
        self.to_unicode
            .as_ref()
            .and_then(ToUnicode::code_len)
            .filter(|len| (1..=4).contains(len))
            .unwrap_or(2)
    }

    fn width_of(&self, code: u32) -> f32 {
        if self.composite {
            return self
                .cid_widths
                .get(&code)
                .copied()
                .unwrap_or(self.default_width);
        }
        code.checked_sub(self.first_char)
            .and_then(|idx| self.widths.get(idx as usize))
            .copied()
            .filter(|w| *w > 0.0)
            .unwrap_or(self.default_width)
    }

    /// Split a shown string into glyphs
    pub fn decode(&self, bytes: &[u8]) -> Vec<Glyph> {
        bytes
            .chunks(self.code_len())
            .map(|chunk| {
                let code = chunk.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
                Glyph {
                    text: self.unicode_for(code),
                    width: self.width_of(code),
                    is_space: !self.composite && code == 32,
                }
            })
            .collect()
    }

    fn unicode_for(&self, code: u32) -> String {
        if let Some(text) = self.to_unicode.as_ref().and_then(|m| m.lookup(code)) {
            return text.to_string();
        }
        if self.composite {
            return char::from_u32(code)
                .filter(|c| !c.is_control())
                .unwrap_or(char::REPLACEMENT_CHARACTER)
                .to_string();
        }
        win_ansi(code as u8).to_string()
    }
}

/// The fonts reachable from one `/Resources` dictionary
#[derive(Debug, Clone, Default)]
pub struct FontTable {
    fonts: HashMap<Vec<u8>, FontInfo>,
}

impl FontTable {
    pub fn from_resources(doc: &Document, resources: Option<&Dictionary>) -> Self {
        let mut fonts = HashMap::new();
        let font_dict = resources
            .and_then(|res| get(doc, res, b"Font"))
            .and_then(|obj| resolve_dict(doc, obj));

        if let Some(font_dict) = font_dict {
            for (key, value) in font_dict.iter() {
                if let Some(dict) = resolve_dict(doc, value) {
                    fonts.insert(key.clone(), FontInfo::load(doc, key, dict));
                }
            }
        }

        Self { fonts }
    }

    pub fn get(&self, key: &[u8]) -> Option<&FontInfo> {
        self.fonts.get(key)
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

/// Remove a six-letter subset prefix such as `ABCDEF+`
pub fn strip_subset_tag(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest))
            if tag.len() == 6 && tag.chars().all(|c| c.is_ascii_uppercase()) =>
        {
            rest
        }
        _ => name,
    }
}

fn descendant<'a>(doc: &'a Document, dict: &'a Dictionary) -> Option<&'a Dictionary> {
    match get(doc, dict, b"DescendantFonts")? {
        Object::Array(arr) => arr.first().and_then(|obj| resolve_dict(doc, obj)),
        _ => None,
    }
}

/// Parse a CIDFont `/W` array: `c [w1 w2 ...]` or `c_first c_last w`
fn parse_cid_widths(doc: &Document, w: &[Object]) -> HashMap<u32, f32> {
    let mut widths = HashMap::new();
    let mut i = 0;

    while i < w.len() {
        let Some(first) = number(resolve(doc, &w[i])) else {
            i += 1;
            continue;
        };
        let first = first.max(0.0) as u32;

        match w.get(i + 1).map(|obj| resolve(doc, obj)) {
            Some(Object::Array(list)) => {
                for (offset, obj) in list.iter().enumerate() {
                    if let Some(width) = number(obj) {
                        widths.insert(first + offset as u32, width / 1000.0);
                    }
                }
                i += 2;
            }
            Some(last) => {
                let last = number(last).map_or(first, |l| l.max(0.0) as u32);
                let width = w.get(i + 2).and_then(number).unwrap_or(1000.0) / 1000.0;
                if last >= first && last - first <= 0xFFFF {
                    for cid in first..=last {
                        widths.insert(cid, width);
                    }
                }
                i += 3;
            }
            None => break,
        }
    }

    widths
}

/// WinAnsiEncoding, which differs from Latin-1 only in 0x80..=0x9F
fn win_ansi(byte: u8) -> char {
    match byte {
        0x80 => '€',
        0x85 => '…',
        0x91 => '‘',
        0x92 => '’',
        0x93 => '“',
        0x94 => '”',
        0x95 => '•',
        0x96 => '–',
        0x97 => '—',
        0x99 => '™',
        b => b as char,
    }
}
