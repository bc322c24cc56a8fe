//! ToUnicode CMap parsing
//!
//! Only the `bfchar` and `bfrange` sections matter for text extraction;
//! everything else in the CMap program is skipped.

use std::collections::HashMap;

/// Code → Unicode mapping read from a font's `/ToUnicode` stream
#[derive(Debug, Clone, Default)]
pub struct ToUnicode {
    map: HashMap<u32, String>,
    /// Source code width in bytes, taken from the first mapping seen
    code_len: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Hex(Vec<u8>),
    ArrayStart,
    ArrayEnd,
    Word(String),
}

impl ToUnicode {
    pub fn parse(data: &[u8]) -> Self {
        let tokens = tokenize(data);
        let mut cmap = ToUnicode::default();
        let mut i = 0;

        while i < tokens.len() {
            match &tokens[i] {
                Token::Word(w) if w == "beginbfchar" => {
                    i = cmap.read_bfchar(&tokens, i + 1);
                }
                Token::Word(w) if w == "beginbfrange" => {
                    i = cmap.read_bfrange(&tokens, i + 1);
                }
                _ => i += 1,
            }
        }

        cmap
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn code_len(&self) -> Option<usize> {
        self.code_len
    }

    pub fn lookup(&self, code: u32) -> Option<&str> {
        self.map.get(&code).map(String::as_str)
    }

    fn insert(&mut self, src: &[u8], code: u32, text: String) {
        if self.code_len.is_none() && !src.is_empty() {
            self.code_len = Some(src.len());
        }
        self.map.insert(code, text);
    }

    fn read_bfchar(&mut self, tokens: &[Token], mut i: usize) -> usize {
        while i + 1 < tokens.len() {
            match (&tokens[i], &tokens[i + 1]) {
                (Token::Hex(src), Token::Hex(dst)) => {
                    self.insert(src, code_of(src), utf16be(dst));
                    i += 2;
                }
                (Token::Word(w), _) if w == "endbfchar" => return i + 1,
                _ => i += 1,
            }
        }
        tokens.len()
    }

    fn read_bfrange(&mut self, tokens: &[Token], mut i: usize) -> usize {
        while i < tokens.len() {
            if matches!(&tokens[i], Token::Word(w) if w == "endbfrange") {
                return i + 1;
            }
            let (Some(Token::Hex(lo)), Some(Token::Hex(hi))) = (tokens.get(i), tokens.get(i + 1))
            else {
                i += 1;
                continue;
            };
            let (start, end) = (code_of(lo), code_of(hi));
            if end < start || end - start > MAX_RANGE {
                i += 2;
                continue;
            }

            match tokens.get(i + 2) {
                Some(Token::Hex(dst)) => {
                    let mut units = to_units(dst);
                    for code in start..=end {
                        self.insert(lo, code, String::from_utf16_lossy(&units));
                        if let Some(last) = units.last_mut() {
                            *last = last.wrapping_add(1);
                        }
                    }
                    i += 3;
                }
                Some(Token::ArrayStart) => {
                    let mut j = i + 3;
                    let mut code = start;
                    while let Some(Token::Hex(dst)) = tokens.get(j) {
                        if code <= end {
                            self.insert(lo, code, utf16be(dst));
                        }
                        code = code.saturating_add(1);
                        j += 1;
                    }
                    if matches!(tokens.get(j), Some(Token::ArrayEnd)) {
                        j += 1;
                    }
                    i = j;
                }
                _ => i += 2,
            }
        }
        tokens.len()
    }
}

/// Ranges wider than this are treated as corrupt
const MAX_RANGE: u32 = 0xFFFF;

fn code_of(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .take(4)
        .fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
}

fn to_units(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks(2)
        .map(|pair| match pair {
            [hi, lo] => u16::from_be_bytes([*hi, *lo]),
            [single] => u16::from(*single),
            _ => 0,
        })
        .collect()
}

fn utf16be(bytes: &[u8]) -> String {
    String::from_utf16_lossy(&to_units(bytes))
}

fn tokenize(data: &[u8]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < data.len() {
        let byte = data[i];
        match byte {
            b'%' => {
                while i < data.len() && data[i] != b'\n' && data[i] != b'\r' {
                    i += 1;
                }
            }
            b'<' if data.get(i + 1) == Some(&b'<') => {
                i += 2;
            }
            b'>' if data.get(i + 1) == Some(&b'>') => {
                i += 2;
            }
            b'<' => {
                let start = i + 1;
                let end = data[start..]
                    .iter()
                    .position(|&b| b == b'>')
                    .map_or(data.len(), |p| start + p);
                tokens.push(Token::Hex(decode_hex(&data[start..end])));
                i = end + 1;
            }
            b'[' => {
                tokens.push(Token::ArrayStart);
                i += 1;
            }
            b']' => {
                tokens.push(Token::ArrayEnd);
                i += 1;
            }
            b if b.is_ascii_whitespace() => i += 1,
            _ => {
                let start = i;
                while i < data.len() && !is_delimiter(data[i]) {
                    i += 1;
                }
                if i == start {
                    i += 1;
                    continue;
                }
                tokens.push(Token::Word(
                    String::from_utf8_lossy(&data[start..i]).into_owned(),
                ));
            }
        }
    }

    tokens
}

fn is_delimiter(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'<' | b'>' | b'[' | b']' | b'%' | b'(' | b')')
}

fn decode_hex(raw: &[u8]) -> Vec<u8> {
    let digits: Vec<u8> = raw
        .iter()
        .filter_map(|&b| (b as char).to_digit(16).map(|d| d as u8))
        .collect();
    digits
        .chunks(2)
        .map(|pair| match pair {
            [hi, lo] => (hi << 4) | lo,
            [hi] => hi << 4,
            _ => 0,
        })
        .collect()
}
