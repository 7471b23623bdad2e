//! Encode/decode pairs over the canonical 16-byte payload.
//!
//! Every pair is a pure function; options such as padding or wrapping are
//! passed in by the caller. Decoders distinguish wrong-length input from
//! alphabet or structure violations.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use std::fmt;

use crate::uuid::UuidError;

/// Canonical payload width in bytes.
pub const PAYLOAD_LEN: usize = 16;

const URN_PREFIX: &[u8] = b"urn:uuid:";
const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";
const A85_OPEN: &[u8] = b"<~";
const A85_CLOSE: &[u8] = b"~>";

/// Textual forms understood by the codec layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Hex,
    Urn,
    B64,
    B32,
    A85,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hex => "hex",
            Self::Urn => "URN",
            Self::B64 => "base 64",
            Self::B32 => "base 32",
            Self::A85 => "ASCII 85",
        })
    }
}

fn payload(raw: &[u8], encoding: Encoding) -> Result<[u8; PAYLOAD_LEN], UuidError> {
    raw.try_into().map_err(|_| UuidError::Malformed {
        encoding,
        detail: "decoded payload is not 16 bytes",
    })
}

/// Canonical `8-4-4-4-12` lowercase hex form.
pub fn encode_hex(bytes: &[u8; PAYLOAD_LEN]) -> String {
    format!(
        "{}-{}-{}-{}-{}",
        hex::encode(&bytes[0..4]),
        hex::encode(&bytes[4..6]),
        hex::encode(&bytes[6..8]),
        hex::encode(&bytes[8..10]),
        hex::encode(&bytes[10..16]),
    )
}

/// `urn:uuid:` form over the canonical hex.
pub fn encode_urn(bytes: &[u8; PAYLOAD_LEN]) -> String {
    format!("urn:uuid:{}", encode_hex(bytes))
}

/// Decodes the canonical hex form, with or without a case-insensitive
/// `urn:uuid:` prefix. Hyphens must sit at offsets 8, 13, 18, and 23.
pub fn decode_hex(s: &str) -> Result<[u8; PAYLOAD_LEN], UuidError> {
    let b = s.as_bytes();
    let b = match b.len() {
        45 => {
            if !b[..URN_PREFIX.len()].eq_ignore_ascii_case(URN_PREFIX) {
                return Err(UuidError::Malformed {
                    encoding: Encoding::Urn,
                    detail: "missing urn:uuid: prefix",
                });
            }
            &b[URN_PREFIX.len()..]
        }
        36 => b,
        n => {
            return Err(UuidError::WrongLength {
                encoding: Encoding::Hex,
                len: n,
            });
        }
    };
    if b[8] != b'-' || b[13] != b'-' || b[18] != b'-' || b[23] != b'-' {
        return Err(UuidError::Malformed {
            encoding: Encoding::Hex,
            detail: "hyphens out of position",
        });
    }
    let mut digits = Vec::with_capacity(2 * PAYLOAD_LEN);
    for (i, &c) in b.iter().enumerate() {
        if !matches!(i, 8 | 13 | 18 | 23) {
            digits.push(c);
        }
    }
    let raw = hex::decode(&digits).map_err(|_| UuidError::Malformed {
        encoding: Encoding::Hex,
        detail: "invalid hex digit",
    })?;
    payload(&raw, Encoding::Hex)
}

/// Standard Base64, optionally padded.
pub fn encode_b64(bytes: &[u8; PAYLOAD_LEN], pad: bool) -> String {
    let mut s = BASE64_STANDARD.encode(bytes);
    if !pad {
        s.truncate(22);
    }
    s
}

/// URL-safe Base64: standard form with `+`/`/` substituted and padding
/// dropped.
pub fn encode_url64(bytes: &[u8; PAYLOAD_LEN]) -> String {
    b64_to_url64(&BASE64_STANDARD.encode(bytes))
}

/// Decodes standard or URL-safe Base64 (22 unpadded or 24 padded chars).
///
/// URL-safe substitutions are reversed and `==` padding restored before
/// delegating to the standard alphabet.
pub fn decode_b64(s: &str) -> Result<[u8; PAYLOAD_LEN], UuidError> {
    let mut s = url64_to_b64(s);
    if s.len() == 22 {
        s.push_str("==");
    }
    if s.len() != 24 {
        return Err(UuidError::WrongLength {
            encoding: Encoding::B64,
            len: s.len(),
        });
    }
    let raw = BASE64_STANDARD
        .decode(s.as_bytes())
        .map_err(|_| UuidError::Malformed {
            encoding: Encoding::B64,
            detail: "invalid base 64 character",
        })?;
    payload(&raw, Encoding::B64)
}

/// Standard Base32, optionally padded to the 32-char boundary.
pub fn encode_b32(bytes: &[u8; PAYLOAD_LEN], pad: bool) -> String {
    let mut out = String::with_capacity(32);
    let mut acc: u32 = 0;
    let mut acc_bits = 0u32;
    for &b in bytes {
        acc = (acc << 8) | u32::from(b);
        acc_bits += 8;
        while acc_bits >= 5 {
            acc_bits -= 5;
            out.push(BASE32_ALPHABET[((acc >> acc_bits) & 0x1f) as usize] as char);
        }
    }
    if acc_bits > 0 {
        out.push(BASE32_ALPHABET[((acc << (5 - acc_bits)) & 0x1f) as usize] as char);
    }
    if pad {
        while out.len() % 8 != 0 {
            out.push('=');
        }
    }
    out
}

/// URL-safe Base32: unpadded, optionally hyphenated every four characters.
pub fn encode_url32(bytes: &[u8; PAYLOAD_LEN], hyphenate_groups: bool) -> String {
    let s = encode_b32(bytes, false);
    if hyphenate_groups { hyphenate(&s, 4) } else { s }
}

/// Decodes standard or URL-safe Base32. Hyphens, spaces, and padding are
/// ignored and case is not significant; 26 data characters must remain.
pub fn decode_b32(s: &str) -> Result<[u8; PAYLOAD_LEN], UuidError> {
    let cleaned: Vec<u8> = s
        .bytes()
        .filter(|&c| c != b'-' && c != b' ' && c != b'=')
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if cleaned.len() != 26 {
        return Err(UuidError::WrongLength {
            encoding: Encoding::B32,
            len: cleaned.len(),
        });
    }
    let mut out = Vec::with_capacity(PAYLOAD_LEN);
    let mut acc: u32 = 0;
    let mut acc_bits = 0u32;
    for &c in &cleaned {
        let val = BASE32_ALPHABET
            .iter()
            .position(|&a| a == c)
            .ok_or(UuidError::Malformed {
                encoding: Encoding::B32,
                detail: "invalid base 32 character",
            })? as u32;
        acc = (acc << 5) | val;
        acc_bits += 5;
        if acc_bits >= 8 {
            acc_bits -= 8;
            out.push((acc >> acc_bits) as u8);
        }
    }
    payload(&out, Encoding::B32)
}

/// Fixed 20-character ASCII-85 form, optionally framed with `<~ ~>`.
///
/// The all-zero group shorthand is never emitted, so every payload encodes
/// to the same width.
pub fn encode_a85(bytes: &[u8; PAYLOAD_LEN], wrap: bool) -> String {
    let mut out = String::with_capacity(24);
    if wrap {
        out.push_str("<~");
    }
    for chunk in bytes.chunks_exact(4) {
        let mut group = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        let mut digits = [0u8; 5];
        for d in digits.iter_mut().rev() {
            *d = (group % 85) as u8;
            group /= 85;
        }
        for d in digits {
            out.push((b'!' + d) as char);
        }
    }
    if wrap {
        out.push_str("~>");
    }
    out
}

/// Decodes the 20-character ASCII-85 form, stripping `<~ ~>` framing when
/// both delimiters are present.
pub fn decode_a85(s: &str) -> Result<[u8; PAYLOAD_LEN], UuidError> {
    let b = s.as_bytes();
    let b = if b.len() == 24 {
        if !(b.starts_with(A85_OPEN) && b.ends_with(A85_CLOSE)) {
            return Err(UuidError::Malformed {
                encoding: Encoding::A85,
                detail: "missing <~ ~> frame",
            });
        }
        &b[A85_OPEN.len()..b.len() - A85_CLOSE.len()]
    } else {
        b
    };
    if b.len() != 20 {
        return Err(UuidError::WrongLength {
            encoding: Encoding::A85,
            len: b.len(),
        });
    }
    let mut out = [0u8; PAYLOAD_LEN];
    for (chunk, slot) in b.chunks_exact(5).zip(out.chunks_exact_mut(4)) {
        let mut group: u32 = 0;
        for &c in chunk {
            if !(b'!'..=b'u').contains(&c) {
                return Err(UuidError::Malformed {
                    encoding: Encoding::A85,
                    detail: "character outside ASCII 85 alphabet",
                });
            }
            group = group
                .checked_mul(85)
                .and_then(|g| g.checked_add(u32::from(c - b'!')))
                .ok_or(UuidError::Malformed {
                    encoding: Encoding::A85,
                    detail: "group overflows 32 bits",
                })?;
        }
        slot.copy_from_slice(&group.to_be_bytes());
    }
    Ok(out)
}

/// Converts a standard Base64 string to its URL-safe counterpart.
pub fn b64_to_url64(s: &str) -> String {
    s.chars()
        .filter_map(|c| match c {
            '+' => Some('-'),
            '/' => Some('_'),
            '=' => None,
            c => Some(c),
        })
        .collect()
}

/// Restores URL-safe substitutions back to the standard Base64 alphabet.
pub fn url64_to_b64(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect()
}

/// Inserts a hyphen after every `n` characters.
pub fn hyphenate(s: &str, n: usize) -> String {
    if n == 0 {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + s.len() / n);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && i % n == 0 {
            out.push('-');
        }
        out.push(c);
    }
    out
}
