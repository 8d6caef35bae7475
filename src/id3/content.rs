//! Frame content decoding.
//!
//! One decoder per frame category. Content decoders never fail: a missing
//! terminator or a short buffer degrades to empty fields, and they only ever
//! look at the frame's own content slice, so they cannot cross the frame
//! boundary.

use super::frame::FrameId;

/// Text encoding selector carried in the first byte of text-bearing frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// Single-byte Latin-1/ASCII-compatible text.
    Latin1,
    /// Two-byte little-endian code units, optionally led by a BOM.
    Utf16Le,
}

impl TextEncoding {
    /// Encoding byte 1 selects UTF-16LE; every other value falls back to
    /// Latin-1 rather than failing.
    pub fn from_byte(byte: u8) -> Self {
        if byte == 1 { Self::Utf16Le } else { Self::Latin1 }
    }

    /// Width of this encoding's null terminator in bytes.
    fn terminator_width(self) -> usize {
        match self {
            Self::Latin1 => 1,
            Self::Utf16Le => 2,
        }
    }
}

/// Decoded frame content, keyed by the identifier's category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameContent {
    /// Single-value text frame (title, performer, album, ...).
    Text(String),
    /// COMM frame.
    Comment(Comment),
    /// GEOB frame.
    EncapsulatedObject(EncapsulatedObject),
    /// PRIV frame.
    Private(Private),
    /// Any unrecognized identifier, passed through uninterpreted.
    Raw(Vec<u8>),
}

/// COMM: a free-text comment in a given language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Three-character language code.
    pub language: String,
    pub short_description: String,
    pub full_text: String,
}

/// GEOB: an arbitrary file embedded in the tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncapsulatedObject {
    pub mime_type: String,
    pub filename: String,
    pub description: String,
    pub payload: Vec<u8>,
}

/// PRIV: owner-identified opaque data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Private {
    pub owner: String,
    pub payload: Vec<u8>,
}

impl FrameContent {
    /// Decodes raw frame content according to the identifier's category.
    ///
    /// Unrecognized identifiers come back as [`FrameContent::Raw`]; an
    /// unknown frame type is not an error.
    pub fn decode(id: FrameId, content: Vec<u8>) -> Self {
        match id.as_bytes() {
            // Single-value text frames: title, performers, album, content
            // type, composer, track/part numbers, year, copyright, publisher.
            b"TIT2" | b"TPE1" | b"TALB" | b"TCON" | b"TCOM" | b"TPE3" | b"TRCK" | b"TYER"
            | b"TPE2" | b"TCOP" | b"TPOS" | b"TPE4" | b"TPUB" => decode_text_frame(&content),
            b"COMM" => decode_comment(&content),
            b"GEOB" => decode_encapsulated_object(&content),
            b"PRIV" => decode_private(&content),
            _ => Self::Raw(content),
        }
    }
}

/// `[encoding:1][text:rest]`
fn decode_text_frame(content: &[u8]) -> FrameContent {
    let Some((&encoding, text)) = content.split_first() else {
        return FrameContent::Text(String::new());
    };
    FrameContent::Text(decode_text(TextEncoding::from_byte(encoding), text))
}

/// `[encoding:1][language:3][short_desc NUL full_text]`
fn decode_comment(content: &[u8]) -> FrameContent {
    let (&encoding, rest) = content.split_first().unwrap_or((&0, &[]));
    let lang_len = rest.len().min(3);
    let language = latin1_to_string(&rest[..lang_len]);

    let text = decode_text(TextEncoding::from_byte(encoding), &rest[lang_len..]);
    let (short_description, full_text) = match text.split_once('\0') {
        Some((short, full)) => (short.to_owned(), full.to_owned()),
        None => (text, String::new()),
    };

    FrameContent::Comment(Comment {
        language,
        short_description,
        full_text,
    })
}

/// `[encoding:1][mime NUL][filename term][description term][payload]`
///
/// The MIME type is always Latin-1; filename and description follow the
/// declared encoding.
fn decode_encapsulated_object(content: &[u8]) -> FrameContent {
    let (&encoding, rest) = content.split_first().unwrap_or((&0, &[]));
    let encoding = TextEncoding::from_byte(encoding);

    let (mime_type, offset) = read_terminated(TextEncoding::Latin1, rest, 0);
    let (filename, offset) = read_terminated(encoding, rest, offset);
    let (description, offset) = read_terminated(encoding, rest, offset);

    FrameContent::EncapsulatedObject(EncapsulatedObject {
        mime_type,
        filename,
        description,
        payload: rest[offset..].to_vec(),
    })
}

/// `[owner NUL][payload]`. No encoding byte; the owner is always ASCII.
fn decode_private(content: &[u8]) -> FrameContent {
    let (owner, offset) = read_terminated(TextEncoding::Latin1, content, 0);
    FrameContent::Private(Private {
        owner,
        payload: content[offset..].to_vec(),
    })
}

/// Decodes `bytes` per `encoding`, stripping a leading BOM for the two-byte
/// encoding.
pub(super) fn decode_text(encoding: TextEncoding, bytes: &[u8]) -> String {
    match encoding {
        TextEncoding::Latin1 => latin1_to_string(bytes),
        TextEncoding::Utf16Le => utf16le_to_string(bytes),
    }
}

/// Scans from `offset` for the encoding-appropriate terminator and returns
/// the decoded field plus the offset just past the terminator.
///
/// A missing terminator decodes the remainder and leaves the offset at the
/// end of the buffer, so any following fields come back empty.
fn read_terminated(encoding: TextEncoding, bytes: &[u8], offset: usize) -> (String, usize) {
    if offset >= bytes.len() {
        return (String::new(), bytes.len());
    }

    let width = encoding.terminator_width();
    let mut end = offset;
    while end + width <= bytes.len() {
        if bytes[end..end + width].iter().all(|&b| b == 0) {
            return (decode_text(encoding, &bytes[offset..end]), end + width);
        }
        end += width;
    }
    (decode_text(encoding, &bytes[offset..]), bytes.len())
}

fn latin1_to_string(bytes: &[u8]) -> String {
    // Latin-1 maps byte-for-byte onto the first 256 code points.
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn utf16le_to_string(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    let text = String::from_utf16_lossy(&units);
    match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_owned(),
        None => text,
    }
}
