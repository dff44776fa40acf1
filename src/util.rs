//! Input decoding and entity helpers.

use std::borrow::Cow;

use encoding_rs::{DecoderResult, Encoding, UTF_8};
use memchr::memchr;
use quick_xml::escape::resolve_html5_entity;

use crate::error::{Error, Result};

/// Decode raw input bytes to a string, rejecting malformed sequences.
///
/// This function:
/// 1. Detects a UTF-8, UTF-16LE or UTF-16BE byte-order mark (and strips it)
/// 2. Defaults to UTF-8 when there is no BOM
/// 3. Decodes without replacement characters
///
/// # Errors
///
/// Returns [`Error::InvalidEncoding`] pointing at the line of the first
/// undecodable byte sequence.
///
/// # Examples
///
/// ```
/// use hamlize::util::decode_input;
///
/// assert_eq!(decode_input(b"\xEF\xBB\xBF<p>hi</p>").unwrap(), "<p>hi</p>");
///
/// let err = decode_input(b"foo\nbar\nb\xFEaz").unwrap_err();
/// assert_eq!(err.line(), Some(3));
/// ```
pub fn decode_input(bytes: &[u8]) -> Result<String> {
    let (encoding, bom_len) = Encoding::for_bom(bytes).unwrap_or((UTF_8, 0));
    let input = &bytes[bom_len..];

    let mut decoder = encoding.new_decoder_without_bom_handling();
    let capacity = decoder
        .max_utf8_buffer_length_without_replacement(input.len())
        .unwrap_or(input.len());
    let mut output = String::with_capacity(capacity);
    let mut pos = 0;

    loop {
        let (result, read) =
            decoder.decode_to_string_without_replacement(&input[pos..], &mut output, true);
        pos += read;
        match result {
            DecoderResult::InputEmpty => return Ok(output),
            DecoderResult::OutputFull => {
                output.reserve(input.len() - pos + 16);
            }
            DecoderResult::Malformed(bad, after) => {
                let end = pos - after as usize;
                let start = end.saturating_sub(bad as usize);
                let line = memchr::memchr_iter(b'\n', output.as_bytes()).count() + 1;
                return Err(Error::InvalidEncoding {
                    line,
                    message: format!(
                        "Invalid {} character {}",
                        encoding.name(),
                        dump_bytes(&input[start..end])
                    ),
                });
            }
        }
    }
}

/// Render bytes as a double-quoted escape sequence, e.g. `"\xFE"`.
pub fn dump_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 4 + 2);
    out.push('"');
    for b in bytes {
        out.push_str(&format!("\\x{:02X}", b));
    }
    out.push('"');
    out
}

/// Decode the HTML entities that survive parsing of marker and filter text.
///
/// Unknown entities are left untouched.
pub fn unescape_entities(text: &str) -> Cow<'_, str> {
    let bytes = text.as_bytes();
    let Some(first) = memchr(b'&', bytes) else {
        return Cow::Borrowed(text);
    };

    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..first]);
    let mut rest = &text[first..];

    while let Some(amp) = memchr(b'&', rest.as_bytes()) {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let resolved = memchr(b';', rest.as_bytes())
            .filter(|&semi| semi > 1 && semi <= 32)
            .and_then(|semi| resolve_entity(&rest[1..semi]).map(|text| (text, semi)));

        match resolved {
            Some((text, semi)) => {
                out.push_str(&text);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);

    Cow::Owned(out)
}

/// Resolve an entity name (without `&` and `;`) to its text.
///
/// Numeric references and every named HTML5 entity are known.
///
/// # Examples
///
/// ```
/// use hamlize::util::resolve_entity;
///
/// assert_eq!(resolve_entity("copy").as_deref(), Some("\u{a9}"));
/// assert_eq!(resolve_entity("#x41").as_deref(), Some("A"));
/// assert_eq!(resolve_entity("bogus"), None);
/// ```
pub fn resolve_entity(entity: &str) -> Option<Cow<'static, str>> {
    let Some(number) = entity.strip_prefix('#') else {
        return resolve_html5_entity(entity).map(Cow::Borrowed);
    };

    let code = match number.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => number.parse::<u32>().ok()?,
    };
    char::from_u32(code).map(|c| Cow::Owned(c.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_utf8() {
        assert_eq!(decode_input(b"<p>caf\xC3\xA9</p>").unwrap(), "<p>café</p>");
    }

    #[test]
    fn test_decode_strips_utf8_bom() {
        assert_eq!(decode_input(b"\xEF\xBB\xBFfoo").unwrap(), "foo");
    }

    #[test]
    fn test_decode_utf16le_with_bom() {
        let bytes = [0xFF, 0xFE, b'h', 0, b'i', 0];
        assert_eq!(decode_input(&bytes).unwrap(), "hi");
    }

    #[test]
    fn test_invalid_utf8_reports_line() {
        let err = decode_input(b"foo\nbar\nb\xFEaz").unwrap_err();
        match err {
            Error::InvalidEncoding { line, message } => {
                assert_eq!(line, 3);
                assert_eq!(message, "Invalid UTF-8 character \"\\xFE\"");
            }
            other => panic!("Expected InvalidEncoding, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_utf16_reports_line() {
        // "foo\nbar\nb" followed by a lone low surrogate
        let mut bytes = vec![0xFF, 0xFE];
        for c in "foo\nbar\nb".encode_utf16() {
            bytes.extend_from_slice(&c.to_le_bytes());
        }
        bytes.extend_from_slice(&[0x00, 0xDC]);
        bytes.extend_from_slice(&[b'z', 0]);

        let err = decode_input(&bytes).unwrap_err();
        assert_eq!(err.line(), Some(3));
        assert!(err.to_string().contains("Invalid UTF-16LE character"));
    }

    #[test]
    fn test_unescape_entities() {
        assert_eq!(unescape_entities("3 &lt; 5 &amp;&amp; x"), "3 < 5 && x");
        assert_eq!(unescape_entities("&#65;&#x42;"), "AB");
        assert_eq!(unescape_entities("no entities"), "no entities");
    }

    #[test]
    fn test_unescape_named_html5_entities() {
        assert_eq!(
            unescape_entities("&copy; 2024 &mdash; more&hellip;"),
            "\u{a9} 2024 \u{2014} more\u{2026}"
        );
        assert_eq!(unescape_entities("&CounterClockwiseContourIntegral;"), "\u{2233}");
    }

    #[test]
    fn test_unescape_leaves_unknown_entities() {
        assert_eq!(unescape_entities("a &bogus; b & c"), "a &bogus; b & c");
        assert_eq!(unescape_entities("&;"), "&;");
    }

    #[test]
    fn test_dump_bytes() {
        assert_eq!(dump_bytes(&[0xFE, 0x01]), "\"\\xFE\\x01\"");
    }
}
