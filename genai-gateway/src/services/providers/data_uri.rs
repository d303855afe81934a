//! Extraction of inline `data:image/<subtype>;base64,<payload>` images from
//! free-form provider text.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;

const PREFIX: &str = "data:image/";
const SEPARATOR: &str = ";base64,";

/// Standard alphabet, padding optional. Providers are inconsistent about `=`.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A data URI located inside a larger text, borrowed from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUriImage<'a> {
    /// Everything between `data:image/` and `;base64,`, e.g. `png`.
    pub mime_subtype: &'a str,
    /// The run of base64 alphabet characters after the separator.
    pub payload: &'a str,
}

impl DataUriImage<'_> {
    pub fn mime_type(&self) -> String {
        format!("image/{}", self.mime_subtype)
    }

    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        decode_base64(self.payload)
    }
}

/// Find the first well-formed data URI image in `text`.
///
/// Every occurrence of `data:image/` is tried in order. A candidate is
/// accepted when a non-empty subtype without `;` is followed by `;base64,`
/// and at least one base64 character. Candidates failing any step are
/// skipped. When several images are embedded only the first is returned.
pub fn find_data_uri_image(text: &str) -> Option<DataUriImage<'_>> {
    text.match_indices(PREFIX)
        .find_map(|(start, _)| parse_candidate(&text[start + PREFIX.len()..]))
}

fn parse_candidate(rest: &str) -> Option<DataUriImage<'_>> {
    // The subtype runs up to the first ';', which must open the separator.
    let subtype_len = rest.find(';')?;
    if subtype_len == 0 {
        return None;
    }
    let (mime_subtype, tail) = rest.split_at(subtype_len);
    let tail = tail.strip_prefix(SEPARATOR)?;

    let payload_len = tail.bytes().take_while(|b| is_base64_byte(*b)).count();
    if payload_len == 0 {
        return None;
    }

    Some(DataUriImage {
        mime_subtype,
        payload: &tail[..payload_len],
    })
}

fn is_base64_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'=')
}

/// Decode a base64 payload, tolerating missing padding.
pub fn decode_base64(payload: &str) -> Result<Vec<u8>, base64::DecodeError> {
    LENIENT_BASE64.decode(payload)
}

/// Decode caller-supplied image data given either as a full data URI or as a
/// bare base64 string.
pub fn decode_image_data(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let input = input.trim();
    match find_data_uri_image(input) {
        Some(uri) if input.starts_with("data:") => uri.decode(),
        _ => decode_base64(input),
    }
}
