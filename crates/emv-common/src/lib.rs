//! EMV Common - TLV lookup and Track 2 decoding for EMV card data

pub mod track2;

pub use track2::{Expiry, PanRecord, Track2, Track2Error};

/// Simple TLV (Tag-Length-Value) lookup for EMV record data
///
/// Walks `data` as a flat run of single-byte tag, single-byte length, value
/// triples and returns the value of the first triple whose tag matches.
/// Constructed templates are not descended into, and the length byte is taken
/// literally (0x81/0x82 long-form prefixes are not interpreted).
///
/// # Arguments
/// * `data` - The EMV-encoded data to search
/// * `tag` - The single-byte tag to search for
///
/// # Returns
/// * `Some(&[u8])` - The value bytes if the tag is found
/// * `None` - If the tag is absent or its value runs past the end of `data`
pub fn find_tlv(data: &[u8], tag: u8) -> Option<&[u8]> {
    let mut i = 0;
    while i + 1 < data.len() {
        let current_tag = data[i];
        let len = data[i + 1] as usize;
        i += 2;

        if current_tag == tag && i + len <= data.len() {
            return Some(&data[i..i + len]);
        }

        i += len;
    }
    None
}

/// Tags read by the record scanner
pub mod tags {
    /// Application Identifier (AID), carried in the PSE directory
    pub const APPLICATION_IDENTIFIER: u8 = 0x4F;
    /// Track 2 Equivalent Data, carried in application records
    pub const TRACK_2_EQUIVALENT_DATA: u8 = 0x57;
}

/// Get a human-readable name for a tag
pub fn get_tag_name(tag: u8) -> &'static str {
    match tag {
        tags::APPLICATION_IDENTIFIER => "Application Identifier (AID)",
        tags::TRACK_2_EQUIVALENT_DATA => "Track 2 Equivalent Data",
        _ => "Unknown Tag",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_tlv_simple() {
        let data = &[0x4F, 0x02, 0xA0, 0x00];
        assert_eq!(find_tlv(data, 0x4F), Some(&[0xA0, 0x00][..]));
    }

    #[test]
    fn test_find_tlv_skips_earlier_triples() {
        // 50 "VISA", then 4F with a 7-byte AID
        let data = &[
            0x50, 0x04, b'V', b'I', b'S', b'A', 0x4F, 0x07, 0xA0, 0x00, 0x00, 0x00, 0x03, 0x10,
            0x10,
        ];
        assert_eq!(
            find_tlv(data, 0x4F),
            Some(&[0xA0, 0x00, 0x00, 0x00, 0x03, 0x10, 0x10][..])
        );
    }

    #[test]
    fn test_find_tlv_returns_first_match() {
        let data = &[0x57, 0x01, 0x11, 0x57, 0x01, 0x22];
        assert_eq!(find_tlv(data, 0x57), Some(&[0x11][..]));
    }

    #[test]
    fn test_find_tlv_not_found() {
        let data = &[0x8F, 0x01, 0x05];
        assert_eq!(find_tlv(data, 0x90), None);
    }

    #[test]
    fn test_find_tlv_empty_and_single_byte() {
        assert_eq!(find_tlv(&[], 0x4F), None);
        assert_eq!(find_tlv(&[0x4F], 0x4F), None);
    }

    #[test]
    fn test_find_tlv_trailing_header_byte() {
        // A lone tag byte after a complete triple is not a header
        let data = &[0x50, 0x01, 0x41, 0x4F];
        assert_eq!(find_tlv(data, 0x4F), None);
    }

    #[test]
    fn test_find_tlv_value_overruns_buffer() {
        let data = &[0x57, 0x05, 0x41, 0x11];
        assert_eq!(find_tlv(data, 0x57), None);
    }

    #[test]
    fn test_find_tlv_zero_length_value() {
        let data = &[0x4F, 0x00, 0x57, 0x01, 0x99];
        assert_eq!(find_tlv(data, 0x4F), Some(&[][..]));
        assert_eq!(find_tlv(data, 0x57), Some(&[0x99][..]));
    }

    #[test]
    fn test_find_tlv_long_form_length_is_literal() {
        // 0x81 is taken as a 129-byte length, which overruns
        let data = &[0x57, 0x81, 0x01, 0xAA];
        assert_eq!(find_tlv(data, 0x57), None);
    }

    #[test]
    fn test_find_tlv_does_not_descend_into_templates() {
        // Record template 70 wrapping a 57
        let data = &[0x70, 0x03, 0x57, 0x01, 0x41];
        assert_eq!(find_tlv(data, 0x57), None);
        let inner = find_tlv(data, 0x70).unwrap();
        assert_eq!(find_tlv(inner, 0x57), Some(&[0x41][..]));
    }

    #[test]
    fn test_find_tlv_is_repeatable() {
        let data = &[0x4F, 0x01, 0x07];
        assert_eq!(find_tlv(data, 0x4F), find_tlv(data, 0x4F));
    }

    #[test]
    fn test_tag_names() {
        assert_eq!(get_tag_name(0x57), "Track 2 Equivalent Data");
        assert_eq!(get_tag_name(0x4F), "Application Identifier (AID)");
        assert_eq!(get_tag_name(0x9F), "Unknown Tag");
    }
}
