//! TLV8 encoding/decoding for pairing messages.
//!
//! TLV8 format: [Type: 1 byte][Length: 1 byte][Value: 0-255 bytes]
//! Values longer than 255 bytes are fragmented across consecutive records
//! with the same type; the final fragment is the first with length < 255.
//!
//! Items are kept in insertion order and duplicate types are allowed, so
//! output bytes follow input order exactly.

use devicepair_core::TlvError;

/// TLV type constants for Pair-Setup messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TlvType {
    Method = 0x00,
    Identifier = 0x01,
    Salt = 0x02,
    PublicKey = 0x03,
    Proof = 0x04,
    EncryptedData = 0x05,
    State = 0x06,
    Error = 0x07,
    RetryDelay = 0x08,
    Certificate = 0x09,
    Signature = 0x0A,
    Permissions = 0x0B,
    FragmentData = 0x0C,
    FragmentLast = 0x0D,
    SessionId = 0x0E,
    Flags = 0x13,
    Separator = 0xFF,
}

impl TlvType {
    /// Convert from raw byte.
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x00 => Some(Self::Method),
            0x01 => Some(Self::Identifier),
            0x02 => Some(Self::Salt),
            0x03 => Some(Self::PublicKey),
            0x04 => Some(Self::Proof),
            0x05 => Some(Self::EncryptedData),
            0x06 => Some(Self::State),
            0x07 => Some(Self::Error),
            0x08 => Some(Self::RetryDelay),
            0x09 => Some(Self::Certificate),
            0x0A => Some(Self::Signature),
            0x0B => Some(Self::Permissions),
            0x0C => Some(Self::FragmentData),
            0x0D => Some(Self::FragmentLast),
            0x0E => Some(Self::SessionId),
            0x13 => Some(Self::Flags),
            0xFF => Some(Self::Separator),
            _ => None,
        }
    }
}

/// Ordered TLV8 message.
#[derive(Debug, Clone, Default)]
pub struct Tlv8 {
    items: Vec<(u8, Vec<u8>)>,
}

impl Tlv8 {
    /// Create empty TLV8 message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item.
    pub fn push(&mut self, typ: TlvType, value: impl Into<Vec<u8>>) {
        self.push_raw(typ as u8, value);
    }

    /// Append an item with a raw type byte.
    pub fn push_raw(&mut self, typ: u8, value: impl Into<Vec<u8>>) {
        self.items.push((typ, value.into()));
    }

    /// Get the first item with the given type.
    pub fn first(&self, typ: TlvType) -> Option<&[u8]> {
        self.first_raw(typ as u8)
    }

    /// Get the first item with the given raw type byte.
    pub fn first_raw(&self, typ: u8) -> Option<&[u8]> {
        self.items
            .iter()
            .find(|(t, _)| *t == typ)
            .map(|(_, v)| v.as_slice())
    }

    /// Iterate items in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &[u8])> {
        self.items.iter().map(|(t, v)| (*t, v.as_slice()))
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if no items are present.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Encode to bytes.
    ///
    /// Items are emitted in insertion order. Values longer than 255 bytes
    /// are fragmented into consecutive records of the same type: full
    /// 255-byte records followed by the remainder. A value whose length is
    /// an exact multiple of 255 gets no trailing zero-length record.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (typ, value) in &self.items {
            if value.is_empty() {
                out.push(*typ);
                out.push(0);
                continue;
            }
            for chunk in value.chunks(255) {
                out.push(*typ);
                out.push(chunk.len() as u8);
                out.extend_from_slice(chunk);
            }
        }
        out
    }

    /// Parse TLV8 from bytes.
    ///
    /// A record continues the previous item when it has the same type and
    /// the previous record's length byte was 255; otherwise it starts a new
    /// item. Same-type records after a short record therefore stay separate
    /// items rather than being merged.
    pub fn parse(data: &[u8]) -> Result<Self, TlvError> {
        let mut items: Vec<(u8, Vec<u8>)> = Vec::new();
        let mut offset = 0;
        let mut continuing: Option<u8> = None;

        while offset < data.len() {
            if offset + 2 > data.len() {
                return Err(TlvError::TruncatedHeader);
            }
            let typ = data[offset];
            let len = data[offset + 1] as usize;
            offset += 2;

            if offset + len > data.len() {
                return Err(TlvError::TruncatedValue {
                    expected: len,
                    actual: data.len() - offset,
                });
            }
            let value = &data[offset..offset + len];
            offset += len;

            if continuing == Some(typ) {
                if let Some((_, item)) = items.last_mut() {
                    item.extend_from_slice(value);
                }
            } else {
                items.push((typ, value.to_vec()));
            }

            continuing = if len == 255 { Some(typ) } else { None };
        }

        Ok(Self { items })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod encoding {
        use super::*;

        #[test]
        fn encode_empty_message() {
            assert!(Tlv8::new().encode().is_empty());
        }

        #[test]
        fn encode_single_item() {
            let mut tlv = Tlv8::new();
            tlv.push(TlvType::State, vec![0x01]);
            assert_eq!(tlv.encode(), vec![0x06, 0x01, 0x01]);
        }

        #[test]
        fn encode_preserves_input_order() {
            let mut tlv = Tlv8::new();
            tlv.push(TlvType::State, vec![0x01]);
            tlv.push(TlvType::Method, vec![0x00]);
            // State (0x06) was pushed first and must stay first.
            assert_eq!(
                tlv.encode(),
                vec![
                    0x06, 0x01, 0x01, // State
                    0x00, 0x01, 0x00, // Method
                ]
            );
        }

        #[test]
        fn encode_empty_value_emits_zero_length_record() {
            let mut tlv = Tlv8::new();
            tlv.push(TlvType::State, Vec::new());
            assert_eq!(tlv.encode(), vec![0x06, 0x00]);
        }

        #[test]
        fn encode_allows_duplicate_types() {
            let mut tlv = Tlv8::new();
            tlv.push(TlvType::Identifier, vec![0xAA]);
            tlv.push(TlvType::Separator, Vec::new());
            tlv.push(TlvType::Identifier, vec![0xBB]);
            assert_eq!(
                tlv.encode(),
                vec![0x01, 0x01, 0xAA, 0xFF, 0x00, 0x01, 0x01, 0xBB]
            );
        }

        #[test]
        fn encode_fragments_260_byte_value() {
            let mut tlv = Tlv8::new();
            tlv.push(TlvType::EncryptedData, vec![0xAB; 260]);

            let encoded = tlv.encode();
            assert_eq!(encoded.len(), 2 + 255 + 2 + 5);
            assert_eq!(encoded[0], 0x05);
            assert_eq!(encoded[1], 0xFF);
            assert!(encoded[2..257].iter().all(|&b| b == 0xAB));
            assert_eq!(encoded[257], 0x05);
            assert_eq!(encoded[258], 0x05);
            assert!(encoded[259..].iter().all(|&b| b == 0xAB));
        }

        #[test]
        fn encode_fragment_length_bytes() {
            // All full fragments carry 255; the tail carries len % 255.
            let len = 700usize;
            let mut tlv = Tlv8::new();
            tlv.push(TlvType::PublicKey, vec![0x11; len]);

            let encoded = tlv.encode();
            let mut offset = 0;
            let mut lengths = Vec::new();
            while offset < encoded.len() {
                assert_eq!(encoded[offset], 0x03);
                let l = encoded[offset + 1] as usize;
                lengths.push(l);
                offset += 2 + l;
            }
            assert_eq!(lengths, vec![255, 255, 190]);
            assert_eq!(len / 255, 2);
            assert_eq!(len % 255, 190);
        }

        #[test]
        fn encode_exact_multiple_of_255_has_no_trailing_record() {
            let mut tlv = Tlv8::new();
            tlv.push(TlvType::PublicKey, vec![0x22; 510]);

            let encoded = tlv.encode();
            // Two full records and nothing after them.
            assert_eq!(encoded.len(), 2 * (2 + 255));
            assert_eq!(encoded[0], 0x03);
            assert_eq!(encoded[1], 0xFF);
            assert_eq!(encoded[257], 0x03);
            assert_eq!(encoded[258], 0xFF);
        }

        #[test]
        fn encode_255_byte_value_is_single_record() {
            let mut tlv = Tlv8::new();
            tlv.push(TlvType::Proof, vec![0x33; 255]);
            let encoded = tlv.encode();
            assert_eq!(encoded.len(), 2 + 255);
            assert_eq!(encoded[1], 0xFF);
        }

        #[test]
        fn fragment_payloads_reassemble_to_original() {
            let value: Vec<u8> = (0..600).map(|i| (i % 256) as u8).collect();
            let mut tlv = Tlv8::new();
            tlv.push(TlvType::EncryptedData, value.clone());

            let encoded = tlv.encode();
            let mut reassembled = Vec::new();
            let mut offset = 0;
            while offset < encoded.len() {
                assert_eq!(encoded[offset], TlvType::EncryptedData as u8);
                let l = encoded[offset + 1] as usize;
                reassembled.extend_from_slice(&encoded[offset + 2..offset + 2 + l]);
                offset += 2 + l;
            }
            assert_eq!(reassembled, value);
        }
    }

    mod parsing {
        use super::*;

        #[test]
        fn parse_empty() {
            let tlv = Tlv8::parse(&[]).unwrap();
            assert!(tlv.is_empty());
        }

        #[test]
        fn parse_single_record() {
            let tlv = Tlv8::parse(&[0x06, 0x01, 0x01]).unwrap();
            assert_eq!(tlv.first(TlvType::State), Some([0x01].as_slice()));
        }

        #[test]
        fn parse_zero_length_value() {
            let tlv = Tlv8::parse(&[0x06, 0x00]).unwrap();
            assert_eq!(tlv.first(TlvType::State), Some([].as_slice()));
        }

        #[test]
        fn parse_merges_fragmented_value() {
            let mut data = vec![0x03, 0xFF];
            data.extend(vec![0xAA; 255]);
            data.extend([0x03, 0x2D]);
            data.extend(vec![0xBB; 45]);

            let tlv = Tlv8::parse(&data).unwrap();
            assert_eq!(tlv.len(), 1);
            let value = tlv.first(TlvType::PublicKey).unwrap();
            assert_eq!(value.len(), 300);
            assert!(value[..255].iter().all(|&b| b == 0xAA));
            assert!(value[255..].iter().all(|&b| b == 0xBB));
        }

        #[test]
        fn parse_keeps_short_same_type_records_separate() {
            // Two short records of the same type are duplicates, not one
            // fragmented value.
            let tlv = Tlv8::parse(&[0x01, 0x01, 0xAA, 0x01, 0x01, 0xBB]).unwrap();
            assert_eq!(tlv.len(), 2);
            assert_eq!(tlv.first(TlvType::Identifier), Some([0xAA].as_slice()));
        }

        #[test]
        fn parse_error_on_truncated_header() {
            assert!(matches!(
                Tlv8::parse(&[0x06]),
                Err(TlvError::TruncatedHeader)
            ));
        }

        #[test]
        fn parse_error_on_truncated_value() {
            assert!(matches!(
                Tlv8::parse(&[0x06, 0x05, 0x01, 0x02]),
                Err(TlvError::TruncatedValue {
                    expected: 5,
                    actual: 2
                })
            ));
        }

        #[test]
        fn encode_parse_round_trip() {
            let mut tlv = Tlv8::new();
            tlv.push(TlvType::State, vec![0x03]);
            tlv.push(TlvType::PublicKey, vec![0xAB; 384]);
            tlv.push(TlvType::Proof, vec![0xCD; 64]);

            let decoded = Tlv8::parse(&tlv.encode()).unwrap();
            assert_eq!(decoded.len(), 3);
            assert_eq!(decoded.first(TlvType::State), Some([0x03].as_slice()));
            assert_eq!(decoded.first(TlvType::PublicKey).unwrap().len(), 384);
            assert_eq!(decoded.first(TlvType::Proof).unwrap().len(), 64);
        }
    }

    mod accessors {
        use super::*;

        #[test]
        fn first_returns_earliest_match() {
            let mut tlv = Tlv8::new();
            tlv.push(TlvType::Identifier, vec![0x01]);
            tlv.push(TlvType::Identifier, vec![0x02]);
            assert_eq!(tlv.first(TlvType::Identifier), Some([0x01].as_slice()));
        }

        #[test]
        fn first_missing_type_is_none() {
            let tlv = Tlv8::new();
            assert_eq!(tlv.first(TlvType::State), None);
        }

        #[test]
        fn iter_yields_in_insertion_order() {
            let mut tlv = Tlv8::new();
            tlv.push(TlvType::State, vec![0x01]);
            tlv.push(TlvType::Method, vec![0x00]);
            let types: Vec<u8> = tlv.iter().map(|(t, _)| t).collect();
            assert_eq!(types, vec![0x06, 0x00]);
        }
    }

    mod tlv_type {
        use super::*;

        #[test]
        fn from_byte_known_types() {
            assert_eq!(TlvType::from_byte(0x00), Some(TlvType::Method));
            assert_eq!(TlvType::from_byte(0x02), Some(TlvType::Salt));
            assert_eq!(TlvType::from_byte(0x03), Some(TlvType::PublicKey));
            assert_eq!(TlvType::from_byte(0x04), Some(TlvType::Proof));
            assert_eq!(TlvType::from_byte(0x06), Some(TlvType::State));
            assert_eq!(TlvType::from_byte(0x13), Some(TlvType::Flags));
            assert_eq!(TlvType::from_byte(0xFF), Some(TlvType::Separator));
        }

        #[test]
        fn from_byte_unknown_returns_none() {
            assert_eq!(TlvType::from_byte(0x10), None);
            assert_eq!(TlvType::from_byte(0xFE), None);
        }
    }
}
