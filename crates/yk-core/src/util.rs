//! Small helpers shared by the protocol and configuration code.

use std::collections::BTreeMap;

use crate::error::{Result, YkError};

const MODHEX: &[u8; 16] = b"cbdefghijklnrtuv";
const HEX: &[u8; 16] = b"0123456789abcdef";

/// Hexdump for debug output, eight bytes per line with an offset column.
pub fn hexdump(src: &[u8]) -> String {
    let mut out = String::new();
    for (i, line) in src.chunks(8).enumerate() {
        let bytes: Vec<String> = line.iter().map(|b| format!("{:02x}", b)).collect();
        out.push_str(&format!("{:04X}   {}\n", i * 8, bytes.join(" ")));
    }
    out
}

/// Translate modhex to ordinary hex. Bytes outside the modhex alphabet
/// pass through.
pub fn modhex_decode(data: &[u8]) -> Vec<u8> {
    data.iter()
        .map(|c| match MODHEX.iter().position(|m| m == c) {
            Some(idx) => HEX[idx],
            None => *c,
        })
        .collect()
}

/// Decode a user supplied byte string.
///
/// `h:` prefixes hex, `m:` prefixes modhex, anything else is taken as
/// raw bytes.
pub fn decode_input(input: &[u8]) -> Result<Vec<u8>> {
    if let Some(hex_str) = input.strip_prefix(b"h:") {
        hex::decode(hex_str).map_err(|e| YkError::invalid(format!("bad hex input: {}", e)))
    } else if let Some(modhex) = input.strip_prefix(b"m:") {
        hex::decode(modhex_decode(modhex))
            .map_err(|e| YkError::invalid(format!("bad modhex input: {}", e)))
    } else {
        Ok(input.to_vec())
    }
}

/// HOTP dynamic truncation (RFC 4226) of an HMAC-SHA1 result.
pub fn hotp_truncate(hmac_result: &[u8], digits: u32) -> Result<u32> {
    if hmac_result.len() != 20 {
        return Err(YkError::invalid(format!(
            "HMAC-SHA-1 not 20 bytes long (got {})",
            hmac_result.len()
        )));
    }
    let offset = (hmac_result[19] & 0x0f) as usize;
    let bin_code = u32::from_be_bytes([
        hmac_result[offset] & 0x7f,
        hmac_result[offset + 1],
        hmac_result[offset + 2],
        hmac_result[offset + 3],
    ]);
    Ok(bin_code % 10u32.pow(digits))
}

/// Parse a tag-length-value byte string into a map keyed by tag.
pub fn tlv_parse(mut data: &[u8]) -> Result<BTreeMap<u8, Vec<u8>>> {
    let mut parsed = BTreeMap::new();
    while !data.is_empty() {
        let [tag, len, rest @ ..] = data else {
            return Err(YkError::invalid("truncated TLV header"));
        };
        let len = *len as usize;
        if rest.len() < len {
            return Err(YkError::invalid(format!(
                "TLV tag 0x{:02x} wants {} bytes, {} left",
                tag,
                len,
                rest.len()
            )));
        }
        parsed.insert(*tag, rest[..len].to_vec());
        data = &rest[len..];
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hexdump_lines() {
        let dump = hexdump(&[0, 1, 2, 3, 4, 5, 6, 0x87, 0xff]);
        assert_eq!(dump, "0000   00 01 02 03 04 05 06 87\n0008   ff\n");
        assert_eq!(hexdump(&[]), "");
    }

    #[test]
    fn test_modhex_decode() {
        assert_eq!(modhex_decode(b"cbdefghijklnrtuv"), b"0123456789abcdef");
        assert_eq!(modhex_decode(b"vvcc"), b"ff00");
    }

    #[test]
    fn test_decode_input_prefixes() {
        assert_eq!(decode_input(b"h:0102ff").unwrap(), vec![1, 2, 0xff]);
        assert_eq!(decode_input(b"m:ccbb").unwrap(), vec![0x00, 0x11]);
        assert_eq!(decode_input(b"abc").unwrap(), b"abc".to_vec());
        assert!(matches!(
            decode_input(b"h:zz"),
            Err(YkError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_hotp_truncate_rfc4226() {
        // RFC 4226 section 5.4 example
        let hmac = hex::decode("1f8698690e02ca16618550ef7f19da8e945b555a").unwrap();
        assert_eq!(hotp_truncate(&hmac, 6).unwrap(), 872921);
        assert_eq!(hotp_truncate(&hmac, 8).unwrap(), 57872921);
        assert!(hotp_truncate(&hmac[..19], 6).is_err());
    }

    #[test]
    fn test_tlv_parse() {
        let parsed = tlv_parse(&[0x01, 0x02, 0x02, 0x3f, 0x02, 0x00, 0x03, 0x01, 0xaa]).unwrap();
        assert_eq!(parsed.get(&0x01), Some(&vec![0x02, 0x3f]));
        assert_eq!(parsed.get(&0x02), Some(&vec![]));
        assert_eq!(parsed.get(&0x03), Some(&vec![0xaa]));
    }

    #[test]
    fn test_tlv_parse_truncated() {
        assert!(tlv_parse(&[0x01]).is_err());
        assert!(tlv_parse(&[0x01, 0x05, 0x00]).is_err());
        assert!(tlv_parse(&[]).unwrap().is_empty());
    }
}
