//! ISO13239 checksum (CRC-16/X-25) as used by the YubiKey frame and
//! response formats.

/// Residual left by running the CRC over data followed by its own
/// (little-endian) CRC field.
pub const CRC_OK_RESIDUAL: u16 = 0xF0B8;

const POLY: u16 = 0x8408;

/// Calculate an ISO13239 CRC of `data`.
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &b in data {
        crc ^= b as u16;
        for _ in 0..8 {
            let carry = crc & 1;
            crc >>= 1;
            if carry != 0 {
                crc ^= POLY;
            }
        }
    }
    crc
}

/// True if `data` (ending in a CRC field) leaves the OK residual.
pub fn validate_crc16(data: &[u8]) -> bool {
    crc16(data) == CRC_OK_RESIDUAL
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_is_initial_value() {
        assert_eq!(crc16(b""), 0xFFFF);
    }

    #[test]
    fn test_known_vector() {
        // CRC-16/X-25 check value is the complement of the raw register.
        assert_eq!(!crc16(b"123456789"), 0x906E);
    }

    #[test]
    fn test_residual_with_complemented_crc() {
        let data = b"Sample #2";
        let crc = !crc16(data);
        let mut buf = data.to_vec();
        buf.extend_from_slice(&crc.to_le_bytes());
        assert!(validate_crc16(&buf));
    }

    #[test]
    fn test_corruption_detected() {
        let data = b"Sample #2";
        let crc = !crc16(data);
        let mut buf = data.to_vec();
        buf.extend_from_slice(&crc.to_le_bytes());
        buf[0] ^= 0x01;
        assert!(!validate_crc16(&buf));
    }

    proptest! {
        #[test]
        fn prop_crc_is_deterministic(data in proptest::collection::vec(any::<u8>(), 0..128)) {
            prop_assert_eq!(crc16(&data), crc16(&data));
        }

        #[test]
        fn prop_appended_complement_validates(data in proptest::collection::vec(any::<u8>(), 0..128)) {
            let mut buf = data.clone();
            buf.extend_from_slice(&(!crc16(&data)).to_le_bytes());
            prop_assert!(validate_crc16(&buf));
        }
    }
}
