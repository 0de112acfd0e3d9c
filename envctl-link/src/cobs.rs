//! Consistent Overhead Byte Stuffing.
//!
//! Encoded frames contain no zero byte except the trailing delimiter. Runs of 254
//! non-zero bytes are split with a `0xff` block code, which carries no implied zero.

use crate::CobsError;

/// Frame delimiter.
pub const DELIMITER: u8 = 0;

const MAX_BLOCK_CODE: u8 = 0xff;

/// Worst-case encoded length of `len` bytes, delimiter included.
pub const fn max_encoded_len(len: usize) -> usize {
    len + len / 254 + 2
}

/// Encodes `src` into `dst` and appends the delimiter.
///
/// Returns the number of bytes written. `dst` must hold at least
/// [`max_encoded_len`]`(src.len())` bytes.
pub fn encode(src: &[u8], dst: &mut [u8]) -> Result<usize, CobsError> {
    if dst.len() < max_encoded_len(src.len()) {
        return Err(CobsError::BufferTooSmall);
    }
    let mut code_idx = 0;
    let mut out = 1;
    let mut code: u8 = 1;
    for &byte in src {
        if byte == 0 {
            dst[code_idx] = code;
            code_idx = out;
            out += 1;
            code = 1;
            continue;
        }
        dst[out] = byte;
        out += 1;
        code += 1;
        if code == MAX_BLOCK_CODE {
            dst[code_idx] = code;
            code_idx = out;
            out += 1;
            code = 1;
        }
    }
    dst[code_idx] = code;
    dst[out] = DELIMITER;
    Ok(out + 1)
}

/// Decodes one frame from `src` into `dst`.
///
/// The trailing delimiter is optional. Returns the number of decoded bytes.
pub fn decode(src: &[u8], dst: &mut [u8]) -> Result<usize, CobsError> {
    let src = match src.iter().position(|&b| b == DELIMITER) {
        Some(end) if end + 1 == src.len() => &src[..end],
        Some(_) => return Err(CobsError::UnexpectedZero),
        None => src,
    };
    let mut i = 0;
    let mut out = 0;
    while i < src.len() {
        let code = src[i];
        i += 1;
        let len = code as usize - 1;
        let block = src.get(i..i + len).ok_or(CobsError::Truncated)?;
        dst.get_mut(out..out + len)
            .ok_or(CobsError::BufferTooSmall)?
            .copy_from_slice(block);
        out += len;
        i += len;
        if code != MAX_BLOCK_CODE && i < src.len() {
            *dst.get_mut(out).ok_or(CobsError::BufferTooSmall)? = 0;
            out += 1;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec::Vec;

    use rand::Rng;

    use super::*;

    fn roundtrip(data: &[u8]) -> Vec<u8> {
        let mut enc = [0u8; 512];
        let n = encode(data, &mut enc).unwrap();
        let frame = &enc[..n];
        assert_eq!(frame.last(), Some(&DELIMITER));
        assert!(!frame[..n - 1].contains(&0));
        let mut dec = [0u8; 512];
        let m = decode(frame, &mut dec).unwrap();
        dec[..m].to_vec()
    }

    #[test]
    fn reference_vector() {
        let mut enc = [0u8; 8];
        let n = encode(&[0x01, 0x02, 0x00, 0x03], &mut enc).unwrap();
        assert_eq!(&enc[..n], &[0x03, 0x01, 0x02, 0x02, 0x03, 0x00]);
        let mut dec = [0u8; 8];
        let m = decode(&enc[..n], &mut dec).unwrap();
        assert_eq!(&dec[..m], &[0x01, 0x02, 0x00, 0x03]);
    }

    #[test]
    fn edge_cases() {
        assert_eq!(roundtrip(&[]), Vec::<u8>::new());
        assert_eq!(roundtrip(&[0]), [0]);
        assert_eq!(roundtrip(&[0, 0, 0]), [0, 0, 0]);
        let mut enc = [0u8; 4];
        assert_eq!(encode(&[0], &mut enc), Ok(3));
        assert_eq!(&enc[..3], &[1, 1, 0]);
    }

    #[test]
    fn long_runs_do_not_corrupt() {
        for len in [253usize, 254, 255, 300, 508] {
            let data: Vec<u8> = (0..len).map(|i| (i % 255) as u8 + 1).collect();
            assert_eq!(roundtrip(&data), data);
        }
    }

    #[test]
    fn random_roundtrip() {
        let mut rng = rand::rng();
        for _ in 0..500 {
            let len = rng.random_range(0..=253);
            let data: Vec<u8> = (0..len)
                .map(|_| if rng.random_bool(0.2) { 0 } else { rng.random() })
                .collect();
            assert_eq!(roundtrip(&data), data);
        }
    }

    #[test]
    fn malformed_frames() {
        let mut dec = [0u8; 16];
        assert_eq!(decode(&[0x05, 0x01, 0x00], &mut dec), Err(CobsError::Truncated));
        assert_eq!(
            decode(&[0x02, 0x00, 0x01, 0x00], &mut dec),
            Err(CobsError::UnexpectedZero)
        );
        let mut small = [0u8; 2];
        assert_eq!(
            decode(&[0x04, 1, 2, 3, 0x00], &mut small),
            Err(CobsError::BufferTooSmall)
        );
    }
}
