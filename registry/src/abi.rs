//! Minimal Solidity ABI codec for the three read calls a token registry
//! exposes: `totalSupply()`, `tokenURI(uint256)` and `ownerOf(uint256)`.

use crate::error::{RegistryError, Result};

/// `totalSupply()`
pub const TOTAL_SUPPLY: [u8; 4] = [0x18, 0x16, 0x0d, 0xdd];
/// `tokenURI(uint256)`
pub const TOKEN_URI: [u8; 4] = [0xc8, 0x7b, 0x56, 0xdd];
/// `ownerOf(uint256)`
pub const OWNER_OF: [u8; 4] = [0x63, 0x52, 0x21, 0x1e];

const WORD: usize = 32;
const ADDRESS_LEN: usize = 20;

/// Encode a call as `0x`-prefixed calldata: selector followed by an
/// optional single `uint256` argument.
pub fn encode_call(selector: [u8; 4], arg: Option<u64>) -> String {
    let mut data = selector.to_vec();
    if let Some(value) = arg {
        data.extend_from_slice(&encode_uint(value));
    }
    format!("0x{}", hex::encode(data))
}

/// Encode `value` as a big-endian 32-byte word.
pub fn encode_uint(value: u64) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Encode a single dynamic `string` return value (head offset, length, padded bytes).
pub fn encode_string(value: &str) -> Vec<u8> {
    let bytes = value.as_bytes();
    let padded_len = bytes.len().div_ceil(WORD) * WORD;
    let mut out = Vec::with_capacity(2 * WORD + padded_len);
    out.extend_from_slice(&encode_uint(WORD as u64));
    out.extend_from_slice(&encode_uint(bytes.len() as u64));
    out.extend_from_slice(bytes);
    out.resize(2 * WORD + padded_len, 0);
    out
}

/// Encode an `address` return value from its `0x` hex form.
pub fn encode_address(address: &str) -> Result<Vec<u8>> {
    let raw = hex::decode(strip_hex_prefix(address))?;
    if raw.len() != ADDRESS_LEN {
        return Err(RegistryError::Abi(format!(
            "address must be {ADDRESS_LEN} bytes, got {}",
            raw.len()
        )));
    }
    let mut word = vec![0u8; WORD - ADDRESS_LEN];
    word.extend_from_slice(&raw);
    Ok(word)
}

/// Decode `0x`-prefixed hex returned by `eth_call`.
pub fn decode_hex(data: &str) -> Result<Vec<u8>> {
    Ok(hex::decode(strip_hex_prefix(data))?)
}

/// Decode the first word as an unsigned integer that must fit in `u64`.
pub fn decode_uint(data: &[u8]) -> Result<u64> {
    let word = word_at(data, 0)?;
    word_to_u64(word)
}

/// Decode a single dynamic `string` return value.
pub fn decode_string(data: &[u8]) -> Result<String> {
    let offset = usize_from(decode_uint(data)?)?;
    let length = usize_from(word_to_u64(word_at(data, offset)?)?)?;
    let start = offset
        .checked_add(WORD)
        .ok_or_else(|| RegistryError::Abi("string offset overflow".to_string()))?;
    let end = start
        .checked_add(length)
        .ok_or_else(|| RegistryError::Abi("string length overflow".to_string()))?;
    let bytes = data.get(start..end).ok_or_else(|| {
        RegistryError::Abi(format!(
            "string of {length} bytes at {start} exceeds {} byte payload",
            data.len()
        ))
    })?;
    String::from_utf8(bytes.to_vec())
        .map_err(|e| RegistryError::Abi(format!("string is not UTF-8: {e}")))
}

/// Decode an `address` return value as lowercase `0x` hex.
pub fn decode_address(data: &[u8]) -> Result<String> {
    let word = word_at(data, 0)?;
    let (padding, address) = word.split_at(WORD - ADDRESS_LEN);
    if padding.iter().any(|b| *b != 0) {
        return Err(RegistryError::Abi("address word has dirty high bytes".to_string()));
    }
    Ok(format!("0x{}", hex::encode(address)))
}

fn strip_hex_prefix(data: &str) -> &str {
    let data = data.trim();
    data.strip_prefix("0x")
        .or_else(|| data.strip_prefix("0X"))
        .unwrap_or(data)
}

fn word_at(data: &[u8], offset: usize) -> Result<&[u8]> {
    offset
        .checked_add(WORD)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| {
            RegistryError::Abi(format!(
                "expected a word at offset {offset}, payload is {} bytes",
                data.len()
            ))
        })
}

fn word_to_u64(word: &[u8]) -> Result<u64> {
    let (high, low) = word.split_at(WORD - 8);
    if high.iter().any(|b| *b != 0) {
        return Err(RegistryError::Abi("uint256 does not fit in u64".to_string()));
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(low);
    Ok(u64::from_be_bytes(buf))
}

fn usize_from(value: u64) -> Result<usize> {
    usize::try_from(value).map_err(|_| RegistryError::Abi(format!("{value} exceeds usize")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_encode_call_with_argument() {
        assert_eq!(encode_call(TOTAL_SUPPLY, None), "0x18160ddd");
        assert_eq!(
            encode_call(TOKEN_URI, Some(5)),
            format!("0xc87b56dd{}5", "0".repeat(63))
        );
    }

    #[test]
    fn test_decode_uint() {
        let word = encode_uint(42);
        assert_eq!(decode_uint(&word).unwrap(), 42);
    }

    #[test]
    fn test_decode_uint_overflow() {
        let mut word = [0u8; 32];
        word[0] = 1;
        assert!(matches!(decode_uint(&word), Err(RegistryError::Abi(_))));
    }

    #[test]
    fn test_decode_string_from_node_payload() {
        // tokenURI response as returned by a node for "ipfs://QmTest/1.json"
        let payload = decode_hex(concat!(
            "0x",
            "0000000000000000000000000000000000000000000000000000000000000020",
            "0000000000000000000000000000000000000000000000000000000000000014",
            "697066733a2f2f516d546573742f312e6a736f6e000000000000000000000000",
        ))
        .unwrap();
        assert_eq!(decode_string(&payload).unwrap(), "ipfs://QmTest/1.json");
    }

    #[test]
    fn test_decode_string_multiword() {
        let uri = "https://example.com/metadata/with/a/rather/long/path/0001.json";
        assert_eq!(decode_string(&encode_string(uri)).unwrap(), uri);
    }

    #[test]
    fn test_decode_string_truncated() {
        let mut payload = encode_string("ipfs://abc");
        payload.truncate(WORD + 4);
        assert!(decode_string(&payload).is_err());
    }

    #[test]
    fn test_decode_string_rejects_length_past_payload() {
        let mut payload = encode_uint(32).to_vec();
        payload.extend_from_slice(&encode_uint(1_000));
        payload.extend_from_slice(&[b'a'; 32]);
        assert!(decode_string(&payload).is_err());
    }

    #[test]
    fn test_decode_address() {
        let owner = "0x68ab0531bf0932ece095797d8e62617e2c234c80";
        let word = encode_address(owner).unwrap();
        assert_eq!(word.len(), 32);
        assert_eq!(decode_address(&word).unwrap(), owner);
    }

    #[test]
    fn test_decode_address_dirty_padding() {
        let mut word = encode_address("0x68ab0531bf0932ece095797d8e62617e2c234c80").unwrap();
        word[0] = 0xff;
        assert!(decode_address(&word).is_err());
    }

    #[test]
    fn test_decode_hex_rejects_garbage() {
        assert!(decode_hex("0xzz").is_err());
        assert_eq!(decode_hex("0x").unwrap(), Vec::<u8>::new());
    }
}
