//! Chunked SHA-256 merkleization primitives for the signing objects that are
//! hashed without a derived container implementation.

use alloy_primitives::B256;
use anyhow::ensure;
use ethereum_hashing::hash32_concat;

/// Merkleize 32-byte chunks, padding the leaf layer with zero chunks up to
/// the next power of two. An empty leaf list yields the zero chunk.
pub fn merkleize_chunks(leaves: &[B256]) -> B256 {
    if leaves.is_empty() {
        return B256::ZERO;
    }

    let mut level = leaves.to_vec();
    level.resize(leaves.len().next_power_of_two(), B256::ZERO);

    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| B256::from(hash32_concat(pair[0].as_slice(), pair[1].as_slice())))
            .collect();
    }

    level[0]
}

/// Root of a byte vector: 32-byte chunks, the last one zero-padded.
pub fn bytes_vector_root(bytes: &[u8]) -> B256 {
    if bytes.is_empty() {
        return B256::ZERO;
    }

    let leaves = bytes
        .chunks(32)
        .map(|chunk| {
            let mut leaf = [0u8; 32];
            leaf[..chunk.len()].copy_from_slice(chunk);
            B256::from(leaf)
        })
        .collect::<Vec<_>>();

    merkleize_chunks(&leaves)
}

/// `hash_tree_root(uint64)`: the value little-endian in the first eight bytes
/// of a zero chunk.
pub fn uint64_root(value: u64) -> B256 {
    let mut chunk = [0u8; 32];
    chunk[..8].copy_from_slice(&value.to_le_bytes());
    B256::from(chunk)
}

/// Root of an SSZ-serialized bitlist. The most-significant set bit of the
/// last byte is the length terminator: it is stripped from the data before
/// chunking and the bit length mixed back in. Empty input stands for the
/// empty bitlist (`[0x01]`); a trailing zero byte has no terminator and is
/// invalid.
pub fn bitlist_root(serialized: &[u8]) -> anyhow::Result<B256> {
    let serialized = if serialized.is_empty() {
        &[0x01][..]
    } else {
        serialized
    };

    let last = serialized[serialized.len() - 1];
    ensure!(last != 0, "bitlist: invalid SSZ (terminator missing)");

    let terminator = 7 - last.leading_zeros() as usize;
    let bit_len = (serialized.len() - 1) as u64 * 8 + terminator as u64;
    let data_len = bit_len.div_ceil(8) as usize;

    let mut data = serialized[..data_len].to_vec();
    if bit_len % 8 != 0 {
        data[data_len - 1] &= !(1u8 << terminator);
    }

    Ok(B256::from(hash32_concat(
        bytes_vector_root(&data).as_slice(),
        uint64_root(bit_len).as_slice(),
    )))
}

#[cfg(test)]
mod tests {
    use ethereum_hashing::hash;

    use super::*;

    fn sha256_pair(left: &B256, right: &B256) -> B256 {
        B256::from_slice(&hash(&[left.as_slice(), right.as_slice()].concat()))
    }

    #[test]
    fn test_uint64_root_is_little_endian() {
        let root = uint64_root(0x0102030405060708);
        assert_eq!(
            root.as_slice()[..8],
            [0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]
        );
        assert_eq!(root.as_slice()[8..], [0u8; 24]);
    }

    #[test]
    fn test_merkleize_pads_to_a_power_of_two() {
        let a = uint64_root(1);
        let b = uint64_root(2);
        let c = uint64_root(3);

        assert_eq!(merkleize_chunks(&[]), B256::ZERO);
        assert_eq!(merkleize_chunks(&[a]), a);
        assert_eq!(merkleize_chunks(&[a, b]), sha256_pair(&a, &b));
        assert_eq!(
            merkleize_chunks(&[a, b, c]),
            sha256_pair(&sha256_pair(&a, &b), &sha256_pair(&c, &B256::ZERO))
        );
    }

    #[test]
    fn test_bytes_vector_chunking() {
        assert_eq!(bytes_vector_root(&[]), B256::ZERO);

        let mut padded = [0u8; 32];
        padded[..4].copy_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(
            bytes_vector_root(&[0xde, 0xad, 0xbe, 0xef]),
            B256::from(padded)
        );

        let long = [0xabu8; 48];
        let mut tail = [0u8; 32];
        tail[..16].copy_from_slice(&long[32..]);
        assert_eq!(
            bytes_vector_root(&long),
            sha256_pair(&B256::from([0xabu8; 32]), &B256::from(tail))
        );
    }

    #[test]
    fn test_bitlist_strips_the_terminator() {
        // [0xff, 0x01]: eight data bits, terminator in the second byte.
        let root = bitlist_root(&[0xff, 0x01]).unwrap();
        let mut data_chunk = [0u8; 32];
        data_chunk[0] = 0xff;
        assert_eq!(
            root,
            sha256_pair(&B256::from(data_chunk), &uint64_root(8))
        );

        // [0x05]: terminator at bit 2, leaving data bits 0b01.
        let root = bitlist_root(&[0x05]).unwrap();
        let mut data_chunk = [0u8; 32];
        data_chunk[0] = 0x01;
        assert_eq!(
            root,
            sha256_pair(&B256::from(data_chunk), &uint64_root(2))
        );
    }

    #[test]
    fn test_empty_bitlist_is_the_lone_terminator() {
        assert_eq!(bitlist_root(&[]).unwrap(), bitlist_root(&[0x01]).unwrap());
        assert_eq!(
            bitlist_root(&[0x01]).unwrap(),
            sha256_pair(&B256::ZERO, &uint64_root(0))
        );
    }

    #[test]
    fn test_trailing_zero_byte_is_rejected() {
        assert!(bitlist_root(&[0x00]).is_err());
        assert!(bitlist_root(&[0xff, 0x00]).is_err());
    }
}
