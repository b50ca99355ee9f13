//! Block representation helpers.

/// Size of an AES block (and of every round key) in bytes.
pub const BLOCK_SIZE: usize = 16;

/// AES block of 16 bytes, stored column-major (`state[row + 4 * col]`).
pub type Block = [u8; BLOCK_SIZE];

/// XORs two blocks, writing the result into `dst`.
#[inline]
pub const fn xor_in_place(dst: &mut Block, rhs: &Block) {
    let mut i = 0;
    while i < BLOCK_SIZE {
        dst[i] ^= rhs[i];
        i += 1;
    }
}

/// Copies a 16-byte slice into a block; `None` for any other length.
pub fn block_from_slice(bytes: &[u8]) -> Option<Block> {
    bytes.try_into().ok()
}

/// Renders bytes as lowercase hex without separators.
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xor_is_self_inverse() {
        let original: Block = core::array::from_fn(|i| i as u8);
        let mask: Block = [0xa5; 16];
        let mut block = original;
        xor_in_place(&mut block, &mask);
        assert_ne!(block, original);
        xor_in_place(&mut block, &mask);
        assert_eq!(block, original);
    }

    #[test]
    fn block_from_slice_checks_length() {
        assert_eq!(block_from_slice(&[7u8; 16]), Some([7u8; 16]));
        assert_eq!(block_from_slice(&[7u8; 15]), None);
        assert_eq!(block_from_slice(&[7u8; 17]), None);
    }

    #[test]
    fn hex_is_lowercase_and_padded() {
        assert_eq!(to_hex(&[0x00, 0x0f, 0xab, 0xff]), "000fabff");
        assert_eq!(to_hex(&[]), "");
    }
}
