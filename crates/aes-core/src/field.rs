//! Arithmetic over GF(2^8) with the AES reduction polynomial
//! `x^8 + x^4 + x^3 + x + 1` (0x11B).

/// Low byte of the reduction polynomial, folded in when doubling overflows.
pub const REDUCTION: u8 = 0x1b;

/// Field addition (XOR).
#[inline]
pub const fn field_add(a: u8, b: u8) -> u8 {
    a ^ b
}

/// Multiplies `b` by `x` (the "xtime" operation).
#[inline]
pub const fn double_in_field(b: u8) -> u8 {
    let shifted = b << 1;
    if b & 0x80 != 0 {
        field_add(shifted, REDUCTION)
    } else {
        shifted
    }
}

/// Field multiplication by shift-and-add over the bits of `a`, low to high.
pub const fn field_multiply(a: u8, mut b: u8) -> u8 {
    let mut product = 0u8;
    let mut bit = 0;
    while bit < 8 {
        if a & (1 << bit) != 0 {
            product = field_add(product, b);
        }
        b = double_in_field(b);
        bit += 1;
    }
    product
}
