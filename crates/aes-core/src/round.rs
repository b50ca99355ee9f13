//! AES round transformations.
//!
//! Every function mutates a 16-byte state in place. Byte `(row, col)` of the
//! state lives at `state[row + 4 * col]`. All of them are `const fn`, so a
//! whole cipher call can run at compile time.

use crate::block::{xor_in_place, Block, BLOCK_SIZE};
use crate::field::{field_add, field_multiply};
use crate::sbox::{inv_sbox, sbox};

/// Number of columns (32-bit words) in the state.
pub const NB: usize = 4;

const MIX_MATRIX: [[u8; 4]; 4] = [
    [0x02, 0x03, 0x01, 0x01],
    [0x01, 0x02, 0x03, 0x01],
    [0x01, 0x01, 0x02, 0x03],
    [0x03, 0x01, 0x01, 0x02],
];

const INV_MIX_MATRIX: [[u8; 4]; 4] = [
    [0x0e, 0x0b, 0x0d, 0x09],
    [0x09, 0x0e, 0x0b, 0x0d],
    [0x0d, 0x09, 0x0e, 0x0b],
    [0x0b, 0x0d, 0x09, 0x0e],
];

#[inline]
const fn index(row: usize, col: usize) -> usize {
    row + col * NB
}

/// Applies SubBytes to the state in place.
#[inline]
pub const fn sub_bytes(state: &mut Block) {
    let mut i = 0;
    while i < BLOCK_SIZE {
        state[i] = sbox(state[i]);
        i += 1;
    }
}

/// Applies the inverse SubBytes transformation.
#[inline]
pub const fn inv_sub_bytes(state: &mut Block) {
    let mut i = 0;
    while i < BLOCK_SIZE {
        state[i] = inv_sbox(state[i]);
        i += 1;
    }
}

const fn rotate_rows(state: &mut Block, left: bool) {
    let mut row = 1;
    while row < 4 {
        let line = [
            state[index(row, 0)],
            state[index(row, 1)],
            state[index(row, 2)],
            state[index(row, 3)],
        ];
        let mut col = 0;
        while col < NB {
            let from = if left {
                (col + row) % NB
            } else {
                (col + NB - row) % NB
            };
            state[index(row, col)] = line[from];
            col += 1;
        }
        row += 1;
    }
}

/// Performs ShiftRows in place: row `r` rotates left by `r`.
#[inline]
pub const fn shift_rows(state: &mut Block) {
    rotate_rows(state, true);
}

/// Performs the inverse of ShiftRows in place: row `r` rotates right by `r`.
#[inline]
pub const fn inv_shift_rows(state: &mut Block) {
    rotate_rows(state, false);
}

const fn multiply_columns(state: &mut Block, matrix: &[[u8; 4]; 4]) {
    let mut col = 0;
    while col < NB {
        let column = [
            state[index(0, col)],
            state[index(1, col)],
            state[index(2, col)],
            state[index(3, col)],
        ];
        let mut row = 0;
        while row < 4 {
            let mut acc = 0u8;
            let mut k = 0;
            while k < 4 {
                acc = field_add(acc, field_multiply(matrix[row][k], column[k]));
                k += 1;
            }
            state[index(row, col)] = acc;
            row += 1;
        }
        col += 1;
    }
}

/// MixColumns over all four columns.
#[inline]
pub const fn mix_columns(state: &mut Block) {
    multiply_columns(state, &MIX_MATRIX);
}

/// Inverse MixColumns over all four columns.
#[inline]
pub const fn inv_mix_columns(state: &mut Block) {
    multiply_columns(state, &INV_MIX_MATRIX);
}

/// Adds (XORs) a round key into the state.
#[inline]
pub const fn add_round_key(state: &mut Block, round_key: &Block) {
    xor_in_place(state, round_key);
}
