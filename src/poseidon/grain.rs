//! Grain LFSR used as the deterministic parameter stream.
//!
//! The 80-bit register is seeded with the parameter label (field type, S-box
//! type, field size, width, round counts) so that every arity gets its own
//! stream. Output bits are filtered in pairs: the second bit of a pair is
//! emitted only when the first one is set.

use crate::field::{modulus, Fr, MODULUS_BITS};
use num_bigint::BigUint;
use num_traits::Zero;

const STATE_BITS: usize = 80;

/// Warm-up clocks discarded after seeding.
const WARMUP_CLOCKS: usize = 160;

/// Field type tag: prime field.
const FIELD_PRIME: u64 = 1;

/// S-box tag: x^alpha.
const SBOX_POWER: u64 = 0;

pub(crate) struct GrainLfsr {
    state: [bool; STATE_BITS],
    head: usize,
}

impl GrainLfsr {
    /// Seed the register for a parameter set and run the warm-up.
    pub(crate) fn new(width: usize, full_rounds: usize, partial_rounds: usize) -> Self {
        let mut bits = Vec::with_capacity(STATE_BITS);
        push_bits(&mut bits, FIELD_PRIME, 2);
        push_bits(&mut bits, SBOX_POWER, 4);
        push_bits(&mut bits, MODULUS_BITS as u64, 12);
        push_bits(&mut bits, width as u64, 12);
        push_bits(&mut bits, full_rounds as u64, 10);
        push_bits(&mut bits, partial_rounds as u64, 10);
        bits.resize(STATE_BITS, true);

        let mut state = [false; STATE_BITS];
        state.copy_from_slice(&bits);

        let mut lfsr = Self { state, head: 0 };
        for _ in 0..WARMUP_CLOCKS {
            lfsr.clock();
        }
        lfsr
    }

    fn tap(&self, i: usize) -> bool {
        self.state[(self.head + i) % STATE_BITS]
    }

    /// b[i+80] = b[i+62] ^ b[i+51] ^ b[i+38] ^ b[i+23] ^ b[i+13] ^ b[i]
    fn clock(&mut self) -> bool {
        let bit = self.tap(62) ^ self.tap(51) ^ self.tap(38) ^ self.tap(23) ^ self.tap(13) ^ self.tap(0);
        self.state[self.head] = bit;
        self.head = (self.head + 1) % STATE_BITS;
        bit
    }

    fn next_bit(&mut self) -> bool {
        loop {
            let keep = self.clock();
            let bit = self.clock();
            if keep {
                return bit;
            }
        }
    }

    /// Read `n` filtered bits as a big-endian integer.
    fn next_bits(&mut self, n: usize) -> BigUint {
        let mut acc = BigUint::zero();
        for _ in 0..n {
            acc <<= 1u32;
            if self.next_bit() {
                acc |= BigUint::from(1u32);
            }
        }
        acc
    }

    /// Next field element by rejection sampling (values >= p are skipped).
    pub(crate) fn next_field_element(&mut self) -> Fr {
        loop {
            let candidate = self.next_bits(MODULUS_BITS);
            if &candidate < modulus() {
                return Fr::from_biguint(&candidate);
            }
        }
    }

    /// Next field element, reduced modulo p instead of rejected.
    pub(crate) fn next_field_element_reduced(&mut self) -> Fr {
        Fr::from_biguint(&self.next_bits(MODULUS_BITS))
    }
}

fn push_bits(bits: &mut Vec<bool>, value: u64, width: usize) {
    for i in (0..width).rev() {
        bits.push((value >> i) & 1 == 1);
    }
}
