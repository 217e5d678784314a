// This file is part of Passg.
//
// Copyright (c) 2025  René Coignard <contact@renecoignard.com>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::collections::HashSet;

use chacha20::ChaCha20;
use chacha20::cipher::{KeyIvInit, StreamCipher};
use zeroize::{ZeroizeOnDrop, Zeroizing};

use crate::{Error, Result};

const KEY_LEN: usize = 32;
const BUFFER_LEN: usize = 512;
const RANGE: u64 = 1 << 32;

/// [`RandomSource::sample`] switches to unique-index rejection sampling when
/// `k * SPARSE_SAMPLE_RATIO < len`, and to a partial Fisher-Yates pass
/// otherwise.
pub const SPARSE_SAMPLE_RATIO: usize = 4;

/// A source of uniformly distributed 32-bit words.
///
/// Every sampling operation the generators use is a provided method built on
/// [`RandomSource::next_u32`], so all sources share the same unbiased
/// reduction.
pub trait RandomSource {
    fn next_u32(&mut self) -> u32;

    /// Uniform integer in `[0, n)`, or `0` when `n == 0`.
    ///
    /// Draws falling at or above the largest multiple of `n` below `2^32`
    /// are rejected and redrawn, so small moduli carry no bias.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds `2^32`, the range of a single draw.
    fn rand_int(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }

        let n = n as u64;
        assert!(n <= RANGE, "rand_int bound {} exceeds 2^32", n);
        let limit = (RANGE / n) * n;

        loop {
            let candidate = u64::from(self.next_u32());
            if candidate < limit {
                return (candidate % n) as usize;
            }
        }
    }

    /// Uniform float in `[0, 1)` with 32 bits of resolution.
    fn rand_float(&mut self) -> f64 {
        f64::from(self.next_u32()) / RANGE as f64
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.rand_int(items.len()))
    }

    fn shuffle_in_place<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.rand_int(i + 1);
            items.swap(i, j);
        }
    }

    /// Fisher-Yates shuffle of a copy; `items` is left untouched.
    fn shuffle<T: Clone>(&mut self, items: &[T]) -> Vec<T> {
        let mut out = items.to_vec();
        self.shuffle_in_place(&mut out);
        out
    }

    /// `k` distinct positions of `items` in random order. Every k-subset is
    /// equally likely. Asking for `k >= items.len()` returns a full shuffle.
    fn sample<T: Clone>(&mut self, items: &[T], k: usize) -> Vec<T> {
        let n = items.len();
        if n == 0 || k == 0 {
            return Vec::new();
        }
        if k >= n {
            return self.shuffle(items);
        }

        if k * SPARSE_SAMPLE_RATIO < n {
            let mut chosen = HashSet::with_capacity(k);
            let mut out = Vec::with_capacity(k);
            while out.len() < k {
                let index = self.rand_int(n);
                if chosen.insert(index) {
                    out.push(items[index].clone());
                }
            }
            return out;
        }

        let mut pool = items.to_vec();
        for i in 0..k {
            let j = i + self.rand_int(n - i);
            pool.swap(i, j);
        }
        pool.truncate(k);
        pool
    }
}

/// ChaCha20 keystream keyed from operating system entropy.
///
/// The keystream is consumed in buffered blocks; the buffer is wiped on drop.
#[derive(ZeroizeOnDrop)]
pub struct Keystream {
    #[zeroize(skip)]
    cipher: ChaCha20,
    buffer: [u8; BUFFER_LEN],
    pos: usize,
}

impl Keystream {
    /// Key a fresh stream with 32 bytes from the operating system.
    ///
    /// Fails with [`Error::RandomUnavailable`] rather than falling back to a
    /// weaker generator.
    pub fn from_entropy() -> Result<Self> {
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        getrandom::getrandom(&mut key[..]).map_err(Error::RandomUnavailable)?;
        Ok(Self::from_key(&key))
    }

    /// Reproducible stream for a fixed key.
    pub fn from_key(key: &[u8; KEY_LEN]) -> Self {
        Self {
            cipher: ChaCha20::new(key.into(), &[0u8; 12].into()),
            buffer: [0u8; BUFFER_LEN],
            pos: BUFFER_LEN,
        }
    }

    fn refill(&mut self) {
        self.buffer.fill(0);
        self.cipher.apply_keystream(&mut self.buffer);
        self.pos = 0;
    }
}

impl RandomSource for Keystream {
    fn next_u32(&mut self) -> u32 {
        if self.pos + 4 > BUFFER_LEN {
            self.refill();
        }

        let word = u32::from_le_bytes([
            self.buffer[self.pos],
            self.buffer[self.pos + 1],
            self.buffer[self.pos + 2],
            self.buffer[self.pos + 3],
        ]);
        self.pos += 4;
        word
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn seeded() -> Keystream {
        Keystream::from_key(&[42u8; 32])
    }

    /// Replays a fixed list of words, then repeats the last one.
    pub(crate) struct Replay {
        words: Vec<u32>,
        pos: usize,
    }

    impl Replay {
        /// Words consumed so far.
        pub(crate) fn draws(&self) -> usize {
            self.pos
        }
    }

    pub(crate) fn replay(words: Vec<u32>) -> Replay {
        Replay { words, pos: 0 }
    }

    impl RandomSource for Replay {
        fn next_u32(&mut self) -> u32 {
            let word = self.words[self.pos.min(self.words.len() - 1)];
            self.pos += 1;
            word
        }
    }

    fn chi_square(n: usize, trials: usize, rng: &mut impl RandomSource) -> f64 {
        let mut counts = vec![0usize; n];
        for _ in 0..trials {
            counts[rng.rand_int(n)] += 1;
        }
        let expected = trials as f64 / n as f64;
        counts
            .iter()
            .map(|&observed| {
                let delta = observed as f64 - expected;
                delta * delta / expected
            })
            .sum()
    }

    #[test]
    fn test_rejection_discards_values_above_limit() {
        // For n = 3 the limit is 4294967295, so u32::MAX must be redrawn.
        let mut rng = Replay {
            words: vec![u32::MAX, 5],
            pos: 0,
        };
        assert_eq!(rng.rand_int(3), 2);
        assert_eq!(rng.pos, 2, "u32::MAX should have been rejected");
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    #[should_panic(expected = "exceeds 2^32")]
    fn test_rand_int_bound_above_draw_range() {
        let mut rng = seeded();
        rng.rand_int((1usize << 32) + 1);
    }

    #[test]
    fn test_rand_int_zero_bound() {
        let mut rng = seeded();
        assert_eq!(rng.rand_int(0), 0);
    }

    #[test]
    fn test_rand_int_within_bounds() {
        let mut rng = seeded();
        for n in [1usize, 2, 3, 10, 84, 7776, 1 << 20] {
            for _ in 0..500 {
                assert!(rng.rand_int(n) < n, "draw out of range for n = {}", n);
            }
        }
    }

    #[test]
    fn test_chi_square_small_moduli() {
        // Critical values at p = 0.001 for n - 1 degrees of freedom.
        let cases = [(3usize, 13.82), (7, 22.46), (37, 67.99)];
        let mut rng = seeded();

        for (n, critical) in cases {
            let statistic = chi_square(n, n * 3000, &mut rng);
            assert!(
                statistic < critical,
                "chi-square {} exceeds {} for n = {}",
                statistic,
                critical,
                n
            );
        }
    }

    #[test]
    fn test_rand_float_range() {
        let mut rng = seeded();
        for _ in 0..10_000 {
            let value = rng.rand_float();
            assert!((0.0..1.0).contains(&value));
        }

        let mut top = Replay {
            words: vec![u32::MAX],
            pos: 0,
        };
        assert!(top.rand_float() < 1.0);
    }

    #[test]
    fn test_pick() {
        let mut rng = seeded();
        let empty: [char; 0] = [];
        assert_eq!(rng.pick(&empty), None);

        let items = ['x', 'y', 'z'];
        for _ in 0..100 {
            let picked = rng.pick(&items).unwrap();
            assert!(items.contains(picked));
        }
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = seeded();
        for len in [0usize, 1, 2, 5, 64] {
            let input: Vec<usize> = (0..len).collect();
            let mut output = rng.shuffle(&input);
            assert_eq!(output.len(), len);
            output.sort_unstable();
            assert_eq!(output, input, "shuffle lost elements for len {}", len);
        }
    }

    #[test]
    fn test_shuffle_leaves_input_untouched() {
        let mut rng = seeded();
        let input: Vec<u8> = (0..32).collect();
        let snapshot = input.clone();
        let _ = rng.shuffle(&input);
        assert_eq!(input, snapshot);
    }

    #[test]
    fn test_sample_full_when_k_exceeds_len() {
        let mut rng = seeded();
        let input: Vec<u32> = (0..10).collect();
        for k in [10usize, 11, 100] {
            let mut output = rng.sample(&input, k);
            output.sort_unstable();
            assert_eq!(output, input);
        }
    }

    #[test]
    fn test_sample_distinct_both_strategies() {
        let mut rng = seeded();
        let input: Vec<u32> = (0..100).collect();

        // 10 * 4 < 100 takes the sparse path, 60 the partial shuffle.
        for k in [1usize, 10, 24, 25, 60, 99] {
            let output = rng.sample(&input, k);
            assert_eq!(output.len(), k);
            let unique: HashSet<_> = output.iter().collect();
            assert_eq!(unique.len(), k, "duplicates in sample of {}", k);
            assert!(output.iter().all(|v| input.contains(v)));
        }
    }

    #[test]
    fn test_sample_empty_cases() {
        let mut rng = seeded();
        let empty: Vec<u8> = Vec::new();
        assert!(rng.sample(&empty, 3).is_empty());
        assert!(rng.sample(&[1u8, 2, 3], 0).is_empty());
    }

    #[test]
    fn test_sample_covers_every_element() {
        let mut rng = seeded();
        let input: Vec<usize> = (0..20).collect();
        let mut seen = [0usize; 20];
        for _ in 0..2000 {
            for v in rng.sample(&input, 2) {
                seen[v] += 1;
            }
        }
        assert!(seen.iter().all(|&c| c > 100), "uneven coverage: {:?}", seen);
    }

    #[test]
    fn test_keystream_deterministic() {
        let mut a = seeded();
        let mut b = seeded();
        let left: Vec<u32> = (0..300).map(|_| a.next_u32()).collect();
        let right: Vec<u32> = (0..300).map(|_| b.next_u32()).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn test_keystream_different_keys() {
        let mut a = Keystream::from_key(&[1u8; 32]);
        let mut b = Keystream::from_key(&[2u8; 32]);
        let left: Vec<u32> = (0..8).map(|_| a.next_u32()).collect();
        let right: Vec<u32> = (0..8).map(|_| b.next_u32()).collect();
        assert_ne!(left, right);
    }

    #[test]
    fn test_keystream_refills_across_buffer_boundary() {
        let mut rng = seeded();
        let words: Vec<u32> = (0..(BUFFER_LEN / 4) * 3).map(|_| rng.next_u32()).collect();
        let unique: HashSet<_> = words.iter().collect();
        assert!(unique.len() > words.len() - 2, "keystream repeated after refill");
    }

    #[test]
    fn test_from_entropy() {
        let mut a = Keystream::from_entropy().unwrap();
        let mut b = Keystream::from_entropy().unwrap();
        let left: Vec<u32> = (0..8).map(|_| a.next_u32()).collect();
        let right: Vec<u32> = (0..8).map(|_| b.next_u32()).collect();
        assert_ne!(left, right);
    }
}
