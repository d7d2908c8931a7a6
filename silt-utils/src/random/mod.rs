//! Random number generation for rule handlers.
//!
//! Every physics worker owns one generator and hands it to handlers by
//! `&mut`, so handlers never contend on shared random state.

mod xoroshiro;

pub use xoroshiro::Xoroshiro;

/// A source of pseudo random numbers.
pub trait Random {
    /// Returns a uniformly distributed `i32`.
    fn next_i32(&mut self) -> i32;

    /// Returns a uniformly distributed `i32` in `0..bound`.
    ///
    /// `bound` must be positive.
    fn next_i32_bounded(&mut self, bound: i32) -> i32;

    /// Returns true with probability `1 / n`.
    fn one_in(&mut self, n: i32) -> bool {
        self.next_i32_bounded(n) == 0
    }

    /// Shuffles a slice in place (Fisher-Yates).
    fn shuffle<T>(&mut self, values: &mut [T])
    where
        Self: Sized,
    {
        for i in (1..values.len()).rev() {
            let j = self.next_i32_bounded(i as i32 + 1) as usize;
            values.swap(i, j);
        }
    }
}
