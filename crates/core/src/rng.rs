//! RNG module - deterministic piece color generation
//!
//! Each piece draws `PIECE_LENGTH` colors from the palette without replacement
//! (a partial Fisher-Yates shuffle), so the balls of one piece are pairwise
//! distinct. If the palette were ever smaller than a piece, colors are drawn
//! with replacement instead.
//!
//! Also provides a simple LCG for deterministic testing.

use crate::piece::PieceColors;
use crate::types::{PALETTE, PIECE_LENGTH};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        // High bits of an LCG are far better distributed than the low ones.
        (self.next_u32() >> 16) % max.max(1)
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Source of piece colors for one session
#[derive(Debug, Clone)]
pub struct ColorQueue {
    rng: SimpleRng,
}

impl ColorQueue {
    /// Create a new color queue with the given seed
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
        }
    }

    /// Draw the colors of the next piece
    pub fn draw(&mut self) -> PieceColors {
        let mut palette = PALETTE;

        if PIECE_LENGTH > palette.len() {
            return std::array::from_fn(|_| {
                palette[self.rng.next_range(palette.len() as u32) as usize]
            });
        }

        // Partial Fisher-Yates: the first PIECE_LENGTH slots become the sample.
        for i in 0..PIECE_LENGTH {
            let remaining = (palette.len() - i) as u32;
            let j = i + self.rng.next_range(remaining) as usize;
            palette.swap(i, j);
        }
        std::array::from_fn(|i| palette[i])
    }

    /// Get the current RNG state (for restarting with the same sequence)
    pub fn seed(&self) -> u32 {
        self.rng.state()
    }
}

impl Default for ColorQueue {
    fn default() -> Self {
        Self::new(1)
    }
}
