//! Age-indexed colour palettes.
//!
//! Each channel is a cosine wave over the age index with a random frequency
//! and phase, darkened linearly towards the oldest bucket.

use std::f64::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Cell;

/// Number of age buckets in a palette. Ages cycle modulo this.
pub const AGE_RANGE: usize = 75;

/// An 8-bit RGB colour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Ordered colours, one per age bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    /// Build a palette from explicit colours. Returns `None` when empty.
    pub fn from_colors(colors: Vec<Rgb>) -> Option<Self> {
        if colors.is_empty() {
            None
        } else {
            Some(Self { colors })
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false; palettes hold at least one colour.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    #[inline]
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Colour for a cell age, cycling past the palette length.
    #[inline]
    pub fn color_for_age(&self, age: u64) -> Rgb {
        self.colors[(age % self.colors.len() as u64) as usize]
    }

    /// Colour for a cell, `None` for dead cells.
    #[inline]
    pub fn color_for(&self, cell: Cell) -> Option<Rgb> {
        cell.age().map(|age| self.color_for_age(age))
    }
}

/// Random cosine palette with `AGE_RANGE` entries.
pub fn random_palette<R: Rng + ?Sized>(rng: &mut R) -> Palette {
    random_palette_with_len(rng, AGE_RANGE)
}

/// Random cosine palette with `len` entries (at least one).
pub fn random_palette_with_len<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Palette {
    let len = len.max(1);
    let frequency: [f64; 3] = [rng.r#gen(), rng.r#gen(), rng.r#gen()];
    let phase: [f64; 3] = [rng.r#gen(), rng.r#gen(), rng.r#gen()];

    let colors = (0..len)
        .map(|i| {
            let x = i as f64 / len as f64;
            let p = x * TAU;
            let saturation = 1.0 - x * 0.5;
            let channel = |c: usize| {
                let v = (2.0 * p * frequency[c] + TAU * phase[c]).cos() * 0.5 + 0.5;
                to_byte(v * saturation)
            };
            Rgb::new(channel(0), channel(1), channel(2))
        })
        .collect();

    Palette { colors }
}

#[inline]
fn to_byte(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}
