//! Category wheel.
//!
//! The landing category is drawn first with a single uniform index. The
//! highlight sequence a renderer animates is generated afterwards and always
//! ends on that category, so the animation cannot skew the outcome.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::{Category, CATEGORY_COUNT};

/// Full turns of the wheel before it settles
const MIN_LAPS: usize = 2;
const MAX_LAPS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spin {
    pub result: Category,
    /// Categories to highlight in order; the last entry is `result`
    pub sequence: Vec<Category>,
}

/// Spin the wheel and plan the highlight sequence
pub fn spin<R: Rng + ?Sized>(categories: &[Category; CATEGORY_COUNT], rng: &mut R) -> Spin {
    let len = categories.len();
    let landing = rng.random_range(0..len);

    let start = rng.random_range(0..len);
    let laps = rng.random_range(MIN_LAPS..=MAX_LAPS);
    let steps = laps * len + (landing + len - start) % len;

    let sequence = (0..=steps).map(|i| categories[(start + i) % len]).collect();

    Spin {
        result: categories[landing],
        sequence,
    }
}

/// Pick one category, each with probability 1/6
pub fn spin_categories<R: Rng + ?Sized>(categories: &[Category; CATEGORY_COUNT], rng: &mut R) -> Category {
    spin(categories, rng).result
}
