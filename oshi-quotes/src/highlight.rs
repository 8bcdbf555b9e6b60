//! Random "featured quote" selection for the list page

use rand::seq::SliceRandom;
use rand::Rng;

/// Pick one item uniformly at random; `None` when `items` is empty
pub fn pick<'a, T, R>(items: &'a [T], rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
{
    items.choose(rng)
}
