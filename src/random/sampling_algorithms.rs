//! Uniform sampling without replacement from iterators of known length. These are used to
//! pick seed infections and the targets of bulk interventions without materializing a
//! shuffled copy of the population.

use rand::seq::index::sample as choose_range;
use rand::Rng;

/// Sample multiple random elements uniformly without replacement from a container of known
/// length. If more samples are requested than there are items, every item is returned.
///
/// The selected items are returned in iteration order, so the result for a given seed does
/// not depend on the order `choose_range` happens to produce indexes in.
pub fn sample_multiple_from_known_length<R, I, T>(rng: &mut R, iter: I, requested: usize) -> Vec<T>
where
    R: Rng,
    I: ExactSizeIterator<Item = T>,
{
    let len = iter.len();
    if requested == 0 || len == 0 {
        return Vec::new();
    }
    if requested >= len {
        return iter.collect();
    }

    let mut indexes = choose_range(rng, len, requested).into_vec();
    indexes.sort_unstable();
    let mut index_iterator = indexes.into_iter().peekable();
    let mut selected = Vec::with_capacity(requested);

    for (idx, item) in iter.enumerate() {
        match index_iterator.peek() {
            Some(&next_idx) if next_idx == idx => {
                selected.push(item);
                index_iterator.next();
            }
            Some(_) => {}
            None => break,
        }
    }

    selected
}
