//! Compact sets of states.
//!
//! Subset construction keys its worklist by *sets* of NFA states, and the NFA simulation
//! in `run` keeps the set of currently active states. Both use [`StateSet`], a bit set
//! over arena indices whose capacity is fixed to the size of the arena it indexes.
//! Sets over the same arena compare and hash by content, so they can key a `HashMap`.

use crate::state::StateId;

/// A fixed-capacity bit set of [`StateId`]s backed by a vector of `u64` words.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct StateSet {
    words: Vec<u64>,
    /// Number of set bits.
    count: usize,
}

impl StateSet {
    const BITS_PER_WORD: usize = 64;

    /// Creates an empty set able to hold indices below `capacity`.
    pub fn new(capacity: usize) -> Self {
        let num_words = capacity.div_ceil(Self::BITS_PER_WORD);
        Self {
            words: vec![0; num_words],
            count: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    fn word_and_bit(id: StateId) -> (usize, u64) {
        let index = id.index();
        (index / Self::BITS_PER_WORD, 1u64 << (index % Self::BITS_PER_WORD))
    }

    #[inline]
    pub fn contains(&self, id: StateId) -> bool {
        let (word, mask) = Self::word_and_bit(id);
        self.words.get(word).is_some_and(|w| w & mask != 0)
    }

    /// Adds a state. Returns true if it was not present.
    ///
    /// # Panics
    ///
    /// Panics if the index is beyond the capacity of the set.
    #[inline]
    pub fn insert(&mut self, id: StateId) -> bool {
        let (word, mask) = Self::word_and_bit(id);
        let w = &mut self.words[word];
        let was_clear = *w & mask == 0;
        if was_clear {
            *w |= mask;
            self.count += 1;
        }
        was_clear
    }

    /// Removes a state. Returns true if it was present.
    #[inline]
    pub fn remove(&mut self, id: StateId) -> bool {
        let (word, mask) = Self::word_and_bit(id);
        match self.words.get_mut(word) {
            Some(w) if *w & mask != 0 => {
                *w &= !mask;
                self.count -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.words.fill(0);
        self.count = 0;
    }

    /// Iterates over the members in ascending index order.
    pub fn iter(&self) -> StateSetIter<'_> {
        StateSetIter {
            set: self,
            word_idx: 0,
            current_word: self.words.first().copied().unwrap_or(0),
        }
    }
}

impl Extend<StateId> for StateSet {
    fn extend<I: IntoIterator<Item = StateId>>(&mut self, iter: I) {
        for id in iter {
            self.insert(id);
        }
    }
}

pub struct StateSetIter<'a> {
    set: &'a StateSet,
    word_idx: usize,
    current_word: u64,
}

impl Iterator for StateSetIter<'_> {
    type Item = StateId;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                let bit = self.current_word.trailing_zeros() as usize;
                self.current_word &= self.current_word - 1;
                return Some(StateId::new(self.word_idx * StateSet::BITS_PER_WORD + bit));
            }
            self.word_idx += 1;
            if self.word_idx >= self.set.words.len() {
                return None;
            }
            self.current_word = self.set.words[self.word_idx];
        }
    }
}

impl<'a> IntoIterator for &'a StateSet {
    type Item = StateId;
    type IntoIter = StateSetIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use test_log::test;

    use super::*;

    fn ids(xs: &[usize]) -> Vec<StateId> {
        xs.iter().map(|&x| StateId::new(x)).collect()
    }

    #[test]
    fn test_insert_remove() {
        let mut set = StateSet::new(100);
        assert!(set.is_empty());
        assert!(set.insert(StateId::new(42)));
        assert!(!set.insert(StateId::new(42)));
        assert!(set.contains(StateId::new(42)));
        assert_eq!(set.len(), 1);
        assert!(set.remove(StateId::new(42)));
        assert!(!set.remove(StateId::new(42)));
        assert!(set.is_empty());
    }

    #[test]
    fn test_iter_ascending() {
        let mut set = StateSet::new(130);
        set.extend(ids(&[65, 3, 128, 5, 64]));
        assert_eq!(set.iter().collect::<Vec<_>>(), ids(&[3, 5, 64, 65, 128]));
    }

    #[test]
    fn test_hash_by_content() {
        let mut a = StateSet::new(10);
        a.extend(ids(&[1, 2]));
        let mut b = StateSet::new(10);
        b.extend(ids(&[2, 1]));
        let mut seen = HashSet::new();
        seen.insert(a);
        assert!(seen.contains(&b));

        b.clear();
        assert!(!seen.contains(&b));
    }

    #[test]
    #[should_panic]
    fn test_insert_beyond_capacity() {
        let mut set = StateSet::new(64);
        set.insert(StateId::new(64));
    }
}
