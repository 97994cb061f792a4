use bit_set::BitSet;

use crate::{SlotId, WordId};

/// The mutable domain store: for each slot, the set of words still considered possible for it,
/// stored as a bit set over `WordId`s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domains {
    by_slot: Vec<BitSet>,
}

impl Domains {
    /// Every slot starts out with every word in its domain.
    pub fn new(slot_count: usize, word_count: usize) -> Domains {
        Domains {
            by_slot: (0..slot_count).map(|_| (0..word_count).collect()).collect(),
        }
    }

    pub fn len(&self, slot_id: SlotId) -> usize {
        self.by_slot[slot_id].len()
    }

    pub fn is_empty(&self, slot_id: SlotId) -> bool {
        self.by_slot[slot_id].is_empty()
    }

    pub fn contains(&self, slot_id: SlotId, word_id: WordId) -> bool {
        self.by_slot[slot_id].contains(word_id)
    }

    /// The words in a slot's domain, in `WordId` order.
    pub fn iter(&self, slot_id: SlotId) -> DomainIter<'_> {
        let domain = &self.by_slot[slot_id];
        DomainIter { inner: domain.iter(), remaining: domain.len() }
    }

    pub fn remove(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        self.by_slot[slot_id].remove(word_id)
    }

    /// Keep only the words of a slot's domain matching `keep`, returning how many were removed.
    pub fn retain<F>(&mut self, slot_id: SlotId, mut keep: F) -> usize
    where
        F: FnMut(WordId) -> bool,
    {
        let eliminated: Vec<WordId> =
            self.by_slot[slot_id].iter().filter(|&word_id| !keep(word_id)).collect();

        for &word_id in &eliminated {
            self.by_slot[slot_id].remove(word_id);
        }

        eliminated.len()
    }

    /// The first slot whose domain has been wiped out, if any.
    pub fn first_empty(&self) -> Option<SlotId> {
        self.by_slot.iter().position(BitSet::is_empty)
    }

    /// Total number of candidate words across all slots.
    pub fn total_len(&self) -> usize {
        self.by_slot.iter().map(BitSet::len).sum()
    }
}

/// Iterator over one slot's domain. `bit_set::Iter` can report an upper bound below the number of
/// items it still yields, so the exact count is tracked here instead.
pub struct DomainIter<'a> {
    inner: bit_set::Iter<'a, u32>,
    remaining: usize,
}

impl<'a> Iterator for DomainIter<'a> {
    type Item = WordId;

    fn next(&mut self) -> Option<WordId> {
        let word_id = self.inner.next()?;
        self.remaining -= 1;
        Some(word_id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a> ExactSizeIterator for DomainIter<'a> {}
