//! Compile-time-derived tag → slot index: a sorted `const` array
//! searched with binary search, with a direct-indexed fallback for
//! shapes whose highest tag id is small enough to make a flat array
//! cheaper.

use fixcore_dictionary::Tag;

/// Maps a tag id to its slot position within one (possibly nested)
/// entry list. Built once, at shape-registration time, from the
/// flattened entry list — never mutated afterwards.
#[derive(Debug, Clone)]
pub struct TagIndex {
    /// `(tag id, slot index)`, sorted by tag id for binary search.
    sorted: Vec<(u32, usize)>,
    max_tag: u32,
    /// Direct-indexed table, used instead of binary search when the
    /// shape's highest tag id is small enough to make a flat array
    /// cheaper than a binary search.
    direct: Option<Vec<Option<usize>>>,
}

const DIRECT_INDEX_LIMIT: u32 = 4096;

impl TagIndex {
    pub fn build(tags: impl Iterator<Item = (Tag, usize)>) -> Self {
        let mut sorted: Vec<(u32, usize)> = tags.map(|(t, i)| (t.get(), i)).collect();
        sorted.sort_unstable_by_key(|(t, _)| *t);
        let max_tag = sorted.last().map(|(t, _)| *t).unwrap_or(0);
        let direct = if max_tag < DIRECT_INDEX_LIMIT {
            let mut table = vec![None; max_tag as usize + 1];
            for (t, i) in &sorted {
                table[*t as usize] = Some(*i);
            }
            Some(table)
        } else {
            None
        };
        Self {
            sorted,
            max_tag,
            direct,
        }
    }

    pub fn slot_of(&self, tag: Tag) -> Option<usize> {
        let id = tag.get();
        if let Some(table) = &self.direct {
            return if id <= self.max_tag {
                table[id as usize]
            } else {
                None
            };
        }
        self.sorted
            .binary_search_by_key(&id, |(t, _)| *t)
            .ok()
            .map(|i| self.sorted[i].1)
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.slot_of(tag).is_some()
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_index_roundtrip() {
        let idx = TagIndex::build(
            [(Tag::new(8).unwrap(), 0), (Tag::new(35).unwrap(), 1), (Tag::new(9).unwrap(), 2)]
                .into_iter(),
        );
        assert_eq!(idx.slot_of(Tag::new(35).unwrap()), Some(1));
        assert_eq!(idx.slot_of(Tag::new(999).unwrap()), None);
    }

    #[test]
    fn sparse_tag_falls_back_to_binary_search() {
        let idx = TagIndex::build([(Tag::new(50000).unwrap(), 0)].into_iter());
        assert!(idx.direct.is_none());
        assert_eq!(idx.slot_of(Tag::new(50000).unwrap()), Some(0));
        assert_eq!(idx.slot_of(Tag::new(1).unwrap()), None);
    }
}
