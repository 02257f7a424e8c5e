use std::collections::BTreeSet;

/// One slice of a block's files assigned to a single execution unit.
///
/// Invariant: `skip + entries <= sum(entries of the listed files)`; `urls`
/// is a (order-preserving) subset of the owning block's file urls.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Partition {
    pub dataset: String,
    pub block_name: String,
    pub nickname: Option<String>,
    pub dataset_id: i64,
    pub urls: Vec<String>,
    pub entries: i64,
    pub skip: i64,
    pub locations: Option<BTreeSet<String>>,
    pub common_prefix: Option<String>,
}

impl Partition {
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// A stable, densely-indexed sequence of partitions.
///
/// Partition numbers never shift across a resync: a retired partition's slot
/// becomes `None` (tombstoned) rather than being removed, and new partitions
/// are always appended at `len()`.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PartitionMap {
    slots: Vec<Option<Partition>>,
}

impl PartitionMap {
    pub fn new() -> Self {
        PartitionMap { slots: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, number: usize) -> Option<&Partition> {
        self.slots.get(number).and_then(|slot| slot.as_ref())
    }

    pub fn set(&mut self, number: usize, partition: Option<Partition>) {
        if number >= self.slots.len() {
            self.slots.resize(number + 1, None);
        }
        self.slots[number] = partition;
    }

    /// Appends a partition, returning its newly-assigned, densely-increasing
    /// partition number.
    pub fn append(&mut self, partition: Partition) -> usize {
        let number = self.slots.len();
        self.slots.push(Some(partition));
        number
    }

    pub fn retire(&mut self, number: usize) {
        if let Some(slot) = self.slots.get_mut(number) {
            *slot = None;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Partition)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|p| (i, p)))
    }

    pub fn iter_all(&self) -> impl Iterator<Item = (usize, Option<&Partition>)> {
        self.slots.iter().enumerate().map(|(i, s)| (i, s.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partition(urls: Vec<&str>, entries: i64, skip: i64) -> Partition {
        Partition {
            dataset: "ds".into(),
            block_name: "blk".into(),
            nickname: None,
            dataset_id: 0,
            urls: urls.into_iter().map(String::from).collect(),
            entries,
            skip,
            locations: None,
            common_prefix: None,
        }
    }

    #[test]
    fn numbers_are_dense_and_append_preserving() {
        let mut map = PartitionMap::new();
        let n0 = map.append(partition(vec!["a"], 10, 0));
        let n1 = map.append(partition(vec!["b"], 20, 0));
        assert_eq!((n0, n1), (0, 1));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn retiring_leaves_a_tombstoned_slot_not_a_shifted_sequence() {
        let mut map = PartitionMap::new();
        map.append(partition(vec!["a"], 10, 0));
        map.append(partition(vec!["b"], 20, 0));
        map.retire(0);

        assert_eq!(map.get(0), None);
        assert!(map.get(1).is_some());
        assert_eq!(map.len(), 2);

        let appended = map.append(partition(vec!["c"], 5, 0));
        assert_eq!(appended, 2);
    }
}
