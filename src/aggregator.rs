use std::collections::HashMap;

use crate::Signature;

/// Signature to occurrence count, in order of first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationTable {
    entries: Vec<(Signature, u64)>,
    // Position of each signature in `entries`
    positions: HashMap<Signature, usize>,
}

impl AggregationTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts, which is the number of blocks recorded.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn get(&self, signature: &str) -> Option<u64> {
        self.positions.get(signature).map(|&position| self.entries[position].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Signature, u64)> + '_ {
        self.entries.iter().map(|(signature, count)| (signature, *count))
    }
}

impl IntoIterator for AggregationTable {
    type Item = (Signature, u64);
    type IntoIter = std::vec::IntoIter<(Signature, u64)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Counts signatures as they are recorded. Single writer only.
#[derive(Debug, Default)]
pub struct Aggregator {
    table: AggregationTable,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more occurrence. New signatures go to the end at count 1.
    pub fn record(&mut self, signature: Signature) {
        self.record_n(signature, 1)
    }

    /// Count `n` occurrences at once, as when merging existing reports.
    pub fn record_n(&mut self, signature: Signature, n: u64) {
        let table = &mut self.table;
        if let Some(&position) = table.positions.get(&signature) {
            table.entries[position].1 += n;
        } else {
            table.positions.insert(signature.clone(), table.entries.len());
            table.entries.push((signature, n));
        }
    }

    pub fn snapshot(&self) -> AggregationTable {
        self.table.clone()
    }

    pub fn into_table(self) -> AggregationTable {
        self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::hashmap;

    #[test]
    fn test_counts_and_first_seen_order() {
        let mut aggregator = Aggregator::new();
        for signature in ["b", "a", "b", "c", "a", "b"] {
            aggregator.record(Signature::from(signature));
        }
        let table = aggregator.snapshot();
        let order: Vec<_> = table.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
        let counts: HashMap<_, _> = table.iter().map(|(s, c)| (s.as_str(), c)).collect();
        assert_eq!(counts, hashmap! { "b" => 3, "a" => 2, "c" => 1 });
        assert_eq!(table.total(), 6);
        assert_eq!(table.get("a"), Some(2));
        assert_eq!(table.get("z"), None);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut aggregator = Aggregator::new();
        aggregator.record(Signature::from("x"));
        let before = aggregator.snapshot();
        aggregator.record(Signature::from("x"));
        assert_eq!(before.get("x"), Some(1));
        assert_eq!(aggregator.into_table().get("x"), Some(2));
    }

    #[test]
    fn test_lookup_after_many_signatures() {
        let mut aggregator = Aggregator::new();
        for n in 0..500 {
            aggregator.record(Signature::from(format!("ERROR case {}", n % 250)));
        }
        let table = aggregator.into_table();
        assert_eq!(table.len(), 250);
        assert_eq!(table.get("ERROR case 0"), Some(2));
        assert_eq!(table.get("ERROR case 249"), Some(2));
        assert_eq!(table.get("ERROR case 250"), None);
        assert_eq!(table.iter().nth(7).map(|(s, _)| s.as_str()), Some("ERROR case 7"));
    }

    #[test]
    fn test_record_n() {
        let mut aggregator = Aggregator::new();
        aggregator.record_n(Signature::from("x"), 4);
        aggregator.record(Signature::from("y"));
        aggregator.record_n(Signature::from("x"), 2);
        let table: Vec<_> = aggregator.into_table().into_iter().collect();
        assert_eq!(table, vec![(Signature::from("x"), 6), (Signature::from("y"), 1)]);
    }

    #[test]
    fn test_empty() {
        let table = Aggregator::new().into_table();
        assert!(table.is_empty());
        assert_eq!(table.total(), 0);
    }
}
