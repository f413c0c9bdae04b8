//! Process-memory repositories for development and tests.
//!
//! Each repository keys its records by id in a [`Table`] behind a mutex.
//! Listing orders follow the repository port contracts, with ties on the
//! timestamp broken by insertion order. Everything is lost on restart.

mod conversations;
mod materials;
mod mind_maps;
mod quizzes;
mod users;

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::domain::ports::RepositoryError;

pub use conversations::MemoryConversationRepository;
pub use materials::MemoryMaterialRepository;
pub use mind_maps::MemoryMindMapRepository;
pub use quizzes::MemoryQuizRepository;
pub use users::MemoryUserRepository;

/// Records keyed by id plus a sequence index that remembers insertion order.
struct Table<K, V> {
    rows: HashMap<K, (u64, V)>,
    order: BTreeMap<u64, K>,
    next_seq: u64,
}

impl<K, V> Default for Table<K, V> {
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
            order: BTreeMap::new(),
            next_seq: 0,
        }
    }
}

impl<K: Copy + Eq + Hash, V> Table<K, V> {
    /// Insert a record; replacing an existing key moves it to the end.
    fn insert(&mut self, key: K, value: V) {
        let seq = self.next_seq;
        self.next_seq += 1;
        if let Some((previous, _)) = self.rows.insert(key, (seq, value)) {
            self.order.remove(&previous);
        }
        self.order.insert(seq, key);
    }

    fn get(&self, key: &K) -> Option<&V> {
        self.rows.get(key).map(|(_, value)| value)
    }

    fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.rows.get_mut(key).map(|(_, value)| value)
    }

    fn contains(&self, key: &K) -> bool {
        self.rows.contains_key(key)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        let (seq, value) = self.rows.remove(key)?;
        self.order.remove(&seq);
        Some(value)
    }

    /// Records in insertion order.
    fn values(&self) -> impl DoubleEndedIterator<Item = &V> {
        self.order.values().filter_map(|key| self.get(key))
    }

    fn retain(&mut self, mut keep: impl FnMut(&V) -> bool) {
        let rows = &mut self.rows;
        self.order.retain(|_, key| {
            let kept = rows.get(&*key).is_some_and(|(_, value)| keep(value));
            if !kept {
                rows.remove(&*key);
            }
            kept
        });
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.rows.len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::query("in-memory store lock poisoned"))
}

/// Order records newest first; later insertions win ties.
fn newest_first<T>(
    records: impl DoubleEndedIterator<Item = T>,
    created_at: impl Fn(&T) -> DateTime<Utc>,
) -> Vec<T> {
    let mut ordered: Vec<T> = records.rev().collect();
    ordered.sort_by_key(|record| std::cmp::Reverse(created_at(record)));
    ordered
}

/// Order records oldest first; earlier insertions win ties.
fn oldest_first<T>(
    records: impl Iterator<Item = T>,
    created_at: impl Fn(&T) -> DateTime<Utc>,
) -> Vec<T> {
    let mut ordered: Vec<T> = records.collect();
    ordered.sort_by_key(|record| created_at(record));
    ordered
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;

    fn at(second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, second)
            .single()
            .expect("valid timestamp")
    }

    fn table(keys: &[u32]) -> Table<u32, String> {
        let mut table = Table::default();
        for key in keys {
            table.insert(*key, format!("row {key}"));
        }
        table
    }

    #[rstest]
    fn table_lists_in_insertion_order_and_finds_by_key() {
        let table = table(&[30, 10, 20]);

        let values: Vec<_> = table.values().map(String::as_str).collect();
        assert_eq!(values, vec!["row 30", "row 10", "row 20"]);
        assert_eq!(table.get(&10).map(String::as_str), Some("row 10"));
        assert!(table.get(&40).is_none());
    }

    #[rstest]
    fn table_removal_keeps_the_index_in_step() {
        let mut table = table(&[1, 2, 3, 4]);

        assert_eq!(table.remove(&2).as_deref(), Some("row 2"));
        assert!(table.remove(&2).is_none());
        table.retain(|value| value != "row 4");

        let values: Vec<_> = table.values().map(String::as_str).collect();
        assert_eq!(values, vec!["row 1", "row 3"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.order.len(), 2);
    }

    #[rstest]
    fn table_reinsert_moves_a_key_to_the_end() {
        let mut table = table(&[1, 2]);
        table.insert(1, "row 1 again".to_owned());

        let values: Vec<_> = table.values().map(String::as_str).collect();
        assert_eq!(values, vec!["row 2", "row 1 again"]);
        assert_eq!(table.order.len(), 2);
    }

    #[rstest]
    fn newest_first_breaks_ties_by_later_insertion() {
        let records = vec![("a", at(1)), ("b", at(2)), ("c", at(2))];
        let ordered = newest_first(records.into_iter(), |(_, ts)| *ts);
        let names: Vec<_> = ordered.into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["c", "b", "a"]);
    }

    #[rstest]
    fn oldest_first_breaks_ties_by_earlier_insertion() {
        let records = vec![("a", at(3)), ("b", at(1)), ("c", at(1))];
        let ordered = oldest_first(records.into_iter(), |(_, ts)| *ts);
        let names: Vec<_> = ordered.into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
    }
}
