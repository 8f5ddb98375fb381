//! Kahn-style leveling of a dependency map.

use dagcore::CycleError;
use std::collections::{BTreeMap, BTreeSet};

/// Lazy sequence of dependency levels.
///
/// Each item is a sorted group of ids whose predecessors all appeared in
/// earlier groups. When the remaining ids all wait on each other, a single
/// `Err` carrying the unresolved remainder is yielded and the iterator ends.
/// [`restart`](Self::restart) rewinds to the first level.
#[derive(Debug, Clone)]
pub struct TopologicalLevels<T: Ord> {
    initial: BTreeMap<T, BTreeSet<T>>,
    remaining: BTreeMap<T, BTreeSet<T>>,
    done: bool,
}

impl<T: Ord + Clone> TopologicalLevels<T> {
    /// `deps` maps each id to the ids it depends on. Self dependencies are
    /// dropped and ids that only appear as dependencies get an empty entry.
    pub fn new<I, D>(deps: I) -> Self
    where
        I: IntoIterator<Item = (T, D)>,
        D: IntoIterator<Item = T>,
    {
        let mut map: BTreeMap<T, BTreeSet<T>> = BTreeMap::new();
        for (id, preds) in deps {
            let mut preds: BTreeSet<T> = preds.into_iter().collect();
            preds.remove(&id);
            map.entry(id).or_default().extend(preds);
        }

        let dangling: Vec<T> = map
            .values()
            .flatten()
            .filter(|dep| !map.contains_key(*dep))
            .cloned()
            .collect();
        for dep in dangling {
            map.entry(dep).or_default();
        }

        Self {
            remaining: map.clone(),
            initial: map,
            done: false,
        }
    }

    pub fn restart(&mut self) {
        self.remaining = self.initial.clone();
        self.done = false;
    }

    pub fn is_empty(&self) -> bool {
        self.initial.is_empty()
    }
}

impl<T: Ord + Clone> Iterator for TopologicalLevels<T> {
    type Item = Result<Vec<T>, CycleError<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.remaining.is_empty() {
            return None;
        }

        let ready: Vec<T> = self
            .remaining
            .iter()
            .filter(|(_, preds)| preds.is_empty())
            .map(|(id, _)| id.clone())
            .collect();

        if ready.is_empty() {
            self.done = true;
            let pending = std::mem::take(&mut self.remaining);
            return Some(Err(CycleError { pending }));
        }

        for id in &ready {
            self.remaining.remove(id);
        }
        for preds in self.remaining.values_mut() {
            for id in &ready {
                preds.remove(id);
            }
        }

        Some(Ok(ready))
    }
}

/// Collect every level, failing on the first cycle
pub fn levels<T, I, D>(deps: I) -> Result<Vec<Vec<T>>, CycleError<T>>
where
    T: Ord + Clone,
    I: IntoIterator<Item = (T, D)>,
    D: IntoIterator<Item = T>,
{
    TopologicalLevels::new(deps).collect()
}
