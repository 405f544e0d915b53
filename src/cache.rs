use std::collections::HashMap;

use crate::data::filter::{cascade, Cascade, Dimension, DimensionColumns, FilterSelection};
use crate::data::model::RecordStore;

/// Key of a cached cascade: which store load, which dimension order, which
/// wanted values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    generation: u64,
    order: Vec<Dimension>,
    wanted: FilterSelection,
}

/// Memo of cascade results for the current store.
///
/// Only an optimization: a miss recomputes. [`ViewCache::invalidate`] must be
/// called whenever the store is replaced.
#[derive(Debug, Default)]
pub struct ViewCache {
    generation: u64,
    entries: HashMap<CacheKey, Cascade>,
    hits: u64,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every entry and start a new store generation.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.entries.clear();
        log::debug!("View cache invalidated (generation {})", self.generation);
    }

    pub fn cascade(
        &mut self,
        store: &RecordStore,
        columns: &DimensionColumns,
        order: &[Dimension],
        wanted: &FilterSelection,
    ) -> Cascade {
        let key = CacheKey {
            generation: self.generation,
            order: order.to_vec(),
            wanted: wanted.clone(),
        };
        if let Some(hit) = self.entries.get(&key) {
            self.hits += 1;
            return hit.clone();
        }
        let result = cascade(store, columns, order, wanted);
        self.entries.insert(key, result.clone());
        result
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::TEAM_ORDER;
    use crate::data::model::{CellValue, Record};
    use std::collections::BTreeMap;

    fn store(team: &str) -> RecordStore {
        let mut cells = BTreeMap::new();
        cells.insert("nombre_equipo".to_string(), CellValue::from(team));
        cells.insert("nombre_liga".to_string(), CellValue::from("Primera"));
        RecordStore::from_records(vec![Record::new(cells)])
    }

    #[test]
    fn repeated_query_hits_the_cache() {
        let s = store("A");
        let cols = DimensionColumns::default();
        let mut cache = ViewCache::new();
        let wanted = FilterSelection::new();
        let first = cache.cascade(&s, &cols, &TEAM_ORDER, &wanted);
        let second = cache.cascade(&s, &cols, &TEAM_ORDER, &wanted);
        assert_eq!(first, second);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidate_forgets_the_old_store() {
        let cols = DimensionColumns::default();
        let mut cache = ViewCache::new();
        let wanted = FilterSelection::new();
        let before = cache.cascade(&store("A"), &cols, &TEAM_ORDER, &wanted);
        cache.invalidate();
        assert!(cache.is_empty());
        let after = cache.cascade(&store("B"), &cols, &TEAM_ORDER, &wanted);
        assert_ne!(before.chosen(Dimension::Team), after.chosen(Dimension::Team));
    }
}
