//! In-memory bowl registry.
//!
//! Three ordered collections with a cross-collection uniqueness invariant:
//! a code lives in exactly one of {active, prepared, returned} at any
//! time, and a record's status always matches its collection. All state
//! mutation in the crate funnels through these operations.

use bowlflow_protocol::{BowlRecord, Collection};

#[derive(Debug, Clone, Default)]
pub struct Registry {
    active: Vec<BowlRecord>,
    prepared: Vec<BowlRecord>,
    returned: Vec<BowlRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self, collection: Collection) -> &[BowlRecord] {
        match collection {
            Collection::Active => &self.active,
            Collection::Prepared => &self.prepared,
            Collection::Returned => &self.returned,
        }
    }

    fn records_mut(&mut self, collection: Collection) -> &mut Vec<BowlRecord> {
        match collection {
            Collection::Active => &mut self.active,
            Collection::Prepared => &mut self.prepared,
            Collection::Returned => &mut self.returned,
        }
    }

    pub fn len(&self, collection: Collection) -> usize {
        self.records(collection).len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.prepared.is_empty() && self.returned.is_empty()
    }

    /// Look a code up across all collections in canonical order
    /// (active, prepared, returned). First match wins; per the uniqueness
    /// invariant a code never legitimately matches twice.
    pub fn find(&self, code: &str) -> Option<(&BowlRecord, Collection)> {
        for collection in Collection::ALL {
            if let Some(record) = self.find_in(collection, code) {
                return Some((record, collection));
            }
        }
        None
    }

    pub fn find_in(&self, collection: Collection, code: &str) -> Option<&BowlRecord> {
        self.records(collection).iter().find(|r| r.code == code)
    }

    pub fn contains(&self, collection: Collection, code: &str) -> bool {
        self.find_in(collection, code).is_some()
    }

    /// Append a record. The caller guarantees no duplicate exists in the
    /// destination; status must match the destination collection.
    pub fn insert(&mut self, collection: Collection, record: BowlRecord) {
        debug_assert_eq!(record.status, collection.status());
        self.records_mut(collection).push(record);
    }

    /// Remove and return the first record with this code. Not-found is the
    /// `None` sentinel, never an error.
    pub fn remove(&mut self, collection: Collection, code: &str) -> Option<BowlRecord> {
        let rows = self.records_mut(collection);
        let idx = rows.iter().position(|r| r.code == code)?;
        Some(rows.remove(idx))
    }

    /// Remove from source, transform, insert into destination.
    ///
    /// Atomic from the caller's view: either the record moves (and the
    /// transformed copy lands in the destination) or nothing changes.
    /// Returns the moved record's destination copy.
    pub fn move_and_transform(
        &mut self,
        code: &str,
        from: Collection,
        to: Collection,
        transform: impl FnOnce(BowlRecord) -> BowlRecord,
    ) -> Option<BowlRecord> {
        let record = self.remove(from, code)?;
        let transformed = transform(record);
        self.insert(to, transformed.clone());
        Some(transformed)
    }

    /// Replace one collection wholesale (remote subscription updates).
    /// Incoming records win by arrival order; status markers are forced to
    /// match the destination so a malformed update cannot break the
    /// status/collection invariant.
    pub fn replace(&mut self, collection: Collection, mut records: Vec<BowlRecord>) {
        for record in &mut records {
            record.status = collection.status();
        }
        *self.records_mut(collection) = records;
    }

    /// Drop every record in a collection; returns how many were removed.
    pub fn clear(&mut self, collection: Collection) -> usize {
        let rows = self.records_mut(collection);
        let count = rows.len();
        rows.clear();
        count
    }

    /// Invariant check used by tests: no duplicate codes within or across
    /// collections, and statuses matching their collection.
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut seen: std::collections::HashMap<&str, Collection> =
            std::collections::HashMap::new();
        let mut violations = Vec::new();
        for collection in Collection::ALL {
            for record in self.records(collection) {
                if record.status != collection.status() {
                    violations.push(format!(
                        "{} in {} has status {}",
                        record.code, collection, record.status
                    ));
                }
                if let Some(previous) = seen.insert(record.code.as_str(), collection) {
                    violations.push(format!(
                        "{} present in both {} and {}",
                        record.code, previous, collection
                    ));
                }
            }
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bowlflow_protocol::BowlStatus;

    fn record(code: &str, collection: Collection) -> BowlRecord {
        BowlRecord {
            code: code.to_string(),
            status: collection.status(),
            ..BowlRecord::default()
        }
    }

    #[test]
    fn find_searches_active_first() {
        let mut registry = Registry::new();
        registry.insert(Collection::Active, record("c1", Collection::Active));
        registry.insert(Collection::Prepared, record("p1", Collection::Prepared));
        let (_, collection) = registry.find("c1").unwrap();
        assert_eq!(collection, Collection::Active);
        assert!(registry.find("missing").is_none());
    }

    #[test]
    fn remove_returns_the_record_or_none() {
        let mut registry = Registry::new();
        registry.insert(Collection::Prepared, record("p1", Collection::Prepared));
        assert_eq!(registry.remove(Collection::Prepared, "p1").unwrap().code, "p1");
        assert!(registry.remove(Collection::Prepared, "p1").is_none());
    }

    #[test]
    fn move_and_transform_applies_overrides() {
        let mut registry = Registry::new();
        registry.insert(Collection::Prepared, record("p1", Collection::Prepared));
        let moved = registry
            .move_and_transform("p1", Collection::Prepared, Collection::Returned, |mut r| {
                r.status = BowlStatus::Returned;
                r.returned_by = Some("Sultan".to_string());
                r
            })
            .unwrap();
        assert_eq!(moved.returned_by.as_deref(), Some("Sultan"));
        assert_eq!(registry.len(Collection::Prepared), 0);
        assert_eq!(registry.len(Collection::Returned), 1);
        assert!(registry.invariant_violations().is_empty());
    }

    #[test]
    fn move_of_unknown_code_changes_nothing() {
        let mut registry = Registry::new();
        assert!(registry
            .move_and_transform("nope", Collection::Active, Collection::Returned, |r| r)
            .is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn replace_forces_status_to_match_collection() {
        let mut registry = Registry::new();
        registry.replace(Collection::Active, vec![record("x", Collection::Prepared)]);
        assert_eq!(
            registry.find_in(Collection::Active, "x").unwrap().status,
            BowlStatus::Active
        );
        assert!(registry.invariant_violations().is_empty());
    }

    #[test]
    fn invariant_check_reports_cross_collection_duplicates() {
        let mut registry = Registry::new();
        registry.insert(Collection::Active, record("dup", Collection::Active));
        registry.insert(Collection::Returned, record("dup", Collection::Returned));
        assert_eq!(registry.invariant_violations().len(), 1);
    }
}
