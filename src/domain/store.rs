use crate::domain::WeightEntry;
use crate::infrastructure::{HookRegistry, STORAGE_KEY, StorageBackend, codec};
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The id being updated no longer exists (stale handle).
    #[error("no entry with id {0}")]
    NotFound(Uuid),
    /// The target day already holds a different entry.
    #[error("an entry already exists for {0}")]
    DateConflict(NaiveDate),
    /// The backend write failed; in-memory state is ahead of storage and
    /// may not survive a restart.
    #[error("failed to persist weight entries")]
    Persistence(#[source] anyhow::Error),
}

/// Per-batch accounting for `import_entries`: an entry counts as imported
/// when its day was free at the moment it was processed, updated otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub updated: usize,
}

/// Owner of the weight-entry collection. Holds at most one entry per
/// calendar day, keeps the collection sorted date-descending, and writes
/// the full collection through to the backend after every mutation.
pub struct WeightStore {
    entries: Vec<WeightEntry>,
    backend: Box<dyn StorageBackend>,
    hooks: HookRegistry,
}

impl WeightStore {
    /// Load whatever the backend holds under the fixed key. Absent or
    /// unreadable data degrades to an empty collection; construction
    /// itself never fails.
    pub fn open(backend: Box<dyn StorageBackend>) -> Self {
        Self::with_hooks(backend, HookRegistry::new())
    }

    pub fn with_hooks(backend: Box<dyn StorageBackend>, hooks: HookRegistry) -> Self {
        let entries = match backend.get(STORAGE_KEY) {
            Ok(Some(bytes)) => match codec::decode(&bytes) {
                Ok(entries) => entries,
                Err(e) => {
                    log::warn!("discarding unreadable weight data: {e:#}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("failed to read persisted weight data: {e:#}");
                Vec::new()
            }
        };

        let mut store = Self {
            entries,
            backend,
            hooks,
        };
        // A blob written by an older build may predate the current sort
        // order.
        store.sort_entries();
        store
    }

    /// The live collection, sorted date-descending.
    pub fn entries(&self) -> &[WeightEntry] {
        &self.entries
    }

    pub fn register_hook<H>(&mut self, hook: H)
    where
        H: crate::infrastructure::ChangeHook + 'static,
    {
        self.hooks.register(hook);
    }

    /// Record a weight. If the entry's day is already occupied the existing
    /// entry is replaced wholesale, so the caller never needs to pre-check.
    pub fn add(&mut self, entry: WeightEntry) -> Result<(), StoreError> {
        if let Some(index) = self.entries.iter().position(|e| e.falls_on(entry.date)) {
            self.entries[index] = entry;
        } else {
            self.entries.push(entry);
        }

        self.sort_entries();
        self.persist()?;
        self.hooks.notify(&self.entries);
        Ok(())
    }

    /// Edit an existing entry, located by id. Unlike `add` this never
    /// creates an entry, and moving onto a day owned by a different entry
    /// is rejected rather than silently clobbering it.
    pub fn update(&mut self, entry: WeightEntry) -> Result<(), StoreError> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == entry.id)
            .ok_or(StoreError::NotFound(entry.id))?;

        if self
            .entries
            .iter()
            .any(|e| e.id != entry.id && e.falls_on(entry.date))
        {
            return Err(StoreError::DateConflict(entry.date));
        }

        self.entries[index] = entry;
        self.sort_entries();
        self.persist()?;
        self.hooks.notify(&self.entries);
        Ok(())
    }

    /// Remove by id. An absent id is a no-op, not an error.
    pub fn delete(&mut self, id: Uuid) -> Result<(), StoreError> {
        self.entries.retain(|e| e.id != id);
        self.persist()?;
        self.hooks.notify(&self.entries);
        Ok(())
    }

    pub fn delete_all(&mut self) -> Result<(), StoreError> {
        self.entries.clear();
        self.persist()?;
        self.hooks.notify(&self.entries);
        Ok(())
    }

    pub fn existing_entry(&self, date: NaiveDate) -> Option<&WeightEntry> {
        self.entries.iter().find(|e| e.falls_on(date))
    }

    pub fn can_add(&self, date: NaiveDate) -> bool {
        self.existing_entry(date).is_none()
    }

    /// Most recent entry by date, independent of insertion order.
    pub fn latest_entry(&self) -> Option<&WeightEntry> {
        self.entries.first()
    }

    /// Latest minus second-latest weight; positive means weight went up.
    pub fn weight_difference(&self) -> Option<f64> {
        match self.entries.as_slice() {
            [latest, previous, ..] => Some(latest.weight - previous.weight),
            _ => None,
        }
    }

    /// Bulk `add`: per-day replace-or-append applied in input order, with a
    /// single persist at the end of the batch. When a batch carries two
    /// entries for one day the later one wins, and counts as an update of
    /// the earlier one.
    pub fn import_entries(
        &mut self,
        incoming: Vec<WeightEntry>,
    ) -> Result<ImportSummary, StoreError> {
        let mut summary = ImportSummary::default();
        if incoming.is_empty() {
            return Ok(summary);
        }

        for entry in incoming {
            if let Some(index) = self.entries.iter().position(|e| e.falls_on(entry.date)) {
                self.entries[index] = entry;
                summary.updated += 1;
            } else {
                self.entries.push(entry);
                summary.imported += 1;
            }
        }

        self.sort_entries();
        self.persist()?;
        self.hooks.notify(&self.entries);
        Ok(summary)
    }

    fn sort_entries(&mut self) {
        self.entries.sort_by(|a, b| b.date.cmp(&a.date));
    }

    fn persist(&self) -> Result<(), StoreError> {
        let bytes = codec::encode(&self.entries).map_err(StoreError::Persistence)?;
        self.backend
            .set(STORAGE_KEY, &bytes)
            .map_err(StoreError::Persistence)?;
        log::debug!("persisted {} entries", self.entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::STORAGE_KEY;
    use crate::infrastructure::test_utils::test_harness::{
        MemoryBackend, TestStore, date, entry, with_test_store,
    };

    #[test]
    fn starts_empty() {
        let harness = TestStore::new();
        assert!(harness.store.entries().is_empty());
        assert!(harness.store.latest_entry().is_none());
        assert!(harness.store.weight_difference().is_none());
    }

    #[test]
    fn add_keeps_entries_sorted_date_descending() {
        with_test_store(|harness| {
            harness.store.add(entry(70.0, date(2024, 1, 13))).unwrap();
            harness.store.add(entry(72.0, date(2024, 1, 15))).unwrap();
            harness.store.add(entry(71.0, date(2024, 1, 14))).unwrap();

            let weights: Vec<f64> = harness.store.entries().iter().map(|e| e.weight).collect();
            assert_eq!(weights, vec![72.0, 71.0, 70.0]);
        });
    }

    #[test]
    fn add_replaces_same_day_entry_wholesale() {
        with_test_store(|harness| {
            let first = entry(70.0, date(2024, 1, 15));
            let second = entry(71.0, date(2024, 1, 15));
            let second_id = second.id;

            harness.store.add(first).unwrap();
            harness.store.add(second).unwrap();

            assert_eq!(harness.store.entries().len(), 1);
            let kept = &harness.store.entries()[0];
            assert_eq!(kept.weight, 71.0);
            assert_eq!(kept.id, second_id);
        });
    }

    #[test]
    fn no_two_entries_ever_share_a_day() {
        with_test_store(|harness| {
            for weight in [70.0, 71.0, 72.0] {
                harness.store.add(entry(weight, date(2024, 1, 15))).unwrap();
                harness.store.add(entry(weight, date(2024, 1, 16))).unwrap();
            }

            let mut days: Vec<_> = harness.store.entries().iter().map(|e| e.date).collect();
            days.dedup();
            assert_eq!(days.len(), harness.store.entries().len());
        });
    }

    #[test]
    fn update_edits_fields_in_place() {
        with_test_store(|harness| {
            let original = entry(70.0, date(2024, 1, 15));
            harness.store.add(original.clone()).unwrap();

            let mut edited = original;
            edited.weight = 69.5;
            edited.note = Some("after flu".to_string());
            harness.store.update(edited.clone()).unwrap();

            assert_eq!(harness.store.entries(), &[edited]);
        });
    }

    #[test]
    fn update_can_move_entry_to_a_free_day() {
        with_test_store(|harness| {
            let original = entry(70.0, date(2024, 1, 15));
            harness.store.add(original.clone()).unwrap();

            let mut moved = original;
            moved.date = date(2024, 1, 20);
            harness.store.update(moved).unwrap();

            assert!(harness.store.existing_entry(date(2024, 1, 15)).is_none());
            assert!(harness.store.existing_entry(date(2024, 1, 20)).is_some());
        });
    }

    #[test]
    fn update_rejects_move_onto_occupied_day() {
        with_test_store(|harness| {
            let a = entry(70.0, date(2024, 1, 1));
            let b = entry(71.0, date(2024, 1, 2));
            harness.store.add(a.clone()).unwrap();
            harness.store.add(b.clone()).unwrap();

            let mut moved = a.clone();
            moved.date = date(2024, 1, 2);
            let err = harness.store.update(moved).unwrap_err();

            assert!(matches!(err, StoreError::DateConflict(d) if d == date(2024, 1, 2)));
            assert_eq!(harness.store.entries(), &[b, a]);
        });
    }

    #[test]
    fn update_unknown_id_is_not_found_and_never_upserts() {
        with_test_store(|harness| {
            let stray = entry(70.0, date(2024, 1, 15));
            let err = harness.store.update(stray.clone()).unwrap_err();

            assert!(matches!(err, StoreError::NotFound(id) if id == stray.id));
            assert!(harness.store.entries().is_empty());
        });
    }

    #[test]
    fn delete_removes_by_id_and_tolerates_absent_id() {
        with_test_store(|harness| {
            let keep = entry(70.0, date(2024, 1, 15));
            let gone = entry(71.0, date(2024, 1, 16));
            harness.store.add(keep.clone()).unwrap();
            harness.store.add(gone.clone()).unwrap();

            harness.store.delete(gone.id).unwrap();
            assert_eq!(harness.store.entries(), &[keep]);

            harness.store.delete(gone.id).unwrap();
            assert_eq!(harness.store.entries().len(), 1);
        });
    }

    #[test]
    fn delete_all_clears_and_persists_empty() {
        with_test_store(|harness| {
            harness.store.add(entry(70.0, date(2024, 1, 15))).unwrap();
            harness.store.add(entry(71.0, date(2024, 1, 16))).unwrap();

            harness.store.delete_all().unwrap();

            assert!(harness.store.entries().is_empty());
            assert!(harness.reopen().entries().is_empty());
        });
    }

    #[test]
    fn existing_entry_and_can_add_agree() {
        with_test_store(|harness| {
            let day = date(2024, 1, 15);
            assert!(harness.store.can_add(day));
            assert!(harness.store.existing_entry(day).is_none());

            harness.store.add(entry(70.0, day)).unwrap();

            assert!(!harness.store.can_add(day));
            assert_eq!(harness.store.existing_entry(day).unwrap().weight, 70.0);
        });
    }

    #[test]
    fn weight_difference_is_latest_minus_previous() {
        with_test_store(|harness| {
            harness.store.add(entry(70.0, date(2024, 1, 14))).unwrap();
            assert!(harness.store.weight_difference().is_none());

            harness.store.add(entry(71.5, date(2024, 1, 15))).unwrap();
            assert_eq!(harness.store.weight_difference(), Some(1.5));
        });
    }

    #[test]
    fn import_counts_new_days_as_imported_and_revisits_as_updated() {
        with_test_store(|harness| {
            let first = harness
                .store
                .import_entries(vec![
                    entry(70.0, date(2024, 1, 1)),
                    entry(71.0, date(2024, 1, 2)),
                ])
                .unwrap();
            assert_eq!(
                first,
                ImportSummary {
                    imported: 2,
                    updated: 0,
                }
            );
            assert_eq!(harness.store.entries().len(), 2);

            let second = harness
                .store
                .import_entries(vec![
                    entry(69.5, date(2024, 1, 1)),
                    entry(71.5, date(2024, 1, 2)),
                ])
                .unwrap();
            assert_eq!(
                second,
                ImportSummary {
                    imported: 0,
                    updated: 2,
                }
            );

            let weights: Vec<f64> = harness.store.entries().iter().map(|e| e.weight).collect();
            assert_eq!(weights, vec![71.5, 69.5]);
        });
    }

    #[test]
    fn same_batch_same_day_resolves_sequentially_later_wins() {
        with_test_store(|harness| {
            let summary = harness
                .store
                .import_entries(vec![
                    entry(70.0, date(2024, 1, 1)),
                    entry(70.4, date(2024, 1, 1)),
                ])
                .unwrap();

            assert_eq!(
                summary,
                ImportSummary {
                    imported: 1,
                    updated: 1,
                }
            );
            assert_eq!(harness.store.entries().len(), 1);
            assert_eq!(harness.store.entries()[0].weight, 70.4);
        });
    }

    #[test]
    fn import_persists_once_per_batch_and_empty_batch_not_at_all() {
        let backend = MemoryBackend::new();
        let mut store = WeightStore::open(Box::new(backend.clone()));

        store
            .import_entries(vec![
                entry(70.0, date(2024, 1, 1)),
                entry(71.0, date(2024, 1, 2)),
                entry(72.0, date(2024, 1, 3)),
            ])
            .unwrap();
        assert_eq!(backend.write_count(), 1);

        let persisted =
            crate::infrastructure::codec::decode(&backend.raw(STORAGE_KEY).unwrap()).unwrap();
        assert_eq!(persisted, store.entries());

        let summary = store.import_entries(Vec::new()).unwrap();
        assert_eq!(summary, ImportSummary::default());
        assert_eq!(backend.write_count(), 1);
        assert_eq!(store.entries().len(), 3);
    }

    #[test]
    fn persisted_entries_survive_reopen_unchanged() {
        with_test_store(|harness| {
            harness
                .store
                .add(WeightEntry::with_note(
                    70.5,
                    date(2024, 1, 15),
                    "morning",
                ))
                .unwrap();
            harness.store.add(entry(71.0, date(2024, 1, 16))).unwrap();

            let reopened = harness.reopen();
            assert_eq!(reopened.entries(), harness.store.entries());
        });
    }

    #[test]
    fn unreadable_blob_degrades_to_empty_store() {
        let backend = MemoryBackend::new();
        backend.seed(STORAGE_KEY, b"definitely not json");

        let store = WeightStore::open(Box::new(backend.clone()));
        assert!(store.entries().is_empty());

        let backend = MemoryBackend::new();
        backend.seed(STORAGE_KEY, br#"{"version": 99, "entries": []}"#);
        let store = WeightStore::open(Box::new(backend));
        assert!(store.entries().is_empty());
    }

    #[test]
    fn open_resorts_blob_written_in_another_order() {
        let backend = MemoryBackend::new();
        let ascending = vec![entry(70.0, date(2024, 1, 14)), entry(71.0, date(2024, 1, 15))];
        backend.seed(
            STORAGE_KEY,
            &crate::infrastructure::codec::encode(&ascending).unwrap(),
        );

        let store = WeightStore::open(Box::new(backend));
        assert_eq!(store.entries()[0].date, date(2024, 1, 15));
    }

    #[test]
    fn record_twice_then_correct_first_day() {
        with_test_store(|harness| {
            harness.store.add(entry(70.0, date(2024, 1, 15))).unwrap();
            harness.store.add(entry(71.0, date(2024, 1, 16))).unwrap();
            harness.store.add(entry(69.8, date(2024, 1, 15))).unwrap();

            let entries = harness.store.entries();
            assert_eq!(entries.len(), 2);
            assert_eq!((entries[0].weight, entries[0].date), (71.0, date(2024, 1, 16)));
            assert_eq!((entries[1].weight, entries[1].date), (69.8, date(2024, 1, 15)));

            assert_eq!(harness.store.latest_entry().unwrap().weight, 71.0);
            let diff = harness.store.weight_difference().unwrap();
            assert!((diff - 1.2).abs() < 1e-9);
        });
    }
}
