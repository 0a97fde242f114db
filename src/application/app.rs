use crate::application::tui::{TrackerTui, TuiTab};
use crate::application::{BackendKind, Config};
use crate::domain::{ChartPeriod, ImportSummary, WeightEntry, WeightStore};
use crate::infrastructure::{
    ChangeLoggerHook, DuckDbBackend, FsBackend, HookRegistry, ImportParser, STORAGE_KEY,
    StorageBackend, storage_path,
};
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;

/// Whether `record` wrote a fresh day or replaced an existing measurement;
/// drives the user-facing message only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded,
    Updated,
}

pub struct WeightApp {
    pub store: WeightStore,
    pub config: Config,
}

impl WeightApp {
    pub fn new() -> Result<Self> {
        Self::with_default_hooks()
    }

    pub fn with_default_hooks() -> Result<Self> {
        let mut hooks = HookRegistry::new();
        hooks.register(ChangeLoggerHook);
        Self::with_config(Config::from_env(), hooks)
    }

    pub fn with_config(config: Config, hooks: HookRegistry) -> Result<Self> {
        let backend = Self::open_backend(&config)?;
        let store = WeightStore::with_hooks(backend, hooks);
        Ok(Self { store, config })
    }

    fn open_backend(config: &Config) -> Result<Box<dyn StorageBackend>> {
        match config.backend {
            BackendKind::Filesystem => {
                log::debug!(
                    "storing entries at {}",
                    storage_path(&config.data_dir, STORAGE_KEY).display()
                );
                Ok(Box::new(FsBackend::new(config.data_dir.clone())))
            }
            BackendKind::DuckDb => {
                std::fs::create_dir_all(&config.data_dir).with_context(|| {
                    format!("failed to create {}", config.data_dir.display())
                })?;
                Ok(Box::new(DuckDbBackend::open(config.db_path())?))
            }
        }
    }

    /// Record a weight for a day, replacing any measurement already logged
    /// that day.
    pub fn record(
        &mut self,
        weight: f64,
        date: NaiveDate,
        note: Option<String>,
    ) -> Result<RecordOutcome> {
        validate_weight(weight)?;

        let outcome = if self.store.can_add(date) {
            RecordOutcome::Recorded
        } else {
            RecordOutcome::Updated
        };

        let entry = match note {
            Some(note) => WeightEntry::with_note(weight, date, note),
            None => WeightEntry::new(weight, date),
        };
        self.store.add(entry)?;
        Ok(outcome)
    }

    /// Edit the entry occupying `date`. Moving it onto a day that already
    /// holds a different entry is rejected by the store.
    pub fn edit(
        &mut self,
        date: NaiveDate,
        new_weight: Option<f64>,
        move_to: Option<NaiveDate>,
        new_note: Option<String>,
    ) -> Result<WeightEntry> {
        let Some(existing) = self.store.existing_entry(date) else {
            bail!("no entry recorded on {date}");
        };

        let mut edited = existing.clone();
        if let Some(weight) = new_weight {
            validate_weight(weight)?;
            edited.weight = weight;
        }
        if let Some(target) = move_to {
            edited.date = target;
        }
        if let Some(note) = new_note {
            edited.note = (!note.is_empty()).then_some(note);
        }

        self.store.update(edited.clone())?;
        Ok(edited)
    }

    /// Delete the entry for a day. Returns whether anything was deleted.
    pub fn delete_day(&mut self, date: NaiveDate) -> Result<bool> {
        match self.store.existing_entry(date) {
            Some(existing) => {
                let id = existing.id;
                self.store.delete(id)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn clear(&mut self) -> Result<()> {
        self.store.delete_all()?;
        Ok(())
    }

    /// Parse bulk-import text and feed the validated batch to the store.
    /// A malformed line aborts before any store mutation.
    pub fn import_text(&mut self, text: &str) -> Result<ImportSummary> {
        let lines = ImportParser::new().parse(text)?;
        let entries = lines
            .into_iter()
            .map(|line| WeightEntry::new(line.weight, line.date))
            .collect();
        Ok(self.store.import_entries(entries)?)
    }

    pub fn run_tui(&self, tab: TuiTab, period: ChartPeriod) -> Result<()> {
        let mut tui = TrackerTui::new(&self.store, &self.config.theme, tab, period)?;
        tui.run()?;
        Ok(())
    }
}

fn validate_weight(weight: f64) -> Result<()> {
    if !(weight > 0.0 && weight <= 500.0) {
        bail!("weight must be greater than 0 kg and at most 500 kg");
    }
    Ok(())
}
