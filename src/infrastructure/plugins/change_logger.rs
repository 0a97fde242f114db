use crate::domain::WeightEntry;
use crate::infrastructure::ChangeHook;
use anyhow::Result;

/// Default hook that records every store mutation through the `log` facade.
pub struct ChangeLoggerHook;

impl ChangeHook for ChangeLoggerHook {
    fn on_entries_changed(&self, entries: &[WeightEntry]) -> Result<()> {
        match entries.first() {
            Some(latest) => log::info!(
                "store changed: {} entries, latest {} on {}",
                entries.len(),
                latest.formatted_weight(),
                latest.date
            ),
            None => log::info!("store changed: now empty"),
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "change logger"
    }
}
