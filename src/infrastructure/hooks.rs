use crate::domain::WeightEntry;
use anyhow::Result;

/// Trait for observers that react to store mutations. The store invokes
/// every registered hook after each successful mutation, with the current
/// sorted collection.
pub trait ChangeHook: Send + Sync {
    fn on_entries_changed(&self, entries: &[WeightEntry]) -> Result<()>;

    /// Human-readable name for this hook
    fn name(&self) -> &str;
}

/// Registry for managing change hooks
pub struct HookRegistry {
    hooks: Vec<Box<dyn ChangeHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Register a new change hook
    pub fn register<H>(&mut self, hook: H)
    where
        H: ChangeHook + 'static,
    {
        self.hooks.push(Box::new(hook));
    }

    /// Notify all registered hooks. A failing hook is logged and skipped so
    /// one bad observer cannot fail the mutation that triggered it.
    pub fn notify(&self, entries: &[WeightEntry]) {
        for hook in &self.hooks {
            if let Err(e) = hook.on_entries_changed(entries) {
                log::warn!("change hook '{}' failed: {e:#}", hook.name());
            }
        }
    }

    /// List all registered hooks
    pub fn list_hooks(&self) -> Vec<&str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}
