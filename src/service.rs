//! Layout service
//!
//! Everything the daemon does on behalf of a client, on top of the
//! orchestrator and the slot store. Slots are zero-based here.

use crate::apply::Orchestrator;
use crate::config::Settings;
use crate::display::dbus::DisplayConfigService;
use crate::error::{DisplayModesError, Result};
use crate::layout::{Layout, is_active, summarize};
use crate::menu::{Menu, build_menu};
use crate::store::{Debouncer, SlotEntry, SlotStore};
use std::sync::Arc;
use tracing::{info, warn};

pub struct LayoutService<S> {
    orchestrator: Orchestrator<S>,
    store: Arc<SlotStore>,
    settings: Settings,
    renames: Debouncer<usize, String>,
}

impl<S: DisplayConfigService> LayoutService<S> {
    pub fn new(service: S, store: Arc<SlotStore>, settings: Settings) -> Self {
        let target = store.clone();
        let renames = Debouncer::spawn(settings.rename_debounce(), move |slot: usize, name: String| {
            if let Err(e) = target.rename_slot(slot, &name) {
                warn!("Failed to rename slot {}: {}", slot, e);
            }
        });

        Self {
            orchestrator: Orchestrator::new(service),
            store,
            settings,
            renames,
        }
    }

    pub fn store(&self) -> &Arc<SlotStore> {
        &self.store
    }

    fn occupied(&self, slot: usize) -> Result<SlotEntry> {
        self.store
            .entry(slot)?
            .ok_or_else(|| DisplayModesError::NotFound(format!("no layout in slot {}", slot + 1)))
    }

    /// Saved layouts in slot order
    pub fn list(&self) -> Result<Vec<SlotEntry>> {
        self.store.entries()
    }

    /// The menu for the current state. A failed state query is logged and the
    /// menu is built with nothing active.
    pub async fn menu(&self) -> Result<Menu> {
        let entries = self.store.entries()?;
        let snapshot = match self.orchestrator.current_state().await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!("Display state unavailable, no layout marked active: {}", e);
                None
            }
        };
        Ok(build_menu(&entries, snapshot.as_ref()))
    }

    /// First saved layout, in slot order, that matches what is shown now
    pub async fn active(&self) -> Result<Option<SlotEntry>> {
        let entries = self.store.entries()?;
        let snapshot = self.orchestrator.current_state().await?;
        Ok(entries.into_iter().find(|e| is_active(&e.layout, &snapshot)))
    }

    pub fn summary(&self, slot: usize) -> Result<String> {
        Ok(summarize(&self.occupied(slot)?.layout))
    }

    /// Captures the current state into `slot`.
    ///
    /// Without a name, re-saving an occupied slot keeps its name and a fresh
    /// slot gets `"Layout <n>"`.
    pub async fn save_current(&self, slot: usize, name: Option<&str>) -> Result<Layout> {
        self.renames.commit_now(slot).await;
        let existing = self.store.entry(slot)?;
        let name = match name {
            Some(name) => name.to_string(),
            None => existing
                .map(|e| e.layout.name)
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| format!("Layout {}", slot + 1)),
        };

        let layout = self.orchestrator.capture(&name).await?;
        self.store.save_layout(slot, &layout)?;
        Ok(layout)
    }

    pub async fn delete(&self, slot: usize) -> Result<()> {
        self.occupied(slot)?;
        self.renames.commit_now(slot).await;
        self.store.clear_slot(slot)
    }

    /// Queues a rename; the name is written once edits to the slot settle
    pub fn rename(&self, slot: usize, name: &str) -> Result<()> {
        self.occupied(slot)?;
        self.renames.push(slot, name.to_string());
        Ok(())
    }

    /// Writes any rename still waiting for its window, then stops the renamer
    pub async fn close(self) {
        self.renames.close().await;
    }

    /// Applies the layout in `slot`. `persistent` defaults to skipping the
    /// confirmation prompt only when the settings say so.
    pub async fn apply(&self, slot: usize, persistent: Option<bool>) -> Result<Layout> {
        let entry = self.occupied(slot)?;
        let persistent = persistent.unwrap_or_else(|| self.settings.default_persistent());

        let uses = self.store.increment_usage(slot)?;
        info!(
            "Applying slot {} '{}' (used {} times)",
            slot + 1,
            entry.layout.display_name(),
            uses
        );
        self.orchestrator.apply(&entry.layout, persistent).await?;
        Ok(entry.layout)
    }
}
