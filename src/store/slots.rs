use crate::config::NUM_SLOTS;
use crate::error::{DisplayModesError, Result};
use crate::layout::Layout;
use async_std::channel::{self, Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// On-disk shape of the store
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct StoreFile {
    layouts: Vec<String>,
    usage_counts: Vec<String>,
}

/// Emitted after every successful write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    LayoutsChanged,
    UsageChanged,
}

/// A decoded, non-empty slot
#[derive(Debug, Clone, PartialEq)]
pub struct SlotEntry {
    /// Zero-based slot index
    pub slot: usize,
    pub layout: Layout,
    pub usage: u64,
}

/// File-backed slot array.
///
/// Every call reads the file afresh; writes go through a temporary file and a
/// rename, so a failed write leaves the previous contents in place.
pub struct SlotStore {
    path: PathBuf,
    write_lock: Mutex<()>,
    subscribers: Mutex<Vec<Sender<StoreEvent>>>,
}

fn check_slot(slot: usize) -> Result<()> {
    if slot >= NUM_SLOTS {
        return Err(DisplayModesError::InvalidArguments(format!(
            "slot {} out of range (0..{})",
            slot, NUM_SLOTS
        )));
    }
    Ok(())
}

fn fixed_len(mut values: Vec<String>, fill: &str) -> Vec<String> {
    values.resize(NUM_SLOTS, fill.to_string());
    values
}

/// Usage counter text to a number; anything unparsable counts as zero
fn parse_count(text: &str) -> u64 {
    text.trim().parse().unwrap_or(0)
}

impl SlotStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<StoreFile> {
        if !self.path.exists() {
            return Ok(StoreFile::default());
        }
        let text = fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&text)?)
    }

    fn write(&self, file: &StoreFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = toml::to_string(file)?;
        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        debug!("Wrote store {}", self.path.display());
        Ok(())
    }

    fn notify(&self, event: StoreEvent) {
        let Ok(mut subscribers) = self.subscribers.lock() else {
            warn!("Store subscriber list poisoned, dropping {:?}", event);
            return;
        };
        subscribers.retain(|tx| tx.try_send(event).is_ok());
    }

    /// Read-modify-write of the whole file under the store's lock
    fn update<F>(&self, event: StoreEvent, change: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<String>, &mut Vec<String>) -> Result<bool>,
    {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| DisplayModesError::Config("store lock poisoned".to_string()))?;

        let file = self.read()?;
        let mut layouts = fixed_len(file.layouts, "");
        let mut counts = fixed_len(file.usage_counts, "0");
        if !change(&mut layouts, &mut counts)? {
            return Ok(());
        }
        self.write(&StoreFile { layouts, usage_counts: counts })?;
        self.notify(event);
        Ok(())
    }

    /// Receives an event after every write made through this store
    pub fn subscribe(&self) -> Receiver<StoreEvent> {
        let (tx, rx) = channel::unbounded();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }

    /// Raw slot texts, always [`NUM_SLOTS`] long; empty string means empty slot
    pub fn layouts(&self) -> Result<Vec<String>> {
        Ok(fixed_len(self.read()?.layouts, ""))
    }

    pub fn set_layouts(&self, layouts: Vec<String>) -> Result<()> {
        self.update(StoreEvent::LayoutsChanged, |current, _| {
            *current = fixed_len(layouts, "");
            Ok(true)
        })
    }

    /// Raw usage counters, always [`NUM_SLOTS`] long
    pub fn usage_counts(&self) -> Result<Vec<String>> {
        Ok(fixed_len(self.read()?.usage_counts, "0"))
    }

    pub fn set_usage_counts(&self, counts: Vec<String>) -> Result<()> {
        self.update(StoreEvent::UsageChanged, |_, current| {
            *current = fixed_len(counts, "0");
            Ok(true)
        })
    }

    /// Every slot that holds a decodable layout, in slot order
    pub fn entries(&self) -> Result<Vec<SlotEntry>> {
        let file = self.read()?;
        let counts = fixed_len(file.usage_counts, "0");

        let entries = fixed_len(file.layouts, "")
            .iter()
            .enumerate()
            .filter(|(_, text)| !text.is_empty())
            .filter_map(|(slot, text)| match Layout::from_json(text) {
                Ok(layout) => Some(SlotEntry {
                    slot,
                    layout,
                    usage: parse_count(&counts[slot]),
                }),
                Err(e) => {
                    debug!("Skipping slot {}: {}", slot, e);
                    None
                }
            })
            .collect();
        Ok(entries)
    }

    /// The decoded layout in `slot`, if any
    pub fn entry(&self, slot: usize) -> Result<Option<SlotEntry>> {
        check_slot(slot)?;
        Ok(self.entries()?.into_iter().find(|e| e.slot == slot))
    }

    /// Stores `layout` in `slot`, replacing whatever was there
    ///
    /// # Arguments
    /// * `slot` - Zero-based slot index
    /// * `layout` - Layout to encode as JSON
    ///
    /// # Returns
    /// * `Result<()>` - `InvalidArguments` for a slot out of range, or a write error
    pub fn save_layout(&self, slot: usize, layout: &Layout) -> Result<()> {
        check_slot(slot)?;
        let text = layout.to_json()?;
        self.update(StoreEvent::LayoutsChanged, |layouts, _| {
            layouts[slot] = text;
            Ok(true)
        })?;
        info!("Saved layout '{}' to slot {}", layout.display_name(), slot);
        Ok(())
    }

    pub fn clear_slot(&self, slot: usize) -> Result<()> {
        check_slot(slot)?;
        self.update(StoreEvent::LayoutsChanged, |layouts, _| {
            layouts[slot].clear();
            Ok(true)
        })?;
        info!("Cleared slot {}", slot);
        Ok(())
    }

    /// Renames the layout in `slot`
    ///
    /// # Arguments
    /// * `slot` - Zero-based slot index
    /// * `name` - New name
    ///
    /// # Returns
    /// * `Result<bool>` - `false`, with nothing written, when the slot is empty
    ///   or does not decode
    pub fn rename_slot(&self, slot: usize, name: &str) -> Result<bool> {
        check_slot(slot)?;
        let mut renamed = false;
        self.update(StoreEvent::LayoutsChanged, |layouts, _| {
            let Ok(mut layout) = Layout::from_json(&layouts[slot]) else {
                debug!("Not renaming slot {}: no layout", slot);
                return Ok(false);
            };
            layout.name = name.to_string();
            layouts[slot] = layout.to_json()?;
            renamed = true;
            Ok(true)
        })?;
        if renamed {
            info!("Renamed slot {} to '{}'", slot, name);
        }
        Ok(renamed)
    }

    /// Bumps the usage counter of `slot` and returns the new value
    pub fn increment_usage(&self, slot: usize) -> Result<u64> {
        check_slot(slot)?;
        let mut value = 0;
        self.update(StoreEvent::UsageChanged, |_, counts| {
            value = parse_count(&counts[slot]) + 1;
            counts[slot] = value.to_string();
            Ok(true)
        })?;
        Ok(value)
    }
}
