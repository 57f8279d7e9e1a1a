use super::*;
use crate::config::NUM_SLOTS;
use crate::error::DisplayModesError;
use crate::layout::{Layout, LogicalMonitorStored, StoredMonitor};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

fn layout(name: &str, connector: &str) -> Layout {
    Layout {
        name: name.to_string(),
        logical_monitors: vec![LogicalMonitorStored {
            primary: true,
            monitors: vec![StoredMonitor {
                connector: connector.to_string(),
                mode: "1920x1080@60".to_string(),
                width: 1920,
                height: 1080,
                ..Default::default()
            }],
            ..Default::default()
        }],
        disabled_monitors: vec![],
    }
}

fn store() -> (TempDir, SlotStore) {
    let dir = TempDir::new().unwrap();
    let store = SlotStore::new(dir.path().join("layouts.toml"));
    (dir, store)
}

mod slot_tests {
    use super::*;

    /// Test that a missing file reads as five empty slots
    #[test]
    fn test_missing_file_is_empty() {
        let (_dir, store) = store();
        assert_eq!(store.layouts().unwrap(), vec![String::new(); NUM_SLOTS]);
        assert_eq!(store.usage_counts().unwrap(), vec!["0".to_string(); NUM_SLOTS]);
        assert!(store.entries().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_read_back() {
        let (_dir, store) = store();
        store.save_layout(2, &layout("Desk", "DP-1")).unwrap();

        let entries = store.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].slot, 2);
        assert_eq!(entries[0].layout, layout("Desk", "DP-1"));
        assert_eq!(entries[0].usage, 0);
        assert!(store.entry(2).unwrap().is_some());
        assert!(store.entry(0).unwrap().is_none());
    }

    /// Test that the file keeps the documented keys and slot count
    #[test]
    fn test_file_format() {
        let (_dir, store) = store();
        store.save_layout(0, &layout("Desk", "DP-1")).unwrap();

        let text = std::fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("layouts"));
        assert!(text.contains("usage-counts"));
        let value: toml::Value = toml::from_str(&text).unwrap();
        assert_eq!(value["layouts"].as_array().unwrap().len(), NUM_SLOTS);
        assert_eq!(value["usage-counts"].as_array().unwrap().len(), NUM_SLOTS);
    }

    #[test]
    fn test_short_arrays_are_padded() {
        let (_dir, store) = store();
        std::fs::write(store.path(), "layouts = [\"\"]\nusage-counts = [\"4\"]\n").unwrap();

        assert_eq!(store.layouts().unwrap().len(), NUM_SLOTS);
        assert_eq!(store.usage_counts().unwrap()[0], "4");
        assert_eq!(store.usage_counts().unwrap()[4], "0");
    }

    /// Test that malformed slot text is skipped rather than reported
    #[test]
    fn test_malformed_slot_is_skipped() {
        let (_dir, store) = store();
        store
            .set_layouts(vec![
                "{not json".to_string(),
                layout("Desk", "DP-1").to_json().unwrap(),
                r#"{"name":"no monitors key"}"#.to_string(),
            ])
            .unwrap();

        let entries = store.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].slot, 1);
    }

    #[test]
    fn test_clear_slot() {
        let (_dir, store) = store();
        store.save_layout(1, &layout("Desk", "DP-1")).unwrap();
        store.clear_slot(1).unwrap();
        assert!(store.entries().unwrap().is_empty());
        assert_eq!(store.layouts().unwrap()[1], "");
    }

    #[test]
    fn test_rename_slot() {
        let (_dir, store) = store();
        store.save_layout(3, &layout("Desk", "DP-1")).unwrap();

        assert!(store.rename_slot(3, "Office").unwrap());
        assert_eq!(store.entry(3).unwrap().unwrap().layout.name, "Office");
        assert!(!store.rename_slot(4, "Nothing here").unwrap());
    }

    #[test]
    fn test_increment_usage() {
        let (_dir, store) = store();
        store.set_usage_counts(vec!["7".to_string(), "junk".to_string()]).unwrap();

        assert_eq!(store.increment_usage(0).unwrap(), 8);
        assert_eq!(store.increment_usage(1).unwrap(), 1);
        assert_eq!(store.usage_counts().unwrap()[..2], ["8".to_string(), "1".to_string()]);
    }

    #[test]
    fn test_slot_out_of_range() {
        let (_dir, store) = store();
        assert!(matches!(
            store.save_layout(NUM_SLOTS, &layout("x", "DP-1")),
            Err(DisplayModesError::InvalidArguments(_))
        ));
        assert!(matches!(store.clear_slot(9), Err(DisplayModesError::InvalidArguments(_))));
        assert!(matches!(store.increment_usage(5), Err(DisplayModesError::InvalidArguments(_))));
    }

    /// Test that subscribers hear about each kind of write
    #[test]
    fn test_subscribers_are_notified() {
        let (_dir, store) = store();
        let events = store.subscribe();

        store.save_layout(0, &layout("Desk", "DP-1")).unwrap();
        store.increment_usage(0).unwrap();
        store.rename_slot(2, "nothing").unwrap();

        assert_eq!(events.try_recv().unwrap(), StoreEvent::LayoutsChanged);
        assert_eq!(events.try_recv().unwrap(), StoreEvent::UsageChanged);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_dropped_subscriber_is_forgotten() {
        let (_dir, store) = store();
        drop(store.subscribe());
        store.clear_slot(0).unwrap();
        store.clear_slot(1).unwrap();
    }
}

mod debounce_tests {
    use super::*;

    type Commits = Arc<Mutex<Vec<(usize, String)>>>;

    fn recorder() -> (Commits, impl Fn(usize, String) + Send + 'static) {
        let commits: Commits = Arc::new(Mutex::new(Vec::new()));
        let sink = commits.clone();
        (commits, move |slot, name| sink.lock().unwrap().push((slot, name)))
    }

    /// Test that a burst of edits to one key commits only the last one
    #[async_std::test]
    async fn test_burst_commits_latest() {
        let (commits, commit) = recorder();
        let debouncer = Debouncer::spawn(Duration::from_millis(50), commit);

        debouncer.push(0, "D".to_string());
        debouncer.push(0, "De".to_string());
        debouncer.push(0, "Desk".to_string());
        async_std::task::sleep(Duration::from_millis(300)).await;

        assert_eq!(*commits.lock().unwrap(), vec![(0, "Desk".to_string())]);
    }

    #[async_std::test]
    async fn test_keys_commit_independently() {
        let (commits, commit) = recorder();
        let debouncer = Debouncer::spawn(Duration::from_millis(50), commit);

        debouncer.push(1, "Office".to_string());
        debouncer.push(0, "Home".to_string());
        async_std::task::sleep(Duration::from_millis(300)).await;

        let mut committed = commits.lock().unwrap().clone();
        committed.sort();
        assert_eq!(committed, vec![(0, "Home".to_string()), (1, "Office".to_string())]);
    }

    /// Test that dropping the debouncer flushes pending edits
    #[async_std::test]
    async fn test_drop_flushes() {
        let (commits, commit) = recorder();
        let debouncer = Debouncer::spawn(Duration::from_secs(60), commit);

        debouncer.push(2, "Travel".to_string());
        drop(debouncer);
        async_std::task::sleep(Duration::from_millis(200)).await;

        assert_eq!(*commits.lock().unwrap(), vec![(2, "Travel".to_string())]);
    }

    /// Test that steady edits to one key do not hold back another key
    #[async_std::test]
    async fn test_windows_are_per_key() {
        let (commits, commit) = recorder();
        let debouncer = Debouncer::spawn(Duration::from_millis(150), commit);

        debouncer.push(1, "Office".to_string());
        for i in 0..8 {
            async_std::task::sleep(Duration::from_millis(30)).await;
            debouncer.push(2, format!("Typing {}", i));
        }

        let committed = commits.lock().unwrap().clone();
        assert_eq!(committed, vec![(1, "Office".to_string())]);
    }

    #[async_std::test]
    async fn test_commit_now_skips_the_window() {
        let (commits, commit) = recorder();
        let debouncer = Debouncer::spawn(Duration::from_secs(60), commit);

        debouncer.push(0, "Desk".to_string());
        debouncer.push(3, "Travel".to_string());
        debouncer.commit_now(0).await;
        debouncer.commit_now(4).await;

        assert_eq!(*commits.lock().unwrap(), vec![(0, "Desk".to_string())]);
    }

    /// Test that close waits until pending edits are committed
    #[async_std::test]
    async fn test_close_waits_for_commits() {
        let (commits, commit) = recorder();
        let debouncer = Debouncer::spawn(Duration::from_secs(60), commit);

        debouncer.push(2, "Travel".to_string());
        debouncer.push(0, "Home".to_string());
        debouncer.close().await;

        assert_eq!(
            *commits.lock().unwrap(),
            vec![(0, "Home".to_string()), (2, "Travel".to_string())]
        );
    }

    #[async_std::test]
    async fn test_commit_into_store() {
        let (_dir, store) = store();
        let store = Arc::new(store);
        store.save_layout(0, &layout("Desk", "DP-1")).unwrap();

        let target = store.clone();
        let debouncer = Debouncer::spawn(Duration::from_millis(30), move |slot: usize, name: String| {
            target.rename_slot(slot, &name).unwrap();
        });
        debouncer.push(0, "Des".to_string());
        debouncer.push(0, "Desk 2".to_string());
        async_std::task::sleep(Duration::from_millis(250)).await;

        assert_eq!(store.entry(0).unwrap().unwrap().layout.name, "Desk 2");
    }
}
