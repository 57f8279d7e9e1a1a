//! Apply Orchestrator
//!
//! Re-applies a stored layout: fetch a fresh serial, build the request, send it.
//! The query and the apply are two separate exchanges awaited in order, so the
//! caller's event loop keeps running while either is in flight. If the
//! topology changes between them the compositor rejects the stale serial and
//! the error is handed back as is; there is no automatic retry.

use crate::display::StateSnapshot;
use crate::display::dbus::DisplayConfigService;
use crate::display::parser;
use crate::error::{DisplayModesError, Result};
use crate::layout::{Layout, build_apply_request, to_layout};
use tracing::{debug, error, info};

pub struct Orchestrator<S> {
    service: S,
}

impl<S: DisplayConfigService> Orchestrator<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Queries and parses the current display state
    pub async fn current_state(&self) -> Result<StateSnapshot> {
        let raw = self.service.get_current_state().await?;
        parser::parse(raw)
    }

    /// Captures the current display state as a layout called `name`
    pub async fn capture(&self, name: &str) -> Result<Layout> {
        let snapshot = self.current_state().await?;
        Ok(to_layout(&snapshot, name))
    }

    /// Applies `layout`, temporarily with a confirmation prompt unless
    /// `persistent` is set
    pub async fn apply(&self, layout: &Layout, persistent: bool) -> Result<()> {
        if layout.logical_monitors.is_empty() {
            return Err(DisplayModesError::InvalidArguments(format!(
                "layout '{}' has no logical monitors",
                layout.display_name()
            )));
        }

        // The serial must come from a query made right now, never from an
        // earlier snapshot.
        let serial = self.service.get_current_state().await?.serial;
        debug!("Fetched serial {} for '{}'", serial, layout.display_name());

        let request = build_apply_request(layout, serial, persistent);
        match self.service.apply_monitors_config(&request).await {
            Ok(()) => {
                info!(
                    "Applied layout '{}' (method {})",
                    layout.display_name(),
                    request.method.code()
                );
                Ok(())
            }
            Err(e) => {
                error!("Failed to apply layout '{}': {}", layout.display_name(), e);
                Err(e)
            }
        }
    }

    /// Applies `layout` unconditionally, without a confirmation prompt
    pub async fn apply_persistent(&self, layout: &Layout) -> Result<()> {
        self.apply(layout, true).await
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{FakeDisplayConfig, docked_state};
    use super::*;
    use crate::layout::ApplyMethod;

    #[async_std::test]
    async fn test_apply_uses_fresh_serial() {
        let orchestrator = Orchestrator::new(FakeDisplayConfig::new(docked_state(10)));
        let layout = orchestrator.capture("Docked").await.unwrap();

        orchestrator.service().set_serial(11);
        orchestrator.apply(&layout, false).await.unwrap();

        let applied = orchestrator.service().applied();
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].serial, 11);
        assert_eq!(applied[0].method, ApplyMethod::Temporary);
        assert_eq!(applied[0].logical_monitors.len(), 2);
        assert_eq!(applied[0].logical_monitors[1].monitors[0].mode, "2560x1440@60");
    }

    #[async_std::test]
    async fn test_apply_persistent_selects_method_two() {
        let orchestrator = Orchestrator::new(FakeDisplayConfig::new(docked_state(1)));
        let layout = orchestrator.capture("Docked").await.unwrap();

        orchestrator.apply_persistent(&layout).await.unwrap();
        assert_eq!(orchestrator.service().applied()[0].method.code(), 2);
    }

    #[async_std::test]
    async fn test_stale_serial_is_surfaced_without_retry() {
        let fake = FakeDisplayConfig::new(docked_state(5));
        fn stale(serial: u32) -> DisplayModesError {
            DisplayModesError::StaleSerial {
                serial,
                message: "The requested configuration is based on stale information".to_string(),
            }
        }
        *fake.reject_apply.lock().unwrap() = Some(stale as fn(u32) -> DisplayModesError);
        let orchestrator = Orchestrator::new(fake);
        let layout = orchestrator.capture("Docked").await.unwrap();

        let result = orchestrator.apply(&layout, true).await;
        assert!(matches!(result, Err(DisplayModesError::StaleSerial { serial: 5, .. })));
        assert!(orchestrator.service().applied().is_empty());
    }

    #[async_std::test]
    async fn test_query_failure_stops_before_apply() {
        let orchestrator = Orchestrator::new(FakeDisplayConfig::unreachable());
        let layout = Layout {
            name: "x".to_string(),
            logical_monitors: vec![Default::default()],
            disabled_monitors: vec![],
        };

        let result = orchestrator.apply(&layout, true).await;
        assert!(matches!(result, Err(DisplayModesError::Transport { .. })));
        assert!(orchestrator.service().applied().is_empty());
    }

    #[async_std::test]
    async fn test_empty_layout_is_rejected() {
        let orchestrator = Orchestrator::new(FakeDisplayConfig::new(docked_state(1)));
        let result = orchestrator.apply(&Layout::default(), true).await;
        assert!(matches!(result, Err(DisplayModesError::InvalidArguments(_))));
    }

    #[async_std::test]
    async fn test_captured_layout_is_active() {
        let orchestrator = Orchestrator::new(FakeDisplayConfig::new(docked_state(1)));
        let snapshot = orchestrator.current_state().await.unwrap();
        let layout = orchestrator.capture("Docked").await.unwrap();

        assert!(crate::layout::is_active(&layout, &snapshot));
        assert_eq!(layout.disabled_monitors.len(), 1);
        assert_eq!(layout.disabled_monitors[0].connector, "HDMI-1");
    }
}
