//! Compositor Display-Config Client
//!
//! The [`DisplayConfigService`] trait is the seam between the layout logic and
//! the compositor. [`MutterDisplayConfig`] implements it over the session bus
//! with zbus; tests swap in an in-memory implementation.

use super::parser::{RawLogicalMonitor, RawMode, RawMonitor, RawMonitorSpec, RawState};
use crate::config::{DISPLAY_CONFIG_BUS_NAME, DISPLAY_CONFIG_INTERFACE, DISPLAY_CONFIG_OBJECT_PATH};
use crate::error::{DisplayModesError, Result};
use crate::layout::ApplyRequest;
use std::collections::HashMap;
use std::future::Future;
use tracing::{debug, info};
use zbus::zvariant::{OwnedValue, Value};
use zbus::{Connection, proxy};

/// `(connector, vendor, product, serial)`
type WireMonitorSpec = (String, String, String, String);
/// `(id, width, height, refresh rate, preferred scale, supported scales, properties)`
type WireMode = (String, i32, i32, f64, f64, Vec<f64>, HashMap<String, OwnedValue>);
type WireMonitor = (WireMonitorSpec, Vec<WireMode>, HashMap<String, OwnedValue>);
type WireLogicalMonitor = (i32, i32, f64, u32, bool, Vec<WireMonitorSpec>, HashMap<String, OwnedValue>);
/// Reply of `GetCurrentState`: `(ua((ssss)a(siiddada{sv})a{sv})a(iiduba(ssss)a{sv})a{sv})`
type WireState = (u32, Vec<WireMonitor>, Vec<WireLogicalMonitor>, HashMap<String, OwnedValue>);

type WireApplyMonitor = (String, String, HashMap<String, OwnedValue>);
/// `(iiduba(ssa{sv}))`
type WireApplyLogicalMonitor = (i32, i32, f64, u32, bool, Vec<WireApplyMonitor>);

// Destination and path are set from `config` when the proxy is built
#[proxy(interface = "org.gnome.Mutter.DisplayConfig", gen_blocking = false)]
trait DisplayConfig {
    fn get_current_state(&self) -> zbus::Result<WireState>;

    fn apply_monitors_config(
        &self,
        serial: u32,
        method: u32,
        logical_monitors: Vec<WireApplyLogicalMonitor>,
        properties: HashMap<String, OwnedValue>,
    ) -> zbus::Result<()>;
}

/// Request/response access to the compositor's display configuration.
///
/// Each call is one independent exchange; nothing is cached between them.
pub trait DisplayConfigService {
    /// Queries the current state, including a fresh serial
    fn get_current_state(&self) -> impl Future<Output = Result<RawState>> + Send;

    /// Asks the compositor to apply `request`
    fn apply_monitors_config(&self, request: &ApplyRequest) -> impl Future<Output = Result<()>> + Send;
}

fn property_is_true(properties: &HashMap<String, OwnedValue>, key: &str) -> bool {
    matches!(properties.get(key).map(|v| &**v), Some(Value::Bool(true)))
}

fn spec_from_wire(spec: WireMonitorSpec) -> RawMonitorSpec {
    RawMonitorSpec::from(spec)
}

fn state_from_wire(wire: WireState) -> RawState {
    let (serial, monitors, logical_monitors, _properties) = wire;

    let monitors = monitors
        .into_iter()
        .map(|(spec, modes, _properties)| RawMonitor {
            spec: spec_from_wire(spec),
            modes: modes
                .into_iter()
                .map(|(id, width, height, refresh_rate, _, _, properties)| RawMode {
                    is_current: property_is_true(&properties, "is-current"),
                    id,
                    width,
                    height,
                    refresh_rate,
                })
                .collect(),
        })
        .collect();

    let logical_monitors = logical_monitors
        .into_iter()
        .map(|(x, y, scale, transform, primary, specs, _properties)| RawLogicalMonitor {
            x,
            y,
            scale,
            transform,
            primary,
            monitors: specs.into_iter().map(spec_from_wire).collect(),
        })
        .collect();

    RawState {
        serial,
        monitors,
        logical_monitors,
    }
}

fn request_to_wire(request: &ApplyRequest) -> Vec<WireApplyLogicalMonitor> {
    request
        .logical_monitors
        .iter()
        .map(|lm| {
            (
                lm.x,
                lm.y,
                lm.scale,
                lm.transform,
                lm.primary,
                lm.monitors
                    .iter()
                    .map(|mon| (mon.connector.clone(), mon.mode.clone(), HashMap::new()))
                    .collect(),
            )
        })
        .collect()
}

/// Mutter's `org.gnome.Mutter.DisplayConfig` on the session bus
pub struct MutterDisplayConfig {
    proxy: DisplayConfigProxy<'static>,
}

impl MutterDisplayConfig {
    /// Connects to the session bus
    pub async fn connect() -> Result<Self> {
        let connection = Connection::session().await.map_err(|e| DisplayModesError::Transport {
            service: "session bus".to_string(),
            message: e.to_string(),
        })?;
        Self::with_connection(&connection).await
    }

    pub async fn with_connection(connection: &Connection) -> Result<Self> {
        let proxy = DisplayConfigProxy::builder(connection)
            .destination(DISPLAY_CONFIG_BUS_NAME)?
            .path(DISPLAY_CONFIG_OBJECT_PATH)?
            .interface(DISPLAY_CONFIG_INTERFACE)?
            .build()
            .await?;
        info!("Connected to {}", DISPLAY_CONFIG_BUS_NAME);
        Ok(Self { proxy })
    }
}

impl DisplayConfigService for MutterDisplayConfig {
    async fn get_current_state(&self) -> Result<RawState> {
        debug!("Calling GetCurrentState");
        let wire = self.proxy.get_current_state().await?;
        Ok(state_from_wire(wire))
    }

    async fn apply_monitors_config(&self, request: &ApplyRequest) -> Result<()> {
        debug!(
            "Calling ApplyMonitorsConfig serial={} method={} logical_monitors={}",
            request.serial,
            request.method.code(),
            request.logical_monitors.len()
        );
        self.proxy
            .apply_monitors_config(
                request.serial,
                request.method.code(),
                request_to_wire(request),
                HashMap::new(),
            )
            .await
            .map_err(|e| match DisplayModesError::from(e) {
                DisplayModesError::StaleSerial { message, .. } => DisplayModesError::StaleSerial {
                    serial: request.serial,
                    message,
                },
                other => other,
            })
    }
}
