//! Load config: defaults, then the first config file found, then environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use empower_core::protocol::CellCapabilities;
use empower_core::records::{CellDetails, UeDetails};
use empower_core::AgentSettings;
use serde::Deserialize;

use crate::net::Link;

/// Agent configuration. File: `--config`, ~/.config/empower/agent.toml,
/// /etc/empower/agent.toml, or the legacy /etc/empower/agent.conf ("<addr> <port>").
/// Env overrides: EMPOWER_CTRL_ADDR, EMPOWER_CTRL_PORT, EMPOWER_ENB_ID.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Controller address (default 127.0.0.1).
    #[serde(default = "default_ctrl_addr")]
    pub ctrl_addr: String,
    /// Controller port (default 2210).
    #[serde(default = "default_ctrl_port")]
    pub ctrl_port: u16,
    #[serde(default = "default_enb_id")]
    pub enb_id: u32,
    #[serde(default = "default_hello_interval_ms")]
    pub hello_interval_ms: u64,
    /// Period of the scheduler tick.
    #[serde(default = "default_sched_interval_ms")]
    pub sched_interval_ms: u64,
    /// Added to the 1 s reconnect delay.
    #[serde(default = "default_net_interval_ms")]
    pub net_interval_ms: u64,
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
    /// Filter used when RUST_LOG is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub cells: Vec<CellConfig>,
    #[serde(default)]
    pub ues: Vec<UeConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CellConfig {
    pub pci: u16,
    #[serde(default)]
    pub dl_earfcn: u16,
    #[serde(default = "default_prbs")]
    pub dl_prbs: u8,
    #[serde(default)]
    pub ul_earfcn: u16,
    #[serde(default = "default_prbs")]
    pub ul_prbs: u8,
    #[serde(default)]
    pub phy_report: bool,
    #[serde(default)]
    pub mac_report: bool,
    /// PRBs in use, as reported by MAC reports.
    #[serde(default)]
    pub dl_prbs_used: u32,
    #[serde(default)]
    pub ul_prbs_used: u32,
}

impl CellConfig {
    pub fn details(&self) -> CellDetails {
        let mut cap = CellCapabilities::NOTHING;
        if self.phy_report {
            cap |= CellCapabilities::PHY_REPORT;
        }
        if self.mac_report {
            cap |= CellCapabilities::MAC_REPORT;
        }
        CellDetails {
            pci: self.pci,
            cap,
            dl_earfcn: self.dl_earfcn,
            dl_prbs: self.dl_prbs,
            ul_earfcn: self.ul_earfcn,
            ul_prbs: self.ul_prbs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UeConfig {
    pub rnti: u16,
    /// Serving cell.
    pub pci: u16,
    #[serde(default)]
    pub plmn: u32,
    #[serde(default)]
    pub imsi: u64,
    /// Readings the UE reports when asked to measure.
    #[serde(default)]
    pub measurements: Vec<MeasurementConfig>,
}

impl UeConfig {
    pub fn details(&self) -> UeDetails {
        UeDetails {
            pci: self.pci,
            plmn: self.plmn,
            rnti: self.rnti,
            imsi: self.imsi,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeasurementConfig {
    pub pci: u16,
    pub earfcn: u16,
    pub rsrp: i16,
    pub rsrq: i16,
}

fn default_ctrl_addr() -> String {
    "127.0.0.1".to_string()
}
fn default_ctrl_port() -> u16 {
    2210
}
fn default_enb_id() -> u32 {
    1
}
fn default_hello_interval_ms() -> u64 {
    2000
}
fn default_sched_interval_ms() -> u64 {
    100
}
fn default_net_interval_ms() -> u64 {
    300
}
fn default_max_message_size() -> usize {
    empower_core::core::DEFAULT_MAX_MESSAGE_SIZE
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_prbs() -> u8 {
    25
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ctrl_addr: default_ctrl_addr(),
            ctrl_port: default_ctrl_port(),
            enb_id: default_enb_id(),
            hello_interval_ms: default_hello_interval_ms(),
            sched_interval_ms: default_sched_interval_ms(),
            net_interval_ms: default_net_interval_ms(),
            max_message_size: default_max_message_size(),
            log_level: default_log_level(),
            cells: Vec::new(),
            ues: Vec::new(),
        }
    }
}

impl Config {
    pub fn agent_settings(&self) -> AgentSettings {
        AgentSettings {
            hello_interval: Duration::from_millis(self.hello_interval_ms),
            max_message_size: self.max_message_size,
        }
    }

    pub fn link(&self) -> Link {
        Link {
            addr: self.ctrl_addr.clone(),
            port: self.ctrl_port,
            sched_interval: Duration::from_millis(self.sched_interval_ms.max(1)),
            net_interval: Duration::from_millis(self.net_interval_ms),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value {value:?} for {var}")]
    Env { var: &'static str, value: String },
}

/// Load config: defaults, then `explicit` or the first file found, then env vars.
pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let mut c = match explicit {
        Some(path) => load_file(path)?,
        None => match config_paths().into_iter().find(|p| p.exists()) {
            Some(path) => load_file(&path)?,
            None => Config::default(),
        },
    };
    apply_env(&mut c, |var| std::env::var(var).ok())?;
    Ok(c)
}

fn config_paths() -> Vec<PathBuf> {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    let mut out = Vec::new();
    if let Some(h) = home {
        out.push(h.join(".config/empower/agent.toml"));
    }
    out.push(PathBuf::from("/etc/empower/agent.toml"));
    out.push(PathBuf::from("/etc/empower/agent.conf"));
    out
}

fn load_file(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse either TOML or the legacy single line "<addr> <port>".
pub fn parse(text: &str) -> Result<Config, toml::de::Error> {
    if let Some((addr, port)) = parse_legacy(text) {
        return Ok(Config {
            ctrl_addr: addr,
            ctrl_port: port,
            ..Config::default()
        });
    }
    toml::from_str(text)
}

fn parse_legacy(text: &str) -> Option<(String, u16)> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    let line = lines.next()?;
    if lines.next().is_some() || line.contains('=') {
        return None;
    }
    let mut words = line.split_whitespace();
    let addr = words.next()?;
    let port = words.next()?.parse().ok()?;
    if words.next().is_some() {
        return None;
    }
    Some((addr.to_string(), port))
}

fn apply_env(c: &mut Config, var: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
    if let Some(s) = var("EMPOWER_CTRL_ADDR") {
        c.ctrl_addr = s;
    }
    if let Some(s) = var("EMPOWER_CTRL_PORT") {
        c.ctrl_port = s.parse().map_err(|_| ConfigError::Env {
            var: "EMPOWER_CTRL_PORT",
            value: s.clone(),
        })?;
    }
    if let Some(s) = var("EMPOWER_ENB_ID") {
        c.enb_id = s.parse().map_err(|_| ConfigError::Env {
            var: "EMPOWER_ENB_ID",
            value: s.clone(),
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn legacy_line() {
        let c = parse("10.0.0.5 4444\n").unwrap();
        assert_eq!(c.ctrl_addr, "10.0.0.5");
        assert_eq!(c.ctrl_port, 4444);
        assert_eq!(c.enb_id, 1);
        assert!(parse_legacy("10.0.0.5").is_none());
        assert!(parse_legacy("10.0.0.5 notaport").is_none());
    }

    #[test]
    fn toml_with_cells_and_ues() {
        let c = parse(
            r#"
            ctrl_addr = "192.168.1.10"
            enb_id = 9
            sched_interval_ms = 50

            [[cells]]
            pci = 1
            dl_earfcn = 1750
            mac_report = true

            [[ues]]
            rnti = 0x46
            pci = 1
            imsi = 222930000000001
            measurements = [{ pci = 2, earfcn = 1750, rsrp = -90, rsrq = -8 }]
            "#,
        )
        .unwrap();
        assert_eq!(c.ctrl_port, 2210);
        assert_eq!(c.enb_id, 9);
        assert_eq!(c.cells[0].dl_prbs, 25);
        assert!(c.cells[0].details().cap.contains(CellCapabilities::MAC_REPORT));
        assert!(!c.cells[0].details().cap.contains(CellCapabilities::PHY_REPORT));
        assert_eq!(c.ues[0].details().rnti, 0x46);
        assert_eq!(c.ues[0].measurements[0].rsrp, -90);
        assert_eq!(c.link().sched_interval, Duration::from_millis(50));
    }

    #[test]
    fn unknown_field_rejected() {
        assert!(parse("proxy_port = 3128").is_err());
    }

    #[test]
    fn env_overrides() {
        let env: HashMap<&str, &str> =
            [("EMPOWER_CTRL_PORT", "5555"), ("EMPOWER_ENB_ID", "12")].into();
        let mut c = Config::default();
        apply_env(&mut c, |v| env.get(v).map(|s| s.to_string())).unwrap();
        assert_eq!(c.ctrl_port, 5555);
        assert_eq!(c.enb_id, 12);
        assert_eq!(c.ctrl_addr, "127.0.0.1");

        let bad: HashMap<&str, &str> = [("EMPOWER_ENB_ID", "x")].into();
        assert!(matches!(
            apply_env(&mut c, |v| bad.get(v).map(|s| s.to_string())),
            Err(ConfigError::Env { var: "EMPOWER_ENB_ID", .. })
        ));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load(Some(Path::new("/nonexistent/empower/agent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
