//! Tunables of a sleep cycle, parsed from a kernel style command line.
//!
//! Options are `key=value` pairs separated by `:`, e.g.
//! `FREEZE_TIMEOUT_MS=6000:SLEEP_LEVEL=3:LOG=info`. Unknown keys are ignored
//! so the same command line can carry options for other subsystems.

use crate::{PmError, PmResult};
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use core::str::FromStr;
use core::time::Duration;

pub type BootOptions<'a> = BTreeMap<&'a str, &'a str>;

pub fn parse_cmdline(cmdline: &str) -> BootOptions {
    let mut args = BootOptions::new();
    for opt in cmdline.split(':') {
        // parse "key=value"
        let mut iter = opt.trim().splitn(2, '=');
        if let Some(key) = iter.next() {
            if let Some(value) = iter.next() {
                args.insert(key.trim(), value.trim());
            }
        }
    }
    args
}

/// Bounds of one `freeze_processes` call.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct FreezerConfig {
    /// Wall clock limit for the whole call, not per task.
    pub timeout: Duration,
    /// How often the task list is rescanned for tasks created mid-freeze.
    pub rescan_interval: Duration,
}

impl Default for FreezerConfig {
    fn default() -> Self {
        FreezerConfig {
            timeout: Duration::from_secs(6),
            rescan_interval: Duration::from_millis(10),
        }
    }
}

/// Parameters passed down to the suspend collaborators.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct SuspendConfig {
    /// Sleep level handed to legacy broadcast, device and platform hooks.
    pub level: usize,
}

impl Default for SuspendConfig {
    fn default() -> Self {
        SuspendConfig { level: 3 }
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct SleepConfig {
    pub freezer: FreezerConfig,
    pub suspend: SuspendConfig,
    /// Max log level requested with `LOG=`, applied by the runner.
    pub log_level: Option<String>,
}

impl SleepConfig {
    pub fn from_cmdline(cmdline: &str) -> PmResult<Self> {
        let options = parse_cmdline(cmdline);
        let mut config = SleepConfig::default();
        if let Some(ms) = options.get("FREEZE_TIMEOUT_MS") {
            config.freezer.timeout = Duration::from_millis(parse_nonzero(ms)?);
        }
        if let Some(ms) = options.get("FREEZE_RESCAN_MS") {
            config.freezer.rescan_interval = Duration::from_millis(parse_nonzero(ms)?);
        }
        if let Some(level) = options.get("SLEEP_LEVEL") {
            config.suspend.level = parse_number(level)?;
        }
        config.log_level = options.get("LOG").map(|level| level.to_string());
        Ok(config)
    }
}

fn parse_number<T: FromStr>(value: &str) -> PmResult<T> {
    value.parse().map_err(|_| {
        warn!("invalid numeric option: {:?}", value);
        PmError::INVALID_ARGS
    })
}

fn parse_nonzero(value: &str) -> PmResult<u64> {
    match parse_number(value)? {
        0 => Err(PmError::OUT_OF_RANGE),
        n => Ok(n),
    }
}
