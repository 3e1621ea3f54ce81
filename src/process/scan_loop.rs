// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-valve-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Periodic scan loop of the valve simulator
//!
//! Every period the loop walks through the same phases:
//!
//! ```text
//! Idle → Reading → Computing → Writing → Reporting → Sleeping → Reading → …
//! ```
//!
//! - **Reading**: command registers are read from the store. A failed read
//!   keeps the previous value of that command (last-known-good).
//! - **Computing**: status bits are derived with the configured
//!   [`FeedbackPolicy`].
//! - **Writing**: status registers are written back. A failed write is logged
//!   and simply retried by the next cycle, which recomputes and rewrites.
//! - **Reporting**: every `report_every` cycles one diagnostic line is logged.
//! - **Sleeping**: the loop waits for the next tick or for shutdown, whichever
//!   comes first. This is the only suspension point and no store lock is held
//!   across it.
//!
//! The two status registers are written by two separate store calls, so a
//! remote reader may observe a half-updated pair within one cycle.

use std::fmt;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use super::error::ConfigError;
use super::feedback::FeedbackPolicy;
use super::register_map::{RegisterMap, Signal};
use super::register_store::RegisterStore;
use super::state::{InitialState, ProcessState};
use crate::config::SimulationConfig;

/// Phase of the scan state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Idle,
    Reading,
    Computing,
    Writing,
    Reporting,
    Sleeping,
}

/// Validated timing and behavior of a scan loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSettings {
    pub period: Duration,
    pub report_every: u64,
    pub policy: FeedbackPolicy,
    pub initial_state: InitialState,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(1),
            report_every: 2,
            policy: FeedbackPolicy::default(),
            initial_state: InitialState::default(),
        }
    }
}

impl ScanSettings {
    pub fn new(
        period: Duration,
        report_every: u64,
        policy: FeedbackPolicy,
        initial_state: InitialState,
    ) -> Result<Self, ConfigError> {
        if period.is_zero() {
            return Err(ConfigError::InvalidPeriod);
        }
        if report_every == 0 {
            return Err(ConfigError::InvalidReportCadence);
        }
        Ok(Self {
            period,
            report_every,
            policy,
            initial_state,
        })
    }

    pub fn from_config(config: &SimulationConfig) -> Result<Self, ConfigError> {
        Self::new(
            Duration::from_millis(config.cycle_period_ms),
            config.report_every,
            config.feedback_policy,
            config.initial_state,
        )
    }
}

/// Result of a single scan cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleOutcome {
    pub cycle: u64,
    pub read_failures: u32,
    pub write_failures: u32,
    pub reported: bool,
}

/// Cumulative counters since the loop was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub cycles: u64,
    pub read_failures: u64,
    pub write_failures: u64,
}

/// One human-readable diagnostic line
pub struct CycleReport<'a> {
    cycle: u64,
    state: &'a ProcessState,
    map: &'a RegisterMap,
}

impl<'a> CycleReport<'a> {
    pub fn new(cycle: u64, state: &'a ProcessState, map: &'a RegisterMap) -> Self {
        Self { cycle, state, map }
    }
}

impl fmt::Display for CycleReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let command = if self.state.open_command {
            "OPEN"
        } else {
            "CLOSE"
        };
        write!(
            f,
            "[{:04}] Command(R{})={:5} Close(R{})={} -> OpenStatus(R{})={} ClosedStatus(R{})={} [{}]",
            self.cycle,
            self.map.address_of(Signal::OpenCommand).address,
            command,
            self.map.address_of(Signal::CloseCommand).address,
            u8::from(self.state.close_command),
            self.map.address_of(Signal::OpenStatus).address,
            u8::from(self.state.open_status),
            self.map.address_of(Signal::ClosedStatus).address,
            u8::from(self.state.closed_status),
            self.state.statuses().label(),
        )
    }
}

/// The scan loop, exclusive owner of the [`ProcessState`]
pub struct ScanLoop<S: RegisterStore> {
    map: RegisterMap,
    store: S,
    settings: ScanSettings,
    state: ProcessState,
    phase: ScanPhase,
    cycle_index: u64,
    stats: ScanStats,
}

impl<S: RegisterStore> ScanLoop<S> {
    pub fn new(map: RegisterMap, store: S, settings: ScanSettings) -> Self {
        Self {
            map,
            store,
            settings,
            state: ProcessState::initial(settings.initial_state),
            phase: ScanPhase::Idle,
            cycle_index: 0,
            stats: ScanStats::default(),
        }
    }

    pub fn state(&self) -> &ProcessState {
        &self.state
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    /// Index of the next cycle to run
    pub fn cycle_index(&self) -> u64 {
        self.cycle_index
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    pub fn map(&self) -> &RegisterMap {
        &self.map
    }

    /// Publish the initial status values before the first cycle
    ///
    /// Returns the number of status writes that failed.
    pub fn prime(&mut self) -> u32 {
        debug!(
            "Priming status registers with initial state {:?}",
            self.settings.initial_state
        );
        self.write_statuses()
    }

    /// Run one complete read → compute → write → report cycle
    pub fn run_cycle(&mut self) -> CycleOutcome {
        let cycle = self.cycle_index;

        self.phase = ScanPhase::Reading;
        let read_failures = self.read_commands();

        self.phase = ScanPhase::Computing;
        let statuses = self.settings.policy.apply(self.state.commands());
        self.state.set_statuses(statuses);

        self.phase = ScanPhase::Writing;
        let write_failures = self.write_statuses();

        self.phase = ScanPhase::Reporting;
        let reported = cycle % self.settings.report_every == 0;
        if reported {
            info!("{}", CycleReport::new(cycle, &self.state, &self.map));
        }

        self.stats.cycles += 1;
        self.stats.read_failures += u64::from(read_failures);
        self.stats.write_failures += u64::from(write_failures);
        self.cycle_index += 1;
        self.phase = ScanPhase::Sleeping;

        CycleOutcome {
            cycle,
            read_failures,
            write_failures,
            reported,
        }
    }

    /// Scan until `shutdown` turns `true` or its sender is dropped
    ///
    /// The first cycle runs immediately. Shutdown interrupts the sleep
    /// without waiting for the end of the period.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> ScanStats {
        info!(
            "Scan loop started: period {:?}, report every {} cycle(s), {} feedback",
            self.settings.period, self.settings.report_every, self.settings.policy
        );

        let failed = self.prime();
        if failed > 0 {
            warn!("{} status register(s) could not be primed", failed);
        }

        let mut interval = time::interval(self.settings.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = interval.tick() => {
                    self.run_cycle();
                }
                changed = shutdown.changed() => {
                    // A dropped sender means nobody can stop us any more
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        self.phase = ScanPhase::Idle;
        info!(
            "Scan loop stopped after {} cycle(s) ({} read failure(s), {} write failure(s))",
            self.stats.cycles, self.stats.read_failures, self.stats.write_failures
        );
        self.stats
    }

    fn read_commands(&mut self) -> u32 {
        let mut failures = 0;
        for (signal, slot) in self.map.commands() {
            match self.store.read(slot.address, slot.width) {
                Ok(words) => {
                    let value = words.iter().any(|word| *word != 0);
                    self.state.set_command(signal, value);
                }
                Err(e) => {
                    failures += 1;
                    warn!(
                        "Cycle {}: failed to read {} at register {}: {} (keeping last value {})",
                        self.cycle_index,
                        signal,
                        slot.address,
                        e,
                        u8::from(self.state.value_of(signal))
                    );
                }
            }
        }
        failures
    }

    fn write_statuses(&mut self) -> u32 {
        let mut failures = 0;
        for (signal, slot) in self.map.statuses() {
            let mut words = vec![0u16; slot.width.into()];
            words[0] = u16::from(self.state.value_of(signal));
            if let Err(e) = self.store.write(slot.address, &words) {
                failures += 1;
                warn!(
                    "Cycle {}: failed to write {} at register {}: {}",
                    self.cycle_index, signal, slot.address, e
                );
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::HoldingRegisterStore;

    #[test]
    fn test_settings_reject_zero_period_and_cadence() {
        assert_eq!(
            ScanSettings::new(
                Duration::ZERO,
                2,
                FeedbackPolicy::Passthrough,
                InitialState::Closed
            ),
            Err(ConfigError::InvalidPeriod)
        );
        assert_eq!(
            ScanSettings::new(
                Duration::from_millis(10),
                0,
                FeedbackPolicy::Passthrough,
                InitialState::Closed
            ),
            Err(ConfigError::InvalidReportCadence)
        );
    }

    #[test]
    fn test_phases_and_report_cadence() {
        let store = HoldingRegisterStore::default();
        let mut scan = ScanLoop::new(RegisterMap::default(), store, ScanSettings::default());
        assert_eq!(scan.phase(), ScanPhase::Idle);

        let reported: Vec<bool> = (0..5).map(|_| scan.run_cycle().reported).collect();
        assert_eq!(reported, vec![true, false, true, false, true]);
        assert_eq!(scan.phase(), ScanPhase::Sleeping);
        assert_eq!(scan.cycle_index(), 5);
        assert_eq!(scan.stats().cycles, 5);
    }

    #[test]
    fn test_report_line() {
        let map = RegisterMap::default();
        let state = ProcessState {
            open_command: true,
            close_command: false,
            open_status: true,
            closed_status: false,
        };
        let line = CycleReport::new(4, &state, &map).to_string();
        assert_eq!(
            line,
            "[0004] Command(R200)=OPEN  Close(R201)=0 -> OpenStatus(R100)=1 ClosedStatus(R101)=0 [OPEN]"
        );
    }

    #[test]
    fn test_wide_status_slot_is_zero_padded() {
        let store = HoldingRegisterStore::new(32);
        let map = RegisterMap::new(
            crate::process::RegisterSlot::new(0, 1),
            crate::process::RegisterSlot::new(1, 1),
            crate::process::RegisterSlot::new(10, 3),
            crate::process::RegisterSlot::new(20, 2),
        )
        .unwrap();
        store.write(10, &[9, 9, 9]).unwrap();
        store.write(0, &[1]).unwrap();

        let mut scan = ScanLoop::new(map, store.clone(), ScanSettings::default());
        scan.run_cycle();

        assert_eq!(store.read(10, 3).unwrap(), vec![1, 0, 0]);
        assert_eq!(store.read(20, 2).unwrap(), vec![0, 0]);
    }
}
