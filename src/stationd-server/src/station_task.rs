// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Station actor: the only task that touches the state machine.
//!
//! Tokens arrive over an mpsc channel, the deferred timer is a
//! `sleep_until` rebuilt from the machine's deadline on every turn, and
//! every event ends by publishing a fresh snapshot on the watch channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use stationd_backend::{BusAccess, RegistrationContext};
use stationd_core::station::controller::{StationListener, StationMachine, StationTiming};
use stationd_core::{Advisory, DynResult, StationRequest, StationSnapshot, StationState};

/// Everything needed to open the bus and build the machine.
pub struct StationTaskConfig {
    pub registry: Arc<RegistrationContext>,
    pub backend: String,
    pub access: BusAccess,
    pub timing: StationTiming,
}

/// Records transitions and advisories in the daemon log.
struct AuditListener;

impl StationListener for AuditListener {
    fn on_state_change(&self, old: &StationState, new: &StationState) {
        debug!("audit: {} -> {}", old, new);
    }

    fn on_timer_armed(&self, state: &StationState, duration: Duration) {
        debug!("audit: timer {:?} armed in {}", duration, state);
    }

    fn on_advisory(&self, advisory: &Advisory) {
        info!("audit: {} advisory: {}", advisory.kind(), advisory);
    }
}

/// Open the configured bus and hand it to a fresh machine.
///
/// Runs before the actor is spawned so a missing expander stops startup.
pub fn build_machine(config: StationTaskConfig) -> DynResult<StationMachine> {
    info!(
        "Opening {} bus backend (access: {:?})",
        config.backend, config.access
    );
    let bus = config.registry.build_bus(&config.backend, config.access)?;
    let mut machine = StationMachine::new(bus, config.timing)?;
    machine.emitter_mut().register(Arc::new(AuditListener));
    let timing = machine.timing();
    info!(
        "Timing: power-on {:?}, cooldown {:?}, guard {:?}",
        timing.power_on_timeout, timing.cooldown, timing.guard_interval
    );
    Ok(machine)
}

/// Serve tokens and timer expiries until shutdown or until every sender is gone.
pub async fn run_station_task(
    mut machine: StationMachine,
    mut rx: mpsc::Receiver<StationRequest>,
    snapshot_tx: watch::Sender<StationSnapshot>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> DynResult<()> {
    let _ = snapshot_tx.send(machine.snapshot());

    loop {
        let deadline = machine.timer().deadline();
        let timer = async move {
            match deadline {
                Some(at) => time::sleep_until(Instant::from_std(at)).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            req = rx.recv() => {
                let Some(req) = req else {
                    info!("Request channel closed");
                    break;
                };
                handle_request(&mut machine, req, &snapshot_tx);
            }
            _ = timer => {
                // Only this task mutates the timer, so `deadline` is still current.
                if let Some(at) = deadline {
                    if machine.poll_timer(at) {
                        let _ = snapshot_tx.send(machine.snapshot());
                    }
                }
            }
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }

    if let Err(e) = machine.shutdown() {
        warn!("Failed to clear actuators on shutdown: {}", e);
        return Err(e);
    }
    let _ = snapshot_tx.send(machine.snapshot());
    info!("Station task stopped");
    Ok(())
}

fn handle_request(
    machine: &mut StationMachine,
    req: StationRequest,
    snapshot_tx: &watch::Sender<StationSnapshot>,
) {
    let StationRequest { token, respond_to } = req;
    let result = machine.submit_token(token);
    let snapshot = machine.snapshot();
    let _ = snapshot_tx.send(snapshot.clone());
    if respond_to.send(result.map(|()| snapshot)).is_err() {
        debug!("Requester for {} went away before the reply", token);
    }
}
