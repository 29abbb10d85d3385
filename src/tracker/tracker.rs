use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::area::{AreaOfInterest, BoundingBox};
use super::cadence::Cadence;
use super::error::TrackerError;
use super::fetch::{FeedSource, FetchCompletion, FetchController};
use super::parsing::parse_states;
use super::reckoning::DeadReckoner;
use super::registry::PlaneRegistry;
use super::simulation::SimulationSource;
use super::types::GeoPosition;
use crate::config::{DataMode, SimulationConfig, TrackerConfig};
use crate::render::RenderTarget;

const COMMAND_QUEUE: usize = 16;

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub enum TrackerMode {
    Idle,
    Running { start: DateTime<Utc> },
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct TrackerStatus {
    pub mode: TrackerMode,
    pub data_mode: DataMode,
    pub center: Option<GeoPosition>,
    pub bounding_box: Option<BoundingBox>,
    pub ticks: u64,
    pub fetch_in_flight: bool,
    pub planes: usize,
    pub last_ingest: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub enum TrackerCommand {
    SetCenter(GeoPosition),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub evicted: Option<usize>,
    pub fetch_started: bool,
    pub extrapolated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No location yet, nothing to track around.
    NoCenter,
    /// A fetch is outstanding, the whole frame is skipped.
    Stalled,
    Ran(TickReport),
}

/// The tracking engine. Owns all tracker state and is driven one tick at a
/// time by whoever owns it, normally [`run_tracker_loop`].
pub struct Tracker<R: RenderTarget, S> {
    config: TrackerConfig,
    area: AreaOfInterest,
    registry: PlaneRegistry<R>,
    fetch: Option<FetchController<S>>,
    completions: Option<mpsc::UnboundedReceiver<FetchCompletion>>,
    simulation: Option<SimulationSource>,
    seeded: bool,
    cadence: Cadence,
    extrapolation_step_s: f64,
    started: Option<DateTime<Utc>>,
    last_ingest: Option<DateTime<Utc>>,
}

impl<R: RenderTarget, S: FeedSource> Tracker<R, S> {
    pub fn new(
        config: TrackerConfig,
        simulation: &SimulationConfig,
        target: R,
        source: Option<S>,
    ) -> Self {
        let (fetch, completions) = match source {
            Some(source) => {
                let (fetch, completions) = FetchController::new(source);
                (Some(fetch), Some(completions))
            }
            None => (None, None),
        };

        let cadence = Cadence::new(
            config.ticks_per_second,
            config.seconds_per_query,
            config.seconds_per_cleanup,
        );
        let (simulation, speed_up) = match config.mode {
            DataMode::Simulated => (
                Some(SimulationSource::new(simulation.count, simulation.seed)),
                simulation.speed_up,
            ),
            DataMode::Live => (None, 1.0),
        };

        let mut area = AreaOfInterest::new();
        if let Some(center) = config.center {
            area.set_center(center);
        }

        Self {
            registry: PlaneRegistry::new(target, DeadReckoner::default(), config.heading_mode),
            extrapolation_step_s: cadence.tick_seconds() * speed_up,
            config,
            area,
            fetch,
            completions,
            simulation,
            seeded: false,
            cadence,
            started: None,
            last_ingest: None,
        }
    }

    #[cfg(test)]
    pub fn registry(&self) -> &PlaneRegistry<R> {
        &self.registry
    }

    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(self.cadence.tick_seconds())
    }

    pub fn set_center(&mut self, point: GeoPosition) {
        if self.area.set_center(point) {
            log::debug!("center moved to {:.4},{:.4}", point.latitude, point.longitude);
        } else {
            log::debug!("ignoring degenerate location {:?}", point);
        }
    }

    pub fn handle_command(&mut self, command: TrackerCommand) {
        match command {
            TrackerCommand::SetCenter(point) => self.set_center(point),
        }
    }

    /// Runs one frame. `now` is unix seconds.
    pub fn tick(&mut self, now: i64) -> TickOutcome {
        let Some(center) = self.area.center() else {
            return TickOutcome::NoCenter;
        };

        if !self.seeded {
            if let Some(simulation) = self.simulation.as_mut() {
                let records = simulation.generate(&center, now);
                let created = self.registry.upsert_batch(records, now);
                log::info!("seeded {} simulated planes", created);
            }
            self.seeded = true;
        }

        if self.fetch.as_ref().is_some_and(|f| f.in_flight()) {
            return TickOutcome::Stalled;
        }

        let tick = self.cadence.advance();
        let mut report = TickReport {
            tick,
            ..Default::default()
        };

        if self.cadence.is_cleanup_tick(tick) {
            let evicted = self
                .registry
                .evict(now, self.config.stale_after_seconds());
            if evicted > 0 {
                log::info!("evicted {} stale planes, {} left", evicted, self.registry.len());
            }
            report.evicted = Some(evicted);
        }

        if self.cadence.is_query_tick(tick) {
            let bbox = self.area.bounding_box(self.config.coordinate_tolerance);
            if let (Some(fetch), Some(bbox)) = (self.fetch.as_mut(), bbox) {
                report.fetch_started = fetch.try_fetch(bbox);
            }
        } else {
            self.registry.extrapolate_all(self.extrapolation_step_s);
            report.extrapolated = true;
        }

        TickOutcome::Ran(report)
    }

    /// Applies a finished fetch. Returns the number of planes created.
    pub fn on_fetch_complete(&mut self, completion: FetchCompletion, now: i64) -> usize {
        let Some(fetch) = self.fetch.as_mut() else {
            return 0;
        };
        let Some(payload) = fetch.complete(completion) else {
            return 0;
        };

        let created = self.registry.upsert_batch(parse_states(&payload), now);
        self.last_ingest = Some(Utc::now());
        log::debug!(
            "feed applied: {} new, {} tracked",
            created,
            self.registry.len()
        );
        created
    }

    /// Hands the fetch completion queue to the loop that drives this tracker.
    pub fn take_completions(&mut self) -> Option<mpsc::UnboundedReceiver<FetchCompletion>> {
        self.completions.take()
    }

    pub fn status(&self) -> TrackerStatus {
        TrackerStatus {
            mode: match self.started {
                Some(start) => TrackerMode::Running { start },
                None => TrackerMode::Idle,
            },
            data_mode: self.config.mode,
            center: self.area.center(),
            bounding_box: self.area.bounding_box(self.config.coordinate_tolerance),
            ticks: self.cadence.ticks(),
            fetch_in_flight: self.fetch.as_ref().is_some_and(|f| f.in_flight()),
            planes: self.registry.len(),
            last_ingest: self.last_ingest,
        }
    }
}

#[derive(Debug)]
struct WorkerHandle {
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<mpsc::Receiver<TrackerCommand>>,
}

/// Owns the tracker task and the status it publishes.
pub struct TrackerService {
    shared: Arc<StdMutex<TrackerStatus>>,
    commands: mpsc::Sender<TrackerCommand>,
    command_rx: Option<mpsc::Receiver<TrackerCommand>>,
    worker: Option<WorkerHandle>,
}

impl TrackerService {
    pub fn new(data_mode: DataMode) -> Self {
        let (commands, command_rx) = mpsc::channel(COMMAND_QUEUE);
        Self {
            shared: Arc::new(StdMutex::new(TrackerStatus {
                mode: TrackerMode::Idle,
                data_mode,
                center: None,
                bounding_box: None,
                ticks: 0,
                fetch_in_flight: false,
                planes: 0,
                last_ingest: None,
            })),
            commands,
            command_rx: Some(command_rx),
            worker: None,
        }
    }

    pub fn status(&self) -> TrackerStatus {
        self.shared.lock().unwrap().clone()
    }

    pub fn shared_status(&self) -> Arc<StdMutex<TrackerStatus>> {
        self.shared.clone()
    }

    /// Sender for location updates and other commands.
    pub fn commands(&self) -> mpsc::Sender<TrackerCommand> {
        self.commands.clone()
    }

    pub fn run<R, S>(&mut self, tracker: Tracker<R, S>) -> Result<(), TrackerError>
    where
        R: RenderTarget + Send + 'static,
        R::Handle: Send,
        S: FeedSource,
    {
        if self.worker.is_some() {
            return Err(TrackerError::AlreadyRunning);
        }
        let command_rx = self.command_rx.take().ok_or(TrackerError::AlreadyRunning)?;

        let shared = self.shared.clone();
        let (stop_tx, stop_rx) = oneshot::channel();
        let join = tokio::spawn(run_tracker_loop(tracker, shared, command_rx, stop_rx));

        self.worker = Some(WorkerHandle { stop_tx, join });
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), TrackerError> {
        let worker = self.worker.take().ok_or(TrackerError::NotRunning)?;
        let _ = worker.stop_tx.send(());
        match worker.join.await {
            Ok(command_rx) => self.command_rx = Some(command_rx),
            Err(e) => log::error!("tracker task failed: {}", e),
        }

        let mut locked = self.shared.lock().unwrap();
        locked.mode = TrackerMode::Idle;
        Ok(())
    }
}

/// Serial driver: frames, fetch completions and commands are handled one at a
/// time on this task, so the registry has a single writer.
async fn run_tracker_loop<R, S>(
    mut tracker: Tracker<R, S>,
    shared: Arc<StdMutex<TrackerStatus>>,
    mut commands: mpsc::Receiver<TrackerCommand>,
    mut stop_rx: oneshot::Receiver<()>,
) -> mpsc::Receiver<TrackerCommand>
where
    R: RenderTarget,
    S: FeedSource,
{
    let mut completions = tracker.take_completions();
    let mut frames = tokio::time::interval(tracker.frame_duration());
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracker.started = Some(Utc::now());
    log::info!(
        "tracker running at {} ticks/s ({:?} data)",
        tracker.config.ticks_per_second,
        tracker.config.mode
    );

    loop {
        tokio::select! {
            _ = frames.tick() => {
                if let TickOutcome::Ran(report) = tracker.tick(Utc::now().timestamp()) {
                    log::trace!(
                        "tick {}: fetch={} extrapolated={} evicted={:?}",
                        report.tick,
                        report.fetch_started,
                        report.extrapolated,
                        report.evicted
                    );
                }
            }
            Some(completion) = next_completion(&mut completions) => {
                tracker.on_fetch_complete(completion, Utc::now().timestamp());
            }
            Some(command) = commands.recv() => {
                tracker.handle_command(command);
            }
            _ = &mut stop_rx => break,
        }

        *shared.lock().unwrap() = tracker.status();
    }

    log::info!("tracker stopped after {} ticks", tracker.cadence.ticks());
    commands
}

async fn next_completion(
    completions: &mut Option<mpsc::UnboundedReceiver<FetchCompletion>>,
) -> Option<FetchCompletion> {
    match completions {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
