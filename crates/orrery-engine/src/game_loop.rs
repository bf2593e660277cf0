//! The frame-stepping state machine.
//!
//! [`GameLoop::frame`] is one deterministic step. It takes the current time
//! and an [`InputSnapshot`], and while a round is running and not paused it:
//!
//! 1. steers the ship and handles a fire request (rate limited),
//! 2. advances every entity by the elapsed time, then lets each react to
//!    where it ended up,
//! 3. runs one gravity pass,
//! 4. tests every unordered pair of bounded entities for overlap and
//!    invokes `collided_with` on both sides of each hit,
//! 5. applies the queued commands (and a logic pass if one was requested),
//! 6. commits removals, then adds queued spawns,
//! 7. draws every entity in insertion order.
//!
//! [`GameLoop::run`] wraps `frame` with a clock, an input source and a
//! best-effort sleep until the loop reaches [`Mode::Over`].
//!
//! # Example
//!
//! ```
//! use orrery_engine::prelude::*;
//!
//! let config = EngineConfig::default();
//! let mut game = GameLoop::new(config, &SpriteCatalog::with_defaults()).unwrap();
//! let mut surface = DrawList::new();
//! let mut events = EventLog::new();
//!
//! game.frame(0, &InputSnapshot::any_key(), &mut surface, &mut events);
//! assert_eq!(game.mode(), Mode::Running);
//!
//! game.frame(16, &InputSnapshot::IDLE, &mut surface, &mut events);
//! assert_eq!(surface.commands().len(), game.world().len());
//! ```

use std::collections::HashSet;
use std::time::{Duration, Instant};

use orrery_ecs::entity::EntityId;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::assets::SpriteStore;
use crate::clock::Clock;
use crate::command::{CommandBuffer, CommandKind, GameSignal};
use crate::config::EngineConfig;
use crate::cooldown::Cooldown;
use crate::entity::{Entity, EntityBox, Role, World};
use crate::error::EngineError;
use crate::events::GameObserver;
use crate::gravity::{GravitySystem, PassStats};
use crate::input::{InputSnapshot, InputSource};
use crate::render::DrawSurface;
use crate::scenario::Scenario;

pub const WIN_MESSAGE: &str = "Well done! You Win!";
pub const LOSS_MESSAGE: &str = "Oh no! They got you, try again?";
pub const START_PROMPT: &str = "Press any key";

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// Which phase the loop is in.
///
/// Showing a win or loss message is `WaitingForStart` with
/// [`GameLoop::message`] set. Pausing is a flag on `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    WaitingForStart,
    Running,
    /// Terminal.
    Over,
}

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundOutcome {
    Win,
    Loss,
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Wall-clock timings of one frame.
#[derive(Debug, Clone, Default)]
pub struct FrameDiagnostics {
    /// Time per phase, in execution order.
    pub phase_times: Vec<(&'static str, Duration)>,
    pub total_time: Duration,
}

/// What happened during one call to [`GameLoop::frame`].
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    /// 1-based frame number.
    pub frame: u64,
    pub elapsed_ms: u64,
    /// Mode after the frame.
    pub mode: Mode,
    pub paused: bool,
    /// Whether entities moved this frame.
    pub simulated: bool,
    pub collisions: usize,
    pub spawned: usize,
    pub removed: usize,
    pub gravity: PassStats,
    pub outcome: Option<RoundOutcome>,
    pub diagnostics: FrameDiagnostics,
}

/// Totals over a [`GameLoop::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub frames: u64,
    pub simulated_frames: u64,
    pub collisions: usize,
    pub spawned: usize,
    pub removed: usize,
    pub wins: u32,
    pub losses: u32,
}

impl RunSummary {
    fn record(&mut self, report: &FrameReport) {
        self.frames += 1;
        self.simulated_frames += u64::from(report.simulated);
        self.collisions += report.collisions;
        self.spawned += report.spawned;
        self.removed += report.removed;
        match report.outcome {
            Some(RoundOutcome::Win) => self.wins += 1,
            Some(RoundOutcome::Loss) => self.losses += 1,
            None => {}
        }
    }
}

fn lap(phase: &mut Instant, name: &'static str, report: &mut FrameReport) {
    let now = Instant::now();
    report
        .diagnostics
        .phase_times
        .push((name, now.duration_since(*phase)));
    *phase = now;
}

// ---------------------------------------------------------------------------
// GameLoop
// ---------------------------------------------------------------------------

/// Owns the world and drives it frame by frame.
pub struct GameLoop {
    config: EngineConfig,
    scenario: Scenario,
    world: World,
    gravity: GravitySystem,
    commands: CommandBuffer,
    /// Entities to add once this frame's removals are committed.
    spawn_queue: Vec<EntityBox>,
    fire_cooldown: Cooldown,
    mode: Mode,
    paused: bool,
    message: Option<String>,
    /// Set when a round ends, taken by the frame that reports it.
    outcome: Option<RoundOutcome>,
    player: Option<EntityId>,
    hostiles_remaining: usize,
    frame_count: u64,
    active_frames: u64,
    last_frame_ms: Option<u64>,
}

impl GameLoop {
    /// Validate `config` and prepare its scenario. The world stays empty
    /// until the first round starts.
    pub fn new(config: EngineConfig, sprites: &dyn SpriteStore) -> Result<Self, EngineError> {
        config.validate()?;
        let scenario = Scenario::prepare(&config, sprites)?;
        Ok(Self {
            gravity: GravitySystem::new(config.gravity),
            fire_cooldown: Cooldown::new(config.fire_interval_ms),
            config,
            scenario,
            world: World::new(),
            commands: CommandBuffer::new(),
            spawn_queue: Vec::new(),
            mode: Mode::WaitingForStart,
            paused: false,
            message: None,
            outcome: None,
            player: None,
            hostiles_remaining: 0,
            frame_count: 0,
            active_frames: 0,
            last_frame_ms: None,
        })
    }

    // -- accessors ----------------------------------------------------------

    /// Current loop mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether simulation is suspended. Only meaningful while running.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Win or loss message shown while waiting for the next round.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Read-only view of the live entities.
    ///
    /// Entities change only through the frame procedure and
    /// [`insert_entity`](Self::insert_entity); there is no mutable world
    /// access:
    ///
    /// ```compile_fail
    /// use orrery_engine::prelude::*;
    ///
    /// let mut game = GameLoop::new(EngineConfig::default(), &SpriteCatalog::with_defaults()).unwrap();
    /// game.world_mut().clear();
    /// ```
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Look up a live entity, failing with [`EngineError::Ecs`] for an id
    /// that was never issued or has been removed.
    pub fn entity(&self, id: EntityId) -> Result<&dyn Entity, EngineError> {
        Ok(self.world.get_or_err(id)?.as_ref())
    }

    /// Configuration the loop was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The ship of the current round, if any.
    pub fn player(&self) -> Option<EntityId> {
        self.player
    }

    /// Hostiles still alive in the current round.
    pub fn hostiles_remaining(&self) -> usize {
        self.hostiles_remaining
    }

    /// Frames processed in every mode, including paused and waiting ones.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Frames spent in [`Mode::Running`], across all rounds.
    pub fn active_frames(&self) -> u64 {
        self.active_frames
    }

    // -- driving ------------------------------------------------------------

    /// Run one frame at time `now_ms`.
    pub fn frame(
        &mut self,
        now_ms: u64,
        input: &InputSnapshot,
        surface: &mut dyn DrawSurface,
        observer: &mut dyn GameObserver,
    ) -> FrameReport {
        let frame_start = Instant::now();
        let elapsed_ms = self
            .last_frame_ms
            .map_or(0, |last| now_ms.saturating_sub(last));
        self.last_frame_ms = Some(now_ms);
        self.frame_count += 1;

        let mut report = FrameReport {
            frame: self.frame_count,
            elapsed_ms,
            ..FrameReport::default()
        };

        if self.mode != Mode::Over {
            if input.quit {
                info!(frame = self.frame_count, "quit requested");
                self.set_mode(Mode::Over, observer);
            } else {
                match self.mode {
                    Mode::WaitingForStart if input.any_key => {
                        self.start_round(observer, &mut report);
                    }
                    Mode::Running => {
                        if input.pause_toggled {
                            self.paused = !self.paused;
                            info!(paused = self.paused, "pause toggled");
                        }
                        if !self.paused {
                            self.simulate(now_ms, elapsed_ms, input, observer, &mut report);
                        }
                    }
                    _ => {}
                }

                let render_start = Instant::now();
                self.render(surface);
                report
                    .diagnostics
                    .phase_times
                    .push(("render", render_start.elapsed()));

                self.tick_fuse(observer);
            }
        }

        report.mode = self.mode;
        report.paused = self.paused;
        report.outcome = self.outcome.take();
        report.diagnostics.total_time = frame_start.elapsed();
        report
    }

    /// Drive frames from `clock` and `input` until [`Mode::Over`].
    pub fn run(
        &mut self,
        clock: &dyn Clock,
        input: &mut dyn InputSource,
        surface: &mut dyn DrawSurface,
        observer: &mut dyn GameObserver,
    ) -> RunSummary {
        let mut summary = RunSummary::default();
        let sleep = Duration::from_millis(self.config.frame_sleep_ms);
        info!(scenario = ?self.scenario.kind(), "game loop started");

        while self.mode != Mode::Over {
            let snapshot = input.poll();
            let report = self.frame(clock.now_millis(), &snapshot, surface, observer);
            summary.record(&report);
            if self.mode != Mode::Over && !sleep.is_zero() {
                std::thread::sleep(sleep);
            }
        }

        info!(
            frames = summary.frames,
            wins = summary.wins,
            losses = summary.losses,
            "game loop finished"
        );
        summary
    }

    /// Add an entity outside of a frame, notifying `observer`.
    pub fn insert_entity(
        &mut self,
        entity: EntityBox,
        observer: &mut dyn GameObserver,
    ) -> EntityId {
        let role = entity.role();
        let id = self.world.add(entity);
        match role {
            Role::Player => self.player = Some(id),
            Role::Hostile => self.hostiles_remaining += 1,
            _ => {}
        }
        if let Some(e) = self.world.get(id) {
            debug!(entity = %id, label = e.label(), "entity spawned");
            observer.on_entity_spawned(id, e.as_ref());
        }
        id
    }

    // -- internals ----------------------------------------------------------

    fn set_mode(&mut self, to: Mode, observer: &mut dyn GameObserver) {
        let from = self.mode;
        if from == to {
            return;
        }
        info!(?from, ?to, "mode changed");
        self.mode = to;
        observer.on_mode_changed(from, to);
    }

    fn start_round(&mut self, observer: &mut dyn GameObserver, report: &mut FrameReport) {
        for (id, entity) in self.world.clear() {
            observer.on_entity_removed(id, entity.as_ref());
            report.removed += 1;
        }
        self.commands.clear();
        self.spawn_queue.clear();
        self.fire_cooldown.reset();
        self.paused = false;
        self.message = None;
        self.player = None;
        self.hostiles_remaining = 0;

        for entity in self.scenario.instantiate() {
            self.insert_entity(entity, observer);
            report.spawned += 1;
        }
        info!(
            entities = self.world.len(),
            hostiles = self.hostiles_remaining,
            "round started"
        );
        self.set_mode(Mode::Running, observer);
    }

    fn end_round(&mut self, outcome: RoundOutcome, observer: &mut dyn GameObserver) {
        if self.mode != Mode::Running {
            return;
        }
        let message = match outcome {
            RoundOutcome::Win => {
                observer.on_win();
                WIN_MESSAGE
            }
            RoundOutcome::Loss => {
                observer.on_loss();
                LOSS_MESSAGE
            }
        };
        info!(?outcome, "round over");
        self.outcome = Some(outcome);
        self.message = Some(message.to_owned());
        self.set_mode(Mode::WaitingForStart, observer);
    }

    fn simulate(
        &mut self,
        now_ms: u64,
        elapsed_ms: u64,
        input: &InputSnapshot,
        observer: &mut dyn GameObserver,
        report: &mut FrameReport,
    ) {
        report.simulated = true;
        let mut phase = Instant::now();

        self.steer(input);
        if input.fire {
            self.try_fire(now_ms);
        }
        lap(&mut phase, "input", report);

        for (_, entity) in self.world.iter_mut() {
            entity.advance(elapsed_ms);
        }
        for (id, entity) in self.world.iter() {
            entity.after_move(id, &mut self.commands);
        }
        lap(&mut phase, "move", report);

        report.gravity = self.gravity.apply_to_world(&mut self.world);
        lap(&mut phase, "gravity", report);

        report.collisions = self.resolve_collisions();
        lap(&mut phase, "collide", report);

        if self.apply_commands(observer) {
            for (id, entity) in self.world.iter_mut() {
                entity.do_logic(id, &mut self.commands);
            }
            if self.apply_commands(observer) {
                warn!("logic pass requested another logic pass, ignored");
            }
        }
        lap(&mut phase, "commands", report);

        for (id, entity) in self.world.commit_removals() {
            if self.player == Some(id) {
                self.player = None;
            }
            debug!(entity = %id, label = entity.label(), "entity removed");
            observer.on_entity_removed(id, entity.as_ref());
            report.removed += 1;
        }
        for entity in std::mem::take(&mut self.spawn_queue) {
            self.insert_entity(entity, observer);
            report.spawned += 1;
        }
        lap(&mut phase, "commit", report);
    }

    fn steer(&mut self, input: &InputSnapshot) {
        let Some(player) = self.player else {
            return;
        };
        let dx = f64::from(input.steer()) * self.config.ship_speed;
        if let Some(ship) = self.world.get_mut(player) {
            ship.set_horizontal_velocity(dx);
        }
    }

    /// Queue a shot from the ship if the cooldown allows it.
    fn try_fire(&mut self, now_ms: u64) -> bool {
        let Some(origin) = self
            .player
            .and_then(|id| self.world.get(id))
            .map(|ship| ship.kinematics().pixel())
        else {
            return false;
        };
        if !self.fire_cooldown.try_acquire(now_ms) {
            trace!(now_ms, "fire request dropped by cooldown");
            return false;
        }
        match self.scenario.shot_from(origin, self.config.shot_speed) {
            Some(shot) => {
                self.spawn_queue.push(shot);
                true
            }
            None => false,
        }
    }

    /// Test every unordered pair of bounded entities once.
    ///
    /// An entity already queued for removal in this frame takes no part in
    /// later pairs, so a hostile hit by two shots at once is only counted
    /// once.
    fn resolve_collisions(&mut self) -> usize {
        let commands = &mut self.commands;
        let mut consumed: HashSet<EntityId> = commands.removal_targets().collect();
        let mut collisions = 0;

        self.world.for_each_pair_mut(|(ia, a), (ib, b)| {
            if !(a.is_bounded() && b.is_bounded())
                || consumed.contains(&ia)
                || consumed.contains(&ib)
            {
                return;
            }
            if !a.collides_with(&**b) {
                return;
            }
            collisions += 1;
            trace!(a = %ia, b = %ib, "collision");
            a.collided_with(ia, ib, &**b, commands);
            b.collided_with(ib, ia, &**a, commands);
            consumed.extend(commands.removal_targets());
        });
        collisions
    }

    /// Apply everything queued, in order. Returns whether a logic pass was
    /// requested.
    fn apply_commands(&mut self, observer: &mut dyn GameObserver) -> bool {
        let mut logic_requested = false;
        for command in self.commands.drain() {
            match command.kind {
                CommandKind::Remove(target) => {
                    if !self.world.mark_for_removal(target) {
                        trace!(
                            entity = %target,
                            reason = ?command.reason,
                            "removal of stale or already pending entity ignored"
                        );
                    }
                }
                CommandKind::Spawn(entity) => self.spawn_queue.push(entity),
                CommandKind::Signal(signal) => {
                    debug!(
                        ?signal,
                        issued_by = %command.issued_by,
                        reason = ?command.reason,
                        "signal"
                    );
                    self.handle_signal(signal, observer);
                }
                CommandKind::RequestLogic => logic_requested = true,
            }
        }
        logic_requested
    }

    fn handle_signal(&mut self, signal: GameSignal, observer: &mut dyn GameObserver) {
        match signal {
            GameSignal::PlayerEliminated => self.end_round(RoundOutcome::Loss, observer),
            GameSignal::HostileEliminated => {
                self.hostiles_remaining = self.hostiles_remaining.saturating_sub(1);
                observer.on_hostile_eliminated(self.hostiles_remaining);
                if self.hostiles_remaining == 0 {
                    self.end_round(RoundOutcome::Win, observer);
                } else {
                    self.speed_up_hostiles();
                }
            }
        }
    }

    fn speed_up_hostiles(&mut self) {
        let factor = self.config.hostile_speedup;
        let pending: Vec<EntityId> = self.world.pending_removals().to_vec();
        for (id, entity) in self.world.iter_mut() {
            if entity.role() == Role::Hostile && !pending.contains(&id) {
                let dx = entity.kinematics().dx();
                entity.set_horizontal_velocity(dx * factor);
            }
        }
    }

    fn render(&self, surface: &mut dyn DrawSurface) {
        if self.mode == Mode::Over {
            return;
        }
        surface.begin_frame();
        self.world.for_each(|id, entity| {
            surface.draw(id, entity.as_ref(), entity.kinematics().pixel());
        });
        if self.mode == Mode::WaitingForStart {
            if let Some(message) = &self.message {
                surface.show_message(message);
            }
            surface.show_message(START_PROMPT);
        }
        surface.end_frame();
    }

    fn tick_fuse(&mut self, observer: &mut dyn GameObserver) {
        if self.mode != Mode::Running {
            return;
        }
        self.active_frames += 1;
        if let Some(max) = self.config.max_active_frames {
            if self.active_frames >= max {
                info!(active_frames = self.active_frames, "run-length limit reached");
                self.set_mode(Mode::Over, observer);
            }
        }
    }
}

impl std::fmt::Debug for GameLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameLoop")
            .field("mode", &self.mode)
            .field("paused", &self.paused)
            .field("entities", &self.world.len())
            .field("hostiles_remaining", &self.hostiles_remaining)
            .field("frame_count", &self.frame_count)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
