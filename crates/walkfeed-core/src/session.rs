//! Async host for a [`PetEconomy`].
//!
//! One tokio task owns the economy. Step readings, feed taps and resets reach
//! it over a channel and the decay timer is an interval inside the same
//! `select!` loop, so each transition runs to completion before the next one
//! starts. State is persisted after every change; storage failures are logged
//! and otherwise ignored.
//!
//! ## Usage
//!
//! ```ignore
//! let (handle, task) = PetSession::start(store, config.economy)?;
//! handle.ingest_steps(4200).await;
//! let outcome = handle.feed(apple).await?;
//! handle.shutdown().await;
//! let final_state = task.await?;
//! ```

use chrono::{Local, Utc};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::economy::{
    CatchUp, EconomyConfig, FeedOutcome, FoodItem, PetEconomy, PetState, ResetOutcome,
};
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::pet::PetIdentity;
use crate::storage::StateStore;

const COMMAND_BUFFER: usize = 64;
const EVENT_BUFFER: usize = 256;

enum Command {
    IngestSteps(i64),
    IngestStepDelta(i64),
    Feed(FoodItem, oneshot::Sender<FeedOutcome>),
    Reset(oneshot::Sender<ResetOutcome>),
    Adopt(PetIdentity, oneshot::Sender<bool>),
    Snapshot(oneshot::Sender<PetState>),
    Shutdown,
}

/// Cloneable handle used by the presentation layer and the step source.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Command>,
    events: broadcast::Sender<Event>,
}

impl SessionHandle {
    /// Forward an absolute step reading. Ignored once the session is gone.
    pub async fn ingest_steps(&self, cumulative: i64) {
        self.fire(Command::IngestSteps(cumulative)).await;
    }

    /// Forward an incremental step reading. Ignored once the session is gone.
    pub async fn ingest_step_delta(&self, delta: i64) {
        self.fire(Command::IngestStepDelta(delta)).await;
    }

    pub async fn feed(&self, item: FoodItem) -> Result<FeedOutcome> {
        self.request(|reply| Command::Feed(item, reply)).await
    }

    pub async fn reset(&self) -> Result<ResetOutcome> {
        self.request(Command::Reset).await
    }

    pub async fn adopt(&self, pet: PetIdentity) -> Result<bool> {
        self.request(|reply| Command::Adopt(pet, reply)).await
    }

    pub async fn snapshot(&self) -> Result<PetState> {
        self.request(Command::Snapshot).await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Stop the decay timer and end the session task.
    pub async fn shutdown(&self) {
        self.fire(Command::Shutdown).await;
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn fire(&self, cmd: Command) {
        if self.tx.send(cmd).await.is_err() {
            debug!("pet session closed; dropping command");
        }
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| CoreError::SessionClosed)?;
        rx.await.map_err(|_| CoreError::SessionClosed)
    }
}

/// The task side of a session.
pub struct PetSession<S> {
    economy: PetEconomy,
    store: S,
    tick_interval: Duration,
    rx: mpsc::Receiver<Command>,
    events: broadcast::Sender<Event>,
    /// Decay applied at start for time spent offline, announced on the
    /// task's first wake-up.
    caught_up: Option<CatchUp>,
}

impl<S> PetSession<S>
where
    S: StateStore + Send + 'static,
{
    /// Load the persisted state, catch up on missed decay if
    /// `catch_up_offline` is set, then spawn.
    ///
    /// Loading happens before the timer exists, so the first tick always
    /// sees the stored values. Missed decay is persisted as soon as the task
    /// starts; its events go out before the first command or tick is handled,
    /// so subscribers taken right after `start` receive them.
    ///
    /// # Errors
    /// Returns an error if the stored state cannot be read.
    pub fn start(store: S, config: EconomyConfig) -> Result<(SessionHandle, JoinHandle<PetState>)> {
        let state = store.load()?.unwrap_or_default();
        let interval = config.tick_interval();
        let catch_up = config.catch_up_offline;
        let mut economy = PetEconomy::from_state(state, config);
        let caught_up = if catch_up {
            Some(economy.catch_up(Utc::now(), interval)).filter(|c| c.ticks > 0)
        } else {
            None
        };
        Ok(Self::launch(economy, store, interval, caught_up))
    }

    /// Spawn the session task on the current tokio runtime. The first decay
    /// tick fires one full `tick_interval` after this call.
    pub fn spawn(
        economy: PetEconomy,
        store: S,
        tick_interval: Duration,
    ) -> (SessionHandle, JoinHandle<PetState>) {
        Self::launch(economy, store, tick_interval, None)
    }

    fn launch(
        economy: PetEconomy,
        store: S,
        tick_interval: Duration,
        caught_up: Option<CatchUp>,
    ) -> (SessionHandle, JoinHandle<PetState>) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let session = Self {
            economy,
            store,
            tick_interval,
            rx,
            events: events.clone(),
            caught_up,
        };
        let task = tokio::spawn(session.run());
        (SessionHandle { tx, events }, task)
    }

    async fn run(mut self) -> PetState {
        let mut ticker = interval_at(Instant::now() + self.tick_interval, self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!(interval_ms = self.tick_interval.as_millis() as u64, "pet session started");
        if self.caught_up.is_some() {
            self.persist();
        }

        loop {
            tokio::select! {
                biased;
                cmd = self.rx.recv() => {
                    self.announce_catch_up();
                    match cmd {
                        Some(Command::Shutdown) | None => break,
                        Some(cmd) => self.handle(cmd),
                    }
                }
                _ = ticker.tick() => {
                    self.announce_catch_up();
                    self.on_tick();
                }
            }
        }

        debug!("pet session stopped");
        self.persist();
        self.economy.snapshot()
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::IngestSteps(n) => {
                if self.economy.ingest_steps(n) {
                    self.after_steps();
                }
            }
            Command::IngestStepDelta(n) => {
                if self.economy.ingest_step_delta(n) {
                    self.after_steps();
                }
            }
            Command::Feed(item, reply) => {
                let outcome = self.economy.feed(&item);
                let at = Utc::now();
                match outcome.rejection {
                    None => {
                        self.publish(Event::Fed {
                            item: item.name,
                            hunger_points: outcome.hunger_points,
                            hunger_level: outcome.hunger_level,
                            at,
                        });
                        self.persist();
                    }
                    Some(rejection) => self.publish(Event::FeedRejected {
                        item: item.name,
                        rejection,
                        at,
                    }),
                }
                let _ = reply.send(outcome);
            }
            Command::Reset(reply) => {
                let outcome = self.economy.reset();
                if outcome.applied {
                    self.publish(Event::PetReset { at: Utc::now() });
                    self.persist();
                }
                let _ = reply.send(outcome);
            }
            Command::Adopt(pet, reply) => {
                let adopted = self.economy.adopt(pet.clone());
                if adopted {
                    self.publish(Event::PetAdopted { pet, at: Utc::now() });
                    self.persist();
                }
                let _ = reply.send(adopted);
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.economy.snapshot());
            }
            Command::Shutdown => {}
        }
    }

    fn announce_catch_up(&mut self) {
        let Some(caught_up) = self.caught_up.take() else {
            return;
        };
        let at = self.economy.state().last_tick_at.unwrap_or_else(Utc::now);
        self.publish(Event::HungerDecayed {
            hunger_level: caught_up.hunger_level,
            at,
        });
        if caught_up.just_died {
            info!(ticks = caught_up.ticks, "pet died while the session was down");
            self.publish(Event::PetDied {
                today_steps: self.economy.state().today_steps,
                at,
            });
        }
    }

    fn on_tick(&mut self) {
        if self.economy.is_dead() {
            return;
        }
        let now = Utc::now();
        let outcome = self.economy.tick_at(now);
        self.publish(Event::HungerDecayed {
            hunger_level: outcome.hunger_level,
            at: now,
        });
        if outcome.just_died {
            self.publish(Event::PetDied {
                today_steps: self.economy.state().today_steps,
                at: now,
            });
        }
        self.persist();
    }

    fn after_steps(&mut self) {
        let state = self.economy.state();
        self.publish(Event::StepsIngested {
            today_steps: state.today_steps,
            hunger_points: state.hunger_points,
            at: Utc::now(),
        });
        if let Err(e) = self
            .store
            .record_daily_steps(Local::now().date_naive(), state.today_steps)
        {
            warn!(error = %e, "failed to record daily steps");
        }
        self.persist();
    }

    fn publish(&self, event: Event) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(self.economy.state()) {
            warn!(error = %e, "failed to persist pet state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    fn fast_config() -> EconomyConfig {
        EconomyConfig {
            decay_per_tick: 2.0,
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn decay_timer_kills_after_fifty_ticks() {
        let store = Arc::new(MemoryStore::new());
        let economy = PetEconomy::new(fast_config());
        let (handle, task) = PetSession::spawn(economy, store.clone(), Duration::from_secs(1));
        let mut events = handle.subscribe();

        tokio::time::sleep(Duration::from_millis(49_500)).await;
        let state = handle.snapshot().await.unwrap();
        assert!(!state.is_dead);
        assert!((state.hunger_level - 2.0).abs() < 1e-9);

        tokio::time::sleep(Duration::from_secs(30)).await;
        let state = handle.snapshot().await.unwrap();
        assert!(state.is_dead);
        assert_eq!(state.hunger_level, 0.0);

        let mut deaths = 0;
        let mut decays = 0;
        while let Ok(ev) = events.try_recv() {
            match ev {
                Event::PetDied { .. } => deaths += 1,
                Event::HungerDecayed { .. } => decays += 1,
                _ => {}
            }
        }
        assert_eq!(deaths, 1);
        assert_eq!(decays, 50);

        handle.shutdown().await;
        let final_state = task.await.unwrap();
        assert!(final_state.is_dead);
        assert_eq!(store.saved(), Some(final_state));
    }

    #[tokio::test(start_paused = true)]
    async fn steps_and_feeding_go_through_the_task() {
        let store = Arc::new(MemoryStore::new());
        let economy = PetEconomy::new(fast_config());
        let (handle, task) = PetSession::spawn(economy, store.clone(), Duration::from_secs(1));

        handle.ingest_steps(150).await;
        handle.ingest_step_delta(50).await;
        tokio::time::sleep(Duration::from_millis(5_500)).await;

        let outcome = handle.feed(FoodItem::new("Apple", 5, 5)).await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.hunger_points, 15);
        assert!((outcome.hunger_level - 95.0).abs() < 1e-9);

        let saved = store.saved().unwrap();
        assert_eq!(saved.today_steps, 200);
        assert_eq!(saved.hunger_points, 15);
        assert_eq!(store.steps_on(Local::now().date_naive()), 200);

        handle.shutdown().await;
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn closed_session_rejects_requests_and_drops_readings() {
        let economy = PetEconomy::default();
        let (handle, task) = PetSession::spawn(economy, MemoryStore::new(), Duration::from_secs(1));
        handle.shutdown().await;
        task.await.unwrap();

        assert!(handle.is_closed());
        handle.ingest_steps(1000).await;
        assert!(matches!(
            handle.snapshot().await,
            Err(CoreError::SessionClosed)
        ));
    }

    fn saved_an_hour_ago(level: f64) -> PetState {
        PetState {
            hunger_level: level,
            last_tick_at: Some(Utc::now() - chrono::Duration::hours(1)),
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn default_config_does_not_decay_while_offline() {
        let store = Arc::new(MemoryStore::with_state(saved_an_hour_ago(80.0)));
        let (handle, task) = PetSession::start(store.clone(), EconomyConfig::default()).unwrap();

        let state = handle.snapshot().await.unwrap();
        assert!(!state.is_dead);
        assert_eq!(state.hunger_level, 80.0);

        handle.shutdown().await;
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn offline_death_is_announced_and_saved() {
        let store = Arc::new(MemoryStore::with_state(saved_an_hour_ago(80.0)));
        let config = EconomyConfig {
            catch_up_offline: true,
            ..Default::default()
        };
        let (handle, task) = PetSession::start(store.clone(), config).unwrap();
        let mut events = handle.subscribe();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(store.saved().map(|s| s.is_dead), Some(true));

        let mut deaths = 0;
        while let Ok(ev) = events.try_recv() {
            if matches!(ev, Event::PetDied { .. }) {
                deaths += 1;
            }
        }
        assert_eq!(deaths, 1);

        handle.shutdown().await;
        assert!(task.await.unwrap().is_dead);
    }

    #[tokio::test(start_paused = true)]
    async fn start_loads_stored_state_before_ticking() {
        let stored = PetState {
            hunger_level: 40.0,
            hunger_points: 77,
            today_steps: 770,
            ..Default::default()
        };
        let store = Arc::new(MemoryStore::with_state(stored));
        let config = EconomyConfig {
            catch_up_offline: false,
            ..fast_config()
        };
        let (handle, task) = PetSession::start(store.clone(), config).unwrap();

        let state = handle.snapshot().await.unwrap();
        assert_eq!(state.hunger_points, 77);
        assert_eq!(state.hunger_level, 40.0);

        handle.shutdown().await;
        task.await.unwrap();
    }
}
