//! Temperature-unit preference: load once, persist-then-apply, convert.
//!
//! The store is the single owner of the `temperatureUnit` key. Readers always
//! see a valid unit: the default until the startup load lands, then whatever
//! was last durably saved. Storage failures never reach consumers; they are
//! logged and the last good value is kept.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::storage::{KeyValueStore, StorageError};
use crate::unit::TemperatureUnit;

/// Storage key owned by the preference store.
pub const TEMPERATURE_UNIT_KEY: &str = "temperatureUnit";

/// Whether the startup load has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    /// Still holding the default; a persisted value may replace it shortly.
    #[default]
    Uninitialized,
    /// The startup read finished (successfully or not).
    Loaded,
}

/// Result of the startup read, for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LoadOutcome {
    Restored(TemperatureUnit),
    Missing,
    Invalid(String),
    /// A newer value was saved while the read was in flight.
    Superseded,
    Failed(StorageError),
}

/// Process-wide temperature-unit preference.
///
/// Share it with `Arc<PreferenceStore>`; every method takes `&self`.
pub struct PreferenceStore {
    storage: Arc<dyn KeyValueStore>,
    unit: watch::Sender<TemperatureUnit>,
    phase: watch::Sender<LoadPhase>,
    // Bumped after every successful persist.
    saved_generation: AtomicU64,
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("unit", &*self.unit.borrow())
            .field("phase", &*self.phase.borrow())
            .finish_non_exhaustive()
    }
}

impl PreferenceStore {
    /// Create a store holding the default unit. Nothing is read yet.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        let (unit, _) = watch::channel(TemperatureUnit::default());
        let (phase, _) = watch::channel(LoadPhase::Uninitialized);
        Self {
            storage,
            unit,
            phase,
            saved_generation: AtomicU64::new(0),
        }
    }

    /// Current display unit.
    pub fn unit(&self) -> TemperatureUnit {
        *self.unit.borrow()
    }

    pub fn phase(&self) -> LoadPhase {
        *self.phase.borrow()
    }

    /// Observe unit changes. The receiver starts at the current value.
    pub fn subscribe(&self) -> watch::Receiver<TemperatureUnit> {
        self.unit.subscribe()
    }

    /// Wait until the startup load has finished.
    pub async fn wait_loaded(&self) {
        let mut rx = self.phase.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|phase| *phase == LoadPhase::Loaded).await;
    }

    /// Convert a Celsius reading into the current display unit.
    pub fn convert(&self, value_celsius: f64) -> f64 {
        self.unit().from_celsius(value_celsius)
    }

    /// Load the persisted unit. Never fails; problems are logged.
    pub async fn initialize(&self) {
        match self.load().await {
            LoadOutcome::Restored(unit) => {
                tracing::info!("Restored temperature unit preference: {}", unit);
            }
            LoadOutcome::Missing => {
                tracing::debug!("No saved temperature unit, using {}", self.unit());
            }
            LoadOutcome::Invalid(raw) => {
                tracing::warn!(
                    "Ignoring invalid saved temperature unit {:?}, keeping {}",
                    raw,
                    self.unit()
                );
            }
            LoadOutcome::Superseded => {
                tracing::debug!("Temperature unit changed during load, keeping {}", self.unit());
            }
            LoadOutcome::Failed(e) => {
                tracing::warn!("Failed to load temperature unit preference: {}", e);
            }
        }
        self.phase.send_replace(LoadPhase::Loaded);
    }

    /// Run [`initialize`](Self::initialize) in the background.
    ///
    /// Callers keep rendering with the current value; the loaded value
    /// arrives through [`subscribe`](Self::subscribe).
    pub fn spawn_initialize(self: &Arc<Self>) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move { store.initialize().await })
    }

    async fn load(&self) -> LoadOutcome {
        let generation = self.saved_generation.load(Ordering::SeqCst);

        let raw = match self.storage.get(TEMPERATURE_UNIT_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return LoadOutcome::Missing,
            Err(e) => return LoadOutcome::Failed(e),
        };

        let unit = match raw.parse::<TemperatureUnit>() {
            Ok(unit) => unit,
            Err(_) if raw.is_empty() => return LoadOutcome::Missing,
            Err(_) => return LoadOutcome::Invalid(raw),
        };

        if self.apply_loaded(unit, generation) {
            LoadOutcome::Restored(unit)
        } else {
            LoadOutcome::Superseded
        }
    }

    /// Persist `unit`, then make it current. On failure nothing changes.
    pub async fn set_unit(&self, unit: TemperatureUnit) {
        if let Err(e) = self.try_set_unit(unit).await {
            tracing::error!("Failed to save temperature unit preference: {}", e);
        }
    }

    /// Like [`set_unit`](Self::set_unit) but hands the storage error back.
    ///
    /// # Errors
    /// Returns [`StorageError::Write`] when persisting fails; the in-memory
    /// unit is left untouched in that case.
    pub async fn try_set_unit(&self, unit: TemperatureUnit) -> Result<(), StorageError> {
        self.storage.set(TEMPERATURE_UNIT_KEY, unit.as_str()).await?;
        self.unit.send_if_modified(|current| {
            self.saved_generation.fetch_add(1, Ordering::SeqCst);
            replace_unit(current, unit)
        });
        tracing::info!("Temperature unit set to {}", unit);
        Ok(())
    }

    /// Persist and apply the opposite of the current unit.
    pub async fn toggle(&self) {
        self.set_unit(self.unit().toggled()).await;
    }

    /// Apply a value read at `generation` unless a save has landed since.
    ///
    /// Saves bump the generation while holding the channel's write lock, so
    /// checking it inside the same lock leaves no gap between check and write.
    fn apply_loaded(&self, unit: TemperatureUnit, generation: u64) -> bool {
        let mut current_generation = true;
        self.unit.send_if_modified(|current| {
            if self.saved_generation.load(Ordering::SeqCst) != generation {
                current_generation = false;
                return false;
            }
            replace_unit(current, unit)
        });
        current_generation
    }
}

fn replace_unit(current: &mut TemperatureUnit, unit: TemperatureUnit) -> bool {
    if *current == unit {
        false
    } else {
        *current = unit;
        true
    }
}
