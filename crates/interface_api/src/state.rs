//! Shared application state
//!
//! Services are built once from a set of [`Adapters`]: PostgreSQL and the
//! hosted storage in production, the in-memory ports in tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tokio::task::JoinHandle;
use tracing::info;

use core_kernel::{HealthCheckable, ObjectStore, SharedClock, SystemClock, WizardSessionId};
use domain_booking::{
    AdminConsole, BookingService, CommitSequencer, DocumentUploadGateway, HandoffNotifier,
    LoggingNotifier, ReservationPort, StepRules, Wizard,
};
use domain_customer::ClientPort;
use domain_fleet::{FleetService, VehiclePhotoGateway, VehiclePort};
use infra_db::{DatabasePool, PostgresClientAdapter, PostgresReservationAdapter, PostgresVehicleAdapter};
use infra_storage::SupabaseObjectStore;

use crate::config::ApiConfig;
use crate::error::ApiError;

/// Port implementations the services run on
pub struct Adapters {
    pub vehicles: Arc<dyn VehiclePort>,
    pub clients: Arc<dyn ClientPort>,
    pub reservations: Arc<dyn ReservationPort>,
    pub store: Arc<dyn ObjectStore>,
    pub notifier: Arc<dyn HandoffNotifier>,
    pub clock: SharedClock,
    /// Checked by the readiness endpoint
    pub health_checks: Vec<Arc<dyn HealthCheckable>>,
}

impl Adapters {
    /// PostgreSQL stores and the hosted object storage, on the wall clock
    pub fn live(pool: DatabasePool, store: SupabaseObjectStore) -> Self {
        let vehicles = Arc::new(PostgresVehicleAdapter::new(pool.clone()));
        let clients = Arc::new(PostgresClientAdapter::new(pool.clone()));
        let reservations = Arc::new(PostgresReservationAdapter::new(pool));
        let store = Arc::new(store);
        let health_checks: Vec<Arc<dyn HealthCheckable>> = vec![vehicles.clone(), store.clone()];

        Self {
            health_checks,
            vehicles,
            clients,
            reservations,
            store,
            notifier: Arc::new(LoggingNotifier),
            clock: Arc::new(SystemClock),
        }
    }
}

/// A wizard shared between requests of the same session
pub type SharedWizard = Arc<Mutex<Wizard>>;

struct Session {
    wizard: SharedWizard,
    /// Unix milliseconds of the last request that locked the session
    touched: AtomicI64,
}

impl Session {
    fn new(wizard: Wizard) -> Self {
        Self {
            wizard: Arc::new(Mutex::new(wizard)),
            touched: AtomicI64::new(Utc::now().timestamp_millis()),
        }
    }

    fn touch(&self) {
        self.touched.store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    fn touched_before(&self, cutoff: DateTime<Utc>) -> bool {
        self.touched.load(Ordering::Relaxed) < cutoff.timestamp_millis()
    }
}

/// In-memory wizard sessions
///
/// Each session has its own lock. A request that finds the lock taken (a
/// submit in flight) is turned away rather than queued. Submitted sessions
/// are removed by the submit handler and abandoned ones by
/// [`WizardSessions::spawn_sweeper`].
#[derive(Clone, Default)]
pub struct WizardSessions {
    sessions: Arc<RwLock<HashMap<WizardSessionId, Arc<Session>>>>,
}

impl WizardSessions {
    pub async fn insert(&self, wizard: Wizard) -> WizardSessionId {
        let id = wizard.id();
        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Session::new(wizard)));
        id
    }

    /// Exclusive access to a session's wizard
    ///
    /// # Errors
    ///
    /// * `NotFound` for an unknown, abandoned or submitted session
    /// * `Locked` while another request holds the session
    pub async fn lock(&self, id: WizardSessionId) -> Result<OwnedMutexGuard<Wizard>, ApiError> {
        let session = self
            .sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Wizard session {} not found", id)))?;

        session.touch();
        session
            .wizard
            .clone()
            .try_lock_owned()
            .map_err(|_| ApiError::Locked("A submission is in progress for this session".to_string()))
    }

    /// Drops a session; returns whether it existed
    pub async fn remove(&self, id: WizardSessionId) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops sessions last used before `cutoff`; returns how many went
    ///
    /// A session whose lock is held is kept whatever its age.
    pub async fn evict_untouched_since(&self, cutoff: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| {
            !session.touched_before(cutoff) || session.wizard.try_lock().is_err()
        });
        before - sessions.len()
    }

    /// Every `period`, drops the sessions idle for longer than `max_idle`
    pub fn spawn_sweeper(&self, max_idle: Duration, period: std::time::Duration) -> JoinHandle<()> {
        let sessions = self.clone();
        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(period);
            loop {
                ticks.tick().await;
                let evicted = sessions.evict_untouched_since(Utc::now() - max_idle).await;
                if evicted > 0 {
                    let remaining = sessions.len().await;
                    info!(evicted, remaining, "idle wizard sessions dropped");
                }
            }
        })
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub fleet: FleetService,
    pub booking: BookingService,
    pub console: AdminConsole,
    pub sessions: WizardSessions,
    pub health_checks: Arc<Vec<Arc<dyn HealthCheckable>>>,
}

impl AppState {
    /// Wires the services on top of `adapters`
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unknown currency or timezone
    pub fn new(config: ApiConfig, adapters: Adapters) -> Result<Self, config::ConfigError> {
        let settings = config.commit_settings()?;
        let currency = settings.currency;
        let rules = StepRules::new(adapters.clock.clone(), config.timezone()?);

        let fleet = FleetService::new(
            adapters.vehicles.clone(),
            VehiclePhotoGateway::with_bucket(adapters.store.clone(), config.photos_bucket.clone()),
        );
        let sequencer = CommitSequencer::new(
            adapters.clients.clone(),
            adapters.reservations.clone(),
            DocumentUploadGateway::with_bucket(adapters.store.clone(), config.documents_bucket.clone()),
            adapters.notifier.clone(),
            settings,
        );
        let booking = BookingService::new(adapters.vehicles.clone(), sequencer, rules);
        let console = AdminConsole::new(
            adapters.vehicles,
            adapters.clients,
            adapters.reservations,
            currency,
        );

        Ok(Self {
            config,
            fleet,
            booking,
            console,
            sessions: WizardSessions::default(),
            health_checks: Arc::new(adapters.health_checks),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{FixedClock, Timezone};

    fn wizard() -> Wizard {
        let clock: SharedClock = Arc::new(FixedClock::at(Utc::now()));
        Wizard::new(StepRules::new(clock, Timezone::casablanca()), core_kernel::Currency::EUR)
    }

    #[tokio::test]
    async fn test_idle_sessions_are_evicted() {
        let sessions = WizardSessions::default();
        let id = sessions.insert(wizard()).await;

        assert_eq!(sessions.evict_untouched_since(Utc::now() - Duration::hours(1)).await, 0);
        assert_eq!(sessions.len().await, 1);

        assert_eq!(sessions.evict_untouched_since(Utc::now() + Duration::seconds(1)).await, 1);
        assert_eq!(sessions.len().await, 0);
        assert!(matches!(sessions.lock(id).await, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_locked_session_survives_sweep() {
        let sessions = WizardSessions::default();
        let id = sessions.insert(wizard()).await;
        let guard = sessions.lock(id).await.unwrap();

        assert_eq!(sessions.evict_untouched_since(Utc::now() + Duration::seconds(1)).await, 0);
        drop(guard);
        assert_eq!(sessions.evict_untouched_since(Utc::now() + Duration::seconds(1)).await, 1);
    }

    #[tokio::test]
    async fn test_sweeper_drops_idle_sessions() {
        let sessions = WizardSessions::default();
        sessions.insert(wizard()).await;

        let sweeper = sessions.spawn_sweeper(Duration::zero(), std::time::Duration::from_millis(10));
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        sweeper.abort();

        assert_eq!(sessions.len().await, 0);
    }
}
