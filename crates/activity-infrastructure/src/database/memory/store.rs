use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

use activity_core::error::DomainError;
use activity_core::repositories::{Repositories, Transaction, UnitOfWork};

use super::repositories::{
    MemoryCategoryRepository, MemoryEnrollmentRepository, MemoryGroupRepository,
    MemoryRepositories, MemoryScheduleRepository, MemorySupervisorRepository,
};
use super::state::{Faults, Handle, MemoryState};

/// Shared in-memory tables. Cloning yields another handle to the same store.
#[derive(Clone)]
pub struct MemoryStore {
    committed: Arc<Mutex<MemoryState>>,
    gate: Arc<AsyncMutex<()>>,
    faults: Arc<Faults>,
    repos: MemoryRepositories,
}

impl MemoryStore {
    pub fn new() -> Self {
        let committed = Arc::new(Mutex::new(MemoryState::default()));
        let gate = Arc::new(AsyncMutex::new(()));
        let faults = Arc::new(Faults::default());
        let repos = MemoryRepositories::bound(Handle::new(
            committed.clone(),
            faults.clone(),
            Some(gate.clone()),
        ));
        Self {
            committed,
            gate,
            faults,
            repos,
        }
    }

    /// Makes the next call of `op` fail with a database error. Operation
    /// names are `<table>.<method>` (for example `"supervisors.create"`),
    /// plus `"transaction.begin"` and `"transaction.commit"`.
    pub fn fail_next(&self, op: &'static str) {
        self.faults.arm(op);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Repositories for MemoryStore {
    type Categories = MemoryCategoryRepository;
    type Groups = MemoryGroupRepository;
    type Schedules = MemoryScheduleRepository;
    type Supervisors = MemorySupervisorRepository;
    type Enrollments = MemoryEnrollmentRepository;

    fn categories(&self) -> &MemoryCategoryRepository {
        self.repos.categories()
    }
    fn groups(&self) -> &MemoryGroupRepository {
        self.repos.groups()
    }
    fn schedules(&self) -> &MemoryScheduleRepository {
        self.repos.schedules()
    }
    fn supervisors(&self) -> &MemorySupervisorRepository {
        self.repos.supervisors()
    }
    fn enrollments(&self) -> &MemoryEnrollmentRepository {
        self.repos.enrollments()
    }
}

#[async_trait]
impl UnitOfWork for MemoryStore {
    type Tx = MemoryTransaction;

    async fn begin(&self) -> Result<MemoryTransaction, DomainError> {
        self.faults.check("transaction.begin")?;
        let guard = self.gate.clone().lock_owned().await;

        let working = Arc::new(Mutex::new(self.committed.lock().clone()));
        let repos = MemoryRepositories::bound(Handle::new(working.clone(), self.faults.clone(), None));
        debug!("Memory transaction started");

        Ok(MemoryTransaction {
            committed: self.committed.clone(),
            working,
            faults: self.faults.clone(),
            repos,
            _guard: guard,
        })
    }
}

/// Private copy of the tables plus the writer gate. Dropping it without
/// `commit` discards the copy.
pub struct MemoryTransaction {
    committed: Arc<Mutex<MemoryState>>,
    working: Arc<Mutex<MemoryState>>,
    faults: Arc<Faults>,
    repos: MemoryRepositories,
    _guard: OwnedMutexGuard<()>,
}

impl Repositories for MemoryTransaction {
    type Categories = MemoryCategoryRepository;
    type Groups = MemoryGroupRepository;
    type Schedules = MemoryScheduleRepository;
    type Supervisors = MemorySupervisorRepository;
    type Enrollments = MemoryEnrollmentRepository;

    fn categories(&self) -> &MemoryCategoryRepository {
        self.repos.categories()
    }
    fn groups(&self) -> &MemoryGroupRepository {
        self.repos.groups()
    }
    fn schedules(&self) -> &MemoryScheduleRepository {
        self.repos.schedules()
    }
    fn supervisors(&self) -> &MemorySupervisorRepository {
        self.repos.supervisors()
    }
    fn enrollments(&self) -> &MemoryEnrollmentRepository {
        self.repos.enrollments()
    }
}

#[async_trait]
impl Transaction for MemoryTransaction {
    async fn commit(self) -> Result<(), DomainError> {
        self.faults.check("transaction.commit")?;
        let working = self.working.lock().clone();
        *self.committed.lock() = working;
        debug!("Memory transaction committed");
        Ok(())
    }

    async fn rollback(self) -> Result<(), DomainError> {
        debug!("Memory transaction rolled back");
        Ok(())
    }
}
