use std::collections::HashSet;
use std::sync::Arc;

use activity_core::domain::{ActivityGroup, Category, Enrollment, Schedule, SupervisorAssignment};
use activity_core::error::DomainError;
use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;
use tracing::warn;

/// Table contents, kept in insertion order.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryState {
    pub categories: Vec<Category>,
    pub groups: Vec<ActivityGroup>,
    pub schedules: Vec<Schedule>,
    pub supervisors: Vec<SupervisorAssignment>,
    pub enrollments: Vec<Enrollment>,
}

impl MemoryState {
    pub fn has_group(&self, id: &uuid::Uuid) -> bool {
        self.groups.iter().any(|g| g.id == *id)
    }
}

/// One-shot failures armed by tests, keyed by operation name such as
/// `"schedules.create"` or `"transaction.commit"`.
#[derive(Debug, Default)]
pub(crate) struct Faults {
    pending: Mutex<HashSet<&'static str>>,
}

impl Faults {
    pub fn arm(&self, op: &'static str) {
        self.pending.lock().insert(op);
    }

    pub fn check(&self, op: &'static str) -> Result<(), DomainError> {
        if self.pending.lock().remove(op) {
            warn!("Injected failure triggered: {}", op);
            return Err(DomainError::DatabaseError(format!("injected failure in {}", op)));
        }
        Ok(())
    }
}

pub(crate) fn constraint_violation(detail: &str) -> DomainError {
    DomainError::DatabaseError(format!("constraint violation: {}", detail))
}

/// Shared view of one table set. Outside a transaction `writer` is the
/// store-wide gate and every write takes it; inside one it is `None`
/// because the transaction already holds the gate.
#[derive(Clone)]
pub(crate) struct Handle {
    state: Arc<Mutex<MemoryState>>,
    faults: Arc<Faults>,
    writer: Option<Arc<AsyncMutex<()>>>,
}

impl Handle {
    pub fn new(
        state: Arc<Mutex<MemoryState>>,
        faults: Arc<Faults>,
        writer: Option<Arc<AsyncMutex<()>>>,
    ) -> Self {
        Self { state, faults, writer }
    }

    pub fn read<T>(&self, op: &'static str, f: impl FnOnce(&MemoryState) -> T) -> Result<T, DomainError> {
        self.faults.check(op)?;
        let state = self.state.lock();
        Ok(f(&state))
    }

    pub async fn write<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&mut MemoryState) -> Result<T, DomainError> + Send,
    ) -> Result<T, DomainError> {
        self.faults.check(op)?;
        let _gate = match &self.writer {
            Some(gate) => Some(gate.lock().await),
            None => None,
        };
        let mut state = self.state.lock();
        f(&mut state)
    }
}
