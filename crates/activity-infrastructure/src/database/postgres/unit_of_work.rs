// ============================================================================
// Activity Infrastructure - PostgreSQL Unit of Work
// File: crates/activity-infrastructure/src/database/postgres/unit_of_work.rs
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::Mutex;
use tracing::debug;

use activity_core::error::DomainError;
use activity_core::repositories::{Repositories, Transaction, UnitOfWork};

use super::executor::{db_error, PgExecutor, SharedTx};
use super::{
    PgCategoryRepository, PgEnrollmentRepository, PgGroupRepository, PgScheduleRepository,
    PgSupervisorRepository,
};

/// One repository of each kind, all on the same connection source.
#[derive(Clone)]
pub struct PgRepositories {
    categories: PgCategoryRepository,
    groups: PgGroupRepository,
    schedules: PgScheduleRepository,
    supervisors: PgSupervisorRepository,
    enrollments: PgEnrollmentRepository,
}

impl PgRepositories {
    fn bound(exec: PgExecutor) -> Self {
        Self {
            categories: PgCategoryRepository::new(exec.clone()),
            groups: PgGroupRepository::new(exec.clone()),
            schedules: PgScheduleRepository::new(exec.clone()),
            supervisors: PgSupervisorRepository::new(exec.clone()),
            enrollments: PgEnrollmentRepository::new(exec),
        }
    }
}

impl Repositories for PgRepositories {
    type Categories = PgCategoryRepository;
    type Groups = PgGroupRepository;
    type Schedules = PgScheduleRepository;
    type Supervisors = PgSupervisorRepository;
    type Enrollments = PgEnrollmentRepository;

    fn categories(&self) -> &PgCategoryRepository {
        &self.categories
    }
    fn groups(&self) -> &PgGroupRepository {
        &self.groups
    }
    fn schedules(&self) -> &PgScheduleRepository {
        &self.schedules
    }
    fn supervisors(&self) -> &PgSupervisorRepository {
        &self.supervisors
    }
    fn enrollments(&self) -> &PgEnrollmentRepository {
        &self.enrollments
    }
}

/// Pool-bound repositories plus the ability to open transactions.
pub struct PgUnitOfWork {
    pool: PgPool,
    repos: PgRepositories,
}

impl PgUnitOfWork {
    pub fn new(pool: PgPool) -> Self {
        let repos = PgRepositories::bound(PgExecutor::Pool(pool.clone()));
        Self { pool, repos }
    }
}

impl Repositories for PgUnitOfWork {
    type Categories = PgCategoryRepository;
    type Groups = PgGroupRepository;
    type Schedules = PgScheduleRepository;
    type Supervisors = PgSupervisorRepository;
    type Enrollments = PgEnrollmentRepository;

    fn categories(&self) -> &PgCategoryRepository {
        self.repos.categories()
    }
    fn groups(&self) -> &PgGroupRepository {
        self.repos.groups()
    }
    fn schedules(&self) -> &PgScheduleRepository {
        self.repos.schedules()
    }
    fn supervisors(&self) -> &PgSupervisorRepository {
        self.repos.supervisors()
    }
    fn enrollments(&self) -> &PgEnrollmentRepository {
        self.repos.enrollments()
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    type Tx = PgTransaction;

    async fn begin(&self) -> Result<PgTransaction, DomainError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("beginning transaction"))?;
        let shared: SharedTx = Arc::new(Mutex::new(Some(tx)));
        debug!("Transaction started");

        Ok(PgTransaction {
            repos: PgRepositories::bound(PgExecutor::Tx(shared.clone())),
            tx: shared,
        })
    }
}

/// Repositories bound to an open PostgreSQL transaction. Dropped without
/// commit, sqlx rolls the transaction back.
pub struct PgTransaction {
    tx: SharedTx,
    repos: PgRepositories,
}

impl PgTransaction {
    async fn take(&self) -> Result<sqlx::Transaction<'static, sqlx::Postgres>, DomainError> {
        self.tx
            .lock()
            .await
            .take()
            .ok_or_else(|| DomainError::InternalError("transaction already finished".into()))
    }
}

impl Repositories for PgTransaction {
    type Categories = PgCategoryRepository;
    type Groups = PgGroupRepository;
    type Schedules = PgScheduleRepository;
    type Supervisors = PgSupervisorRepository;
    type Enrollments = PgEnrollmentRepository;

    fn categories(&self) -> &PgCategoryRepository {
        self.repos.categories()
    }
    fn groups(&self) -> &PgGroupRepository {
        self.repos.groups()
    }
    fn schedules(&self) -> &PgScheduleRepository {
        self.repos.schedules()
    }
    fn supervisors(&self) -> &PgSupervisorRepository {
        self.repos.supervisors()
    }
    fn enrollments(&self) -> &PgEnrollmentRepository {
        self.repos.enrollments()
    }
}

#[async_trait]
impl Transaction for PgTransaction {
    async fn commit(self) -> Result<(), DomainError> {
        self.take()
            .await?
            .commit()
            .await
            .map_err(db_error("committing transaction"))?;
        debug!("Transaction committed");
        Ok(())
    }

    async fn rollback(self) -> Result<(), DomainError> {
        self.take()
            .await?
            .rollback()
            .await
            .map_err(db_error("rolling back transaction"))?;
        debug!("Transaction rolled back");
        Ok(())
    }
}
