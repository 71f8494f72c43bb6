use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use activity_core::error::DomainError;
use activity_core::repositories::StaffDirectory;

/// Staff directory over a fixed set of ids.
#[derive(Debug, Default)]
pub struct MemoryStaffDirectory {
    staff: Mutex<HashSet<Uuid>>,
}

impl MemoryStaffDirectory {
    pub fn new(ids: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            staff: Mutex::new(ids.into_iter().collect()),
        }
    }

    pub fn insert(&self, id: Uuid) {
        self.staff.lock().insert(id);
    }
}

#[async_trait]
impl StaffDirectory for MemoryStaffDirectory {
    async fn exists(&self, staff_id: &Uuid) -> Result<bool, DomainError> {
        Ok(self.staff.lock().contains(staff_id))
    }
}
