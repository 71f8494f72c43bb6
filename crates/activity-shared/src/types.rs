//! Common types

use uuid::Uuid;

/// Fresh random id for a new row.
pub fn new_id() -> Uuid {
    Uuid::new_v4()
}
