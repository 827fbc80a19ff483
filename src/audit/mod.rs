mod storage;
mod types;

pub use storage::AuditLog;
pub use types::AuditRecord;
