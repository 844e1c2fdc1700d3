//! kas-store: the persisted Transaction Store, its storage backends, the
//! confirm-before-delete protocol and export/import.

pub mod export;
pub mod intent;
pub mod storage;
pub mod store;

pub use export::{
    APP_NAME, ExportDocument, ExportError, ExportFormat, export_file_name, read_export,
    write_csv, write_export,
};
pub use intent::{Confirm, Decision, DestructiveIntent};
pub use storage::{FileStorage, MemoryStorage, PersistError, Storage};
pub use store::{Change, ChangeKind, ImportMode, STORAGE_KEY, TransactionStore};
