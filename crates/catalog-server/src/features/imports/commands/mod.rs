//! Import commands (write operations)

pub mod cancel_import;
pub mod start_import;

pub use cancel_import::{CancelImportCommand, CancelImportError, CancelImportResponse};
pub use start_import::{StartImportCommand, StartImportError, StartImportResponse};
