// Data Models
pub mod location;
pub mod operation;

pub use location::Location;
pub use operation::{
    ArchiveOperation, HashAlgorithm, OperationProgress, OperationTarget, OperationType,
    ProgressState,
};
