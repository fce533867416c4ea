// UI Layer
pub mod console;

pub use console::{ConsoleHost, DirectoryPane};
