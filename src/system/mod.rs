// System Layer
pub mod archiver;
pub mod filesystem;
pub mod hash;
pub mod output_parser;
pub mod runner;

pub use archiver::Archiver;
pub use filesystem::{FileSystem, LocalFileSystem};
pub use hash::get_hash;
pub use output_parser::{ArchiverOutputParser, SevenZipOutputParser};
pub use runner::{CancellationToken, ProcessRunner, RunOptions};
