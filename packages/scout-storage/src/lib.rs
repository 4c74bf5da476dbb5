pub mod backend;
pub mod file;
pub mod shapes;
pub mod store;

mod error;

pub use backend::{Backend, MemoryBackend};
pub use error::{Error, ShapeError};
pub use file::FileBackend;
pub use store::{Diagnostics, PersistedStore, Shape, TracingDiagnostics};

pub type Result<T, E = Error> = std::result::Result<T, E>;
