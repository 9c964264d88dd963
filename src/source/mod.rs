//! Byte source implementations
//!
//! Provides the `ByteSource` abstraction and file / in-memory backends.

mod local;
mod memory;
mod traits;

pub use local::FileSource;
pub use memory::MemorySource;
pub use traits::{BoxedSource, ByteSource};
