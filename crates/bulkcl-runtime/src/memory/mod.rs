mod access;
mod allocator;
mod pool;
mod slice;
mod storage;

pub use access::*;
pub use allocator::*;
pub use pool::*;
pub use slice::*;
pub use storage::*;
