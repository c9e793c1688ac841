mod sync;

pub use sync::{BoundedLine, SyncBoundedLineReader};
