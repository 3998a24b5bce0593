pub mod storage;
pub mod types;

pub use storage::{append_progress, get_progress_path, load_progress};
pub use types::{ProgressLog, ProgressRecord};
