pub mod recorder;

pub use recorder::{ActionRecorder, DelayMode, RecordOptions};
