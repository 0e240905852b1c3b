mod cursor;
mod recorder;

pub use cursor::{CursorPage, Cursored};
pub use recorder::ActivityRecorder;
