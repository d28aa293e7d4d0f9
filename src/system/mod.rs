pub mod reset;

pub use reset::{RecordedRestart, Restart};
