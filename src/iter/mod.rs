mod channel;
mod func;

pub use channel::{IterChParams, RecordStream};
