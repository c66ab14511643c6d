pub mod bbdown;
pub mod cmd;
pub mod config;
mod error;
pub mod paths;
pub mod stream_list;

pub use error::{EngineError, Result};
pub use stream_list::{parse_stream_list, StreamRecord};
