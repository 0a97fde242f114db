pub mod change_logger;

pub use change_logger::*;
