pub mod browser;
pub mod theme;

pub use browser::*;
pub use theme::*;
