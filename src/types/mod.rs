pub mod chart;
pub mod indicators;
pub mod levels;
pub mod patterns;
pub mod signals;

pub use chart::*;
pub use indicators::*;
pub use levels::*;
pub use patterns::*;
pub use signals::*;
