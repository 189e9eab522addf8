//! Systems - logic that operates on components

mod behavior;
mod lifecycle;
mod movement;
mod shake;
mod spawner;

pub use behavior::*;
pub use lifecycle::*;
pub use movement::*;
pub use shake::*;
pub use spawner::*;
