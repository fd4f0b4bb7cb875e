pub mod config;
pub mod outline;
pub mod task;
pub mod workspace;

pub use config::*;
pub use outline::*;
pub use task::*;
pub use workspace::*;
