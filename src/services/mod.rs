pub mod controller;
pub mod extractor;
pub mod niche_store;
pub mod orchestrator;
pub mod pacing;
pub mod regions;
pub mod session;
pub mod sink;

pub use controller::*;
pub use niche_store::*;
pub use orchestrator::*;
pub use pacing::*;
pub use regions::*;
pub use session::*;
