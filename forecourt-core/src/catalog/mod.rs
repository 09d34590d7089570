//! Session state exposed to the rendering layer.

pub mod generation;
pub mod session;

pub use generation::{GenerationCounter, GenerationGuard};
pub use session::{CatalogSession, PageState, SessionStatus, StalePage};
