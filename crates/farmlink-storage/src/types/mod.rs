//! Type definitions for FarmLink storage.

mod ids;
mod plans;
mod resources;
mod tenants;

// Re-export all types from submodules
pub use ids::*;
pub use plans::*;
pub use resources::*;
pub use tenants::*;
