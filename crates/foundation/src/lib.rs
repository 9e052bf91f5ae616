pub mod camera;
pub mod geo;

// Foundation crate: small, well-tested primitives only.
pub use camera::*;
pub use geo::*;
