//! tau - the thruster arrangement utility.
//!
//! Facade over the workspace crates so front-ends (CLI, plotting, future
//! GUIs) share one dependency. The core pipeline lives in
//! [`envelope`]; see that crate for the per-direction solver chain.

pub use tau_config as config;
pub use tau_core as math;
pub use tau_envelope as envelope;
pub use tau_export as export;
pub use tau_lp as lp;
pub use tau_thruster as thruster;

/// Returns the version of the library for smoke tests while scaffolding.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
