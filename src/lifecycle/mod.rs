//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Initialize subsystems → Spawn refresher → Serve API
//!
//! Shutdown (shutdown.rs):
//!     Ctrl-C received → Broadcast → Refresher exits, API drains → Exit
//! ```

pub mod shutdown;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::Components;
