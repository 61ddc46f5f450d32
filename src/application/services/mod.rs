//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, Environment)
//! but are themselves concrete structs, not traits.

mod service_file;

pub use service_file::{ApplyReport, ServiceFileService};
