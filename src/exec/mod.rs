//! External process execution

pub mod subprocess;

pub use subprocess::{CommandResult, InheritedRunner, PathLocator, ProcessRunner, ToolLocator};
