//! mrsnap VCS - external tools and working-tree checkout
//!
//! Provides:
//! - `ExternalCommand` and the `ToolRunner` seam for the bulk sync tool and post steps
//! - `Vcs`, the per-project version-control operations, with the `GitCli` implementation
//! - `CheckoutDriver`, which moves one working tree to a commit with a single fetch retry
//!
//! Every invocation takes the working directory as an explicit parameter.
//! The process working directory is never changed.

pub mod checkout;
pub mod git;
pub mod process;

pub use checkout::CheckoutDriver;
pub use git::{GitCli, Vcs};
pub use process::{ExternalCommand, SystemRunner, ToolRunner};
