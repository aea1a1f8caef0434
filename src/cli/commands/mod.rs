//! Command implementations.

pub mod init;
pub mod lookup;
pub mod route;
pub mod sync;

pub use init::{run_config, run_init};
pub use lookup::run_lookup;
pub use route::run_route;
pub use sync::run_sync;
