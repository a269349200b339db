//! Chronos calendar server - integration test support.
//!
//! This crate re-exports the workspace crates to support integration tests
//! that use `chronos::` paths.

#![allow(ambiguous_glob_reexports)]

pub mod component {
    // Re-export core and service modules at the component level
    pub use chronos_core::*;
    pub use chronos_service::*;

    // Re-export the storage layer
    pub mod store {
        pub use chronos_db::store::*;
    }

    // Re-export models
    pub mod model {
        pub use chronos_db::model::*;
    }

    // Re-export app middleware and handlers
    pub mod middleware {
        pub use chronos_app::middleware::*;
    }

    // Re-export config from core
    pub mod config {
        pub use chronos_core::config::*;
    }
}

// Re-export top-level modules for convenience
pub mod app {
    pub use chronos_app::*;

    pub mod api {
        pub use chronos_app::app::api::*;
    }
}
