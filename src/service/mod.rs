pub mod core;


// Re-export the primary types so `crate::service::*` paths stay short.
pub use core::{
    GrantOutcome, MostShared, ResourceWarning, RevokeOutcome, VisibilityOutcome,
    VisibilityService, VisibilityStats,
};
