#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
pub mod context;
pub mod identity;

pub use context::{AlreadyAuthenticated, Authentication, AuthenticationDetails, SecurityContext};
pub use identity::{Identity, IdentityBuilder};
