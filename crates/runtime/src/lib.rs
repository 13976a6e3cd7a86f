pub mod debounce;
pub mod readiness;

pub use debounce::*;
pub use readiness::*;
