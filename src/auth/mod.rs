//! Authentication: form validation, account payloads, and the session state machine.

pub mod context;
pub mod types;
pub mod validation;

pub use context::{AuthContext, AuthState, AuthStatus};
pub use types::{Credentials, LoginResponse, Registration};
pub use validation::ValidationErrors;
