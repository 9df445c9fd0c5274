//! Input validation for capability arguments
//!
//! A JSON-Schema subset engine with pluggable string formats. It has no
//! dependency on the registry and is shared by it for input checks.

pub mod error;
pub mod formats;
pub mod validator;

pub use error::{build_validation_error, codes, ValidationError};
pub use formats::{FormatFn, FormatRegistry};
pub use validator::{is_empty_value, InputValidator, InputValidatorBuilder};
