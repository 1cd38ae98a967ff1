//! Constellation validation
//!
//! Checks a graph's internal consistency before it is written back to the
//! store. Validators never mutate the graph and report every problem they
//! find in one pass.
//!
//! # Validators
//!
//! - [`OperationValidator`]: parent/child edit-intent compatibility
//! - [`HasOperationValidator`]: as above, and the root must carry an operation
//! - [`IdentifierValidator`]: id, version and ark shape
//! - [`ResourceRelationValidator`]: resource relations reference real resources
//!
//! # Example
//!
//! ```rust
//! use snac_model::{Constellation, NameEntry, Operation};
//! use snac_validation::ValidationEngine;
//!
//! let mut c = Constellation::new().with_operation(Operation::Insert);
//! let mut name = NameEntry::new("Smith, John", None);
//! name.meta.operation = Operation::Delete;
//! c.name_entries.push(name);
//!
//! let errors = ValidationEngine::with_defaults().validate(&c);
//! assert_eq!(errors.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod engine;
pub mod error;
pub mod identifier;
pub mod operation;
pub mod resource;
pub mod validator;
mod walk;

pub use engine::ValidationEngine;
pub use error::{ValidationError, ValidationFailure, ValidationResult};
pub use identifier::IdentifierValidator;
pub use operation::{HasOperationValidator, OperationValidator};
pub use resource::ResourceRelationValidator;
pub use validator::{ConstellationValidator, ValidatorKind};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
