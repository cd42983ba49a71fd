//! # strata_vars
//!
//! Variable schemas and resolution for Strata blueprints.
//!
//! Every blueprint declares an ordered [`VariableSchema`]. Caller-supplied
//! values are resolved against it once per render:
//!
//! - unknown names are rejected
//! - required variables must be present
//! - defaults fill in the rest
//! - every value is coerced to its declared type
//!
//! The result is an immutable [`ResolvedVariables`] with typed accessors.
//!
//! ## Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use serde_json::json;
//! use strata_vars::{VariableSchema, VariableType};
//!
//! let schema = VariableSchema::new()
//!     .required("ServiceName", VariableType::String, "A simple name for the service.")
//!     .optional("Count", VariableType::Integer, json!(1), "Number of tasks.");
//!
//! let mut provided = BTreeMap::new();
//! provided.insert("ServiceName".to_string(), json!("worker"));
//!
//! let vars = schema.resolve(&provided).unwrap();
//! assert_eq!(vars.str("ServiceName").unwrap(), "worker");
//! assert_eq!(vars.int("Count").unwrap(), 1);
//! ```

pub mod error;
pub mod resolved;
pub mod schema;
pub mod types;

pub use error::{VarsError, VarsResult};
pub use resolved::ResolvedVariables;
pub use schema::{DefaultValue, VariableDef, VariableSchema};
pub use types::{ResourceLiteral, ResourceShape, VarValue, VariableType};
