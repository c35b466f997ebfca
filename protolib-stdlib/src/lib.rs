//! Protolib operation library
//!
//! This crate provides the operations Protolib attaches to strings, lists,
//! maps and error values, the registry that names them, and the installer
//! that binds them onto shared prototypes.
//!
//! Each group is usable directly through its extension trait:
//!
//! ```
//! use protolib_stdlib::StrExt;
//!
//! assert_eq!("a/b|c".arr(None), vec!["a", "b", "c"]);
//! ```
//!
//! or dynamically, after installation, through [`Invoke`]:
//!
//! ```
//! use protolib_core::Value;
//! use protolib_stdlib::{Installer, Invoke};
//!
//! Installer::new().unwrap().install(&["string"]);
//! let mut s = Value::from("hello world");
//! assert_eq!(s.invoke("tc", &[]).unwrap(), Value::from("Hello World"));
//! ```

mod args;

pub mod arrays;
pub mod config;
pub mod errors;
pub mod installer;
pub mod objects;
pub mod paths;
pub mod prototype;
pub mod registry;
pub mod strings;

pub use arrays::ArrayExt;
pub use config::ProtolibConfig;
pub use errors::ErrorExt;
pub use installer::Installer;
pub use objects::ObjectExt;
pub use paths::{ListOptions, PathExt};
pub use prototype::{InstalledMarker, Invoke, Prototype, Prototypes};
pub use registry::{Operation, OperationFn, Registry};
pub use strings::{Fallback, Pattern, StrExt};
