//! mdconf Test - Shared test utilities for the mdconf crates.
//!
//! This crate provides temporary configuration files, test logging and
//! sample server configurations for use as a dev-dependency.
//!
//! # Usage
//!
//! ```rust,ignore
//! use mdconf_test::{TestContext, SECTION_SCENARIO};
//!
//! #[test]
//! fn loads_sample() {
//!     let ctx = TestContext::new();
//!     let path = ctx.create_file("httpd.conf", SECTION_SCENARIO);
//!     let resolved = mdconf_config::load(&path, Some(ctx.path())).unwrap();
//!     assert_eq!(resolved.domains().len(), 1);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod fixtures;
pub mod harness;

pub use fixtures::*;
pub use harness::*;
