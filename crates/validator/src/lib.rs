//! # verity-validator
//!
//! Declarative attribute validation for observable data models.
//!
//! A model declares rules per attribute; a bound [`Controller`](controller::Controller)
//! validates changes incrementally, tells the view which attributes became
//! valid or invalid, and publishes summary events once the pass is over.
//!
//! ## Quick Start
//!
//! ```
//! use serde_json::json;
//! use verity_validator::prelude::*;
//!
//! let user = Record::from_json(&json!({"name": "", "email": "ada@example.com"}))
//!     .unwrap()
//!     .with_validation(
//!         Validation::new()
//!             .attr("name", RuleDecl::validator("required", true))
//!             .attr("email", RuleDecl::new().with("required", true).with("pattern", "email")),
//!     );
//!
//! let binding = bind(&View::new().with_model(user), Options::new()).unwrap();
//! let controller = binding.controller().unwrap();
//!
//! let invalid = controller.validate(None, &Options::new()).unwrap();
//! assert_eq!(invalid.unwrap()["name"], "Name is required");
//! assert!(controller.is_valid("email").unwrap());
//! ```
//!
//! ## Declaring rules
//!
//! Rules are declared with [`Validation`](rules::Validation) and
//! [`RuleDecl`](rules::RuleDecl), or loaded from JSON with
//! [`Validation::from_json`](rules::Validation::from_json). A rule object
//! may carry several validators, a custom `msg` with `{0}`-style
//! placeholders, a `depends` list and `labelPlaceholders`.
//!
//! ## Built-in validators
//!
//! `required`, `acceptance`, `min`, `max`, `range`, `length`, `minLength`,
//! `maxLength`, `rangeLength`, `oneOf`, `equalTo`, `pattern` and `fn`. See
//! [`validators`] for their semantics and [`Catalog`](validators::Catalog)
//! for registering more.

// Declaration closures are stored as `Arc<dyn Fn(..)>`; their signatures are
// spelled out once as type aliases in `rules::spec`.
#![allow(clippy::type_complexity)]

pub mod bind;
pub mod config;
pub mod controller;
pub mod evaluate;
pub mod events;
pub mod foundation;
pub mod message;
pub mod model;
pub mod prelude;
pub mod queue;
pub mod render;
pub mod rules;
pub mod testing;
pub mod validators;
