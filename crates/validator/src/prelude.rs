//! Prelude module for convenient imports.
//!
//! Provides a single `use verity_validator::prelude::*;` import that brings
//! in the types needed to declare rules, bind models and read results.

// ============================================================================
// FOUNDATION: Errors and values
// ============================================================================

pub use crate::foundation::{Attributes, ConfigError, Result};

// ============================================================================
// DECLARATIONS
// ============================================================================

pub use crate::message::{LabelFormatter, Labels};
pub use crate::rules::{Param, RuleDecl, RuleSpec, Validation};
pub use crate::validators::{Catalog, FnArgs, Outcome, ValidatorArgs};

// ============================================================================
// BINDING AND VALIDATION
// ============================================================================

pub use crate::bind::{Binding, Collection, View, bind};
pub use crate::config::{Options, configure};
pub use crate::controller::{Controller, InvalidAttrs, ValidityQuery};
pub use crate::events::ModelEvent;
pub use crate::model::{Model, Record};
pub use crate::render::{Render, RenderContext};
