//! Rule declarations, normalization and dependency tracking

pub mod dependencies;
pub mod normalize;
pub mod spec;

pub use dependencies::dependencies_of;
pub use normalize::{Rule, normalize, rules_for};
pub use spec::{
    CustomFn, Param, ParamFn, PlaceholderFn, Placeholders, RuleDecl, RuleSpec, Validation,
};
