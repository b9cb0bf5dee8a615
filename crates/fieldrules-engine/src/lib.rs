//! fieldrules engine
//!
//! Declarative, prioritized transformation and validation rules for
//! individual record fields.
//!
//! Rules are defined in JSON or YAML and specify:
//! - The field they apply to and their priority (lower runs first)
//! - An optional condition (null checks, string tests, patterns, ranges)
//! - An action (categorize, transform, mask, validate, format, replace)
//!
//! The active rule set can be reloaded while the engine is in use.

pub mod action;
pub mod appliers;
pub mod condition;
pub mod engine;
pub mod executor;
pub mod rule;
pub mod store;

pub use action::{
    FormatAction, MaskAction, MaskType, OnInvalid, ReplaceAction, RuleAction, RuleKind,
    TransformOp, ValidateAction,
};
pub use condition::{Operator, RuleCondition};
pub use engine::RuleEngine;
pub use executor::ChainExecutor;
pub use rule::{Rule, RuleConfiguration, RuleDefinition};
pub use store::{FileRuleSource, ReloadSummary, RuleSet, RuleSource, StaticRuleSource};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::action::{RuleAction, RuleKind};
    pub use crate::condition::{Operator, RuleCondition};
    pub use crate::engine::RuleEngine;
    pub use crate::rule::{Rule, RuleConfiguration};
    pub use crate::store::{FileRuleSource, RuleSet, RuleSource, StaticRuleSource};
}
