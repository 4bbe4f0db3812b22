//! Column type resolution.
//!
//! Raw declared types harvested from unrelated repositories are resolved into
//! a canonical spelling and a closed [`BaseCategory`], which in turn decides
//! the sandbox column type and the seed literal for synthesized tables.
pub mod category;
pub mod semantic;
pub mod unify;

pub use category::BaseCategory;
pub use semantic::{classify_column, SemanticType};
pub use unify::{unify_optional, unify_type, UnifiedType};
