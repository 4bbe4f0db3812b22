/// SQL text and statement-tree processing for the validation pipeline.
///
/// ```text
/// raw SQL (any dialect, host placeholders)
///       ↓
/// Dialect Normalizer      (normalizer.rs)
///       ↓
/// Statement parser        (parser.rs)
///       ↓
/// Placeholder Neutralizer (neutralizer.rs)
///       ↓
/// executable SQL → sandbox explain (validator.rs)
/// ```
///
/// `ddl.rs` turns harvested CREATE TABLE statements into table shapes for
/// the schema synthesizer.
pub mod ddl;
pub mod neutralizer;
pub mod normalizer;
pub mod parser;

pub use ddl::table_shape_from_create;
pub use neutralizer::{find_placeholders, neutralize, NeutralizeReport, PlaceholderKind};
pub use normalizer::{normalize, Normalizer, RewriteRule};
pub use parser::{parse_single, parse_sql};
