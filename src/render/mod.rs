//! Rendering module: fragment normalization, serialization and output records.

mod json;
mod math;
mod normalize;
mod serialize;

pub use json::{
    append_record, read_records, to_json, to_json_line, EndnotesRecord, JsonFormat, PagesRecord,
    PositionsRecord,
};
pub use math::{delimit_equations, strip_math_line_breaks, EquationMap};
pub use normalize::{strip_attributes, unify_whitespace, ContentNormalizer, UNICODE_SPACES};
pub use serialize::{open_tag, serialize, serialize_children};
