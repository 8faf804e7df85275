//! Card generation: field resolution, pricing and template substitution.

mod fields;
mod generator;
mod pricing;

pub use fields::{CardField, CardFields, DEGREE_NOT_LISTED, UNKNOWN};
pub use generator::{CardError, CardGenerator, CardTemplate, GeneratedCard};
pub use pricing::{package_price, Package};
