pub mod generator;

pub use generator::{DottedName, Namespace, QueryText};
