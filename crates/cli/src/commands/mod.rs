pub mod cache;
pub mod fields;
pub mod form;
pub mod records;
pub mod schema;
