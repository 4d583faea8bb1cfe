// Request handling module
// Resolves request paths against the asset store

pub mod resolver;

pub use resolver::{resolve, Resolution};
