//! Operations over mappings. Each returns a fresh [`Mappings`] value
//! and preserves the input order of classes and members.
//!
//! [`Mappings`]: crate::tree::mappings::Mappings

mod project;
mod rename;
mod classes;
mod join;

pub use join::join_all;
