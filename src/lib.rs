//! Applies name mappings to compiled classes and jars.
//!
//! The heavy lifting lives in two companion crates: `spool` knows the
//! class file format, `weft` knows mappings and remappers. This crate
//! ties them together: [`rewrite_class`] rewrites every symbolic
//! reference in a class through a [`weft::remapper::MemberRemapper`]
//! (with optional access widening and mixin annotation handling), and
//! [`jar::rewrite_jar`] does the same for every class in a jar. The
//! [`loader`] module provides the class path access that inheritance
//! walking needs.

mod mixin;

pub mod rewrite;
pub mod loader;
pub mod jar;

pub use rewrite::{rewrite_class, RewriteOptions};
