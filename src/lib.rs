//! # CLOSURE-DEPS
//!
//! Fast `goog.provide` / `goog.require` dependency extraction for
//! Closure-style JavaScript codebases.
//!
//! ## Components
//!
//! - **Extractor** ([`parsers::Source`]): tokenizes a file and records the
//!   namespaces it provides and requires, whether it is a `goog.module`,
//!   and the implicit `goog` namespace of the `@provideGoog` base file.
//!   Files marked with `goog.setTestOnly(...)` contribute no declarations.
//! - **Cache** ([`parsers::SourceCache`]): a JSON file mapping paths to
//!   extracted records, trusted only while the file's mtime is unchanged.
//! - **Analyzer** ([`core::DependencyAnalyzer`]): walks an input tree and
//!   ties the two together.

pub mod core;
pub mod parsers;
