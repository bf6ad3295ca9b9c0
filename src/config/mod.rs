//! Configuration management for Kitchen
//!
//! A single TOML file configures the HTTP listener, the symbol table and
//! bundle cache, the compiler endpoint, the documentation proxy and the
//! shared cache. See [`global`] for the file format and lookup order.

pub mod global;

pub use global::{
    CacheSection, CompilerSection, DepsSection, DocsSection, KitchenConfig, SamplesSection,
    ServerSection,
};
