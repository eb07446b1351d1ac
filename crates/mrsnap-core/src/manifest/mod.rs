//! Manifest tree parsing
//!
//! `repo`-style manifests declare `<project name=.. path=..>` entries and may
//! pull in further manifest files through `<include name=..>`.

mod parser;

pub use parser::parse_manifest;
