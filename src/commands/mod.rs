//! Command implementations for the exprlib CLI

pub mod check;
pub mod completions;
pub mod create;
pub mod delete;
pub mod deploy;
pub mod helpers;
pub mod list;
pub mod show;
pub mod update;
pub mod validate_slug;
pub mod version;
