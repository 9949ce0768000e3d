//! Core library: taxonomy parsing, model catalog, search, comparison, bulk load.

pub mod catalog;
pub mod compare;
pub mod config;
pub mod models;
pub mod populate;
pub mod search;
pub mod taxonomy;
