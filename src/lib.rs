//! # Krua Ledger
//!
//! Purchase and expense ledger core for a Thai restaurant point of sale.
//! Parses Thai-language commands, resolves ingredient and menu names with
//! fuzzy matching, guards against duplicate entries, and keeps an
//! append-only transaction log with derived stock and cost figures.

pub mod cache;
pub mod command_parser;
pub mod cost_engine;
pub mod duplicate_guard;
pub mod errors;
pub mod expense_categorizer;
pub mod localization;
pub mod model;
pub mod orchestrator;
pub mod resolver;
pub mod similarity;
pub mod store;
pub mod units;
