//! askdb - ask a PostgreSQL database questions in plain English.
//!
//! A question is translated into a statement by a language model, checked by
//! the guard, executed, and the rows are rendered as text.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod safety;
pub mod translator;
pub mod web;
