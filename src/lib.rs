//! Backend for a student/family portal over the Educamos school platform.
//!
//! A headless-browser login captures a session cookie, the upstream gateway
//! replays it against the platform's JSON and HTML endpoints, and the parse
//! layer normalizes whatever comes back into stable English-named records
//! served over a small axum API. An optional document store carries push
//! subscriptions and scheduled homework reminders.

pub mod app;
pub mod cli;
pub mod config;
pub mod educamos;
pub mod logging;
pub mod models;
pub mod notify;
pub mod parse;
pub mod state;
pub mod store;
pub mod web;
