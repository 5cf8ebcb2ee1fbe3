//! Web API module for the portal backend.

pub mod announcements;
pub mod auth;
pub mod circulars;
pub mod context;
pub mod cron;
pub mod error;
pub mod grades;
pub mod home;
pub mod incidents;
pub mod middleware;
pub mod push;
pub mod routes;
pub mod schedule;
pub mod status;
pub mod tasks;

pub use routes::*;
