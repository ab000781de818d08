//! Client onboarding dashboard: normalizes spreadsheet rows into records,
//! filters and sorts them, and derives the indicators the dashboard shows.

pub mod aggregate;
pub mod catalog;
pub mod dates;
pub mod fields;
pub mod filter;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod report;
pub mod sort;
pub mod source;
pub mod status;
