//! Request handlers

pub mod admin;
pub mod keywords;
pub mod metrics;
pub mod places;
pub mod search;
