//! Data models for the PeopleSearch application.
//!
//! These models match the JSON shapes the browser client consumes.

mod image;
mod person;

pub use image::*;
pub use person::*;
