//! Certification Eligibility Engine for healthcare professionals
//!
//! This crate decides whether a physician has accumulated enough qualifying
//! work to sit a specialty certification exam. It merges employment links
//! across simultaneous establishments into a deduplicated month-by-month
//! coverage timeline, classifies each month into a weekly-hour tier, and
//! counts full semesters per tier against the required total.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod models;
