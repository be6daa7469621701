//! cgpa-core - Credit-weighted GPA engine and arrear reconciliation.
//!
//! This crate defines the grade scale, the averaging engine, the subject
//! catalog and the per-session store that keeps semester and cumulative
//! averages consistent as arrears are added, moved or removed.

pub mod averaging;
pub mod catalog;
pub mod config;
pub mod error;
pub mod grade;
pub mod model;
pub mod report;
pub mod session;
pub mod sheet;
pub mod store;
