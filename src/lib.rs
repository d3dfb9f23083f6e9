//! Submission grader
//!
//! Core of an asynchronous grading system for student code submissions: a
//! worker polls pending submissions, runs each one through an external
//! evaluator process, and records a pass/fail verdict with a score.

pub mod app_state;
pub mod config;
pub mod db;
pub mod models;
pub mod routes;
pub mod services;
pub mod shutdown;
