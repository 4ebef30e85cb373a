//! Weekly shift coverage planning
//!
//! An organizer publishes the hours that must be staffed on each day,
//! participants submit when they are available, and the allocators in
//! [`schedule`] turn both into shift assignments. Everything under
//! `schedule` is pure; [`parser`], [`form`], [`display`] and [`web`] are the
//! storage and presentation layers around it.

pub mod config;
pub mod display;
pub mod error;
pub mod form;
pub mod parser;
pub mod schedule;
pub mod web;

pub use error::{Result, ScheduleError};
