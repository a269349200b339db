pub mod access;
pub mod auth;
pub mod calendar;
pub mod error;
pub mod event;
pub mod recurrence;
pub mod regional;
pub mod reminder;
pub mod user;
