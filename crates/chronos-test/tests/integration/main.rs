//! HTTP-level integration tests against an in-process service.


mod auth;
mod events;
mod recurrence;
mod regional;
mod sharing;
