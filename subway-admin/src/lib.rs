//! Subway admin server.
//!
//! A JSON service for managing subway stations and lines, and the ordered
//! sequence of stations each line serves.

pub mod config;
pub mod domain;
pub mod store;
pub mod web;
