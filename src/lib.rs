//! ETM API - backend for esports event and team management
//!
//! This crate provides the REST API for ETM:
//! - Users, teams and events with role-based access
//! - Event ↔ team links and users' favourite events
//! - An append-only audit log of every mutation

pub mod audit;
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
