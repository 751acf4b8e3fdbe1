//! # FieldOps Rust Backend
//!
//! Work-order scheduling engine for field-service operations.
//!
//! This crate provides the scheduling subsystem of the FieldOps platform:
//! converting labor-hour estimates into multi-day timelines, tracking
//! day-by-day availability of crew members and equipment, recording
//! resource conflicts, and searching a bounded future window for the
//! earliest feasible start date. The subsystem exposes a REST API via
//! Axum for the dispatch frontend.
//!
//! ## Features
//!
//! - **Timeline Calculation**: Hour estimates to work days, buffer days, and
//!   per-day hour allocations
//! - **Resource Calendar**: Per-resource, per-day availability with range
//!   writes and default-open point reads
//! - **Conflict Detection**: Advisory scans of schedules against the calendar
//! - **Optimal-Date Search**: Bounded first-fit search for a feasible start
//! - **HTTP API**: RESTful endpoints plus an SSE change-event feed
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Domain model types shared across layers
//! - [`db`]: Repository pattern and persistence layer
//! - [`services`]: Scheduling business logic (timeline, calendar, conflicts,
//!   schedule management, date search)
//! - [`http`]: Axum-based HTTP server and request handlers

pub mod api;

pub mod db;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
