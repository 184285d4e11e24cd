//! # vh-core
//!
//! Core types and error types for VenueHub.
//!
//! This crate provides the foundational types shared across all VenueHub crates:
//! - Entity structs for all domain objects (permissions, vendors, rooms, etc.)
//! - Request payloads accepted by the controllers
//! - Enums for sorting, archive filtering, cloning and questionnaire state
//! - Pagination math and the `{message, data}` response envelope
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod pagination;
pub mod requests;
pub mod responses;
