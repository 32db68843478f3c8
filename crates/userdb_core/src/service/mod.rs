//! Lifecycle controllers and the rules they share.
//!
//! # Responsibility
//! - Orchestrate repository calls into transactional use cases.
//! - Keep boundary adapters free of ownership and cascade rules.
//!
//! # Invariants
//! - Every public operation runs in exactly one unit of work.
//! - Validation failures surface before any write is issued.

pub mod account_service;
pub mod asset_factory;
pub mod cascade;
pub(crate) mod edges;
pub mod error;
pub mod ownership;
pub mod privilege_catalog;
pub mod product_service;
pub mod project_service;
mod unit_of_work;
