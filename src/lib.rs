//! DikiTivi - backend for the DikiTivi media streaming and publishing platform
//!
//! This library provides the core functionality for the DikiTivi backend,
//! including database operations, FlexPay payment gateway integration,
//! SMS notifications and API handlers.

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod payments;
pub mod reference;
pub mod sms;
