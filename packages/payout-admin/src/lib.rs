//! # Payout Fee Admin
//!
//! Staff-facing service for the payout fee schedule. Stores the seven fee
//! settings, validates edits at the write boundary, previews fees with the
//! `payout-fees` calculator, and cross-checks the calculation mirrored in the
//! hosted database.
//!
//! ## Endpoints
//! - `GET /health` - Liveness with basic counters
//! - `GET /metrics` - Prometheus metrics
//! - `GET /admin/payout-fees` - Stored settings, parsed and mirrored schedule
//! - `POST /admin/payout-fees` - Update one setting (`{key, value}`)
//! - `GET /admin/payout-fees/preview?method=&amount_cents=` - Fee breakdown
//! - `GET /admin/payout-fees/describe` - Policy text per method
//! - `GET /admin/payout-fees/reconcile` - Compare against the mirrored calculation

pub mod config;
mod error;
mod handlers;
pub mod metrics;
mod middleware;
pub mod mirror;
mod response;
mod router;
mod state;
pub mod store;

pub use config::Config;
pub use error::Error;
pub use router::create as create_router;
pub use state::AppState;
