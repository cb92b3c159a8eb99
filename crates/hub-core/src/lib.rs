//! # Hub Core
//!
//! Core logic for the nurse-call integration hub.
//!
//! This crate contains the stateful, invariant-bearing parts of the pipeline:
//! - [`ClinicalRequestEvent`]: the normalized request shape both synthesizers fold into
//! - [`AggregationStore`]: a bounded, lock-guarded history of recent requests plus connector and
//!   hospital records, with derived metrics recomputed on every mutation
//! - [`ConnectorStatusSimulator`] and [`RequestFeed`]: the drivers that perturb and feed the store
//! - [`persist`]: saving and restoring the connector/hospital lists
//!
//! **No scheduling and no API concerns**: timers, HTTP and CLI surfaces belong in `hub-run`,
//! `api-rest` and `hub-cli`. Nothing here reads environment variables.

pub mod config;
pub mod connector;
pub mod constants;
pub mod error;
pub mod feed;
pub mod persist;
pub mod request;
pub mod simulator;
pub mod store;

pub use config::CoreConfig;
pub use connector::{ConnectorRecord, ConnectorUpdate, HospitalRecord};
pub use constants::{DEFAULT_REQUEST_CAPACITY, TRIMMED_REQUEST_CAPACITY};
pub use error::{HubError, HubResult};
pub use feed::RequestFeed;
pub use persist::PersistedState;
pub use request::ClinicalRequestEvent;
pub use simulator::ConnectorStatusSimulator;
pub use store::{AggregationMetrics, AggregationStore, StoreSnapshot};
