//! Simulation of cold starts and request losses in a FaaS platform with bounded memory.
//!
//! The platform keeps at most `M` functions in memory. A request for a loaded idle function is served
//! immediately, a request for an unloaded function triggers a cold start that evicts the function idle for
//! the longest time, and a request is lost if its function is already executing or if all `M` slots are busy
//! executing. Requests of all functions arrive as one Poisson stream and are attributed to functions by their
//! popularity; cold start and service times are exponential.
//!
//! A run is built with [`simulation::CapacitySimulation::new`] from a [`config::Config`] and a
//! [`function::FunctionTable`] (see [`trace`] for loading one from a CSV trace), and executed with
//! [`simulation::CapacitySimulation::run`]. Use [`parallel`] to sweep capacities and trials and [`stats`] to
//! aggregate the results.

pub mod config;
pub mod error;
pub mod event;
pub mod function;
pub mod generator;
pub mod metrics;
pub mod parallel;
pub mod platform;
pub mod report;
pub mod request;
pub mod simulation;
pub mod slots;
pub mod stats;
pub mod trace;
