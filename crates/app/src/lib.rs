//! # wirehome-app
//!
//! Application layer — the message bus, the registries and **port
//! definitions** (traits).
//!
//! ## Responsibilities
//! - Define the **storage port** that the JSON-tree adapter implements
//! - Host the in-process [`message_bus::MessageBus`] — filter subscriptions,
//!   bounded history ring, long-poll wait
//! - Host the canonical registries: [`services::ComponentRegistry`] and
//!   [`services::ComponentGroupRegistry`], which persist through the storage
//!   port and publish every committed mutation on the bus
//! - Diagnostics (operations-per-second counters), system status gauges and
//!   the process-wide cancellation token
//!
//! ## Dependency rule
//! Depends on `wirehome-domain` only.
//! Never imports adapter crates. Adapters depend on *this* crate, not the
//! reverse.

pub mod diagnostics;
pub mod message_bus;
pub mod ports;
pub mod services;
pub mod shutdown;
pub mod system_status;

#[cfg(test)]
pub(crate) mod testing;
