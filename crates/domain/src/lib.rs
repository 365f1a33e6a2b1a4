//! # wirehome-domain
//!
//! Pure domain model for the Wirehome Core home automation hub.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, timestamps
//! - Define **Components** (controllable devices or logical units with
//!   settings, status readings and a disk-loaded configuration)
//! - Define **Component Groups** (named collections of components and macros
//!   with per-membership association settings)
//! - Define **Bus Messages** (immutable JSON-shaped records routed by `type`)
//!   and **Message Filters** (required key/value equalities)
//! - Define **Notifications** (user-facing messages surfaced over HTTP)
//! - Package uid parsing for the script host's repository proxy
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod component;
pub mod component_group;
pub mod event;
pub mod message;
pub mod notification;
pub mod package;
