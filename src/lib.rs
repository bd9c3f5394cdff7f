//! lmtmon - Lustre OST telemetry agent library.
//!
//! This library provides the core functionality behind `lmtmond`:
//! - `collector` - OS and Lustre per-target counter probes over `/proc`
//! - `sampler` - stateful CPU differencing and the per-cycle record emitter
//! - `codec` - encoder/decoder for the v2 OST record wire format
//! - `model` - decoded record value types

pub mod codec;
pub mod collector;
pub mod model;
pub mod sampler;
