//! Domain layer: flight identity, seat snapshots, and the event log.
//!
//! This module contains the client-side domain model: the mirrored flight's
//! identity, the wholesale-replacement seat map, boundary-validated stream
//! events, and the bounded newest-first event log.

pub mod event;
pub mod event_log;
pub mod flight_id;
pub mod seat;

pub use event::{LogEntry, PaymentNotice, SeatConfirmation, SeatHold, StreamEvent};
pub use event_log::EventLog;
pub use flight_id::FlightId;
pub use seat::{SeatMap, SeatRecord};
