//! # ams-mirror
//!
//! Live seat-map mirroring client for the AMS airline operations backend.
//!
//! The mirror consumes two external collaborators: the Seat Query Service
//! (`GET /flights/{id}/seats`) and the Event Stream Service (a persistent
//! WebSocket at `/ws` pushing JSON event frames). It keeps a local replica of
//! one flight's seat map plus a bounded, newest-first log of every event that
//! arrives, and re-fetches the seat snapshot whenever a seat-affecting event
//! comes in.
//!
//! ## Architecture
//!
//! ```text
//! Seat Query Service (HTTP)     Event Stream Service (WS)
//!     │                             │
//!     ├── SeatClient (client/)      ├── run_stream (stream/)
//!     │                             │     frames → EventLog
//!     ├── SeatRefresher (service/) ◄┘     seat* events → refresh request
//!     │     single-flight fetches
//!     │
//!     └── SharedState (state.rs)
//!           SeatMap + EventLog + ConnectionStatus
//! ```
//!
//! All seat snapshot fetches are funnelled through the refresher worker, so a
//! stale in-flight response can never overwrite a newer one. Stream drops
//! reconnect with exponential backoff, and every successful connect requests
//! one resynchronizing fetch.

pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod mirror;
pub mod service;
pub mod shutdown;
pub mod state;
pub mod stream;
