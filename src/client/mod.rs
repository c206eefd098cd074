//! HTTP clients for the external backend services.

pub mod seats;

pub use seats::SeatClient;
