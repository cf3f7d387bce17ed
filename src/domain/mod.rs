//! Booking rules shared by the HTTP service and the API client.

pub mod booking;
pub mod errors;
pub mod gate;
pub mod place;
pub mod ports;
pub mod pricing;
pub mod reservation;
