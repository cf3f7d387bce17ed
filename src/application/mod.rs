pub mod reservation_service;
pub mod sweep;
