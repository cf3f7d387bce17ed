pub mod memory_repo;
pub mod models;
pub mod rental_repo;
