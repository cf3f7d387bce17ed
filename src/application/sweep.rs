use std::time::Duration;

use actix_web::web;
use chrono::Utc;
use tokio::task::JoinHandle;

use super::reservation_service::ReservationService;
use crate::domain::ports::RentalRepository;

/// Periodically completes confirmed stays whose check-out day has arrived.
/// The first pass runs immediately.
pub fn spawn_completion_sweep<R: RentalRepository>(
    service: web::Data<ReservationService<R>>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let service = service.clone();
            let today = Utc::now().date_naive();
            match tokio::task::spawn_blocking(move || service.complete_finished_stays(today)).await
            {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => log::error!("Completion sweep failed: {}", e),
                Err(e) => log::error!("Completion sweep task aborted: {}", e),
            }
        }
    })
}
