use std::io;

use actix_web::web;
use dotenvy::dotenv;
use rental_service::application::reservation_service::ReservationService;
use rental_service::application::sweep::spawn_completion_sweep;
use rental_service::config::Config;
use rental_service::infrastructure::rental_repo::DieselRentalRepository;
use rental_service::{build_server, create_pool, run_migrations};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let pool = create_pool(&config.database_url).map_err(io::Error::other)?;
    run_migrations(&pool).map_err(io::Error::other)?;

    let service = web::Data::new(ReservationService::new(DieselRentalRepository::new(pool)));
    spawn_completion_sweep(service.clone(), config.completion_sweep);

    log::info!("Starting server at http://{}:{}", config.host, config.port);
    log::info!(
        "API docs at http://{}:{}/swagger-ui/",
        config.host,
        config.port
    );

    build_server(service, &config.host, config.port)?.await
}
