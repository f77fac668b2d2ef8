// src/main.rs
// Entry point: `multipendulum [COUNT] [DAMPING]`, then serves the simulator on MULTIPENDULUM_ADDR (default 127.0.0.1:8080).

use actix_files::Files; // Static page that plays frames back
use actix_web::{web, App, HttpServer};
use multipendulum::cli::parse_args;
use multipendulum::ui::{self, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "127.0.0.1:8080";

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let launch = parse_args(std::env::args().skip(1));
    let state = AppState {
        defaults: ui::launch_defaults(launch.segment_count, launch.damping),
    };
    let addr = std::env::var("MULTIPENDULUM_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());

    info!(
        segment_count = launch.segment_count,
        damping = launch.damping,
        %addr,
        "starting multipendulum server"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(ui::routes)
            .service(Files::new("/", "./static").index_file("index.html"))
    })
    .bind(addr)?
    .run()
    .await
}
