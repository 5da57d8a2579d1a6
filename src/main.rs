use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flashdeck::{config, db, handlers, state::AppState};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "flashdeck=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let db_path = config::load_database_path();
  let pool = db::init_db(&db_path).expect("Failed to initialize database");

  {
    // Aggregates may be stale relative to due dates that passed while the
    // service was down
    let mut conn = db::try_lock(&pool).expect("Database lock failed during startup");
    if let Err(e) = db::recalculate_all(&mut conn) {
      tracing::warn!("Failed to refresh deck statistics: {}", e);
    }
  }

  let app = handlers::router(AppState::new(pool));

  let bind_addr = config::server_bind_addr();
  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Server running on http://localhost:{}", config::SERVER_PORT);

  axum::serve(listener, app)
    .await
    .expect("Server failed to start");
}
