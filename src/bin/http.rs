#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use habit_streaks::{TrackerConfig, http_api};
    use tracing_subscriber::EnvFilter;

    let config = match std::env::args().nth(1) {
        Some(path) => TrackerConfig::load(path)?.with_env_overrides(|key| std::env::var(key).ok()),
        None => TrackerConfig::from_env(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .init();

    let addr = config.socket_addr()?;
    let state = build_state(&config)?;
    println!("habit tracker HTTP API listening on http://{addr}");
    http_api::serve(addr, state).await?;
    Ok(())
}

#[cfg(all(feature = "http_api", feature = "sqlite"))]
fn build_state(
    config: &habit_streaks::TrackerConfig,
) -> Result<habit_streaks::http_api::AppState, Box<dyn std::error::Error>> {
    use habit_streaks::http_api::AppState;
    use habit_streaks::{HabitStore, SqliteHabitStore, Tracker};
    use std::sync::Arc;

    let Some(path) = &config.database_path else {
        return Ok(AppState::new(Tracker::new()));
    };
    let store = SqliteHabitStore::new(path)?;
    let tracker = store.load_tracker()?.unwrap_or_default();
    tracing::info!(path = %path.display(), habits = tracker.len(), "loaded habits from sqlite");
    Ok(AppState::with_store(tracker, Arc::new(store)))
}

#[cfg(all(feature = "http_api", not(feature = "sqlite")))]
fn build_state(
    config: &habit_streaks::TrackerConfig,
) -> Result<habit_streaks::http_api::AppState, Box<dyn std::error::Error>> {
    if let Some(path) = &config.database_path {
        return Err(format!(
            "database_path {} is set but sqlite support is not compiled in",
            path.display()
        )
        .into());
    }
    Ok(habit_streaks::http_api::AppState::new(habit_streaks::Tracker::new()))
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
