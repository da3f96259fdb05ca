// src/main.rs
//
// Demo driver: logs in, pumps the session event into the store, and
// renders the dashboard counts, the current user's tasks and the board
// lanes once. Uses the HTTP adapter when BACKEND_URL is set, the seeded
// in-memory adapter otherwise.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use env_logger::Env;
use log::{info, warn};

use taskpilot::board::{BoardColumns, Lane};
use taskpilot::config::Config;
use taskpilot::dashboard::status_counts;
use taskpilot::memory::InMemoryStore;
use taskpilot::remote::RemoteStore;
use taskpilot::store::TaskStore;
use taskpilot::supabase::SupabaseStore;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    let remote: Arc<dyn RemoteStore> = match &config.backend_url {
        Some(url) => {
            info!("using backend at {}", url);
            let supabase = Arc::new(SupabaseStore::new(url, &config.backend_api_key));
            supabase.spawn_change_poller(Duration::from_secs(config.poll_interval_secs));
            supabase
        }
        None => {
            info!("no BACKEND_URL set, using built-in demo data");
            Arc::new(InMemoryStore::with_demo_data())
        }
    };

    let mut session_events = remote.session_events();
    let mut store = TaskStore::new(remote);

    let email = env::var("DEMO_EMAIL").unwrap_or_else(|_| "alice@example.com".to_string());
    let password = env::var("DEMO_PASSWORD").unwrap_or_else(|_| "password".to_string());

    match store.login(&email, &password).await {
        Ok(true) => {}
        Ok(false) => {
            warn!("invalid credentials for {}", email);
            return;
        }
        Err(e) => {
            warn!("login error: {}", e);
            return;
        }
    }

    match session_events.recv().await {
        Ok(event) => store.handle_session_event(event).await,
        Err(e) => {
            warn!("session event channel closed: {}", e);
            return;
        }
    }

    let current_user = match store.current_user() {
        Some(user) => user.clone(),
        None => {
            warn!("no profile loaded for {}", email);
            return;
        }
    };
    println!("Signed in as {} ({})", current_user.name, current_user.initials);

    let counts = status_counts(store.tasks());
    println!(
        "Tasks: {} total — {} to do, {} in progress, {} done",
        counts.total(),
        counts.to_do,
        counts.in_progress,
        counts.done
    );

    println!("\nMy tasks:");
    for task in store.tasks_for_user(&current_user.id) {
        let due = task
            .due_date
            .map(|d| d.date_naive().to_string())
            .unwrap_or_default();
        println!(
            "  [{}] {} ({}) {}",
            task.status.as_str(),
            task.title,
            task.priority.as_str(),
            due
        );
    }

    let columns = BoardColumns::from_store(&store);
    println!("\nBoard:");
    for lane in Lane::ALL {
        println!(
            "  {}: {} cards",
            lane.status().as_str(),
            columns.lane(lane).len()
        );
    }
}
