mod ai;
mod common;
mod config;
mod storage;
mod ui;

use clap::Parser;
use dotenvy::dotenv;
use tokio::sync::mpsc;

use ai::{AiWorker, Gateway};
use storage::TripStore;
use ui::TripPlannerApp;

#[derive(Parser)]
#[command(
    name = "ai_trip_planner",
    version,
    about = "Trip planner with Gemini-powered suggestions and spot-finder chat"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), eframe::Error> {
    dotenv().ok();
    // Khởi tạo Logger để debug
    env_logger::init();

    let cli = Cli::parse();
    let app_config = config::load_config(&cli.config);

    if let Err(err) = storage::ensure_data_dir(&app_config.database_path) {
        log::warn!("Unable to create data directory: {err}");
    }
    let store = match TripStore::open(&app_config.database_path) {
        Ok(store) => store,
        Err(err) => {
            log::error!(
                "Failed to open trip store at {} ({err}); falling back to in-memory store",
                app_config.database_path
            );
            TripStore::in_memory().expect("in-memory store should always open")
        }
    };

    // Thiếu credential không phải là lỗi chết người: app vẫn chạy,
    // mọi tính năng AI chuyển sang trạng thái "unavailable".
    let gateway = match Gateway::from_env(&app_config.model) {
        Ok(gateway) => Some(gateway),
        Err(err) => {
            log::warn!("{err}");
            None
        }
    };
    let ai_available = gateway.is_some();

    // 1. Tạo các kênh giao tiếp (Channels)
    // UI -> AI worker
    let (cmd_tx, cmd_rx) = mpsc::channel(100);
    // AI worker -> UI
    let (event_tx, event_rx) = mpsc::channel(100);

    // 2. Khởi chạy AI worker (Chạy ngầm)
    tokio::spawn(async move {
        AiWorker::new(event_tx, cmd_rx, gateway).run().await;
    });

    // 3. Khởi chạy UI (Chạy trên Main Thread)
    let options = eframe::NativeOptions::default();
    let mut event_rx = Some(event_rx);
    let mut store = Some(store);

    eframe::run_native(
        "AI Trip Planner",
        options,
        Box::new(move |cc| {
            let event_receiver = event_rx
                .take()
                .expect("TripPlannerApp should only be initialized once");
            let store = store
                .take()
                .expect("TripPlannerApp should only be initialized once");

            log::info!("Client started (model: {})", app_config.model);

            Ok(Box::new(TripPlannerApp::new(
                cc,
                store,
                cmd_tx.clone(),
                event_receiver,
                ai_available,
            )))
        }),
    )
}
