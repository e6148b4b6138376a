mod app;
mod config;
mod dispatch;
mod event;
mod history;
mod interact;
mod layout;
mod responder;
mod speech;
mod theme;

use app::ChatJamApp;
use config::Config;
use dispatch::Dispatcher;
use eframe::egui;
use responder::Gateway;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("chatjam-runtime")
        .build()?;

    let (tx, channel) = dispatch::result_channel();
    let gateway = Arc::new(Gateway::new(config.clone()));
    let dispatcher = Dispatcher::new(gateway, tx, runtime.handle().clone());
    let app = ChatJamApp::new(channel, dispatcher, runtime.handle().clone(), &config);
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 600.0])
            .with_min_inner_size([480.0, 360.0])
            .with_title("ChatJam"),
        ..Default::default()
    };

    eframe::run_native(
        "ChatJam",
        native_options,
        Box::new(move |creation_context| {
            app.theme().apply_visuals(&creation_context.egui_ctx);
            Ok(Box::new(app))
        }),
    )?;

    Ok(())
}
