use std::{env, error::Error};

use lodestone::{
    config::{LodestoneConfig, LodestoneConfigLoadError},
    logging::LodestoneLogger,
    server::Lodestone,
    telemetry::init_meter,
    utils::leak,
};
use tokio::sync::broadcast;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let _ = dotenvy::dotenv();
    #[cfg(debug_assertions)]
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .parse_default_env()
        .init();
    #[cfg(not(debug_assertions))]
    env_logger::init();

    let provider = if dotenvy::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_ok() {
        match init_meter() {
            Ok(provider) => Some(provider),
            Err(e) => {
                log::warn!("Metrics exporter disabled: {e}");
                None
            }
        }
    } else {
        None
    };

    let config_file = env::current_dir()?.join("settings.toml");

    let config = match LodestoneConfig::load(&config_file) {
        Ok(config) => {
            // Save config to fill missing fields
            let _ = config.save(&config_file);
            Ok(config)
        }
        Err(error) => match error {
            LodestoneConfigLoadError::Io(_) => {
                let default_config = LodestoneConfig::default();
                let _ = default_config.save(&config_file);
                Ok(default_config)
            }
            LodestoneConfigLoadError::Parse(parse_error) => Err(parse_error),
        },
    }?;

    let stop = leak(broadcast::channel(1).0);
    let lodestone = leak(Lodestone::new(config)?);
    let stop_rx = stop.subscribe();
    let mut server = tokio::spawn(async move {
        if let Err(e) = lodestone.start(stop_rx).await {
            log::error!("{e}");
        }
    });

    {
        use futures::future::{select_all, FutureExt};
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        let sigint_fut = sigint.recv().boxed();
        let sigterm_fut = sigterm.recv().boxed();

        let signalled = tokio::select! {
            _ = select_all([sigint_fut, sigterm_fut]) => true,
            _ = &mut server => false,
        };
        if signalled {
            LodestoneLogger::stopping();
            let _ = stop.send(());
            let _ = server.await;
        }
    }

    if let Some(provider) = provider {
        if let Err(e) = provider.shutdown() {
            log::warn!("Failed to flush metrics: {e}");
        }
    }
    Ok(())
}
