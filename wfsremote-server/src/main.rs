use std::io::{stdout, Write};
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use wfsremote_common::models::NetworkConfig;
use wfsremote_osc::{RemoteApi, RemoteOscManager, SettingsStore};

mod console;

#[derive(Parser, Debug, Clone)]
#[command(name = "wfsremote")]
#[command(author, version, about = "WFS remote - OSC control surface for a Wave Field Synthesis server")]
struct Args {
    /// Settings file. Defaults to <config dir>/wfs-remote/settings.json
    #[arg(long)]
    config: Option<PathBuf>,

    /// UDP port to listen on for server messages (0 = any free port)
    #[arg(long)]
    incoming_port: Option<u16>,

    /// UDP port the WFS server listens on
    #[arg(long)]
    outgoing_port: Option<u16>,

    /// IPv4 address of the WFS server
    #[arg(long)]
    remote_host: Option<Ipv4Addr>,

    /// Password required on /findDevice
    #[arg(long)]
    password: Option<String>,

    /// Write the effective settings back to the settings file
    #[arg(long, default_value = "false")]
    save: bool,
}

impl Args {
    fn apply_overrides(&self, config: &mut NetworkConfig) {
        if let Some(port) = self.incoming_port {
            config.incoming_port = port;
        }
        if let Some(port) = self.outgoing_port {
            config.outgoing_port = port;
        }
        if let Some(host) = self.remote_host {
            config.remote_host = host;
        }
        if let Some(pw) = &self.password {
            config.find_device_password = Some(pw.clone());
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("wfsremote=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    if let Err(e) = tracing::subscriber::set_global_default(sub) {
        eprintln!("Failed to set global subscriber: {e}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let store = match &args.config {
        Some(path) => SettingsStore::new(path),
        None => SettingsStore::at_default_location()?,
    };
    let mut config = store
        .load()
        .with_context(|| format!("loading settings from {}", store.path().display()))?;
    args.apply_overrides(&mut config);
    config.validate()?;
    if args.save {
        store
            .save(&config)
            .with_context(|| format!("saving settings to {}", store.path().display()))?;
        info!("Saved settings to {}", store.path().display());
    }

    info!(
        "WFS remote starting. in={} out={}:{}",
        config.incoming_port, config.remote_host, config.outgoing_port
    );

    let manager = RemoteOscManager::new(config).with_settings_store(store);
    let api: Arc<dyn RemoteApi> = Arc::new(manager);

    if let Err(e) = api.osc_start().await {
        // Not fatal: `apply` can pick another port.
        error!("Could not start OSC: {}", e);
    }

    let mut events = api.osc_subscribe(None);
    let event_task = tokio::spawn(async move {
        while let Some(ev) = events.recv().await {
            info!(family = ?ev.family(), id = ev.target_id(), "Remote => {:?}", ev);
        }
    });

    println!("Type 'help' for available commands.");
    run_console(&api).await?;

    api.osc_stop().await?;
    event_task.abort();
    info!("Main finished. Goodbye!");
    Ok(())
}

async fn run_console(api: &Arc<dyn RemoteApi>) -> anyhow::Result<()> {
    let mut reader = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("wfs> ");
        stdout().flush()?;

        let line = tokio::select! {
            line = reader.next_line() => match line? {
                Some(line) => line,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        };

        let (quit_requested, output) = console::dispatch(&line, api).await;
        if let Some(msg) = output {
            println!("{}", msg);
        }
        if quit_requested {
            break;
        }
    }
    Ok(())
}
