extern crate log;
extern crate clap;

use log::{info, error};
use env_logger::Env;

use clap::{Arg, App};

use hotspotd::config;
use hotspotd::server;

#[tokio::main]
async fn main() {
    let matches = App::new("hotspotd")
                        .version(env!("CARGO_PKG_VERSION"))
                        .about("Management console backend for WiFi hotspot operators")
                        .arg(Arg::with_name("config")
                            .short("c")
                            .long("config")
                            .value_name("FILE")
                            .default_value(".hotspotd.yaml")
                            .help("Sets a custom config file")
                            .takes_value(true))
                        .arg(Arg::with_name("verbose")
                            .short("v")
                            .multiple(true)
                            .help("Sets the level of verbosity"))
                        .arg(Arg::with_name("host-addr")
                            .short("H")
                            .long("host-addr")
                            .takes_value(true)
                            .help("Host address to listen on, overrides the config file"))
                        .get_matches();

    let log_level;
    match matches.occurrences_of("verbose") {
        0 => log_level = "info",
        1 => log_level = "debug",
        _ => log_level = "trace",
    }

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let config_file = matches.value_of("config").unwrap_or(".hotspotd.yaml");
    let mut config = match config::new(config_file) {
        Ok(c) => c,
        Err(e) => {
            error!("Cannot read the config file {}: {}", config_file, e);
            std::process::exit(1);
        },
    };

    if let Some(h) = matches.value_of("host-addr") {
        config.server.host_addr = h.to_string();
    }

    info!("--- Configuration ---");
    info!("File: {}", config_file);
    info!("Listening address: {}", config.server.host_addr);
    info!("Datastore kind: {}", config.datastore.kind);

    if let Err(e) = server::server_run(&config).await {
        error!("{}", e);
        std::process::exit(1);
    }
}
