mod allocator;
mod config;
mod error;
mod insights;
mod models;
mod run;
mod session;
mod store;
mod ui;


use anyhow::Result;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config, rest) = config::Config::from_env_and_args(&args)?;

    match rest.first().map(String::as_str) {
        None => run::as_tui(&config),
        Some(_) => run::as_cli(&rest, &config),
    }
}
