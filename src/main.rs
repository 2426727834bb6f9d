use log::error;
use std::process::ExitCode;
use timetable_scheduler::config::ServerConfig;
use timetable_scheduler::server;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_filter.as_str()),
    )
    .init();

    if let Err(e) = server::run_server(config).await {
        error!("Server stopped: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
