//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::fund_code_adapter::FundCodeCatalog;
use crate::domain::config_validation::{self, validate_app_config};
use crate::domain::error::EtfCrossError;
use crate::domain::request::StrategyRequest;
use crate::domain::result::{StrategyData, StrategyResponse};
use crate::domain::strategy::StrategyService;
use crate::ports::catalog_port::InstrumentCatalog;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

pub const TOKEN_ENV_VAR: &str = "TUSHARE_TOKEN";
const DEFAULT_CSV_DIR: &str = "data";
const DEFAULT_CATALOG_PATH: &str = "fund_code.csv";
#[cfg(feature = "web")]
const DEFAULT_STATIC_DIR: &str = "frontend";

#[derive(Parser, Debug)]
#[command(name = "etfcross", about = "Dual moving-average crossover backtester for ETFs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Backtest the crossover strategy on one instrument
    Run {
        /// Instrument code, e.g. 510300.SH
        #[arg(long)]
        code: String,
        /// First trading day, YYYYMMDD or YYYY-MM-DD
        #[arg(long)]
        start: String,
        /// Last trading day, YYYYMMDD or YYYY-MM-DD
        #[arg(long)]
        end: String,
        /// Short moving-average period (default from [strategy])
        #[arg(long = "short")]
        short_period: Option<i64>,
        /// Long moving-average period (default from [strategy])
        #[arg(long = "long")]
        long_period: Option<i64>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Write the JSON response here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the instruments in the catalog
    ListCodes {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Start the HTTP API and frontend
    Serve {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            code,
            start,
            end,
            short_period,
            long_period,
            config,
            output,
        } => {
            let config = match load_config(config.as_deref()) {
                Ok(c) => c,
                Err(code) => return code,
            };
            let params = match config_validation::default_params(&config) {
                Ok(p) => p,
                Err(e) => return report(&e),
            };
            let request = StrategyRequest {
                code,
                start_date: start,
                end_date: end,
                short_period: short_period.unwrap_or(params.short_period() as i64),
                long_period: long_period.unwrap_or(params.long_period() as i64),
            };
            run_strategy(&config, &request, output.as_deref())
        }
        Command::ListCodes { config } => match load_config(config.as_deref()) {
            Ok(c) => run_list_codes(&c),
            Err(code) => code,
        },
        Command::Serve { config } => match load_config(config.as_deref()) {
            Ok(c) => run_serve(c),
            Err(code) => code,
        },
    }
}

fn report(err: &EtfCrossError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}

/// Loads and validates the config file. Without a path every value takes its
/// default.
pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, ExitCode> {
    let config = match path {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            FileConfigAdapter::from_file(path).map_err(|e| {
                report(&EtfCrossError::ConfigParse {
                    file: path.display().to_string(),
                    reason: e.to_string(),
                })
            })?
        }
        None => FileConfigAdapter::empty(),
    };

    validate_app_config(&config).map_err(|e| report(&e))?;
    Ok(config)
}

/// `[tushare] token`, falling back to the `TUSHARE_TOKEN` environment
/// variable.
pub fn resolve_token(config: &dyn ConfigPort, env_token: Option<String>) -> Option<String> {
    config
        .get_string("tushare", "token")
        .or_else(|| env_token.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()))
}

pub fn build_data_port(
    config: &dyn ConfigPort,
) -> Result<Arc<dyn DataPort + Send + Sync>, EtfCrossError> {
    match config_validation::data_source(config).as_str() {
        "tushare" => build_tushare_port(config),
        _ => {
            let dir = config
                .get_string("data", "csv_dir")
                .unwrap_or_else(|| DEFAULT_CSV_DIR.to_string());
            info!(dir = %dir, "using CSV price files");
            Ok(Arc::new(CsvAdapter::new(PathBuf::from(dir))))
        }
    }
}

#[cfg(feature = "tushare")]
fn build_tushare_port(
    config: &dyn ConfigPort,
) -> Result<Arc<dyn DataPort + Send + Sync>, EtfCrossError> {
    use crate::adapters::tushare_adapter::TushareAdapter;

    let token = resolve_token(config, std::env::var(TOKEN_ENV_VAR).ok()).ok_or_else(|| {
        EtfCrossError::ConfigMissing {
            section: "tushare".to_string(),
            key: "token".to_string(),
        }
    })?;
    info!("using Tushare Pro data");
    Ok(Arc::new(TushareAdapter::from_config(config, token)?))
}

#[cfg(not(feature = "tushare"))]
fn build_tushare_port(
    _config: &dyn ConfigPort,
) -> Result<Arc<dyn DataPort + Send + Sync>, EtfCrossError> {
    Err(EtfCrossError::ConfigInvalid {
        section: "data".to_string(),
        key: "source".to_string(),
        reason: "built without the tushare feature".to_string(),
    })
}

pub fn build_catalog(config: &dyn ConfigPort) -> FundCodeCatalog {
    let path = config
        .get_string("catalog", "path")
        .unwrap_or_else(|| DEFAULT_CATALOG_PATH.to_string());
    FundCodeCatalog::new(PathBuf::from(path))
}

fn build_service(config: &dyn ConfigPort) -> Result<StrategyService, EtfCrossError> {
    let data_port = build_data_port(config)?;
    let labels = config_validation::signal_labels(config)?;
    Ok(StrategyService::new(data_port, labels))
}

fn run_strategy(
    config: &dyn ConfigPort,
    request: &StrategyRequest,
    output: Option<&Path>,
) -> ExitCode {
    let service = match build_service(config) {
        Ok(s) => s,
        Err(e) => return report(&e),
    };

    let response = match service.get_strategy_result(request) {
        Ok(r) => r,
        Err(e) => return report(&e),
    };

    if let Err(e) = write_response(&response, output) {
        return report(&e);
    }

    match &response.data {
        Some(data) => {
            eprint!("{}", format_summary(request, data));
            ExitCode::SUCCESS
        }
        None => {
            let err = EtfCrossError::DataUnavailable {
                code: request.code.trim().to_uppercase(),
            };
            report(&err)
        }
    }
}

fn write_response(response: &StrategyResponse, output: Option<&Path>) -> Result<(), EtfCrossError> {
    let json = serde_json::to_string_pretty(response).map_err(std::io::Error::other)?;
    match output {
        Some(path) => {
            fs::write(path, json)?;
            info!(path = %path.display(), "wrote strategy result");
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub fn format_summary(request: &StrategyRequest, data: &StrategyData) -> String {
    let m = &data.backtest;
    format!(
        "{} {} to {} MA({}/{})\n  \
         total return   {:>8.2}%\n  \
         annual return  {:>8.2}%\n  \
         max drawdown   {:>8.2}%\n  \
         win rate       {:>8.2}%\n  \
         trades         {:>8}\n",
        request.code.trim().to_uppercase(),
        request.start_date,
        request.end_date,
        request.short_period,
        request.long_period,
        m.total_return,
        m.annual_return,
        m.max_drawdown,
        m.win_rate,
        m.trades,
    )
}

fn run_list_codes(config: &dyn ConfigPort) -> ExitCode {
    let instruments = match build_catalog(config).list_instruments() {
        Ok(i) => i,
        Err(e) => return report(&e),
    };

    if instruments.is_empty() {
        eprintln!("No instruments in catalog");
    }
    for instrument in &instruments {
        println!("{}\t{}", instrument.ts_code, instrument.name);
    }
    ExitCode::SUCCESS
}

#[cfg(feature = "web")]
fn run_serve(config: FileConfigAdapter) -> ExitCode {
    match serve(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

#[cfg(feature = "web")]
fn serve(config: &dyn ConfigPort) -> Result<(), EtfCrossError> {
    use crate::adapters::web::{AppState, build_router};

    let addr = config_validation::listen_addr(config)?;
    let static_dir = config
        .get_string("web", "static_dir")
        .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string());

    let state = AppState {
        service: Arc::new(build_service(config)?),
        catalog: Arc::new(build_catalog(config)),
        static_dir: PathBuf::from(static_dir),
    };
    let router = build_router(state);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(%addr, "listening");
        axum::serve(listener, router).await
    })?;
    Ok(())
}

#[cfg(not(feature = "web"))]
fn run_serve(_config: FileConfigAdapter) -> ExitCode {
    eprintln!("error: web feature is required for serve");
    ExitCode::from(1)
}
