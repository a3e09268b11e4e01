use std::process::ExitCode;

use scholar::api::routes::build_app;
use scholar::cli::output::Output;
use scholar::cli::{Cli, Commands};
use scholar::utils::toml_config::ScholarConfig;
use scholar::{AppError, AppState, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    match run(cli, &output).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output.error(&format!("{} ({})", e, e.kind()));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    match cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
    }) {
        Commands::Serve { host, port } => {
            let mut config = ScholarConfig::load_or_default(&cli.config)?;
            init_tracing(&config.server.log_level, cli.verbose);
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config, output).await
        }
        Commands::Query {
            query,
            sort_by_score,
            json,
        } => {
            let config = ScholarConfig::load_or_default(&cli.config)?;
            init_tracing(if cli.verbose { "debug" } else { "warn" }, false);

            let state = AppState::from_config(config).await?;
            let response = state.service.handle(&query.join(" ")).await?;

            if json {
                let body = serde_json::to_string_pretty(&response)
                    .map_err(|e| AppError::Internal(format!("Failed to encode response: {}", e)))?;
                println!("{}", body);
            } else {
                output.research_response(&response, sort_by_score);
            }
            Ok(())
        }
        Commands::Config { full, validate } => show_config(&cli.config, full, validate, output),
    }
}

async fn serve(config: ScholarConfig, output: &Output) -> Result<()> {
    output.banner();

    let addr = config.bind_addr();
    let state = AppState::from_config(config).await?;
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Configuration(format!("Failed to bind {}: {}", addr, e)))?;

    output.success(&format!("Listening on http://{}", addr));
    output.hint("POST /api/research with {\"query\": \"...\"}");
    tracing::info!(%addr, version = env!("CARGO_PKG_VERSION"), "Scholar server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Ctrl-C received, shutting down");
            }
        })
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {}", e)))
}

fn show_config(
    path: &std::path::Path,
    full: bool,
    validate: bool,
    output: &Output,
) -> Result<()> {
    let config = if validate {
        let config = ScholarConfig::load(path)?;
        output.success(&format!("{} is valid", path.display()));
        config
    } else {
        ScholarConfig::load_or_default(path)?
    };

    if full {
        let text = toml::to_string_pretty(&config)
            .map_err(|e| AppError::Internal(format!("Failed to render config: {}", e)))?;
        println!("{}", text);
        return Ok(());
    }

    output.header("Configuration");
    output.kv("file", &path.display().to_string());
    output.kv("bind", &config.bind_addr());
    output.kv("model", config.llm.provider.model());
    output.kv("arxiv", &config.arxiv.base_url);
    output.kv("max_results", &config.arxiv.max_results.to_string());
    output.kv(
        "cache",
        &if config.cache.enabled {
            format!("enabled, ttl {}s", config.cache.ttl_secs)
        } else {
            "disabled".to_string()
        },
    );
    output.newline();
    Ok(())
}

/// `RUST_LOG` wins over the configured level. `SCHOLAR_LOG_FORMAT=json`
/// switches to JSON lines. Logs go to stderr so query output stays clean.
fn init_tracing(level: &str, verbose: bool) {
    let level = if verbose { "debug" } else { level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "scholar={level},scholar_server={level},tower_http={level}"
        ))
    });

    let json = std::env::var("SCHOLAR_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
