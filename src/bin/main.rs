//! cbdc-wallet-proxy CLI
//!
//!   cbdc-wallet-proxy serve [--port 3000]          → HTTP API
//!   cbdc-wallet-proxy create                       → {"walletID": 0, "address": "usd1..."}
//!   cbdc-wallet-proxy get <walletID>               → registry record
//!   cbdc-wallet-proxy list                         → all registry records
//!   cbdc-wallet-proxy mint <walletID> <utxos> <atomicUnit>
//!   cbdc-wallet-proxy balance <walletID|address>   → {"balance": "1.00", "utxos": "1", "pending": "0"}
//!   cbdc-wallet-proxy send <senderID> <address> <amount>
//!   cbdc-wallet-proxy import <walletID> <importinput>
//!   cbdc-wallet-proxy send-and-import <senderID> <address> <amount>
//!
//! Configuration (flags override env, env overrides `.env`):
//!   --cli <path>        CBDC_PROXY_CLI          client-cli binary
//!   --cli-config <name> CBDC_PROXY_CLI_CONFIG   config file handed to client-cli
//!   --work-dir <dir>    CBDC_PROXY_WORK_DIR     where wallet/mempool files live
//!   --registry <path>   CBDC_PROXY_REGISTRY     walletInfo.json location
//!   --timeout <secs>    CBDC_PROXY_TIMEOUT_SECS per-invocation limit (off by default)
//!   --port <port>       PORT
//!                       API_KEY                 required X-API-KEY value

use anyhow::{anyhow, bail, Context};
use cbdc_wallet_proxy::logging::init_logging;
use cbdc_wallet_proxy::{ApiKey, ProxyConfig, WalletService};
use serde_json::{json, Value};
use std::env;
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

fn main() {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let opts = ParsedArgs::parse(&args[1..]);

    if opts.help {
        print_usage();
        return;
    }

    if opts.version {
        println!("cbdc-wallet-proxy {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let Some(command) = opts.command.clone() else {
        print_usage();
        return;
    };

    let result = tokio::runtime::Runtime::new()
        .context("Failed to create runtime")
        .and_then(|rt| rt.block_on(dispatch(&command, &opts)));

    let pretty = opts.pretty || std::io::stdout().is_terminal();
    match result {
        Ok(output) => println!("{}", render(&output, pretty)),
        Err(e) => {
            eprintln!("{}", render(&json!({"error": format!("{e:#}")}), pretty));
            std::process::exit(1);
        }
    }
}

async fn dispatch(command: &str, opts: &ParsedArgs) -> anyhow::Result<Value> {
    let config = opts.config();
    match command {
        "serve" => cmd_serve(config).await,
        "create" => cmd_create(&config).await,
        "get" => cmd_get(&config, opts).await,
        "list" | "ls" => cmd_list(&config).await,
        "mint" => cmd_mint(&config, opts).await,
        "balance" => cmd_balance(&config, opts).await,
        "send" => cmd_send(&config, opts).await,
        "import" => cmd_import(&config, opts).await,
        "send-and-import" => cmd_send_and_import(&config, opts).await,
        other => bail!("Unknown command: {}", other),
    }
}

fn render(value: &Value, pretty: bool) -> String {
    let rendered = if pretty { serde_json::to_string_pretty(value) } else { serde_json::to_string(value) };
    rendered.unwrap_or_else(|_| value.to_string())
}

#[derive(Default)]
struct ParsedArgs {
    command: Option<String>,
    positional: Vec<String>,
    cli: Option<String>,
    cli_config: Option<String>,
    work_dir: Option<String>,
    registry: Option<String>,
    timeout: Option<u64>,
    port: Option<u16>,
    pretty: bool,
    help: bool,
    version: bool,
}

impl ParsedArgs {
    fn parse(args: &[String]) -> Self {
        load_dotenv(".env");

        let mut opts = ParsedArgs::default();
        let mut positional = Vec::new();
        let mut i = 0;

        while i < args.len() {
            let arg = &args[i];
            let next = args.get(i + 1).cloned();
            let mut takes_value = true;
            match arg.as_str() {
                "--help" | "-h" => { opts.help = true; takes_value = false; }
                "--version" | "-V" => { opts.version = true; takes_value = false; }
                "--pretty" => { opts.pretty = true; takes_value = false; }
                "--cli" => opts.cli = next,
                "--cli-config" => opts.cli_config = next,
                "--work-dir" | "-d" => opts.work_dir = next,
                "--registry" | "-r" => opts.registry = next,
                "--timeout" => opts.timeout = next.and_then(|v| v.parse().ok()),
                "--port" | "-p" => opts.port = next.and_then(|v| v.parse().ok()),
                _ if !arg.starts_with('-') => { positional.push(arg.clone()); takes_value = false; }
                _ => takes_value = false, // Ignore unknown flags
            }
            i += if takes_value { 2 } else { 1 };
        }

        // First positional is command, the rest are its arguments
        if !positional.is_empty() {
            opts.command = Some(positional.remove(0));
        }
        opts.positional = positional;
        opts
    }

    /// Environment first, then flags on top.
    fn config(&self) -> ProxyConfig {
        let mut config = ProxyConfig::from_env();
        if let Some(ref v) = self.cli { config = config.with_cli(v); }
        if let Some(ref v) = self.cli_config { config = config.with_cli_config(v); }
        if let Some(ref v) = self.work_dir { config = config.with_work_dir(v); }
        if let Some(ref v) = self.registry { config = config.with_registry(v); }
        if let Some(secs) = self.timeout.filter(|s| *s > 0) { config = config.with_timeout(Duration::from_secs(secs)); }
        if let Some(port) = self.port { config = config.with_port(port); }
        config
    }

    fn arg(&self, index: usize, name: &str) -> anyhow::Result<&str> {
        let usage = self.command.as_deref().unwrap_or("");
        self.positional
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| anyhow!("<{}> required: cbdc-wallet-proxy {} ...", name, usage))
    }

    fn number(&self, index: usize, name: &str) -> anyhow::Result<u64> {
        let raw = self.arg(index, name)?;
        raw.parse().with_context(|| format!("<{}> must be a non-negative integer, got '{}'", name, raw))
    }
}

/// Set variables from a `.env` file unless already present.
fn load_dotenv(path: &str) {
    let Ok(contents) = std::fs::read_to_string(path) else { return };
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim().trim_matches('"');
            if !value.is_empty() && env::var(key.trim()).is_err() {
                env::set_var(key.trim(), value);
            }
        }
    }
}

fn print_usage() {
    println!(
        r#"cbdc-wallet-proxy - HTTP proxy for the OpenCBDC client-cli wallet

USAGE:
    cbdc-wallet-proxy <command> [args] [options]

COMMANDS:
    serve                                   Run the HTTP API
    create                                  Create a wallet
    get <walletID>                          Show a registered wallet
    list                                    List registered wallets
    mint <walletID> <utxos> <atomicUnit>    Mint funds into a wallet
    balance <walletID|address>              Show balance
    send <senderID> <address> <amount>      Send funds (prints importinput)
    import <walletID> <importinput>         Import received funds
    send-and-import <senderID> <address> <amount>
                                            Send and import in one step

OPTIONS:
    --cli <path>          client-cli binary [env: CBDC_PROXY_CLI]
    --cli-config <name>   client-cli config [env: CBDC_PROXY_CLI_CONFIG]
    -d, --work-dir <dir>  wallet file directory [env: CBDC_PROXY_WORK_DIR]
    -r, --registry <path> wallet registry [env: CBDC_PROXY_REGISTRY]
    --timeout <secs>      client-cli time limit [env: CBDC_PROXY_TIMEOUT_SECS]
    -p, --port <port>     HTTP port [env: PORT, default 3000]
    --pretty              Pretty-print JSON
    -h, --help            Show this help
    -V, --version         Show version

ENVIRONMENT:
    API_KEY               X-API-KEY required by the HTTP API
    RUST_LOG              Log filter (default: info)
    CBDC_PROXY_LOG_JSON   Set to 1 for JSON logs"#
    );
}

async fn cmd_serve(config: ProxyConfig) -> anyhow::Result<Value> {
    use cbdc_wallet_proxy::server::create_router;
    use cbdc_wallet_proxy::shutdown_signal;

    let wallets = Arc::new(WalletService::from_config(&config));
    wallets.check_artifacts().await?;

    let api_key = config.api_key.as_deref().map(ApiKey::new);
    if api_key.is_none() {
        warn!("API_KEY not set; every API request will be rejected");
    }

    let router = create_router(wallets, api_key);
    let addr = format!("0.0.0.0:{}", config.port);

    info!("cbdc-wallet-proxy listening on http://{}", addr);
    info!("client-cli: {} (work dir {})", config.cli_path.display(), config.work_dir.display());
    debug!("  POST /wallet              - Create wallet");
    debug!("  GET  /wallet/:walletID    - Wallet info");
    debug!("  POST /mint                - Mint funds");
    debug!("  GET  /balance/:walletID   - Balance by id or address");
    debug!("  POST /send                - Send funds");
    debug!("  POST /importfunds         - Import funds");
    debug!("  POST /sendandimport       - Send and import");

    let listener = tokio::net::TcpListener::bind(&addr).await.with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    info!("Shutdown complete");

    Ok(json!({"status": "stopped"}))
}

async fn cmd_create(config: &ProxyConfig) -> anyhow::Result<Value> {
    let record = WalletService::from_config(config).create_wallet().await?;
    Ok(json!({"walletID": record.wallet_id, "address": record.address}))
}

async fn cmd_get(config: &ProxyConfig, opts: &ParsedArgs) -> anyhow::Result<Value> {
    let record = WalletService::from_config(config).get_wallet(opts.arg(0, "walletID")?).await?;
    Ok(json!({"walletID": record.wallet_id, "address": record.address}))
}

async fn cmd_list(config: &ProxyConfig) -> anyhow::Result<Value> {
    let records = WalletService::from_config(config).list_wallets().await?;
    let wallets: Vec<Value> = records.iter().map(|r| json!({"walletID": r.wallet_id, "address": r.address})).collect();
    Ok(json!({"wallets": wallets, "count": wallets.len()}))
}

async fn cmd_mint(config: &ProxyConfig, opts: &ParsedArgs) -> anyhow::Result<Value> {
    let (id, utxos, amount) = (opts.arg(0, "walletID")?, opts.number(1, "utxos")?, opts.number(2, "atomicUnit")?);
    let output = WalletService::from_config(config).mint(id, utxos, amount).await?;
    Ok(json!({"result": output}))
}

async fn cmd_balance(config: &ProxyConfig, opts: &ParsedArgs) -> anyhow::Result<Value> {
    let info = WalletService::from_config(config).balance(opts.arg(0, "walletID|address")?).await?;
    Ok(serde_json::to_value(info)?)
}

async fn cmd_send(config: &ProxyConfig, opts: &ParsedArgs) -> anyhow::Result<Value> {
    let (id, address, amount) = (opts.arg(0, "senderID")?, opts.arg(1, "address")?, opts.number(2, "amount")?);
    let output = WalletService::from_config(config).send(id, address, amount).await?;
    Ok(json!({
        "result": output,
        "importinput": cbdc_wallet_proxy::parse_continuation_token(&output),
    }))
}

async fn cmd_import(config: &ProxyConfig, opts: &ParsedArgs) -> anyhow::Result<Value> {
    let (id, token) = (opts.arg(0, "walletID")?, opts.arg(1, "importinput")?);
    let output = WalletService::from_config(config).import(id, token).await?;
    Ok(json!({"result": output}))
}

async fn cmd_send_and_import(config: &ProxyConfig, opts: &ParsedArgs) -> anyhow::Result<Value> {
    let (id, address, amount) = (opts.arg(0, "senderID")?, opts.arg(1, "address")?, opts.number(2, "amount")?);
    let output = WalletService::from_config(config).send_and_import(id, address, amount).await?;
    Ok(json!({"result": output}))
}
