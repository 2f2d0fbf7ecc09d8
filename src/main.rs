//! Binary entry point for the `lambdacloud` CLI.

use std::io::{self, Write};
use std::process;

use camino::Utf8PathBuf;
use clap::Parser;
use serde::Serialize;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use lambdacloud::render::instance_types_table;
use lambdacloud::{
    ConfigError, LambdaApi, LambdaApiError, LambdaConfig, LaunchSpec, ProcessEnv, Token,
    TokenStore, TokenStoreError, login,
};

mod cli;

use cli::{AddSshKeyCommand, ApiCommand, Cli, Command, CreateCommand, SshKeysCommand};

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("token storage error: {0}")]
    Token(#[from] TokenStoreError),
    #[error(transparent)]
    Api(#[from] LambdaApiError),
    #[error("failed to write output: {0}")]
    Output(String),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = match dispatch(cli).await {
        Ok(()) => 0,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("lambdacloud=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

async fn dispatch(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Login(args) => {
            let store = TokenStore::from_env(&ProcessEnv)?;
            login(&store, &Token::from(args.token))?;
            write_line(&format!("Token saved to {}", store.path()))
        }
        Command::Logout => {
            TokenStore::from_env(&ProcessEnv)?.delete()?;
            Ok(())
        }
        Command::Api(command) => {
            let api = build_client(cli.endpoint, cli.api_token)?;
            run_api_command(&api, command).await
        }
    }
}

fn build_client(
    endpoint: Option<String>,
    api_token: Option<String>,
) -> Result<LambdaApi, CliError> {
    let mut config = LambdaConfig::load_without_cli_args()?;
    if let Some(endpoint) = endpoint {
        config.endpoint = endpoint;
    }
    config.validate()?;

    let api = LambdaApi::from_config(&config)?;
    Ok(match api_token {
        Some(token) => api.with_token(Token::from(token)),
        None => api,
    })
}

async fn run_api_command(api: &LambdaApi, command: ApiCommand) -> Result<(), CliError> {
    match command {
        ApiCommand::InstanceTypes(args) => {
            let types = api.list_instance_types(args.all).await?;
            write_line(&instance_types_table(&types))
        }
        ApiCommand::List => write_json(&api.list_instances().await?),
        ApiCommand::Get(args) => write_json(&api.get_instance(&args.instance_id).await?),
        ApiCommand::Create(args) => {
            let spec = launch_spec(args)?;
            let instance_ids = api.create_instance(&spec).await?;
            write_json(&instance_ids)
        }
        ApiCommand::Delete(args) => write_json(&api.delete_instance(&args.instance_id).await?),
        ApiCommand::SshKeys(SshKeysCommand::List) => write_json(&api.list_ssh_keys().await?),
        ApiCommand::SshKeys(SshKeysCommand::Add(args)) => {
            write_json(&add_ssh_key(api, args).await?)
        }
        ApiCommand::FileSystems => write_json(&api.list_file_systems().await?),
    }
}

fn launch_spec(args: CreateCommand) -> Result<LaunchSpec, LambdaApiError> {
    let mut builder = LaunchSpec::builder(args.instance_type)
        .ssh_keys(args.ssh_keys)
        .file_systems(args.file_systems)
        .quantity(args.quantity);
    if let Some(region) = args.region {
        builder = builder.region(region);
    }
    builder.build()
}

async fn add_ssh_key(
    api: &LambdaApi,
    args: AddSshKeyCommand,
) -> Result<lambdacloud::SshKey, LambdaApiError> {
    match (args.public_key, args.public_key_file) {
        (Some(public_key), _) => api.add_ssh_key(&args.name, &public_key).await,
        (None, Some(path)) => {
            api.add_ssh_key_from_file(&args.name, &Utf8PathBuf::from(path))
                .await
        }
        (None, None) => Err(LambdaApiError::Validation(String::from(
            "pass --public-key or --public-key-file",
        ))),
    }
}

fn write_json(value: &impl Serialize) -> Result<(), CliError> {
    let rendered =
        serde_json::to_string_pretty(value).map_err(|err| CliError::Output(err.to_string()))?;
    write_line(&rendered)
}

fn write_line(text: &str) -> Result<(), CliError> {
    writeln!(io::stdout(), "{text}").map_err(|err| CliError::Output(err.to_string()))
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}
