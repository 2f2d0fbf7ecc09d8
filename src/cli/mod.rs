//! Command-line interface definitions for the `lambdacloud` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::{Args, Parser, Subcommand};

/// Top-level CLI for the `lambdacloud` binary.
#[derive(Debug, Parser)]
#[command(
    name = "lambdacloud",
    about = "Manage Lambda Cloud instances, SSH keys, and file systems",
    version,
    arg_required_else_help = true
)]
pub(crate) struct Cli {
    /// Override the API base URL for this invocation.
    #[arg(long, global = true, value_name = "URL")]
    pub(crate) endpoint: Option<String>,
    /// Use this API token instead of LAMBDA_TOKEN or the stored token.
    #[arg(long = "token", global = true, value_name = "TOKEN")]
    pub(crate) api_token: Option<String>,
    /// Log request details to stderr.
    #[arg(short, long, global = true)]
    pub(crate) verbose: bool,
    /// Operation to perform.
    #[command(subcommand)]
    pub(crate) command: Command,
}

/// Subcommands of the `lambdacloud` binary.
#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Store an API token for later calls.
    #[command(name = "login")]
    Login(LoginCommand),
    /// Remove the stored API token.
    #[command(name = "logout")]
    Logout,
    /// Commands that call the API.
    #[command(flatten)]
    Api(ApiCommand),
}

/// Subcommands that need an API client.
#[derive(Debug, Subcommand)]
pub(crate) enum ApiCommand {
    /// List instance types with their hourly price.
    #[command(name = "instance-types", alias = "instance_types")]
    InstanceTypes(InstanceTypesCommand),
    /// List instances as JSON.
    #[command(name = "list")]
    List,
    /// Show one instance as JSON.
    #[command(name = "get")]
    Get(InstanceIdArg),
    /// Launch instances and print their identifiers.
    #[command(name = "create")]
    Create(CreateCommand),
    /// Terminate an instance.
    #[command(name = "delete")]
    Delete(InstanceIdArg),
    /// Manage SSH keys.
    #[command(name = "ssh-keys", subcommand)]
    SshKeys(SshKeysCommand),
    /// List persistent file systems as JSON.
    #[command(name = "file-systems")]
    FileSystems,
}

/// Arguments for `lambdacloud login`.
#[derive(Debug, Args)]
pub(crate) struct LoginCommand {
    /// API token issued by the Lambda Cloud dashboard.
    #[arg(value_name = "TOKEN")]
    pub(crate) token: String,
}

/// Arguments for `lambdacloud instance-types`.
#[derive(Debug, Args)]
pub(crate) struct InstanceTypesCommand {
    /// Include instance types without capacity in any region.
    #[arg(long)]
    pub(crate) all: bool,
}

/// Positional instance identifier.
#[derive(Debug, Args)]
pub(crate) struct InstanceIdArg {
    /// Provider instance identifier.
    #[arg(value_name = "INSTANCE_ID")]
    pub(crate) instance_id: String,
}

/// Arguments for `lambdacloud create`.
#[derive(Debug, Args)]
pub(crate) struct CreateCommand {
    /// Instance type to launch (see `lambdacloud instance-types`).
    #[arg(value_name = "INSTANCE_TYPE")]
    pub(crate) instance_type: String,
    /// SSH key to install; repeat for several keys.
    #[arg(long = "ssh-key", value_name = "NAME")]
    pub(crate) ssh_keys: Vec<String>,
    /// File system to attach; repeat for several file systems.
    #[arg(long = "file-system", value_name = "NAME")]
    pub(crate) file_systems: Vec<String>,
    /// Region to launch in; defaults to the first region with capacity.
    #[arg(long, value_name = "REGION")]
    pub(crate) region: Option<String>,
    /// Number of instances to launch.
    #[arg(long, default_value_t = 1, value_name = "COUNT")]
    pub(crate) quantity: u32,
}

/// Subcommands of `lambdacloud ssh-keys`.
#[derive(Debug, Subcommand)]
pub(crate) enum SshKeysCommand {
    /// List registered SSH keys as JSON.
    #[command(name = "list")]
    List,
    /// Register a public key.
    #[command(name = "add")]
    Add(AddSshKeyCommand),
}

/// Arguments for `lambdacloud ssh-keys add`.
#[derive(Debug, Args)]
pub(crate) struct AddSshKeyCommand {
    /// Name to register the key under.
    #[arg(value_name = "NAME")]
    pub(crate) name: String,
    /// Public key material.
    #[arg(
        long,
        value_name = "KEY",
        conflicts_with = "public_key_file",
        required_unless_present = "public_key_file"
    )]
    pub(crate) public_key: Option<String>,
    /// Read the public key from a file.
    #[arg(long, value_name = "PATH")]
    pub(crate) public_key_file: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap_or_else(|err| panic!("parse {args:?}: {err}"))
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn accepts_underscore_alias_for_instance_types() {
        let cli = parse(&["lambdacloud", "instance_types", "--all"]);

        assert!(matches!(
            cli.command,
            Command::Api(ApiCommand::InstanceTypes(InstanceTypesCommand { all: true }))
        ));
    }

    #[test]
    fn create_collects_repeated_keys() {
        let cli = parse(&[
            "lambdacloud",
            "create",
            "gpu_1x_a10",
            "--ssh-key",
            "laptop",
            "--ssh-key",
            "desktop",
            "--quantity",
            "2",
        ]);

        let Command::Api(ApiCommand::Create(create)) = cli.command else {
            panic!("expected create command");
        };
        assert_eq!(create.instance_type, "gpu_1x_a10");
        assert_eq!(create.ssh_keys, ["laptop", "desktop"]);
        assert_eq!(create.quantity, 2);
        assert_eq!(create.region, None);
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let cli = parse(&["lambdacloud", "list", "--endpoint", "http://localhost", "--token", "t"]);

        assert_eq!(cli.endpoint.as_deref(), Some("http://localhost"));
        assert_eq!(cli.api_token.as_deref(), Some("t"));
    }

    #[rstest]
    #[case(&["lambdacloud", "login", "t"], false)]
    #[case(&["lambdacloud", "logout"], false)]
    #[case(&["lambdacloud", "list"], true)]
    #[case(&["lambdacloud", "file-systems"], true)]
    #[case(&["lambdacloud", "ssh-keys", "list"], true)]
    fn only_api_commands_need_a_client(#[case] args: &[&str], #[case] needs_client: bool) {
        let cli = parse(args);

        assert_eq!(matches!(cli.command, Command::Api(_)), needs_client);
    }

    #[test]
    fn ssh_key_add_requires_key_source() {
        let result = Cli::try_parse_from(["lambdacloud", "ssh-keys", "add", "laptop"]);

        assert!(result.is_err());
    }
}
