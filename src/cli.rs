use std::path::PathBuf;

use clap::Parser;

const AFTER_HELP: &str = r#"Configuration lives in ~/.scd/config (or $SCD_HOME/config). Example:

{
    "user": "vagrant",
    "hosts": ["127.0.0.1"],
    "port": 2222,
    "shell": "zsh",
    "private_key": "~/my_key.pem",
    "ignored_files": ["*/.git/*", ".DS_Store"],
    "files": [
        "~/.oh-my-zsh",
        "~/.zshrc",
        ["~/my_settings.txt", "~/server_settings.txt"]
    ],
    "programs": ["tree"],
    "scripts": ["~/init.sh", {"script": "~/root_setup.sh", "sudo": true}]
}

Files changed since the last deployment are redeployed. Removed files and
programs are not reconciled."#;

/// scd - deploy shell configuration to remote hosts
#[derive(Parser, Debug)]
#[command(name = "scd")]
#[command(author, version, about, long_about = None)]
#[command(after_help = AFTER_HELP)]
pub struct Cli {
    /// Hosts to deploy to (defaults to the hosts in the config file)
    pub hosts: Vec<String>,

    /// Port to connect to (default 22)
    #[arg(short = 'P', long)]
    pub port: Option<u16>,

    /// User to authenticate as
    #[arg(short, long)]
    pub user: Option<String>,

    /// Private key file to authenticate with
    #[arg(short = 'i', long)]
    pub private_key: Option<PathBuf>,

    /// Password (prefer -f or -r; arguments are visible to other local users)
    #[arg(short, long, conflicts_with_all = ["password_file", "read_password"])]
    pub password: Option<String>,

    /// File containing the password
    #[arg(short = 'f', long, conflicts_with = "read_password")]
    pub password_file: Option<PathBuf>,

    /// Read the password interactively
    #[arg(short, long)]
    pub read_password: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Emit NDJSON events instead of human-readable output
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Redeploy everything regardless of host status
    #[arg(long)]
    pub force: bool,

    /// Clear the status of HOST (address or name) and exit
    #[arg(long, value_name = "HOST")]
    pub clear_status: Option<String>,

    /// Print host status (all hosts, or HOST) and exit
    #[arg(long, value_name = "HOST", num_args = 0..=1, default_missing_value = "all")]
    pub host_status: Option<String>,

    /// Print the effective configuration and exit
    #[arg(long)]
    pub print_config: bool,
}
