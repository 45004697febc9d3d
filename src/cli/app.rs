//! Main CLI application structure

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::compose::{BackendMode, PortSettings};
use crate::storage::Workdir;

use super::output::{Output, OutputFormat};
use super::{deploy_cmd, plugin_cmd, sync_cmd};

#[derive(Parser)]
#[command(name = "erxes")]
#[command(author, version, about = "Deployment and plugin management for the erxes business suite")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Deployment backend; anything other than docker-compose selects swarm
    #[arg(long, global = true, env = "DEPLOYMENT_METHOD", default_value = "docker-swarm")]
    pub method: String,

    #[command(flatten)]
    pub ports: PortArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Port settings, resolved from the environment by clap
#[derive(Args)]
pub struct PortArgs {
    /// Port plugin services listen on inside their containers
    #[arg(long, global = true, env = "SERVICE_INTERNAL_PORT", default_value_t = 80)]
    pub service_internal_port: u16,

    /// Published gateway port
    #[arg(long, global = true, env = "GATEWAY_PORT", default_value_t = 3300)]
    pub gateway_port: u16,

    /// Published frontend port
    #[arg(long, global = true, env = "UI_PORT", default_value_t = 3000)]
    pub ui_port: u16,

    /// Published mongo port
    #[arg(long, global = true, env = "MONGO_PORT", default_value_t = 27017)]
    pub mongo_port: u16,

    /// Published redis port
    #[arg(long, global = true, env = "REDIS_PORT", default_value_t = 6379)]
    pub redis_port: u16,

    /// Published rabbitmq port
    #[arg(long, global = true, env = "RABBITMQ_PORT", default_value_t = 5672)]
    pub rabbitmq_port: u16,
}

impl PortArgs {
    fn to_settings(&self) -> PortSettings {
        PortSettings {
            service_internal_port: self.service_internal_port,
            gateway_port: self.gateway_port,
            ui_port: self.ui_port,
            mongo_port: self.mongo_port,
            redis_port: self.redis_port,
            rabbitmq_port: self.rabbitmq_port,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a deployment directory
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,

        /// Public hostname of the deployment
        #[arg(long)]
        domain: String,
    },

    /// Compile and deploy the datastore stack
    DeployDbs {
        /// Write the compose file without applying it
        #[arg(long)]
        compile_only: bool,
    },

    /// Compile and deploy the application stack
    Up {
        /// Write the compose file without applying it
        #[arg(long)]
        compile_only: bool,
    },

    /// Add a plugin to the configuration
    Install {
        /// Plugin name
        name: String,
    },

    /// Remove a plugin from the configuration
    Uninstall {
        /// Plugin name
        name: String,

        /// Also remove the running docker service
        #[arg(long)]
        remove_service: bool,
    },

    /// Download and extract a plugin's UI bundle
    Syncui {
        /// Plugin name
        name: String,

        /// Release tag override
        #[arg(long)]
        tag: Option<String>,

        /// Explicit archive location, bypassing bucket resolution
        #[arg(long)]
        location: Option<String>,
    },

    /// Download the locale archive and merge plugin catalogs
    Locales,

    /// Dump one mongo database from the running container
    DumpDb {
        /// Database name
        db_name: String,

        /// Copy the dump out of the container and compress it
        #[arg(long)]
        copy_dump: bool,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.format, cli.verbose);
    let mode = BackendMode::from_method(&cli.method);
    let ports = cli.ports.to_settings();

    output.verbose("erxes CLI starting");

    match cli.command {
        Commands::Init { path, domain } => {
            output.verbose_ctx("init", &format!("Initializing deployment at: {}", path));
            let workdir = Workdir::init(&path, &domain)?;
            output.success(&format!(
                "Initialized erxes deployment at {}",
                workdir.root().display()
            ));
        }

        Commands::DeployDbs { compile_only } => {
            deploy_cmd::deploy_dbs(&output, mode, &ports, compile_only)?
        }

        Commands::Up { compile_only } => deploy_cmd::up(&output, mode, &ports, compile_only)?,

        Commands::Install { name } => plugin_cmd::install(&output, &name)?,

        Commands::Uninstall {
            name,
            remove_service,
        } => plugin_cmd::uninstall(&output, &name, remove_service)?,

        Commands::Syncui {
            name,
            tag,
            location,
        } => sync_cmd::syncui(&output, &name, tag.as_deref(), location.as_deref())?,

        Commands::Locales => sync_cmd::locales(&output)?,

        Commands::DumpDb { db_name, copy_dump } => {
            deploy_cmd::dump_db(&output, &db_name, copy_dump)?
        }
    }

    output.verbose("Command completed successfully");
    Ok(())
}
