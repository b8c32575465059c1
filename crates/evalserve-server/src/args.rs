//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use evalserve_core::EvalSessionArguments;
use evalserve_server::{LogFormat, ServerConfig};

#[derive(Parser)]
#[command(name = "evalserve")]
#[command(about = "Serve registered evals over HTTP, one sample at a time")]
#[command(
    long_about = r#"Serve registered evals over HTTP, one sample at a time

USAGE:
  evalserve serve                    # Start the HTTP API
  evalserve run test-match           # Grade a whole eval with the stub
  evalserve dataset test-match       # Print an eval's samples as JSON
  evalserve list                     # List registered evals"#
)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true, env = "EVALSERVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log output format
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = LogFormat::Pretty,
        env = "EVALSERVE_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API
    Serve {
        /// Address to listen on (overrides the configuration file)
        #[arg(long)]
        bind: Option<String>,

        /// Eval served by /dataset when no eval is named
        #[arg(long)]
        default_eval: Option<String>,

        /// Additional registry directory
        #[arg(long = "registry-path")]
        registry_path: Vec<PathBuf>,
    },

    /// Grade every sample of an eval with the dummy completion function
    Run(RunArgs),

    /// Print an eval's samples as JSON without grading them
    Dataset {
        eval: String,

        #[arg(long)]
        max_samples: Option<usize>,

        #[arg(long = "registry-path")]
        registry_path: Vec<PathBuf>,
    },

    /// List registered evals
    List {
        #[arg(long = "registry-path")]
        registry_path: Vec<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Eval name or alias
    pub eval: String,

    /// Extra eval parameters, e.g. "max_tokens=5,temperature=0.2"
    #[arg(long)]
    pub extra_eval_params: Option<String>,

    /// Grade at most this many samples
    #[arg(long)]
    pub max_samples: Option<usize>,

    /// Show per-sample progress (default: on unless --max-samples is set)
    #[arg(long, overrides_with = "no_visible")]
    pub visible: bool,

    #[arg(long, overrides_with = "visible")]
    pub no_visible: bool,

    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long)]
    pub user: Option<String>,

    /// Write recorded events as JSONL
    #[arg(long)]
    pub log_to_file: Option<PathBuf>,

    #[arg(long = "registry-path")]
    pub registry_path: Vec<PathBuf>,

    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    pub local_run: bool,

    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    pub dry_run_logging: bool,
}

impl RunArgs {
    pub fn visible(&self) -> Option<bool> {
        match (self.visible, self.no_visible) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    /// Session arguments with `config` filling in every flag not given
    ///
    /// Configured registry paths come first, so command-line paths override
    /// their entries.
    pub fn into_session_args(self, config: &ServerConfig) -> EvalSessionArguments {
        let visible = self.visible();
        let registry_path = config
            .registry_paths
            .iter()
            .cloned()
            .chain(self.registry_path)
            .collect();
        EvalSessionArguments {
            eval: self.eval,
            extra_eval_params: self
                .extra_eval_params
                .unwrap_or_else(|| config.extra_eval_params.clone()),
            max_samples: self.max_samples.or(config.max_samples),
            visible,
            seed: self.seed.unwrap_or(config.seed),
            user: self.user.unwrap_or_else(|| config.user.clone()),
            registry_path,
            log_to_file: self.log_to_file,
            local_run: self.local_run,
            dry_run: self.dry_run,
            dry_run_logging: self.dry_run_logging,
        }
    }
}
