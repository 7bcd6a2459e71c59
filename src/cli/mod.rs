//! Command-line interface for the `subwrap` binary.

pub mod commands;

use crate::host::CallShape;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "subwrap")]
#[command(version, about = "Trace subroutine calls by wrapping them with pre/post hooks", long_about = None)]
pub struct Cli {
    /// Directory searched for module sources (repeatable)
    #[arg(short = 'I', long = "lib", value_name = "DIR", global = true)]
    pub lib: Vec<PathBuf>,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        match (self.quiet, self.verbose) {
            (true, _) => Verbosity::Quiet,
            (false, 0) => Verbosity::Normal,
            (false, 1) => Verbosity::Verbose,
            (false, _) => Verbosity::Debug,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    Debug,
}

impl Verbosity {
    pub fn to_log_level(self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "info",
            Verbosity::Debug => "debug",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a namespace and list its subroutines
    List(ListArgs),
    /// Wrap subroutines with tracing hooks, then call one of them
    Call(CallArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Namespace to load, e.g. Orchard::Tree
    pub namespace: String,
}

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Fully qualified subroutine to call, e.g. Orchard::Tree::grow
    pub target: String,

    /// Arguments as a JSON array
    #[arg(short, long, value_name = "JSON")]
    pub args: Option<String>,

    /// Number of values the call asks for
    #[arg(short, long, value_enum, default_value_t = ShapeArg::Single)]
    pub shape: ShapeArg,

    /// Call as a method, with the namespace as invocant
    #[arg(short, long)]
    pub method: bool,

    /// Namespace or `Namespace::*` family to wrap (repeatable)
    #[arg(short, long = "package", value_name = "PATTERN", help_heading = "Wrapping")]
    pub packages: Vec<String>,

    /// Extra subroutine to wrap (repeatable)
    #[arg(long = "sub", value_name = "NAME", help_heading = "Wrapping")]
    pub subs: Vec<String>,

    /// Also wrap inherited methods of the selected namespaces
    #[arg(long, help_heading = "Wrapping")]
    pub inherited: bool,

    /// Run the post hook even when the call fails
    #[arg(long, help_heading = "Wrapping")]
    pub always_post: bool,

    /// TOML or JSON file with wrap options
    #[arg(short, long, value_name = "FILE", help_heading = "Wrapping")]
    pub options: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeArg {
    Void,
    Single,
    Sequence,
}

impl From<ShapeArg> for CallShape {
    fn from(shape: ShapeArg) -> Self {
        match shape {
            ShapeArg::Void => CallShape::Void,
            ShapeArg::Single => CallShape::Single,
            ShapeArg::Sequence => CallShape::Sequence,
        }
    }
}
