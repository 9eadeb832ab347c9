//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Composite scene trees: draw, measure and render them with visitors
#[derive(Parser, Debug)]
#[command(name = "grove")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug level: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file (layered over the global config)
    #[arg(short, long, global = true, env = "GROVE_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Draw every graphic of a scene, composites before their members
    Draw {
        /// Scene file
        #[arg(value_hint = ValueHint::FilePath)]
        scene: PathBuf,
    },

    /// Report the area of each shape and the total
    Area {
        /// Scene file
        #[arg(value_hint = ValueHint::FilePath)]
        scene: PathBuf,
    },

    /// Show the scene as a tree
    Tree {
        /// Scene file
        #[arg(value_hint = ValueHint::FilePath)]
        scene: PathBuf,
    },

    /// List shapes in traversal order
    Names {
        /// Scene file
        #[arg(value_hint = ValueHint::FilePath)]
        scene: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Print a commented config template
    Template,
    /// Show config file locations
    Path,
}
