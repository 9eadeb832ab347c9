//! Command dispatch: load the scene, run a visitor, print the result

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::{
    AreaCalculator, BuiltScene, DrawVisitor, NameCollector, Scene, TreeRenderer,
};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::domain::{walk_recursive, DomainError};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    output::set_color(settings.output.color);

    match &cli.command {
        Some(Commands::Draw { scene }) => {
            for line in draw_lines(&load_scene(scene, &settings)?, &settings)? {
                output::info(&line);
            }
            Ok(())
        }
        Some(Commands::Area { scene }) => cmd_area(scene, &settings),
        Some(Commands::Tree { scene }) => {
            output::info(&render_tree(&load_scene(scene, &settings)?, &settings)?);
            Ok(())
        }
        Some(Commands::Names { scene }) => {
            let names = collect_names(&load_scene(scene, &settings)?, &settings)?;
            output::info(&names.iter().join("\n"));
            Ok(())
        }
        Some(Commands::Config { command }) => cmd_config(command, &settings),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `grove --help`".to_string(),
        )),
    }
}

#[instrument(level = "debug", skip(settings))]
fn load_scene(path: &Path, settings: &Settings) -> CliResult<BuiltScene> {
    let built = Scene::load(path)?.build(settings.tree)?;
    debug!("scene {} has {} nodes", path.display(), built.tree.len());
    Ok(built)
}

/// Draw lines in pre-order: each composite before its members.
pub fn draw_lines(scene: &BuiltScene, settings: &Settings) -> CliResult<Vec<String>> {
    Ok(settings
        .traversal
        .traversal()
        .run(&scene.tree, scene.root, &mut DrawVisitor)?)
}

pub fn measure_area(scene: &BuiltScene, settings: &Settings) -> CliResult<AreaCalculator> {
    let mut calc = AreaCalculator::new(settings.output.precision);
    settings
        .traversal
        .traversal()
        .run(&scene.tree, scene.root, &mut calc)?;
    Ok(calc)
}

pub fn collect_names(scene: &BuiltScene, settings: &Settings) -> CliResult<Vec<String>> {
    let mut names = NameCollector::new();
    settings
        .traversal
        .traversal()
        .run(&scene.tree, scene.root, &mut names)?;
    Ok(names.into_names())
}

pub fn render_tree(scene: &BuiltScene, settings: &Settings) -> CliResult<String> {
    if let Some(limit) = settings.traversal.max_depth {
        let depth = scene.tree.depth(scene.root);
        if depth > limit {
            return Err(DomainError::DepthExceeded { limit }.into());
        }
    }
    let mut renderer = TreeRenderer::new(settings.output.branch_label.clone());
    Ok(walk_recursive(&scene.tree, scene.root, &mut renderer)?.to_string())
}

fn cmd_area(path: &Path, settings: &Settings) -> CliResult<()> {
    let calc = measure_area(&load_scene(path, settings)?, settings)?;
    output::header(&format!("Areas in {}", path.display()));
    for line in calc.report() {
        output::detail(&line);
    }
    output::action("Total", &format!("{:.*}", settings.output.precision, calc.total()));
    Ok(())
}

fn cmd_config(command: &ConfigCommands, settings: &Settings) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::action("Global", &path.display()),
            None => output::error("cannot determine config directory"),
        },
    }
    Ok(())
}
