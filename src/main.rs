//! Satchel - Entry Point
//!
//! Small command-line front end for inspecting and packing bags.
//!
//! ```text
//! satchel export                       write default templates to the data dir
//! satchel show <bag.json>              print a saved bag
//! satchel pack <bag.json> <id>...      auto-place items into a bag and save it
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use satchel::items::{resolve_sockets, InventoryGrid};
use satchel::save::{load_bag, save_bag};
use satchel::{EngineConfig, InstanceIdGen, TemplateLibrary};

const CONFIG_PATH: &str = "config.ron";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting Satchel v{}", env!("CARGO_PKG_VERSION"));

    let config = EngineConfig::load_or_default(Path::new(CONFIG_PATH));
    let library = TemplateLibrary::load_or_default(&config);
    let mut ids = InstanceIdGen::new();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("export") => {
            let path = config.templates_path();
            TemplateLibrary::defaults()
                .export(&path)
                .with_context(|| format!("exporting templates to {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        Some("show") => {
            let path = bag_arg(&args)?;
            let grid = load_bag(&path, &library, &mut ids, config.max_grid_size)
                .with_context(|| format!("loading bag {}", path.display()))?;
            print_grid(&grid);
        }
        Some("pack") => {
            let path = bag_arg(&args)?;
            let mut grid = if path.exists() {
                load_bag(&path, &library, &mut ids, config.max_grid_size)
                    .with_context(|| format!("loading bag {}", path.display()))?
            } else {
                InventoryGrid::from_config(&config)
            };

            for template_id in &args[2..] {
                let instance = library
                    .instantiate(template_id, &mut ids)
                    .with_context(|| format!("unknown template '{}'", template_id))?;
                if let Err(rejected) = grid.auto_place_any_rotation(instance) {
                    log::warn!("No room for '{}': {}", template_id, rejected);
                }
            }

            save_bag(&grid, &path).with_context(|| format!("saving bag {}", path.display()))?;
            print_grid(&grid);
        }
        _ => bail!("usage: satchel export | show <bag.json> | pack <bag.json> <template-id>..."),
    }

    Ok(())
}

fn bag_arg(args: &[String]) -> Result<PathBuf> {
    args.get(1)
        .map(PathBuf::from)
        .context("missing bag file argument")
}

fn print_grid(grid: &InventoryGrid) {
    print!("{}", grid.render());
    println!(
        "{} items, {}/{} cells free",
        grid.count(),
        grid.free_cell_count(),
        grid.width() as usize * grid.height() as usize
    );
    for (i, item) in grid.placed_items().iter().enumerate() {
        let origin = item.origin().unwrap_or_default();
        let sockets: Vec<String> = resolve_sockets(item)
            .iter()
            .map(|s| format!("({}, {})", s.x, s.y))
            .collect();
        println!(
            "  {:>2}. {} at ({}, {}) {:?} sockets: [{}]",
            i + 1,
            item.template().name(),
            origin.x,
            origin.y,
            item.rotation(),
            sockets.join(", ")
        );
    }
}
