//! rotaconf CLI binary entry point.
//! Delegates to the library modules and prints results.

use clap::Parser;
use owo_colors::OwoColorize;
use rotaconf::cli::{Cli, Commands, ConfigArgs};
use rotaconf::config::{self, CliOverrides, Effective};
use rotaconf::logging::{init_logging, LogFormat};
use rotaconf::packages::PackageFacts;
use rotaconf::sync::{run_sync, SyncOptions};
use rotaconf::{docs, output, render, validate};

fn fail(code: i32, msg: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", "❌ error:".red().bold(), msg);
    std::process::exit(code);
}

fn resolve(
    args: &ConfigArgs,
    docs_dir: Option<String>,
    docs_format: Option<String>,
    no_docs: bool,
) -> Effective {
    let ov = CliOverrides {
        config: args.config.clone(),
        sysroot: args.sysroot.clone(),
        output: args.output.clone(),
        docs_dir,
        docs_format,
        no_docs,
    };
    match config::resolve_effective(&ov) {
        Ok(eff) => {
            tracing::debug!(
                config = %eff.config_path.display(),
                os = %eff.state.os_family,
                "resolved config"
            );
            eff
        }
        Err(e) => fail(2, e),
    }
}

fn validated(eff: &Effective) {
    if let Err(errs) = validate::validate(&eff.state) {
        output::print_validation(&errs, &eff.output);
        std::process::exit(2);
    }
}

fn main() {
    let cli = Cli::parse();
    let log_format = cli.log_format.parse::<LogFormat>().unwrap_or_else(|e| fail(2, e));
    init_logging(&cli.log_level, log_format);

    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Validate { cfg } => {
            let eff = resolve(&cfg, None, None, true);
            validated(&eff);
            output::print_valid(eff.state.custom_configs.len(), &eff.output);
        }
        Commands::Render { cfg, name } => {
            let eff = resolve(&cfg, None, None, true);
            validated(&eff);
            let targets = eff.targets();
            let text = match name {
                None => render::render_global(
                    &eff.state.global,
                    eff.state.os_family,
                    &targets.include_dir,
                ),
                Some(n) => match eff.state.custom_configs.iter().find(|c| c.name == n) {
                    Some(c) => render::render_custom(c, &eff.state.global),
                    None => fail(2, format!("no custom config named '{}'", n)),
                },
            };
            print!("{}", text);
        }
        Commands::Docs {
            cfg,
            format,
            docs_dir,
        } => {
            let eff = resolve(&cfg, docs_dir, format, false);
            validated(&eff);
            let d = docs::emit(&eff.state, &eff.hostname, eff.docs_format);
            match docs::write_docs(&d, &eff.docs_dir, &eff.hostname) {
                Ok(paths) => output::print_docs_written(&paths, &eff.output),
                Err(e) => fail(
                    1,
                    format!("failed to write docs under {}: {}", eff.docs_dir.display(), e),
                ),
            }
        }
        Commands::Sync {
            cfg,
            dry_run,
            check,
            no_docs,
            docs_dir,
        } => {
            let eff = resolve(&cfg, docs_dir, None, no_docs);
            let opts = SyncOptions {
                write: !(dry_run || check),
            };
            let report = match run_sync(&eff.state, &eff.targets(), &opts) {
                Ok(r) => r,
                Err(errs) => {
                    output::print_validation(&errs, &eff.output);
                    std::process::exit(2);
                }
            };
            let facts = PackageFacts::probe();
            let notes = facts.missing_for(&eff.state.global);
            output::print_sync(&report, &eff.hostname, &notes, &facts, &eff.output);

            let mut code = if report.is_failed() { 1 } else { 0 };
            if opts.write && eff.docs_enabled {
                let d = docs::emit(&eff.state, &eff.hostname, eff.docs_format);
                match docs::write_docs(&d, &eff.docs_dir, &eff.hostname) {
                    Ok(paths) if eff.output != "json" => {
                        output::print_docs_written(&paths, &eff.output)
                    }
                    Ok(_) => {}
                    Err(e) => {
                        eprintln!(
                            "{} failed to write docs under {}: {}",
                            "✖ ⟦error⟧".red().bold(),
                            eff.docs_dir.display(),
                            e
                        );
                        code = 1;
                    }
                }
            }
            if check && report.has_changes() {
                code = 1;
            }
            std::process::exit(code);
        }
    }
}
