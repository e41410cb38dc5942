//! ferrojail - deterministic lifecycle manager for VNET jails on ZFS

mod cli;
mod command;
mod config;
mod error;
mod host;
mod jail;
mod parse;
mod zfs;

use cli::{Cli, Commands};
use config::Config;
use error::{Error, Result};
use host::HostContext;
use std::collections::HashMap;
use std::path::Path;

fn main() {
    if let Err(e) = run() {
        eprintln!("\x1b[31merror:\x1b[0m {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse_args();

    if matches!(cli.command, Commands::Completion { .. }) {
        if let Commands::Completion { shell } = cli.command {
            Cli::generate_completion(shell);
        }
        return Ok(());
    }

    let mut config = load_config(&cli.config)?;
    config.debug = config.debug || cli.debug;
    let ctx = HostContext::bootstrap(config)?;

    match cli.command {
        Commands::Completion { .. } => unreachable!("handled above"),

        Commands::New { name } => {
            let jail = ctx.jail(name);
            jail.create_fs()?;
            print_status(&jail);
        }

        Commands::Run {
            name,
            private,
            no_private,
            vnet,
            no_vnet,
            params,
        } => {
            let jail = ctx.jail(name);
            if !jail.check_fs() {
                jail.create_fs()?;
            }
            let extra = params_to_map(params);
            jail.start(
                effective_flag(vnet, no_vnet),
                effective_flag(private, no_private),
                &extra,
            )?;
            print_status(&jail);
        }

        Commands::Start {
            name,
            private,
            no_private,
            vnet,
            no_vnet,
            params,
        } => {
            let jail = ctx.jail(name);
            let extra = params_to_map(params);
            jail.start(
                effective_flag(vnet, no_vnet),
                effective_flag(private, no_private),
                &extra,
            )?;
            print_status(&jail);
        }

        Commands::Stop { name } => {
            let jail = ctx.jail(name);
            jail.stop()?;
            println!("\x1b[33m{}\x1b[0m stopped", jail.name);
        }

        Commands::Remove { name, force } => {
            let jail = ctx.jail(name);
            jail.remove(force)?;
            println!("\x1b[33m{}\x1b[0m removed", jail.name);
        }

        Commands::Cleanup {
            name,
            force,
            destroy_fs,
        } => {
            let jail = ctx.jail(name);
            let report = jail.cleanup(force, destroy_fs);
            println!(
                "\x1b[33m{}\x1b[0m cleanup: running={} devfs={} epair={} fs={}",
                jail.name, report.running, report.devfs_mounted, report.epair_present, report.fs_present
            );
        }

        Commands::List { json } => {
            let jails = ctx.get_jails()?;
            if json {
                let rows: Vec<_> = jails
                    .iter()
                    .map(|j| {
                        serde_json::json!({
                            "name": j.name,
                            "hash": j.hash,
                            "ipv6": j.ipv6,
                            "running": j.is_running(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows).unwrap());
            } else {
                println!("{:<20} {:<16} {:<28} {:<8}", "NAME", "HASH", "IPV6", "RUNNING");
                for jail in &jails {
                    let running = jail.is_running();
                    let running_str = if running {
                        "\x1b[32mtrue\x1b[0m"
                    } else {
                        "false"
                    };
                    println!(
                        "{:<20} {:<16} {:<28} {running_str}",
                        jail.name, jail.hash, jail.ipv6
                    );
                }
            }
        }

        Commands::Sysrc { name, args } => {
            let jail = ctx.jail(name);
            let mut argv: Vec<String> = vec!["sysrc".to_string(), "-R".to_string(), jail.path.clone()];
            argv.extend(args);
            let refs: Vec<&str> = argv.iter().map(|s| s.as_str()).collect();
            let out = ctx.cmd(&refs)?;
            if !out.is_empty() {
                println!("{out}");
            }
        }

        Commands::Jexec { name, command } => {
            let jail = ctx.jail(name);
            let mut argv: Vec<String> = vec!["jexec".to_string(), jail.hash.clone()];
            argv.extend(command);
            let refs: Vec<&str> = argv.iter().map(|s| s.as_str()).collect();
            let out = ctx.cmd(&refs)?;
            if !out.is_empty() {
                println!("{out}");
            }
        }

        Commands::Install { .. } => {
            return Err(Error::NotImplemented("install"));
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        Config::load(path)
    } else {
        Ok(Config::default())
    }
}

fn effective_flag(flag: bool, negated: bool) -> bool {
    flag && !negated
}

fn params_to_map(params: Vec<(String, String)>) -> HashMap<String, String> {
    params.into_iter().collect()
}

fn print_status(jail: &jail::Jail<'_>) {
    println!(
        "\x1b[32m{}\x1b[0m hash={} ipv6={}",
        jail.name, jail.hash, jail.ipv6
    );
}
