use clap::Parser;
use scenario_matcher::cli::commands::{cmd_parse, cmd_rank, cmd_resolve};
use scenario_matcher::cli::config::{Cli, Commands, ResolveOverrides, load_config};
use scenario_matcher::logging::init_logging;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Resolve {
            suite,
            scenarios,
            output_dir,
            write_locators,
            format,
            policy,
            beam_width,
            search_width,
            trace,
        } => {
            let overrides = ResolveOverrides {
                policy: policy.map(Into::into),
                beam_width,
                search_width,
                output_dir,
                write_locators,
                trace,
            };
            let all_ok = cmd_resolve(&suite, &scenarios, format, &overrides, config)?;
            if !all_ok {
                std::process::exit(1);
            }
        }
        Commands::Rank {
            markup,
            target,
            kind,
        } => {
            cmd_rank(&markup, &target, kind.into(), config)?;
        }
        Commands::Parse { suite } => {
            cmd_parse(&suite)?;
        }
    }

    Ok(())
}
