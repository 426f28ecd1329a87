use clap::Parser;
use log::{info, warn};
use snafu::ErrorCompat;

use bracket_ranking::*;

mod args;
mod session;

use crate::args::{Args, Command};
use crate::session::*;

fn items_from_args(items: &[String], items_file: Option<&str>) -> SessionResult<Vec<ItemId>> {
    let mut res: Vec<ItemId> = items.to_vec();
    if let Some(p) = items_file {
        res.extend(read_items_file(p)?);
    }
    Ok(res)
}

fn run(args: &Args) -> SessionResult<()> {
    let config = read_config(args.config.as_deref())?;
    let mut rules = validate_rules(&config)?;
    info!("Session {:?}, rules: {:?}", config.session_name, rules);

    match &args.command {
        Command::Generate {
            items,
            items_file,
            seed,
            join_code,
            out,
        } => {
            if let Some(s) = seed {
                rules.tiebreak_mode = TieBreakMode::Seeded(*s);
            } else if let Some(code) = join_code {
                rules.tiebreak_mode = TieBreakMode::Seeded(seed_from_join_code(code));
            }
            let all_items = items_from_args(items, items_file.as_deref())?;
            run_generate(&all_items, config.session_name.clone(), &rules, out)?;
        }
        Command::Vote {
            bracket,
            votes,
            participant,
            round,
            position,
            choice,
        } => {
            run_vote(bracket, votes, participant, *round, *position, choice)?;
        }
        Command::Advance {
            bracket,
            votes,
            seed,
        } => {
            if let Some(s) = seed {
                rules.tiebreak_mode = TieBreakMode::Seeded(*s);
            }
            if let RoundOutcome::Complete = run_advance(bracket, votes.as_deref(), &rules)? {
                println!("The bracket is complete.");
            }
        }
        Command::Rank {
            bracket,
            tiers,
            out,
            reference,
        } => {
            if let Some(t) = tiers {
                rules.tier_count = *t;
            }
            let summary = run_rank(bracket, &rules, out.as_deref(), reference.as_deref())?;
            if out.is_none() {
                for (idx, item) in summary.ranking.iter().enumerate() {
                    println!("{:>4}. {}", idx + 1, item);
                }
            }
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    if let Err(e) = run(&args) {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
