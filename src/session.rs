use log::{debug, info, warn};

use bracket_ranking::builder::VoteBook;
use bracket_ranking::*;
use snafu::{prelude::*, Snafu};

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::session::records::*;

mod io_items;

pub use io_items::read_items_file;

#[derive(Debug, Snafu)]
pub enum SessionError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error serializing to JSON"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("{source}"))]
    Bracket { source: BracketErrors },
    #[snafu(display("A bracket already exists at {path}, refusing to generate it again"))]
    BracketExists { path: String },
    #[snafu(display("Malformed bracket file: {reason}"))]
    MalformedBracket { reason: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type SessionResult<T> = Result<T, SessionError>;

/// The session files, as stored on disk.
pub mod records {
    use serde::{Deserialize, Serialize};

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct MatchupRecord {
        pub round: u32,
        pub position: u32,
        #[serde(rename = "itemAId")]
        pub item_a_id: Option<String>,
        #[serde(rename = "itemBId")]
        pub item_b_id: Option<String>,
        #[serde(rename = "winnerId")]
        pub winner_id: Option<String>,
    }

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct BracketRecord {
        #[serde(rename = "sessionId")]
        pub session_id: Option<String>,
        pub rounds: u32,
        /// All the items of the session, in the order they were submitted.
        pub items: Vec<String>,
        pub matchups: Vec<MatchupRecord>,
    }

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct VoteRecord {
        pub round: u32,
        pub position: u32,
        #[serde(rename = "participantId")]
        pub participant_id: String,
        #[serde(rename = "chosenItemId")]
        pub chosen_item_id: String,
    }

    #[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
    pub struct SessionRules {
        #[serde(rename = "tierCount")]
        pub tier_count: Option<u32>,
        #[serde(rename = "tiebreakMode")]
        pub tiebreak_mode: Option<String>,
        #[serde(rename = "randomSeed")]
        pub random_seed: Option<String>,
    }

    #[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
    pub struct SessionConfig {
        #[serde(rename = "sessionName")]
        pub session_name: Option<String>,
        #[serde(rename = "joinCode")]
        pub join_code: Option<String>,
        #[serde(default)]
        pub rules: SessionRules,
    }

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct TierRecord {
        pub label: String,
        pub items: Vec<String>,
    }

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct RankingSummary {
        #[serde(rename = "sessionId")]
        pub session_id: Option<String>,
        pub complete: bool,
        pub ranking: Vec<String>,
        pub tiers: Vec<TierRecord>,
    }
}

// ********* Conversions **********

pub fn bracket_to_record(session_id: Option<String>, items: &[ItemId], bracket: &Bracket) -> BracketRecord {
    let mut matchups: Vec<MatchupRecord> = bracket
        .matchups
        .iter()
        .map(|m| MatchupRecord {
            round: m.round,
            position: m.position,
            item_a_id: m.item_a.clone(),
            item_b_id: m.item_b.clone(),
            winner_id: m.winner.clone(),
        })
        .collect();
    matchups.sort_by_key(|m| (m.round, m.position));
    BracketRecord {
        session_id,
        rounds: bracket.total_rounds,
        items: items.to_vec(),
        matchups,
    }
}

/// Rebuilds a bracket from its record, checking that the grid of matchups is complete.
pub fn record_to_bracket(record: &BracketRecord) -> SessionResult<Bracket> {
    let rounds = record.rounds;
    if rounds == 0 || rounds > 31 {
        return MalformedBracketSnafu {
            reason: format!("invalid number of rounds {}", rounds),
        }
        .fail();
    }
    let size: u64 = 1 << rounds;
    let mut seen: HashSet<(u32, u32)> = HashSet::new();
    let mut matchups: Vec<Matchup> = Vec::with_capacity(record.matchups.len());
    for mr in record.matchups.iter() {
        let in_range = mr.round >= 1 && mr.round <= rounds && (mr.position as u64) < (size >> mr.round);
        ensure!(
            in_range,
            MalformedBracketSnafu {
                reason: format!("matchup out of range: round {} position {}", mr.round, mr.position),
            }
        );
        ensure!(
            seen.insert((mr.round, mr.position)),
            MalformedBracketSnafu {
                reason: format!("duplicated matchup: round {} position {}", mr.round, mr.position),
            }
        );
        let m = Matchup {
            round: mr.round,
            position: mr.position,
            item_a: mr.item_a_id.clone(),
            item_b: mr.item_b_id.clone(),
            winner: mr.winner_id.clone(),
        };
        ensure!(
            !(m.round == 1 && m.winner.is_none() && m.occupants().len() == 1),
            MalformedBracketSnafu {
                reason: format!("unresolved bye at round 1 position {}", mr.position),
            }
        );
        if let Some(w) = m.winner.as_ref() {
            ensure!(
                m.has_occupant(w),
                MalformedBracketSnafu {
                    reason: format!(
                        "winner {:?} is not playing at round {} position {}",
                        w, mr.round, mr.position
                    ),
                }
            );
        }
        matchups.push(m);
    }
    ensure!(
        matchups.len() as u64 == size - 1,
        MalformedBracketSnafu {
            reason: format!("expected {} matchups, found {}", size - 1, matchups.len()),
        }
    );
    matchups.sort_by_key(|m| (m.round, m.position));
    Ok(Bracket {
        total_rounds: rounds,
        matchups,
    })
}

pub fn records_to_book(records: &[VoteRecord]) -> VoteBook {
    let mut book = VoteBook::new();
    for vr in records.iter() {
        book.record(
            vr.round,
            vr.position,
            Vote {
                participant: vr.participant_id.clone(),
                chosen: vr.chosen_item_id.clone(),
            },
        );
    }
    book
}

pub fn book_to_records(book: &VoteBook) -> Vec<VoteRecord> {
    book.iter()
        .map(|(round, position, v)| VoteRecord {
            round,
            position,
            participant_id: v.participant.clone(),
            chosen_item_id: v.chosen.clone(),
        })
        .collect()
}

// ********* Configuration **********

pub fn read_config(path: Option<&str>) -> SessionResult<SessionConfig> {
    match path {
        Some(p) => read_json(p),
        None => Ok(SessionConfig::default()),
    }
}

/// Turns the rules of the configuration file into bracket rules.
pub fn validate_rules(config: &SessionConfig) -> SessionResult<BracketRules> {
    let rules = &config.rules;
    let tiebreak_mode = match rules.tiebreak_mode.as_deref() {
        None | Some("random") => TieBreakMode::Random,
        Some("seeded") => {
            match (rules.random_seed.as_deref(), config.join_code.as_deref()) {
                (Some(s), _) => match s.parse::<u64>() {
                    Result::Ok(x) => TieBreakMode::Seeded(x),
                    Err(_) => {
                        whatever!("Cannot understand randomSeed {:?}: expected an integer", s)
                    }
                },
                (None, Some(code)) => TieBreakMode::Seeded(seed_from_join_code(code)),
                (None, None) => {
                    whatever!("The seeded tiebreak mode needs a randomSeed or a joinCode")
                }
            }
        }
        Some(x) => {
            whatever!("Cannot use tiebreak mode {:?} (expected random or seeded)", x)
        }
    };
    let tier_count = match rules.tier_count {
        None => BracketRules::DEFAULT_RULES.tier_count,
        Some(0) => {
            whatever!("tierCount must be at least 1")
        }
        Some(x) => x,
    };
    Ok(BracketRules {
        tiebreak_mode,
        tier_count,
    })
}

// ********* File access **********

fn read_json<T: DeserializeOwned>(path: &str) -> SessionResult<T> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    debug!("read_json: {} bytes from {}", contents.len(), path);
    serde_json::from_str(&contents).context(ParsingJsonSnafu { path })
}

fn to_pretty_json<T: Serialize>(value: &T) -> SessionResult<String> {
    serde_json::to_string_pretty(value).context(SerializingJsonSnafu {})
}

fn write_output(path: &str, contents: &str) -> SessionResult<()> {
    if path == "stdout" {
        println!("{}", contents);
        return Ok(());
    }
    fs::write(path, contents).context(WritingFileSnafu { path })
}

/// Writes a file that must not exist yet.
fn write_new_file(path: &str, contents: &str) -> SessionResult<()> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return BracketExistsSnafu { path }.fail();
        }
        Err(e) => return Err(e).context(WritingFileSnafu { path }),
    };
    file.write_all(contents.as_bytes())
        .context(WritingFileSnafu { path })
}

pub fn read_bracket(path: &str) -> SessionResult<(BracketRecord, Bracket)> {
    let record: BracketRecord = read_json(path)?;
    let bracket = record_to_bracket(&record)?;
    info!(
        "Loaded bracket {:?}: {} items, {} rounds",
        record.session_id,
        record.items.len(),
        bracket.total_rounds
    );
    Ok((record, bracket))
}

/// Reads the votes file. A missing file means no vote has been cast yet.
pub fn read_votes(path: &str) -> SessionResult<Vec<VoteRecord>> {
    if !Path::new(path).exists() {
        debug!("read_votes: {} does not exist yet", path);
        return Ok(Vec::new());
    }
    read_json(path)
}

// ********* Operations **********

/// Creates the bracket of a session and writes it. The bracket is created only once.
pub fn run_generate(
    items: &[ItemId],
    session_id: Option<String>,
    rules: &BracketRules,
    out: &str,
) -> SessionResult<BracketRecord> {
    let mut rng = rng_for(rules.tiebreak_mode);
    let bracket = Bracket::create(items, &mut rng).context(BracketSnafu {})?;
    let record = bracket_to_record(session_id, items, &bracket);
    let contents = to_pretty_json(&record)?;
    if out == "stdout" {
        write_output(out, &contents)?;
    } else {
        write_new_file(out, &contents)?;
    }
    info!(
        "Bracket with {} rounds and {} matchups written to {}",
        record.rounds,
        record.matchups.len(),
        out
    );
    Ok(record)
}

/// Validates a vote against the bracket and upserts it into the votes file.
pub fn run_vote(
    bracket_path: &str,
    votes_path: &str,
    participant: &str,
    round: u32,
    position: u32,
    choice: &str,
) -> SessionResult<Vec<VoteRecord>> {
    let (_, bracket) = read_bracket(bracket_path)?;
    let mut book = records_to_book(&read_votes(votes_path)?);
    book.cast(&bracket, round, position, participant, choice)
        .context(BracketSnafu {})?;
    info!(
        "{} votes for {:?} at round {} position {}",
        participant, choice, round, position
    );
    let records = book_to_records(&book);
    write_output(votes_path, &to_pretty_json(&records)?)?;
    Ok(records)
}

/// Tallies the current round of the bracket and writes the updated bracket back.
pub fn run_advance(
    bracket_path: &str,
    votes_path: Option<&str>,
    rules: &BracketRules,
) -> SessionResult<RoundOutcome> {
    let (record, mut bracket) = read_bracket(bracket_path)?;
    let votes = match votes_path {
        Some(p) => read_votes(p)?,
        None => {
            warn!("No votes file given, every matchup of the round is a coin flip");
            Vec::new()
        }
    };
    let book = records_to_book(&votes);
    let mut rng = rng_for(rules.tiebreak_mode);
    let outcome = bracket
        .tally_and_advance_round(&book, &mut rng)
        .context(BracketSnafu {})?;
    match &outcome {
        RoundOutcome::Advanced { round, decided } => {
            for (position, winner) in decided.iter() {
                info!("Round {} position {}: {} advances", round, position, winner);
            }
            let updated = bracket_to_record(record.session_id.clone(), &record.items, &bracket);
            write_output(bracket_path, &to_pretty_json(&updated)?)?;
        }
        RoundOutcome::Complete => {
            info!("The bracket is complete, nothing to tally");
        }
    }
    Ok(outcome)
}

pub fn build_summary(record: &BracketRecord, bracket: &Bracket, rules: &BracketRules) -> SessionResult<RankingSummary> {
    let ranking = bracket.rank(&record.items);
    let tiers = assign_tiers(&ranking, rules.tier_count).context(BracketSnafu {})?;
    let labels = default_tier_labels(rules.tier_count);
    Ok(RankingSummary {
        session_id: record.session_id.clone(),
        complete: bracket.is_complete(),
        ranking,
        tiers: labels
            .into_iter()
            .zip(tiers.into_iter())
            .map(|(label, items)| TierRecord { label, items })
            .collect(),
    })
}

/// Ranks the bracket, optionally writes the summary and checks it against a reference.
pub fn run_rank(
    bracket_path: &str,
    rules: &BracketRules,
    out: Option<&str>,
    check_summary_path: Option<&str>,
) -> SessionResult<RankingSummary> {
    let (record, bracket) = read_bracket(bracket_path)?;
    if !bracket.is_complete() {
        warn!("The bracket is not complete: ranking by elimination round");
    }
    let summary = build_summary(&record, &bracket, rules)?;
    for tier in summary.tiers.iter() {
        info!("{:>3}: {}", tier.label, tier.items.join(", "));
    }

    let summary_js: JSValue = serde_json::to_value(&summary).context(SerializingJsonSnafu {})?;
    let pretty_summary = to_pretty_json(&summary_js)?;
    if let Some(p) = out {
        write_output(p, &pretty_summary)?;
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        let summary_ref: JSValue = read_json(summary_p)?;
        let pretty_summary_ref = to_pretty_json(&summary_ref)?;
        if pretty_summary_ref != pretty_summary {
            warn!("Found differences with the reference summary");
            print_diff(pretty_summary_ref.as_str(), pretty_summary.as_str(), "\n");
            whatever!("Difference detected between computed summary and reference summary")
        }
    }
    Ok(summary)
}
