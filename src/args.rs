use clap::{Parser, Subcommand};

/// Collaborative tier lists, decided by single-elimination bracket voting.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The session configuration in JSON format: session name, join code
    /// and rules. Command line flags override the values it contains.
    #[clap(short, long, value_parser, global = true)]
    pub config: Option<String>,

    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false, global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Creates the bracket of a session. An existing bracket file is never overwritten.
    Generate {
        /// The items to rank, for example `--items Alien Brazil Clue`.
        #[clap(long = "items", value_parser, multiple_values = true)]
        items: Vec<String>,

        /// (file path) A file listing the items, either as a JSON array of strings or one item per line.
        #[clap(long, value_parser)]
        items_file: Option<String>,

        /// A fixed random seed, to reproduce the seeding shuffle.
        #[clap(long, value_parser)]
        seed: Option<u64>,

        /// Derives the random seed from the join code of the session.
        #[clap(long, value_parser)]
        join_code: Option<String>,

        /// (file path or 'stdout') Where to write the bracket.
        #[clap(short, long, value_parser)]
        out: String,
    },

    /// Records the vote of a participant for one matchup. Voting again replaces the previous vote.
    Vote {
        /// (file path) The bracket file.
        #[clap(short, long, value_parser)]
        bracket: String,

        /// (file path) The votes file. It is created if it does not exist.
        #[clap(long, value_parser)]
        votes: String,

        #[clap(long, value_parser)]
        participant: String,

        #[clap(long, value_parser)]
        round: u32,

        #[clap(long, value_parser)]
        position: u32,

        /// The item chosen by the participant.
        #[clap(long, value_parser)]
        choice: String,
    },

    /// Tallies the current round and moves the winners to the next round.
    Advance {
        /// (file path) The bracket file. It is updated in place.
        #[clap(short, long, value_parser)]
        bracket: String,

        /// (file path, optional) The votes file. Without votes, every matchup is a coin flip.
        #[clap(long, value_parser)]
        votes: Option<String>,

        /// A fixed random seed for tie breaks.
        #[clap(long, value_parser)]
        seed: Option<u64>,
    },

    /// Ranks the items of a bracket and splits them into tiers.
    Rank {
        /// (file path) The bracket file.
        #[clap(short, long, value_parser)]
        bracket: String,

        /// (default 5) The number of tiers.
        #[clap(long, value_parser)]
        tiers: Option<u32>,

        /// (file path, 'stdout' or empty) If specified, the ranking summary will be written in JSON
        /// format to the given location.
        #[clap(short, long, value_parser)]
        out: Option<String>,

        /// (file path) A reference ranking summary in JSON format. If provided, tierbracket will
        /// check that the computed summary matches the reference.
        #[clap(short, long, value_parser)]
        reference: Option<String>,
    },
}
