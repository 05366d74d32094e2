#![forbid(unsafe_code)]

//! Command-line argument parsing for the shell.
//!
//! Parses args by hand. Supports environment variable overrides via the
//! `AMBI_*` prefix; explicit flags win over the environment.

use std::env;
use std::process;

use ambi::SessionConfig;
use thiserror::Error;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Words the shell seeds the trie with unless `--vocab` says otherwise.
pub const DEMO_VOCABULARY: [&str; 8] = [
    "the", "there", "their", "robot", "robot1", "robot2_b", "robber", "robbed",
];

pub const HELP_TEXT: &str = "\
ambi-shell - prefix autocompletion at the terminal

USAGE:
    ambi-shell [OPTIONS]

OPTIONS:
    --prompt=TEXT          Prompt label (default: 'ambi>')
    --vocab=a,b,c          Seed words, comma separated (default: demo words)
    --max-sequence-len=N   Escape sequence framing bound, 1-32 (default: 3)
    --learn                Add submitted queries to the completion words
    --no-color             Disable colored output
    --help, -h             Show this help message
    --version, -V          Show version

KEYS:
    letters, digits, _ -   Edit the query
    Backspace              Delete the last character
    Tab                    List completions for the query
    Enter                  Submit the query
    Up / Down              Recall earlier queries
    Ctrl+C / Ctrl+D        Quit

ENVIRONMENT VARIABLES:
    AMBI_PROMPT               Override --prompt
    AMBI_VOCAB                Override --vocab
    AMBI_MAX_SEQUENCE_LEN     Override --max-sequence-len
    AMBI_LEARN                Set to 1/true/yes to enable --learn
    AMBI_NO_COLOR             Set to anything non-empty to disable color
    AMBI_LOG                  Log filter for stderr output (default: warn)";

/// Rejected command line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CliError {
    /// A flag value did not parse.
    #[error("Invalid {flag} value: {value}")]
    InvalidValue { flag: &'static str, value: String },
    /// An unrecognized argument.
    #[error("Unknown argument: {0}")]
    UnknownArgument(String),
}

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run a session with these options.
    Run(Opts),
    /// Print the help text.
    Help,
    /// Print the version.
    Version,
}

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Prompt label.
    pub prompt: String,
    /// Seed vocabulary.
    pub vocabulary: Vec<String>,
    /// Escape sequence framing bound.
    pub max_sequence_len: usize,
    /// Insert submissions into the trie.
    pub learn: bool,
    /// Emit colors.
    pub color: bool,
}

impl Default for Opts {
    fn default() -> Self {
        let config = SessionConfig::default();
        Self {
            prompt: config.prompt,
            vocabulary: DEMO_VOCABULARY.iter().map(|w| (*w).to_string()).collect(),
            max_sequence_len: config.max_sequence_len,
            learn: config.learn_submissions,
            color: config.styled,
        }
    }
}

impl Opts {
    /// Parse command-line arguments and environment variables.
    ///
    /// Prints help or version and exits when asked to; prints the error and
    /// exits with status 1 on a bad argument.
    pub fn parse() -> Self {
        match Self::try_parse_from(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(Command::Run(opts)) => opts,
            Ok(Command::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Command::Version) => {
                println!("ambi-shell {VERSION}");
                process::exit(0);
            }
            Err(err) => {
                eprintln!("{err}");
                eprintln!("Try --help for usage.");
                process::exit(1);
            }
        }
    }

    /// Parse `args` (without the program name) with `var` as the
    /// environment.
    ///
    /// Invalid environment values are ignored; invalid flags are errors.
    ///
    /// # Errors
    ///
    /// Returns [`CliError`] for an unknown argument or an unparsable value.
    pub fn try_parse_from<I, S, F>(args: I, var: F) -> Result<Command, CliError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        // Apply environment variable defaults first
        if let Some(val) = var("AMBI_PROMPT") {
            opts.prompt = val;
        }
        if let Some(val) = var("AMBI_VOCAB") {
            opts.vocabulary = split_vocabulary(&val);
        }
        if let Some(val) = var("AMBI_MAX_SEQUENCE_LEN")
            && let Ok(n) = val.parse()
        {
            opts.max_sequence_len = n;
        }
        if let Some(val) = var("AMBI_LEARN") {
            opts.learn = is_truthy(&val);
        }
        if let Some(val) = var("AMBI_NO_COLOR")
            && !val.is_empty()
        {
            opts.color = false;
        }

        // Parse command-line args (override env vars)
        for arg in args {
            match arg.as_ref() {
                "--help" | "-h" => return Ok(Command::Help),
                "--version" | "-V" => return Ok(Command::Version),
                "--learn" => opts.learn = true,
                "--no-color" => opts.color = false,
                other => {
                    if let Some(val) = other.strip_prefix("--prompt=") {
                        opts.prompt = val.to_string();
                    } else if let Some(val) = other.strip_prefix("--vocab=") {
                        opts.vocabulary = split_vocabulary(val);
                    } else if let Some(val) = other.strip_prefix("--max-sequence-len=") {
                        opts.max_sequence_len =
                            val.parse().map_err(|_| CliError::InvalidValue {
                                flag: "--max-sequence-len",
                                value: val.to_string(),
                            })?;
                    } else {
                        return Err(CliError::UnknownArgument(other.to_string()));
                    }
                }
            }
        }

        Ok(Command::Run(opts))
    }

    /// Session configuration for these options.
    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::default()
            .with_prompt(self.prompt.as_str())
            .with_vocabulary(self.vocabulary.iter().cloned())
            .with_max_sequence_len(self.max_sequence_len)
            .with_learn_submissions(self.learn)
            .with_styled(self.color)
    }
}

fn split_vocabulary(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_truthy(val: &str) -> bool {
    matches!(
        val.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
