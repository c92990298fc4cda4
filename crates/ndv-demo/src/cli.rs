#![forbid(unsafe_code)]

//! Command-line argument parsing for the ndv demo.
//!
//! Parses args by hand and supports environment overrides via the
//! `NDV_DEMO_*` prefix. Explicit flags beat the environment, which beats
//! the defaults.

use std::env;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
ndv demo: display-model events walkthrough

USAGE:
    ndv-demo [OPTIONS]

Builds a display model, installs a green default LUT, and prints the
events fired by assigning a channel axis and two current-index entries.

OPTIONS:
    --log-level=LEVEL    Log filter written to stderr, e.g. 'debug' or
                         'ndv_model=trace' (default: warn)
    --dump-json          Print the final model as JSON after the events
    --help, -h           Show this help message
    --version, -V        Show version

ENVIRONMENT VARIABLES:
    NDV_DEMO_LOG         Override --log-level
    NDV_DEMO_DUMP_JSON   Enable --dump-json (1/true)";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// `tracing` filter directive for stderr logging.
    pub log_level: String,
    /// Print the model as JSON once the scenario has run.
    pub dump_json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ParseError {
    Help,
    Version,
    InvalidValue { flag: &'static str, value: String },
    UnknownArg(String),
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            log_level: "warn".into(),
            dump_json: false,
        }
    }
}

impl Opts {
    /// Parse command-line arguments and environment variables, exiting the
    /// process for `--help`, `--version`, and invalid input.
    pub fn parse() -> Self {
        match Self::parse_from_env_and_args(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(opts) => opts,
            Err(ParseError::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Err(ParseError::Version) => {
                println!("ndv-demo {VERSION}");
                process::exit(0);
            }
            Err(ParseError::InvalidValue { flag, value }) => {
                eprintln!("Invalid {flag} value: {value}");
                process::exit(1);
            }
            Err(ParseError::UnknownArg(arg)) => {
                eprintln!("Unknown argument: {arg}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    fn parse_from_env_and_args<I, S, F>(args: I, get_env: F) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        if let Some(val) = get_env("NDV_DEMO_LOG")
            && !val.trim().is_empty()
        {
            opts.log_level = val.trim().to_string();
        }
        if let Some(val) = get_env("NDV_DEMO_DUMP_JSON") {
            opts.dump_json = val == "1" || val.eq_ignore_ascii_case("true");
        }

        for arg in args {
            match arg.as_ref() {
                "--help" | "-h" => return Err(ParseError::Help),
                "--version" | "-V" => return Err(ParseError::Version),
                "--dump-json" => opts.dump_json = true,
                other => {
                    if let Some(val) = other.strip_prefix("--log-level=") {
                        if val.trim().is_empty() {
                            return Err(ParseError::InvalidValue {
                                flag: "--log-level",
                                value: val.to_string(),
                            });
                        }
                        opts.log_level = val.trim().to_string();
                    } else {
                        return Err(ParseError::UnknownArg(other.to_string()));
                    }
                }
            }
        }

        Ok(opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_with_env<I, S>(
        args: I,
        env_pairs: &[(&'static str, &'static str)],
    ) -> Result<Opts, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = std::collections::HashMap::new();
        for (key, value) in env_pairs {
            map.insert(*key, *value);
        }
        Opts::parse_from_env_and_args(args, |key| map.get(key).map(|value| (*value).to_string()))
    }

    #[test]
    fn default_opts() {
        let opts = Opts::default();
        assert_eq!(opts.log_level, "warn");
        assert!(!opts.dump_json);
        assert_eq!(parse_with_env(Vec::<&str>::new(), &[]), Ok(opts));
    }

    #[test]
    fn version_string_nonempty() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn help_text_lists_options_and_env_vars() {
        assert!(HELP_TEXT.contains("--log-level=LEVEL"));
        assert!(HELP_TEXT.contains("--dump-json"));
        assert!(HELP_TEXT.contains("NDV_DEMO_LOG"));
        assert!(HELP_TEXT.contains("NDV_DEMO_DUMP_JSON"));
    }

    #[test]
    fn flags_parse() {
        let opts = parse_with_env(["--log-level=debug", "--dump-json"], &[]).unwrap();
        assert_eq!(opts.log_level, "debug");
        assert!(opts.dump_json);
    }

    #[test]
    fn env_overrides_defaults() {
        let opts = parse_with_env(
            Vec::<&str>::new(),
            &[("NDV_DEMO_LOG", "ndv_model=trace"), ("NDV_DEMO_DUMP_JSON", "TRUE")],
        )
        .unwrap();
        assert_eq!(opts.log_level, "ndv_model=trace");
        assert!(opts.dump_json);

        let off = parse_with_env(Vec::<&str>::new(), &[("NDV_DEMO_DUMP_JSON", "0")]).unwrap();
        assert!(!off.dump_json);
    }

    #[test]
    fn flags_override_env() {
        let opts = parse_with_env(["--log-level=error"], &[("NDV_DEMO_LOG", "trace")]).unwrap();
        assert_eq!(opts.log_level, "error");
    }

    #[test]
    fn blank_env_log_is_ignored() {
        let opts = parse_with_env(Vec::<&str>::new(), &[("NDV_DEMO_LOG", "  ")]).unwrap();
        assert_eq!(opts.log_level, "warn");
    }

    #[test]
    fn help_and_version_short_circuit() {
        assert_eq!(parse_with_env(["--dump-json", "-h"], &[]), Err(ParseError::Help));
        assert_eq!(parse_with_env(["--version"], &[]), Err(ParseError::Version));
        assert_eq!(parse_with_env(["-V"], &[]), Err(ParseError::Version));
    }

    #[test]
    fn bad_input_is_reported() {
        assert_eq!(
            parse_with_env(["--log-level="], &[]),
            Err(ParseError::InvalidValue {
                flag: "--log-level",
                value: String::new(),
            })
        );
        assert_eq!(
            parse_with_env(["--screen=2"], &[]),
            Err(ParseError::UnknownArg("--screen=2".into()))
        );
    }
}
