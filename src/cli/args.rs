//! Command-line argument parsing for the GoBarber client
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// GoBarber - browse providers and book appointments
#[derive(Parser, Debug)]
#[command(name = "gobarber")]
#[command(version)]
#[command(about = "Browse GoBarber providers and book appointments", long_about = None)]
pub struct Args {
    /// API base URL (overrides config and GOBARBER_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List bookable providers
    Providers,

    /// Show a provider's morning and afternoon slots for a day
    Availability {
        /// Provider id
        #[arg(short, long)]
        provider: String,

        /// Day to inspect (YYYY-MM-DD, today by default)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Book an appointment
    Book {
        /// Provider id
        #[arg(short, long)]
        provider: String,

        /// Day of the appointment (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,

        /// Hour of the appointment (0-23)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=23))]
        hour: u8,
    },

    /// Display current configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }
}

impl Verbosity {
    /// Default `tracing` level for this verbosity
    pub fn log_level(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "info",
            Verbosity::VeryVerbose => "debug",
        }
    }

    /// Check if should show progress spinners
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if should show detailed events
    pub fn show_events(&self) -> bool {
        matches!(self, Verbosity::Verbose | Verbosity::VeryVerbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_book() {
        let args = Args::try_parse_from([
            "gobarber", "book", "--provider", "p1", "--date", "2024-03-10", "--hour", "14",
        ])
        .unwrap();

        match args.command {
            Commands::Book {
                provider,
                date,
                hour,
            } => {
                assert_eq!(provider, "p1");
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
                assert_eq!(hour, 14);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_book_rejects_hour_24() {
        let result = Args::try_parse_from([
            "gobarber", "book", "-p", "p1", "-d", "2024-03-10", "--hour", "24",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_availability_date_optional() {
        let args = Args::try_parse_from(["gobarber", "availability", "-p", "p1"]).unwrap();
        assert!(matches!(
            args.command,
            Commands::Availability { date: None, .. }
        ));
    }

    #[test]
    fn test_bad_date_rejected() {
        let result = Args::try_parse_from(["gobarber", "availability", "-p", "p1", "-d", "10/03/2024"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verbosity_levels() {
        let args = Args::try_parse_from(["gobarber", "-q", "providers"]).unwrap();
        assert_eq!(args.verbosity(), Verbosity::Quiet);

        let args = Args::try_parse_from(["gobarber", "providers"]).unwrap();
        assert_eq!(args.verbosity(), Verbosity::Normal);

        let args = Args::try_parse_from(["gobarber", "providers", "-v"]).unwrap();
        assert_eq!(args.verbosity(), Verbosity::Verbose);

        let args = Args::try_parse_from(["gobarber", "-vv", "providers"]).unwrap();
        assert_eq!(args.verbosity(), Verbosity::VeryVerbose);
        assert_eq!(args.verbosity().log_level(), "debug");
    }

    #[test]
    fn test_verbosity_flags() {
        assert!(!Verbosity::Quiet.show_progress());
        assert!(Verbosity::Normal.show_progress());
        assert!(!Verbosity::Normal.show_events());
        assert!(Verbosity::Verbose.show_events());
    }
}
