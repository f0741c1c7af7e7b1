//! Command-line parsing for `csptemp`.
//!
//! Parsing is kept separate from evaluation so the template code never sees
//! clap types.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

/// Print a light-curve template for a decline rate and filter.
#[derive(Debug, Parser)]
#[command(name = "csptemp", version, about = "CSP light-curve templates", allow_negative_numbers = true)]
pub struct Cli {
    /// Decline rate dm15 (mag).
    pub dm15: f64,

    /// Filter: one of u, g, r, i, B, V, Y, J, H, K, J_K, H_K.
    pub band: String,

    /// Print flux relative to peak instead of magnitudes.
    #[arg(long)]
    pub flux: bool,

    /// Treat epochs as observer-frame at this redshift.
    #[arg(short = 'z', long, default_value_t = 0.0)]
    pub redshift: f64,

    /// Do not stretch-extrapolate decline rates outside [0.7, 1.94].
    #[arg(long)]
    pub no_extrapolate: bool,

    /// Directory holding the coefficient bundles and calibration data.
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Render an ASCII plot after the listing.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Generate all bands and write the template to this JSON file.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positionals_and_flags() {
        let cli = Cli::try_parse_from(["csptemp", "1.1", "B", "--flux", "-z", "0.02", "-vv"]).unwrap();
        assert_eq!(cli.dm15, 1.1);
        assert_eq!(cli.band, "B");
        assert!(cli.flux && !cli.no_extrapolate && !cli.plot);
        assert_eq!(cli.redshift, 0.02);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn negative_decline_rate_is_a_value() {
        let cli = Cli::try_parse_from(["csptemp", "-0.2", "V"]).unwrap();
        assert_eq!(cli.dm15, -0.2);
    }

    #[test]
    fn missing_filter_is_a_usage_error() {
        assert!(Cli::try_parse_from(["csptemp", "1.1"]).is_err());
    }
}
