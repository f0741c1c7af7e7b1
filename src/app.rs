//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - sets up logging
//! - builds the shared surface engine
//! - evaluates and prints the requested template
//! - writes the optional plot and export

use std::ffi::OsString;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::domain::{Band, EngineConfig, Epochs, EvalOptions};
use crate::error::AppError;
use crate::io::write_template_json;
use crate::report::{ListingContext, format_listing};
use crate::surface::{Engine, initialize};
use crate::template::make_template;

/// Epoch grid printed by the CLI: `[LISTING_START, LISTING_STOP)` in `LISTING_STEP` days.
const LISTING_START: f64 = -10.0;
const LISTING_STOP: f64 = 70.0;
const LISTING_STEP: f64 = 1.0;

/// Entry point for the `csptemp` binary.
pub fn run() -> Result<(), AppError> {
    run_from(std::env::args_os())
}

/// Like `run`, with an explicit argv.
pub fn run_from<I, T>(args: I) -> Result<(), AppError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        // --help / --version
        Err(err) if !err.use_stderr() => {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(AppError::new(1, err.to_string().trim_end().to_string())),
    };

    init_logging(cli.verbose);

    let config = engine_config(&cli);
    let engine = initialize(&config)?;
    info!(surface = engine.kind().display_name(), data_dir = %config.data_dir.display(), "engine ready");

    print!("{}", render(&cli, &engine)?);
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// `--data-dir` wins over `CSPTEMP_DATA_DIR` / `.env`.
fn engine_config(cli: &Cli) -> EngineConfig {
    let mut config = EngineConfig::from_env();
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    config
}

fn eval_options(cli: &Cli) -> EvalOptions {
    EvalOptions {
        redshift: cli.redshift,
        as_magnitude: !cli.flux,
        extrapolate: !cli.no_extrapolate,
    }
}

/// Evaluate the requested band and build the terminal output; writes the
/// export file when asked.
pub fn render(cli: &Cli, engine: &Engine) -> Result<String, AppError> {
    let band: Band = cli.band.parse()?;
    let options = eval_options(cli);
    let mut template = make_template(engine, cli.dm15);

    let epochs = Epochs::range(LISTING_START, LISTING_STOP, LISTING_STEP);
    let curve = template.eval(band, epochs.clone(), options)?.into_curve();

    let ctx = ListingContext {
        dm15: cli.dm15,
        band,
        surface: engine.kind(),
        options,
    };
    let mut out = format_listing(&ctx, epochs.as_slice(), &curve);

    if cli.plot {
        let magnitudes = options.as_magnitude || band.is_color_model();
        out.push('\n');
        out.push_str(&crate::plot::render_light_curve(
            epochs.as_slice(),
            &curve,
            magnitudes,
            cli.width,
            cli.height,
        ));
    }

    if let Some(path) = &cli.export {
        template.generate()?;
        write_template_json(path, &template.to_file()?)?;
        info!(path = %path.display(), "wrote template export");
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::read_template_json;
    use crate::surface::fixtures::decline_engine;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("csptemp").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn too_few_arguments_exit_with_usage() {
        let err = run_from(["csptemp", "1.1"]).unwrap_err();
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("Usage"), "{err}");
    }

    #[test]
    fn listing_prints_trusted_epochs_only() {
        let out = render(&cli(&["1.1", "J"]), &decline_engine()).unwrap();
        let rows: Vec<&str> = out.lines().filter(|l| !l.starts_with('#')).collect();
        // J is trusted on (-8, 57): days -7..=56.
        assert_eq!(rows.len(), 64);
        assert!(rows[0].starts_with("-7.0 "));
        assert!(rows[63].starts_with("56.0 "));
    }

    #[test]
    fn unknown_filter_is_an_input_error() {
        let err = render(&cli(&["1.1", "Z"]), &decline_engine()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn plot_and_export_are_optional_extras() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.json");
        let path_arg = path.to_string_lossy().to_string();

        let out = render(
            &cli(&["1.1", "B", "--plot", "--export", &path_arg]),
            &decline_engine(),
        )
        .unwrap();
        assert!(out.contains("Plot: t=[-10.0, 69.0] days"));

        let file = read_template_json(&path).unwrap();
        assert_eq!(file.bands.len(), Band::ALL.len());
        assert_eq!(file.tool, "csp-templates");
    }
}
