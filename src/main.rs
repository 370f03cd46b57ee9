// SPDX-License-Identifier: MPL-2.0

use exr_merge::pipeline::{self, Config};

use anyhow::Context;
use std::path::PathBuf;
use std::time::Duration;

// Default values for some of the program arguments.
const DEFAULT_TIFFSET_TIMEOUT: &str = "30";

/// Entry point of the program.
fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    // Set log verbosity.
    let verbosity = matches.occurrences_of("verbose");
    stderrlog::new()
        .quiet(false)
        .verbosity(verbosity as usize)
        .show_level(false)
        .color(stderrlog::ColorChoice::Never)
        .init()
        .context("Failed to initialize log verbosity")?;
    // Start program.
    run(get_config(&matches)?)
}

/// Command line interface of the program.
fn cli() -> clap::App<'static, 'static> {
    // CLI arguments related to the merged output.
    let output_args = vec![
        clap::Arg::with_name("out")
            .long("out")
            .value_name("name")
            .default_value(pipeline::DEFAULT_OUTPUT_NAME)
            .help("File name of the merged TIFF, written next to the frames"),
        clap::Arg::with_name("save-mask")
            .long("save-mask")
            .value_name("name")
            .help("Also save the color filter layout of the merged image as PNG"),
    ];
    // CLI arguments related to the metadata patch.
    let metadata_args = vec![
        clap::Arg::with_name("tiffset")
            .long("tiffset")
            .value_name("program")
            .default_value(pipeline::DEFAULT_TIFFSET)
            .help("Program used to write the frame geometry into TIFF tag 270"),
        clap::Arg::with_name("tiffset-timeout")
            .long("tiffset-timeout")
            .value_name("secs")
            .default_value(DEFAULT_TIFFSET_TIMEOUT)
            .help("Kill the metadata program if it runs longer than this"),
        clap::Arg::with_name("no-tiffset")
            .long("no-tiffset")
            .help("Do not patch the TIFF metadata"),
    ];
    // CLI arguments related to input and the rest.
    let input_args = vec![
        clap::Arg::with_name("verbose")
            .short("v")
            .multiple(true)
            .help("Multiple levels of verbosity (up to -vvvv)"),
        clap::Arg::with_name("home")
            .long("home")
            .value_name("dir")
            .help("Directory containing the frames (default: $HOME)"),
        clap::Arg::with_name("BASENAME")
            .required(true)
            .help("Frames are read from <home>/<BASENAME>_0.pgm and <home>/<BASENAME>_1.pgm"),
    ];
    clap::App::new("exr-merge")
        .version(std::env!("CARGO_PKG_VERSION"))
        .about("Merge the two half frames of a Fuji EXR HR capture into one raw mosaic")
        .args(&output_args)
        .args(&metadata_args)
        .args(&input_args)
}

/// Retrieve the merge configuration from clap matches.
fn get_config(matches: &clap::ArgMatches) -> anyhow::Result<Config> {
    let home_dir = match matches.value_of("home") {
        Some(dir) => PathBuf::from(dir),
        None => std::env::var_os("HOME")
            .map(PathBuf::from)
            .context("HOME is not set, use --home to give the frames directory")?,
    };
    let timeout_secs: u64 = matches
        .value_of("tiffset-timeout")
        .unwrap()
        .parse()
        .context("Invalid --tiffset-timeout")?;
    anyhow::ensure!(timeout_secs > 0, "--tiffset-timeout must be at least 1 second");

    let mut config = Config::new(home_dir, matches.value_of("BASENAME").unwrap());
    config.output_name = matches.value_of("out").unwrap().to_string();
    config.tiffset_program = PathBuf::from(matches.value_of("tiffset").unwrap());
    config.tiffset_timeout = Duration::from_secs(timeout_secs);
    config.patch_metadata = !matches.is_present("no-tiffset");
    config.mask_output = matches.value_of("save-mask").map(String::from);
    Ok(config)
}

/// Start actual program with the configuration successfully parsed.
fn run(config: Config) -> anyhow::Result<()> {
    let now = std::time::Instant::now();
    let report = pipeline::run(&config, &config.tiffset()).context(format!(
        "Failed to merge the frames of {}",
        config.basename
    ))?;
    log::warn!(
        "Merged two {}x{} frames into {} ({}x{}) in {:.1} s",
        report.frame_width,
        report.frame_height,
        report.output_path.display(),
        report.side,
        report.side,
        now.elapsed().as_secs_f32()
    );
    Ok(())
}
