//! Manage command line arguments here.
use std::fs::OpenOptions;
use std::path::PathBuf;

use clap::builder::styling;
use clap::{Arg, ArgAction, Command};
use simplelog::*;

/// This structure holds the command line arguments.
#[derive(Debug, Default)]
pub struct CliOptions {
    // memory dump to carve
    pub input_file: PathBuf,

    // folder receiving the CSV reports and extracted icons
    pub output_dir: PathBuf,

    // only carve those artifact kinds
    pub kinds: Vec<String>,

    // number of threads to use
    pub nb_threads: usize,

    // skip favicon extraction
    pub no_icons: bool,

    // display progress bar
    pub progress_bar: bool,
}

impl CliOptions {
    #[allow(clippy::field_reassign_with_default)]
    pub fn new() -> anyhow::Result<CliOptions> {
        const STYLES: styling::Styles = styling::Styles::styled()
            .header(styling::AnsiColor::Green.on_default().bold())
            .usage(styling::AnsiColor::Green.on_default().bold())
            .literal(styling::AnsiColor::Blue.on_default().bold())
            .placeholder(styling::AnsiColor::Cyan.on_default());

        let matches = Command::new("torcarve, a Tor Browser memory carver")
            .version("0.1")
            .styles(STYLES)
            .about(
                r#"Carve Tor Browser artifacts out of a raw memory dump.

            Extracts browsing activity, browser and SOCKS5 requests, tab
            session data and HTTP request metadata into CSV reports.

            "#,
            )
            .arg(
                Arg::new("input")
                    .short('i')
                    .long("input")
                    .long_help("Name and path of the memory dump file to be carved")
                    .value_name("DUMP")
                    .value_parser(clap::value_parser!(PathBuf))
                    .required(true),
            )
            .arg(
                Arg::new("output")
                    .short('o')
                    .long("output")
                    .long_help("Folder receiving the CSV reports and extracted favicons")
                    .value_name("FOLDER")
                    .value_parser(clap::value_parser!(PathBuf))
                    .required(true),
            )
            .arg(
                Arg::new("artifacts")
                    .short('a')
                    .long("artifacts")
                    .help("Comma-separated list of artifact kinds to carve (activity, requests, sessions, http, socks)")
                    .num_args(1)
                    .value_delimiter(',')
                    .required(false),
            )
            .arg(
                Arg::new("nbthreads")
                    .short('n')
                    .long("nbthreads")
                    .long_help("Number of threads used to walk signature matches")
                    .value_name("THREADS")
                    .value_parser(clap::value_parser!(usize))
                    .required(false),
            )
            .arg(
                Arg::new("noicons")
                    .long("no-icons")
                    .action(ArgAction::SetTrue)
                    .long_help("Do not save base64 favicons found in tab session data"),
            )
            .arg(
                Arg::new("log")
                    .long("log")
                    .long_help("Save debugging info into the file LOG.")
                    .action(ArgAction::Set)
                    .value_name("LOG")
                    .value_parser(clap::value_parser!(PathBuf)),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .long_help("Verbose mode, from info (-v) to trace (-vvv).")
                    .action(ArgAction::Count),
            )
            .arg(
                Arg::new("pb")
                    .long("progress")
                    .short('p')
                    .action(ArgAction::SetTrue)
                    .long_help("Display progress bar"),
            )
            .get_matches();

        // save all cli options into a structure
        let mut options = CliOptions::default();

        options.input_file = matches.get_one::<PathBuf>("input").unwrap().clone();
        options.output_dir = matches.get_one::<PathBuf>("output").unwrap().clone();
        options.nb_threads = *matches.get_one::<usize>("nbthreads").unwrap_or(&1);
        options.nb_threads = options.nb_threads.max(1);
        options.no_icons = matches.get_flag("noicons");

        options.kinds = matches
            .get_many::<String>("artifacts")
            .map(|kinds| kinds.cloned().collect())
            .unwrap_or_default();

        // manage debugging
        if matches.contains_id("verbose") {
            let level = match matches.get_count("verbose") {
                0 => log::LevelFilter::Off,
                1 => log::LevelFilter::Info,
                2 => log::LevelFilter::Debug,
                3..=255 => log::LevelFilter::Trace,
            };
            if let Some(path) = matches.get_one::<PathBuf>("log") {
                init_write_logger(path, level)?;
            } else {
                init_term_logger(level)?;
            }
        }

        // set pb
        options.progress_bar = matches.get_flag("pb");

        Ok(options)
    }
}

// Initialize write logger: either create it or use it
fn init_write_logger(logfile: &PathBuf, level: log::LevelFilter) -> anyhow::Result<()> {
    if level == log::LevelFilter::Off {
        return Ok(());
    }

    let writable = OpenOptions::new().create(true).append(true).open(logfile)?;

    WriteLogger::init(
        level,
        simplelog::ConfigBuilder::new()
            .set_time_format_rfc3339()
            .build(),
        writable,
    )?;

    Ok(())
}

// Initialize terminal logger
fn init_term_logger(level: log::LevelFilter) -> anyhow::Result<()> {
    if level == log::LevelFilter::Off {
        return Ok(());
    }
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;

    Ok(())
}
