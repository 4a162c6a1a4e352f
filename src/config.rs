use std::path::PathBuf;

use clap::{App, Arg};

#[derive(Debug, PartialEq)]
pub struct Config {
    pub image_path: PathBuf,
    pub verbose: bool,
}

impl Config {
    /// Builds a `Config` from the process's own `argv`. `clap` owns the
    /// missing-argument usage message and exit code; this only translates
    /// its `ArgMatches` into our typed struct.
    pub fn from_args() -> Self {
        Self::from_matches(Self::app().get_matches())
    }

    fn app() -> App<'static, 'static> {
        App::new("LC-3 VM")
            .arg(
                Arg::with_name("verbose")
                    .short("v")
                    .long("verbose")
                    .help("Raises the log level to info"),
            )
            .arg(
                Arg::with_name("PROGRAM")
                    .help("Path to the program image to run")
                    .required(true)
                    .index(1),
            )
    }

    fn from_matches(matches: clap::ArgMatches) -> Self {
        Self {
            image_path: PathBuf::from(matches.value_of("PROGRAM").expect("PROGRAM is required")),
            verbose: matches.is_present("verbose"),
        }
    }
}
