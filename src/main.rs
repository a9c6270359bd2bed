use cdm_audio::application::fetch;
use cdm_audio::cli::{format_summary, Cli};
use cdm_audio::error::CdmError;
use cdm_audio::infrastructure::{FileConfig, HttpLibrary, Id3Writer};
use clap::Parser;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(cli);

    match result {
        Ok(_) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {}", e.display_with_suggestions());
            std::process::exit(e.exit_code());
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "info,cdm_audio=debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), CdmError> {
    // Flags win over the settings file, which wins over defaults
    let file = FileConfig::discover(cli.config.as_deref())?;
    let settings = cli.settings(file)?;
    log::debug!("settings: {:?}", settings);

    let library = HttpLibrary::new(&settings.base, settings.retries);
    let report = fetch::run(&library, &Id3Writer, &settings)?;

    print!("{}", format_summary(&report));
    Ok(())
}
