use {
    adpcm2wav::{convert, load, store, Options},
    anyhow::Context as _,
    camino::Utf8PathBuf,
    clap::Parser,
    formats::ParseOptions,
    std::process::ExitCode,
};

/// Decode a mono MS-ADPCM WAVE file into 16-bit PCM.
#[derive(Parser)]
#[command(name = "adpcm2wav", version)]
struct Cli {
    /// ADPCM-encoded input file
    input: Utf8PathBuf,

    /// PCM output file, created or truncated
    output: Utf8PathBuf,

    /// Skip the RIFF pad byte after odd-sized chunks
    #[arg(long)]
    word_aligned: bool,

    /// Log chunk and block details
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn level(&self) -> log::LevelFilter {
        match (self.verbose, self.quiet) {
            (true, _) => log::LevelFilter::Debug,
            (_, true) => log::LevelFilter::Error,
            _         => log::LevelFilter::Info,
        }
    }

    fn options(&self) -> Options {
        Options {
            parse: ParseOptions{word_aligned: self.word_aligned},
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    log_init(cli.level());

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("conversion failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let bytes = load(&cli.input)?;
    log::info!("{}: {} KiB", cli.input, bytes.len() >> 10);

    let conversion = convert(&bytes, &cli.options())
        .with_context(|| format!("decoding {}", cli.input))?;
    for line in conversion.format.to_string().lines() {
        log::info!("{line}");
    }

    store(&cli.output, &conversion)?;
    log::info!("{}: {} samples at {} Hz",
        cli.output, conversion.samples.len(), conversion.format.sample_rate);
    Ok(())
}

fn log_init(filter: log::LevelFilter) {
    use simplelog::*;
    let term = TermLogger::new(
        filter,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
    if CombinedLogger::init(vec![term]).is_err() {
        eprintln!("logger already initialised");
    }
}
