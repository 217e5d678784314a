mod ui;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use passg::wordlist::{EMOJI, WORDLIST, load_emoji, load_wordlist_or_fallback};
use passg::{
    CharClasses, GenerationOptions, PassphraseOptions, UsernameOptions, estimate_passphrase_entropy,
    estimate_password_entropy,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zeroize::Zeroizing;

const BASIC_DEFAULT_LENGTH: usize = 12;
const UNIVERSAL_DEFAULT_LENGTH: usize = 10;

#[derive(Parser)]
#[command(
    name = "passg",
    version,
    author,
    about = "Password, passphrase and username generator with strength estimation"
)]
struct Cli {
    #[arg(short, long, value_enum, default_value = "password")]
    mode: Mode,

    /// Password length [default: 12, or 10 with --universal]
    #[arg(short, long)]
    length: Option<usize>,

    /// Spread the password evenly across character classes
    #[arg(short, long)]
    universal: bool,

    /// Character class for --universal, repeatable [default: lower, upper, numbers, symbols]
    #[arg(short, long = "class", value_enum, requires = "universal")]
    classes: Vec<Class>,

    /// Characters never used by --universal
    #[arg(short = 'x', long, requires = "universal")]
    exclude: Option<String>,

    /// Passphrase word count
    #[arg(short, long, default_value_t = 5)]
    words: usize,

    /// Capitalized passphrase words joined by digit and symbol separators
    #[arg(short, long)]
    advanced: bool,

    /// Diceware-style wordlist file; the built-in list is used otherwise
    #[arg(long, env = "PASSG_WORDLIST")]
    wordlist: Option<PathBuf>,

    /// Emoji glyph file for the emoji class
    #[arg(long, env = "PASSG_EMOJI")]
    emoji: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value = "random")]
    style: Style,

    /// Name or word to fold into the username
    #[arg(short, long, default_value = "")]
    keyword: String,

    /// Number of results
    #[arg(short = 'n', long, default_value_t = 1)]
    count: usize,

    /// Print results only
    #[arg(short, long)]
    quiet: bool,

    /// Log generator decisions to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
enum Mode {
    Password,
    Passphrase,
    Username,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
enum Class {
    Lower,
    Upper,
    Numbers,
    Symbols,
    Extended,
    NonLatin,
    Emoji,
}

impl From<Class> for CharClasses {
    fn from(class: Class) -> Self {
        match class {
            Class::Lower => CharClasses::LOWERCASE,
            Class::Upper => CharClasses::UPPERCASE,
            Class::Numbers => CharClasses::NUMBERS,
            Class::Symbols => CharClasses::SYMBOLS,
            Class::Extended => CharClasses::EXTENDED_SYMBOLS,
            Class::NonLatin => CharClasses::NON_LATIN,
            Class::Emoji => CharClasses::EMOJI,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
enum Style {
    Professional,
    Gamer,
    Random,
}

impl From<Style> for passg::Style {
    fn from(style: Style) -> Self {
        match style {
            Style::Professional => passg::Style::Professional,
            Style::Gamer => passg::Style::Gamer,
            Style::Random => passg::Style::Random,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "passg=debug" } else { "passg=warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.count == 0 {
        anyhow::bail!("Count must be at least 1");
    }

    let display = ui::DisplayOptions::detect(cli.quiet);

    let (outputs, report) = match cli.mode {
        Mode::Password => passwords(&cli)?,
        Mode::Passphrase => passphrases(&cli, &display)?,
        Mode::Username => usernames(&cli)?,
    };

    ui::display_output(&outputs, &report, &display);

    Ok(())
}

fn passwords(cli: &Cli) -> Result<(Vec<Zeroizing<String>>, ui::Report)> {
    let default_length = if cli.universal {
        UNIVERSAL_DEFAULT_LENGTH
    } else {
        BASIC_DEFAULT_LENGTH
    };

    let mut options = GenerationOptions::new(cli.length.unwrap_or(default_length));
    if cli.universal {
        options = options.universal();
    }
    if !cli.classes.is_empty() {
        let classes = cli
            .classes
            .iter()
            .fold(CharClasses::empty(), |acc, &c| acc | CharClasses::from(c));
        options = options.classes(classes);
    }
    if let Some(exclude) = &cli.exclude {
        options = options.exclude(&ui::normalize_input(exclude, "Exclusion list")?);
    }

    if let Some(path) = &cli.emoji {
        EMOJI
            .get_or_load(|| load_emoji(path))
            .with_context(|| format!("Failed to load emoji list from {}", path.display()))?;
    }

    let start = Instant::now();
    let mut outputs = Vec::with_capacity(cli.count);
    for _ in 0..cli.count {
        outputs.push(passg::generate_password(&options).context("Failed to generate password")?);
    }
    let elapsed = start.elapsed();

    let entropy = outputs
        .iter()
        .map(|p| estimate_password_entropy(p))
        .min_by_key(|e| e.bits);

    let report = ui::Report {
        kind: ui::Kind::Password {
            mode: options.mode,
            length: options.length,
            classes: options.classes,
            excluded: options.excluded.len(),
        },
        entropy,
        elapsed,
    };
    Ok((outputs, report))
}

fn passphrases(
    cli: &Cli,
    display: &ui::DisplayOptions,
) -> Result<(Vec<Zeroizing<String>>, ui::Report)> {
    let (words, _) = ui::show_progress(display.unicode_support, "Loading wordlist...", || {
        WORDLIST
            .get_or_load(|| {
                Ok::<_, passg::Error>(load_wordlist_or_fallback(cli.wordlist.as_deref()))
            })
            .context("Failed to load wordlist")
    })?;

    let options = PassphraseOptions::new(cli.words).advanced(cli.advanced);

    let start = Instant::now();
    let mut outputs = Vec::with_capacity(cli.count);
    for _ in 0..cli.count {
        let passphrase = passg::generate_passphrase(words.as_slice(), &options)
            .context("Failed to generate passphrase")?;
        outputs.push(passphrase);
    }
    let elapsed = start.elapsed();

    let report = ui::Report {
        kind: ui::Kind::Passphrase {
            word_count: options.word_count,
            wordlist_size: words.len(),
            advanced: options.advanced,
        },
        entropy: Some(estimate_passphrase_entropy(
            options.word_count,
            words.len(),
            options.advanced,
        )),
        elapsed,
    };
    Ok((outputs, report))
}

fn usernames(cli: &Cli) -> Result<(Vec<Zeroizing<String>>, ui::Report)> {
    let options = UsernameOptions::new(cli.style.into())
        .keyword(ui::normalize_input(&cli.keyword, "Keyword")?);

    let start = Instant::now();
    let mut outputs = Vec::with_capacity(cli.count);
    for _ in 0..cli.count {
        let username =
            passg::generate_username(&options).context("Failed to generate username")?;
        outputs.push(Zeroizing::new(username));
    }
    let elapsed = start.elapsed();

    let report = ui::Report {
        kind: ui::Kind::Username {
            style: options.style,
        },
        entropy: None,
        elapsed,
    };
    Ok((outputs, report))
}
