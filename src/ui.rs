use anyhow::Result;
use console::{Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use passg::{CharClasses, EntropyResult, Mode, Strength};
use std::time::{Duration, Instant};
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

pub const MIN_SAFE_PASSWORD_LENGTH: usize = 12;
pub const MIN_SAFE_WORD_COUNT: usize = 5;

pub struct DisplayOptions {
    pub unicode_support: bool,
    pub color_support: bool,
    pub quiet: bool,
}

impl DisplayOptions {
    pub fn detect(quiet: bool) -> Self {
        Self {
            unicode_support: detect_unicode_support(),
            color_support: detect_color_support(),
            quiet,
        }
    }
}

pub enum Kind {
    Password {
        mode: Mode,
        length: usize,
        classes: CharClasses,
        excluded: usize,
    },
    Passphrase {
        word_count: usize,
        wordlist_size: usize,
        advanced: bool,
    },
    Username {
        style: passg::Style,
    },
}

pub struct Report {
    pub kind: Kind,
    /// Weakest estimate across all outputs; usernames carry none.
    pub entropy: Option<EntropyResult>,
    pub elapsed: Duration,
}

pub fn detect_unicode_support() -> bool {
    supports_unicode::on(supports_unicode::Stream::Stdout)
}

pub fn detect_color_support() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

pub fn get_status_symbols(unicode_support: bool) -> (&'static str, &'static str) {
    if unicode_support {
        ("\u{2713}", "!")
    } else {
        ("+", "!")
    }
}

fn branches(unicode_support: bool) -> (&'static str, &'static str) {
    if unicode_support {
        ("\u{251c}\u{2500}", "\u{2514}\u{2500}")
    } else {
        ("|-", "`-")
    }
}

/// Trim and NFC-normalize user text. Control characters are rejected.
pub fn normalize_input(s: &str, input_name: &str) -> Result<String> {
    let normalized: String = s.trim().nfc().collect();

    let positions: Vec<String> = normalized
        .chars()
        .enumerate()
        .filter(|(_, c)| c.is_control())
        .map(|(pos, _)| pos.to_string())
        .collect();

    if !positions.is_empty() {
        anyhow::bail!(
            "{} contains {} control character(s) at position(s): {}",
            input_name,
            positions.len(),
            positions.join(", ")
        );
    }

    Ok(normalized)
}

pub fn show_progress<F, T>(unicode_support: bool, message: &'static str, f: F) -> Result<(T, Duration)>
where
    F: FnOnce() -> Result<T>,
{
    let term = Term::stderr();
    term.hide_cursor().ok();

    let pb = ProgressBar::new_spinner();

    if unicode_support {
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&[
                    "\u{280b}", "\u{2819}", "\u{2839}", "\u{2838}", "\u{283c}", "\u{2834}",
                    "\u{2826}", "\u{2827}", "\u{2807}", "\u{280f}", "\u{2713}",
                ]),
        );
    } else {
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("-\\|/-"),
        );
    }

    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(80));

    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed();

    pb.finish_and_clear();
    term.show_cursor().ok();

    result.map(|r| (r, elapsed))
}

fn status_style(secure: bool, options: &DisplayOptions) -> Style {
    if !options.color_support {
        Style::new()
    } else if secure {
        Style::new().green()
    } else {
        Style::new().yellow()
    }
}

fn plural(count: usize, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 { one } else { many }
}

pub fn display_output(outputs: &[Zeroizing<String>], report: &Report, options: &DisplayOptions) {
    if options.quiet {
        for output in outputs {
            println!("{}", &**output);
        }
        return;
    }

    for (i, output) in outputs.iter().enumerate() {
        println!("Out[{}]:\n{}\n", i, &**output);
    }

    display_settings(report, options);
    if let Some(entropy) = report.entropy {
        let length = outputs
            .iter()
            .map(|o| o.chars().count())
            .min()
            .unwrap_or_default();
        display_stats(entropy, length, report, options);
    }
}

fn display_settings(report: &Report, options: &DisplayOptions) {
    let (mid, last) = branches(options.unicode_support);

    println!("Settings:");
    match &report.kind {
        Kind::Password {
            mode,
            length,
            classes,
            excluded,
        } => {
            let mode_name = match mode {
                Mode::Basic => "Basic (no lookalikes, no repeats)",
                Mode::Universal => "Universal (even class quotas)",
            };
            println!("  {} Mode       {}", mid, mode_name);
            if *mode == Mode::Universal {
                println!("  {} Classes    {}", mid, class_names(*classes));
                println!("  {} Excluded   {} {}", mid, excluded, plural(*excluded, "char", "chars"));
            }
            println!("  {} Sampling   ChaCha20, unbiased rejection", mid);
            println!("  {} Output     {} {}", last, length, plural(*length, "char", "chars"));
        }
        Kind::Passphrase {
            word_count,
            wordlist_size,
            advanced,
        } => {
            println!("  {} Wordlist   {} words", mid, wordlist_size);
            println!(
                "  {} Separator  {}",
                mid,
                if *advanced { "digit + symbol" } else { "space" }
            );
            println!("  {} Sampling   ChaCha20, unbiased rejection", mid);
            println!("  {} Output     {} {}", last, word_count, plural(*word_count, "word", "words"));
        }
        Kind::Username { style } => {
            let style_name = match style {
                passg::Style::Professional => "Professional",
                passg::Style::Gamer => "Gamer",
                passg::Style::Random => "Random",
            };
            println!("  {} Style      {}", mid, style_name);
            println!("  {} Time       {:.3}s", last, report.elapsed.as_secs_f64());
        }
    }
    println!();
}

fn class_names(classes: CharClasses) -> String {
    let names: Vec<&str> = classes
        .iter_names()
        .map(|(name, _)| name)
        .collect();
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ").to_lowercase()
    }
}

fn display_stats(entropy: EntropyResult, length: usize, report: &Report, options: &DisplayOptions) {
    let (check_ok, check_warn) = get_status_symbols(options.unicode_support);
    let (mid, last) = branches(options.unicode_support);

    let strong = entropy.label >= Strength::Strong;
    let entropy_style = status_style(strong, options);
    let status_icon = if strong { check_ok } else { check_warn };

    let length_secure = match &report.kind {
        Kind::Passphrase { word_count, .. } => *word_count >= MIN_SAFE_WORD_COUNT,
        _ => length >= MIN_SAFE_PASSWORD_LENGTH,
    };
    let length_style = status_style(length_secure, options);
    let length_status = if length_secure { check_ok } else { check_warn };

    println!("Stats:");

    println!(
        "  {} Entropy    {} {} bits ({})",
        mid,
        entropy_style.apply_to(format!("[{}]", status_icon)),
        entropy_style.apply_to(entropy.bits),
        entropy_style.apply_to(entropy.label)
    );

    println!(
        "  {} Length     {} {} {}",
        mid,
        length_style.apply_to(format!("[{}]", length_status)),
        length_style.apply_to(length),
        plural(length, "char", "chars")
    );

    println!("  {} Time       {:.3}s", last, report.elapsed.as_secs_f64());

    println!(
        "\n{} Security: {}",
        entropy_style.apply_to(format!("[{}]", status_icon)),
        entropy_style.apply_to(entropy.label)
    );
}
