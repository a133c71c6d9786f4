//! Localized date and time.
//!
//! `TEXT.FORMAT` follows the CLDR conventions legacy themes were written
//! for: a style name (`short`, `medium`, `long`, `full`) picks the locale's
//! own pattern, anything else is an LDML pattern such as `dd/MM/yyyy` or
//! `HH:mm`. A format containing `%` is taken as a chrono strftime string.

use crate::dispatch::Dispatcher;
use crate::theme::MetricPoint;
use crate::DispatchError;
use chrono::{DateTime, Locale, TimeZone};
use std::fmt::{Display, Write};

const DEFAULT_FORMAT: &str = "medium";

/// CLDR patterns for one locale, in `short`, `medium`, `long`, `full` order.
struct StylePatterns {
    date: [&'static str; 4],
    time: [&'static str; 4],
}

const TIME_24H: [&str; 4] = ["HH:mm", "HH:mm:ss", "HH:mm:ss z", "HH:mm:ss zzzz"];

const EN: StylePatterns = StylePatterns {
    date: ["M/d/yy", "MMM d, y", "MMMM d, y", "EEEE, MMMM d, y"],
    time: ["h:mm a", "h:mm:ss a", "h:mm:ss a z", "h:mm:ss a zzzz"],
};

const EN_GB: StylePatterns = StylePatterns {
    date: ["dd/MM/y", "d MMM y", "d MMMM y", "EEEE d MMMM y"],
    time: TIME_24H,
};

const FR: StylePatterns = StylePatterns {
    date: ["dd/MM/y", "d MMM y", "d MMMM y", "EEEE d MMMM y"],
    time: TIME_24H,
};

const DE: StylePatterns = StylePatterns {
    date: ["dd.MM.yy", "dd.MM.y", "d. MMMM y", "EEEE, d. MMMM y"],
    time: TIME_24H,
};

const ES: StylePatterns = StylePatterns {
    date: ["d/M/yy", "d MMM y", "d 'de' MMMM 'de' y", "EEEE, d 'de' MMMM 'de' y"],
    time: ["H:mm", "H:mm:ss", "H:mm:ss z", "H:mm:ss (zzzz)"],
};

const IT: StylePatterns = StylePatterns {
    date: ["dd/MM/yy", "d MMM y", "d MMMM y", "EEEE d MMMM y"],
    time: TIME_24H,
};

const NL: StylePatterns = StylePatterns {
    date: ["dd-MM-y", "d MMM y", "d MMMM y", "EEEE d MMMM y"],
    time: TIME_24H,
};

const PT: StylePatterns = StylePatterns {
    date: ["dd/MM/y", "d 'de' MMM 'de' y", "d 'de' MMMM 'de' y", "EEEE, d 'de' MMMM 'de' y"],
    time: TIME_24H,
};

// CLDR root, for languages without their own entry
const ROOT: StylePatterns = StylePatterns {
    date: ["y-MM-dd", "y MMM d", "y MMMM d", "y MMMM d, EEEE"],
    time: TIME_24H,
};

fn style_patterns(locale: Locale) -> &'static StylePatterns {
    let name = format!("{locale:?}");
    match name.as_str() {
        "POSIX" => return &EN,
        "en_GB" | "en_IE" => return &EN_GB,
        _ => {}
    }
    match name.split('_').next().unwrap_or_default() {
        "en" => &EN,
        "fr" => &FR,
        "de" => &DE,
        "es" => &ES,
        "it" => &IT,
        "nl" => &NL,
        "pt" => &PT,
        _ => &ROOT,
    }
}

fn style_index(style: &str) -> Option<usize> {
    match style {
        "short" => Some(0),
        "medium" => Some(1),
        "long" => Some(2),
        "full" => Some(3),
        _ => None,
    }
}

fn pattern_for(format: &str, styles: &[&str; 4]) -> String {
    if let Some(index) = style_index(format) {
        return ldml_to_strftime(styles[index]);
    }
    if format.contains('%') {
        return format.to_owned();
    }
    ldml_to_strftime(format)
}

/// strftime pattern for a `DATE.DAY` format in `locale`.
#[must_use]
pub fn date_pattern(format: &str, locale: Locale) -> String {
    pattern_for(format, &style_patterns(locale).date)
}

/// strftime pattern for a `DATE.HOUR` format in `locale`.
#[must_use]
pub fn time_pattern(format: &str, locale: Locale) -> String {
    pattern_for(format, &style_patterns(locale).time)
}

/// Translate an LDML date pattern into chrono's strftime syntax.
///
/// Quoted text (`'de'`, `''` for a quote) is copied literally. Field letters
/// chrono has no equivalent for are copied as they are.
#[must_use]
pub fn ldml_to_strftime(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\'' {
            if chars.next_if_eq(&'\'').is_some() {
                out.push('\'');
                continue;
            }
            while let Some(quoted) = chars.next() {
                if quoted != '\'' {
                    push_literal(&mut out, quoted);
                } else if chars.next_if_eq(&'\'').is_some() {
                    out.push('\'');
                } else {
                    break;
                }
            }
            continue;
        }

        if !c.is_ascii_alphabetic() {
            push_literal(&mut out, c);
            continue;
        }

        let mut width = 1;
        while chars.next_if_eq(&c).is_some() {
            width += 1;
        }
        match field(c, width) {
            Some(spec) => out.push_str(spec),
            None => (0..width).for_each(|_| out.push(c)),
        }
    }
    out
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

fn field(letter: char, width: usize) -> Option<&'static str> {
    let spec = match (letter, width) {
        ('y', 2) => "%y",
        ('y', _) => "%Y",
        ('M' | 'L', 1) => "%-m",
        ('M' | 'L', 2) => "%m",
        ('M' | 'L', 3) => "%b",
        ('M' | 'L', _) => "%B",
        ('d', 1) => "%-d",
        ('d', _) => "%d",
        ('D', _) => "%j",
        ('E' | 'c' | 'e', 4) => "%A",
        ('c' | 'e', 1 | 2) => "%u",
        ('E' | 'c' | 'e', _) => "%a",
        ('a', _) => "%p",
        ('H', 1) => "%-H",
        ('H', _) => "%H",
        ('h', 1) => "%-I",
        ('h', _) => "%I",
        ('m', 1) => "%-M",
        ('m', _) => "%M",
        ('s', 1) => "%-S",
        ('s', _) => "%S",
        ('S', 3) => "%3f",
        ('z', _) => "%Z",
        ('Z', _) => "%z",
        _ => return None,
    };
    Some(spec)
}

fn render<Tz>(now: &DateTime<Tz>, pattern: &str, locale: Locale) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut text = String::new();
    write!(text, "{}", now.format_localized(pattern, locale)).ok()?;
    Some(text)
}

fn localized<Tz>(
    now: &DateTime<Tz>,
    format: &str,
    locale: Locale,
    pattern: fn(&str, Locale) -> String,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    render(now, &pattern(format, locale), locale).unwrap_or_else(|| {
        log::warn!("Invalid date format {format:?}, using {DEFAULT_FORMAT}");
        render(now, &pattern(DEFAULT_FORMAT, locale), locale).unwrap_or_default()
    })
}

/// Draw `DATE.DAY` and `DATE.HOUR` for `now`.
pub fn stats<Tz>(out: &mut Dispatcher<'_>, now: &DateTime<Tz>, locale: Locale) -> Result<(), DispatchError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let day = localized(now, &text_format(out, "DAY"), locale, date_pattern);
    out.present(&MetricPoint::new("DATE", "DAY"), None, &day, "")?;

    let hour = localized(now, &text_format(out, "HOUR"), locale, time_pattern);
    out.present(&MetricPoint::new("DATE", "HOUR"), None, &hour, "")
}

fn text_format(out: &Dispatcher<'_>, kind: &str) -> String {
    out.theme()
        .node(&["DATE", kind, "TEXT", "FORMAT"])
        .and_then(|format| format.as_str())
        .unwrap_or(DEFAULT_FORMAT)
        .to_owned()
}

/// Parse a POSIX locale name such as `fr_FR.UTF-8` or `de_DE@euro`.
#[must_use]
pub fn locale_from_env_value(value: &str) -> Option<Locale> {
    let name = value
        .split(['.', '@'])
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty())?;
    if name == "C" || name == "POSIX" {
        return Some(Locale::POSIX);
    }
    Locale::try_from(name).ok()
}

/// Time locale of the process, from `LC_ALL`, `LC_TIME` then `LANG`.
#[must_use]
pub fn system_locale() -> Locale {
    for var in ["LC_ALL", "LC_TIME", "LANG"] {
        let Ok(value) = std::env::var(var) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        match locale_from_env_value(&value) {
            Some(locale) => return locale,
            None => log::warn!("Unknown locale {var}={value}, using POSIX"),
        }
        break;
    }
    Locale::POSIX
}
