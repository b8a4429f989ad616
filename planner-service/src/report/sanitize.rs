//! Text clean-up ahead of PDF rendering.
//!
//! [`sanitize`] transliterates the letters and punctuation in the table below
//! and strips markdown markers. [`to_renderable`] then replaces whatever is
//! still outside printable ASCII with `?`.

/// Localized letters and typographic punctuation with their plain forms.
#[rustfmt::skip]
const SUBSTITUTIONS: &[(char, &str)] = &[
    // Turkish
    ('ç', "c"), ('Ç', "C"), ('ğ', "g"), ('Ğ', "G"), ('ı', "i"), ('İ', "I"),
    ('ö', "o"), ('Ö', "O"), ('ş', "s"), ('Ş', "S"), ('ü', "u"), ('Ü', "U"),
    // Western European
    ('à', "a"), ('á', "a"), ('â', "a"), ('ã', "a"), ('ä', "a"), ('å', "a"),
    ('À', "A"), ('Á', "A"), ('Â', "A"), ('Ã', "A"), ('Ä', "A"), ('Å', "A"),
    ('è', "e"), ('é', "e"), ('ê', "e"), ('ë', "e"),
    ('È', "E"), ('É', "E"), ('Ê', "E"), ('Ë', "E"),
    ('ì', "i"), ('í', "i"), ('î', "i"), ('ï', "i"),
    ('Ì', "I"), ('Í', "I"), ('Î', "I"), ('Ï', "I"),
    ('ò', "o"), ('ó', "o"), ('ô', "o"), ('õ', "o"), ('ø', "o"),
    ('Ò', "O"), ('Ó', "O"), ('Ô', "O"), ('Õ', "O"), ('Ø', "O"),
    ('ù', "u"), ('ú', "u"), ('û', "u"),
    ('Ù', "U"), ('Ú', "U"), ('Û', "U"),
    ('ñ', "n"), ('Ñ', "N"), ('ý', "y"), ('ÿ', "y"), ('Ý', "Y"),
    ('ß', "ss"), ('æ', "ae"), ('Æ', "AE"), ('œ', "oe"), ('Œ', "OE"),
    // Typography
    ('\u{2018}', "'"), ('\u{2019}', "'"), ('\u{201A}', "'"), ('\u{2032}', "'"),
    ('\u{201C}', "\""), ('\u{201D}', "\""), ('\u{201E}', "\""), ('\u{2033}', "\""),
    ('\u{00AB}', "\""), ('\u{00BB}', "\""),
    ('\u{2013}', "-"), ('\u{2014}', "-"), ('\u{2212}', "-"), ('\u{2010}', "-"),
    ('\u{2026}', "..."),
    ('\u{2022}', "-"), ('\u{00B7}', "-"), ('\u{25AA}', "-"), ('\u{25CF}', "-"),
    ('\u{2192}', "->"),
    ('\u{00A0}', " "), ('\u{2009}', " "), ('\u{202F}', " "),
    ('\u{200B}', ""), ('\u{FEFF}', ""),
];

fn substitute(c: char) -> Option<&'static str> {
    SUBSTITUTIONS
        .iter()
        .find(|(from, _)| *from == c)
        .map(|(_, to)| *to)
}

/// Transliterate table characters and drop markdown emphasis and headings.
///
/// `sanitize(sanitize(x)) == sanitize(x)` for every input.
pub fn sanitize(text: &str) -> String {
    let mut flat = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\r' => {}
            '\t' => flat.push_str("    "),
            _ => match substitute(c) {
                Some(plain) => flat.push_str(plain),
                None => flat.push(c),
            },
        }
    }

    flat.split('\n')
        .map(clean_line_fully)
        .collect::<Vec<_>>()
        .join("\n")
}

fn clean_line_fully(line: &str) -> String {
    let mut current = line.to_string();
    loop {
        let next = clean_line(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// One pass of markdown stripping. Each pass either shortens the line or
/// normalizes a bullet, so repeating it reaches a fixed point.
fn clean_line(line: &str) -> String {
    let trimmed = line.trim_start();

    if trimmed.starts_with('#') {
        return trimmed
            .trim_start_matches(|c: char| c == '#' || c.is_whitespace())
            .to_string();
    }

    let indent = &line[..line.len() - trimmed.len()];
    let line = match trimmed
        .strip_prefix("* ")
        .or_else(|| trimmed.strip_prefix("+ "))
    {
        Some(rest) => format!("{}- {}", indent, rest),
        None => line.to_string(),
    };

    line.replace('*', "").replace("__", "").replace('`', "")
}

/// Replace anything outside printable ASCII (newline excepted) with `?`.
pub fn to_renderable(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\n' | ' '..='~' => c,
            _ => '?',
        })
        .collect()
}

/// Strip emphasis and heading markers only, keeping localized letters.
///
/// Used for speech, where the engine pronounces accented text correctly.
pub fn strip_markup(text: &str) -> String {
    text.lines()
        .map(|line| {
            let trimmed = line.trim_start();
            let line = if trimmed.starts_with('#') {
                trimmed.trim_start_matches(|c: char| c == '#' || c.is_whitespace())
            } else {
                line
            };
            line.replace('*', "").replace("__", "").replace('`', "")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
