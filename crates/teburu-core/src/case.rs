//! Key case conversion
//!
//! Follows the rules of the common `strcase` conventions, extended to
//! Unicode letters:
//!
//! - Space, `_`, `-` and `.` separate words. Other punctuation is kept in
//!   the delimited styles and dropped in camel case.
//! - The delimited styles also split on lower/upper and letter/digit
//!   transitions, and before the last capital of an acronym (`JSONData` ->
//!   `json_data`).
//! - Camel case capitalises the letter after a separator or a digit and
//!   lowercases the first character. Other capitals are kept (`UserID` ->
//!   `userID`).
//!
//! Every style gives the same key when applied to its own output.

/// Output key style, selected by the `case` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyCase {
    /// lowerCamelCase
    #[default]
    Camel,
    /// snake_case
    Snake,
    /// kebab-case
    Kebab,
    /// SCREAMING_SNAKE_CASE
    ScreamingSnake,
    /// Header text unchanged
    Plain,
}

impl KeyCase {
    /// Parse a query value. Unknown and empty values mean camel case.
    pub fn from_query(name: &str) -> Self {
        match name {
            "camel" => KeyCase::Camel,
            "snake" => KeyCase::Snake,
            "kebab" => KeyCase::Kebab,
            "screaming_snake" => KeyCase::ScreamingSnake,
            "plain" => KeyCase::Plain,
            _ => KeyCase::Camel,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyCase::Camel => "camel",
            KeyCase::Snake => "snake",
            KeyCase::Kebab => "kebab",
            KeyCase::ScreamingSnake => "screaming_snake",
            KeyCase::Plain => "plain",
        }
    }

    /// Convert a header name to an output key
    pub fn apply(&self, s: &str) -> String {
        match self {
            KeyCase::Camel => to_lower_camel(s),
            KeyCase::Snake => to_delimited(s, '_', false),
            KeyCase::Kebab => to_delimited(s, '-', false),
            KeyCase::ScreamingSnake => to_delimited(s, '_', true),
            KeyCase::Plain => s.to_string(),
        }
    }

    /// The conversion as a plain function pointer
    pub fn as_fn(&self) -> fn(&str) -> String {
        match self {
            KeyCase::Camel => to_lower_camel,
            KeyCase::Snake => to_snake,
            KeyCase::Kebab => to_kebab,
            KeyCase::ScreamingSnake => to_screaming_snake,
            KeyCase::Plain => str::to_string,
        }
    }
}

/// Select the conversion function for a `case` query value
pub fn select_case_fn(name: &str) -> fn(&str) -> String {
    KeyCase::from_query(name).as_fn()
}

/// Convert string to lowerCamelCase
pub fn to_lower_camel(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut cap_next = false;

    for (i, c) in s.trim().chars().enumerate() {
        if c.is_alphabetic() {
            if cap_next {
                result.extend(c.to_uppercase());
            } else if i == 0 {
                result.extend(c.to_lowercase());
            } else {
                result.push(c);
            }
            cap_next = false;
        } else if c.is_numeric() {
            result.push(c);
            cap_next = true;
        } else {
            cap_next = is_separator(c);
        }
    }
    result
}

/// Convert string to snake_case
pub fn to_snake(s: &str) -> String {
    to_delimited(s, '_', false)
}

/// Convert string to kebab-case
pub fn to_kebab(s: &str) -> String {
    to_delimited(s, '-', false)
}

/// Convert string to SCREAMING_SNAKE_CASE
pub fn to_screaming_snake(s: &str) -> String {
    to_delimited(s, '_', true)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Upper,
    Lower,
    Digit,
    Other,
}

impl CharClass {
    fn of(c: char) -> Self {
        if c.is_uppercase() {
            CharClass::Upper
        } else if c.is_lowercase() {
            CharClass::Lower
        } else if c.is_numeric() {
            CharClass::Digit
        } else {
            CharClass::Other
        }
    }
}

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '_' | '-' | '.')
}

fn push_cased(out: &mut String, c: char, screaming: bool) {
    if screaming {
        out.extend(c.to_uppercase());
    } else {
        out.extend(c.to_lowercase());
    }
}

fn to_delimited(s: &str, delimiter: char, screaming: bool) -> String {
    use CharClass::{Digit, Lower, Upper};

    let chars: Vec<char> = s.trim().chars().collect();
    let mut result = String::with_capacity(s.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        let class = CharClass::of(c);

        if let Some(&next) = chars.get(i + 1) {
            let next_class = CharClass::of(next);
            let transition = matches!(
                (class, next_class),
                (Upper, Lower | Digit) | (Lower, Upper | Digit) | (Digit, Upper | Lower)
            );

            if transition {
                // last capital of an acronym starts the next word
                let after_capital = i > 0 && CharClass::of(chars[i - 1]) == Upper;
                if class == Upper && next_class == Lower && after_capital {
                    result.push(delimiter);
                }
                push_cased(&mut result, c, screaming);
                if class == Lower || class == Digit || next_class == Digit {
                    result.push(delimiter);
                }
                continue;
            }
        }

        if is_separator(c) {
            result.push(delimiter);
        } else {
            push_cased(&mut result, c, screaming);
        }
    }
    result
}
