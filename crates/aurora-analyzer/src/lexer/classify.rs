/// Lexical class of a single character on a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Code,
    /// Inside a string literal, including both quotes.
    String,
    /// From a `#` outside a string to the end of the line.
    Comment,
}

/// Classify every character of `line` (one entry per `char`).
///
/// A `"` not preceded by `\` toggles string mode. A `#` outside a string
/// starts a comment that runs to the end of the line. The tokenizer
/// follows the same rules, so no later pass ever sees string or comment
/// text as code.
pub fn classify_line(line: &str) -> Vec<CharClass> {
    let mut classes = Vec::with_capacity(line.len());
    let mut in_string = false;
    let mut prev: Option<char> = None;

    for (i, ch) in line.chars().enumerate() {
        if ch == '"' && prev != Some('\\') {
            in_string = !in_string;
            classes.push(CharClass::String);
        } else if ch == '#' && !in_string {
            let remaining = line.chars().count() - i;
            classes.extend(std::iter::repeat(CharClass::Comment).take(remaining));
            break;
        } else if in_string {
            classes.push(CharClass::String);
        } else {
            classes.push(CharClass::Code);
        }
        prev = Some(ch);
    }

    classes
}
