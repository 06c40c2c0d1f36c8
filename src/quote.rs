//! Identifier quoting.
//!
//! Table and column names are never bound as parameters, so they are rendered
//! backtick-delimited with embedded backticks doubled. Both MySQL and SQLite
//! accept this form.

/// Quote a single identifier: `name` -> `` `name` ``
pub fn quote_identifier(name: &str) -> String {
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('`');
    for ch in name.chars() {
        if ch == '`' {
            quoted.push('`');
        }
        quoted.push(ch);
    }
    quoted.push('`');
    quoted
}

/// Quote each identifier and join them with `", "`
pub fn quote_identifier_list<'a, I>(names: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .map(quote_identifier)
        .collect::<Vec<_>>()
        .join(", ")
}

/// `?, ?, ?` with `count` positional placeholders
pub fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
