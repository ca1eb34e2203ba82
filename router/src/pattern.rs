//! Route template compilation.
//!
//! A template is a literal path with named-parameter tokens: `{name}`
//! translates to a capture group matching one or more word or hyphen
//! characters; everything else matches literally. Templates are anchored
//! and tolerate a leading `/`, because matched URLs never carry one.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// A route template failed to compile.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The template contains a brace that is not part of a `{name}` token.
    #[error("route template {template:?} contains a malformed parameter token")]
    MalformedParameter {
        /// The offending template.
        template: String,
    },

    /// The assembled expression was rejected by the regex engine.
    #[error("route template {template:?} does not compile")]
    Pattern {
        /// The offending template.
        template: String,
        /// The underlying regex error.
        #[source]
        source: Box<regex::Error>,
    },
}

pub(crate) struct Compiled {
    pub regex: Regex,
    pub names: Vec<String>,
}

fn token() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| {
        Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("token pattern is a valid literal")
    })
}

pub(crate) fn compile(template: &str) -> Result<Compiled, PatternError> {
    let trimmed = template.strip_prefix('/').unwrap_or(template);

    let mut pattern = String::from("^");
    let mut names = Vec::new();
    let mut last = 0;
    for capture in token().captures_iter(trimmed) {
        let (Some(whole), Some(name)) = (capture.get(0), capture.get(1)) else {
            continue;
        };
        push_literal(&mut pattern, &trimmed[last..whole.start()], template)?;
        pattern.push_str(r"([\w-]+)");
        names.push(name.as_str().to_owned());
        last = whole.end();
    }
    push_literal(&mut pattern, &trimmed[last..], template)?;
    pattern.push('$');

    let regex = Regex::new(&pattern).map_err(|source| PatternError::Pattern {
        template: template.to_owned(),
        source: Box::new(source),
    })?;
    Ok(Compiled { regex, names })
}

fn push_literal(pattern: &mut String, literal: &str, template: &str) -> Result<(), PatternError> {
    if literal.contains(['{', '}']) {
        return Err(PatternError::MalformedParameter {
            template: template.to_owned(),
        });
    }
    pattern.push_str(&regex::escape(literal));
    Ok(())
}
