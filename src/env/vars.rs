use anyhow::{bail, Result};

use crate::env::EnvMap;

/// Replaces `{NAME}` references with values from `env`, falling back to the
/// process environment. `\{` and `\}` produce literal braces; a brace not
/// followed by an identifier is kept as is.
pub fn expand_vars(input: &str, env: &EnvMap) -> Result<String> {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find(['\\', '{']) {
        output.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(escaped) = tail.strip_prefix('\\') {
            match escaped.chars().next() {
                Some(brace @ ('{' | '}')) => {
                    output.push(brace);
                    rest = &escaped[1..];
                }
                _ => {
                    output.push('\\');
                    rest = escaped;
                }
            }
            continue;
        }

        let body = &tail[1..];
        let Some(end) = body.find('}') else {
            output.push_str(tail);
            rest = "";
            break;
        };

        let name = &body[..end];
        if !body.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
            output.push('{');
            rest = body;
            continue;
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            bail!("invalid variable name {{{name}}}");
        }

        match env.get(name).cloned().or_else(|| std::env::var(name).ok()) {
            Some(value) => output.push_str(&value),
            None => bail!("missing variable {name}"),
        }
        rest = &body[end + 1..];
    }

    output.push_str(rest);
    Ok(output)
}
