use std::sync::LazyLock;

use regex::{Captures, Regex};

/// `{{ env.NAME }}` with an optional `| default("value")` suffix
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{\{\s*([A-Za-z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#).expect("must be valid regex")
});

/// Substitute environment placeholders in raw config text
///
/// Comment lines are copied untouched so commented-out entries never
/// require their variables to be set.
pub(crate) fn expand_env(input: &str) -> anyhow::Result<String> {
    let mut expanded = input
        .lines()
        .map(|line| {
            if line.trim_start().starts_with('#') {
                Ok(line.to_owned())
            } else {
                expand_line(line)
            }
        })
        .collect::<anyhow::Result<Vec<_>>>()?
        .join("\n");

    if input.ends_with('\n') {
        expanded.push('\n');
    }

    Ok(expanded)
}

fn expand_line(line: &str) -> anyhow::Result<String> {
    let mut out = String::with_capacity(line.len());
    let mut cursor = 0;

    for captures in PLACEHOLDER.captures_iter(line) {
        let Some(whole) = captures.get(0) else {
            continue;
        };

        out.push_str(&line[cursor..whole.start()]);
        out.push_str(&resolve(&captures)?);
        cursor = whole.end();
    }

    out.push_str(&line[cursor..]);
    Ok(out)
}

fn resolve(captures: &Captures<'_>) -> anyhow::Result<String> {
    let key = captures.get(1).map_or("", |m| m.as_str());
    let fallback = captures.get(2).map(|m| m.as_str());

    let Some(var) = key.strip_prefix("env.").filter(|name| !name.is_empty() && !name.contains('.')) else {
        anyhow::bail!("only variables scoped with 'env.' are supported: `{key}`");
    };

    match (std::env::var(var), fallback) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(default)) => Ok(default.to_owned()),
        (Err(_), None) => anyhow::bail!("environment variable not found: `{var}`"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_without_placeholders_is_unchanged() {
        let input = "vendor = \"openai\"\n";
        assert_eq!(expand_env(input).unwrap(), input);
    }

    #[test]
    fn substitutes_variable() {
        temp_env::with_var("SWITCHBOARD_TEST_KEY", Some("sk-123"), || {
            let result = expand_env("api_key = \"{{ env.SWITCHBOARD_TEST_KEY }}\"").unwrap();
            assert_eq!(result, "api_key = \"sk-123\"");
        });
    }

    #[test]
    fn substitutes_several_variables_on_separate_lines() {
        let vars = [("SB_A", Some("a")), ("SB_B", Some("b"))];
        temp_env::with_vars(vars, || {
            let result = expand_env("x = \"{{ env.SB_A }}\"\ny = \"{{env.SB_B}}\"").unwrap();
            assert_eq!(result, "x = \"a\"\ny = \"b\"");
        });
    }

    #[test]
    fn missing_variable_is_an_error() {
        temp_env::with_var_unset("SB_MISSING", || {
            let err = expand_env("api_key = \"{{ env.SB_MISSING }}\"").unwrap_err();
            assert!(err.to_string().contains("SB_MISSING"));
        });
    }

    #[test]
    fn default_applies_only_when_unset() {
        temp_env::with_var_unset("SB_OPTIONAL", || {
            let result = expand_env("m = \"{{ env.SB_OPTIONAL | default(\"gpt-4o\") }}\"").unwrap();
            assert_eq!(result, "m = \"gpt-4o\"");
        });
        temp_env::with_var("SB_OPTIONAL", Some("o3"), || {
            let result = expand_env("m = \"{{ env.SB_OPTIONAL | default(\"gpt-4o\") }}\"").unwrap();
            assert_eq!(result, "m = \"o3\"");
        });
    }

    #[test]
    fn comment_lines_are_not_expanded() {
        temp_env::with_var_unset("SB_MISSING", || {
            let input = "  # api_key = \"{{ env.SB_MISSING }}\"";
            assert_eq!(expand_env(input).unwrap(), input);
        });
    }

    #[test]
    fn unscoped_variable_is_rejected() {
        let err = expand_env("k = \"{{ vault.TOKEN }}\"").unwrap_err();
        assert!(err.to_string().contains("only variables scoped with 'env.'"));
    }
}
