use std::sync::OnceLock;

use regex::Regex;

/// Expand `{{ env.VAR }}` placeholders in raw TOML text
///
/// An optional fallback is supported via `{{ env.VAR | default("value") }}`.
/// Expansion happens before deserialization so config structs stay plain
/// `String`/`SecretString`.
pub(crate) fn expand_env(input: &str) -> Result<String, String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*env\.([A-Za-z0-9_]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#)
            .expect("must be valid regex")
    });

    let mut output = String::with_capacity(input.len());
    let mut last_end = 0;

    for captures in re.captures_iter(input) {
        let overall = captures.get(0).expect("group 0 always present");
        let var_name = &captures[1];
        let fallback = captures.get(2).map(|m| m.as_str());

        output.push_str(&input[last_end..overall.start()]);

        match std::env::var(var_name) {
            Ok(value) => output.push_str(&value),
            Err(_) => match fallback {
                Some(default) => output.push_str(default),
                None => return Err(format!("environment variable not found: `{var_name}`")),
            },
        }

        last_end = overall.end();
    }

    output.push_str(&input[last_end..]);
    Ok(output)
}
