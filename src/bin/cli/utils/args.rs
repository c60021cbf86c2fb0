//! Rewrites single-dash long flags into the form clap understands.
//!
//! The tool accepts `-sep x`, `-sep=x`, `-v`, `-tree` (and their `--`
//! spellings). Flag parsing stops at the first positional argument or at
//! `--`; everything after that is positional even if it starts with `-`.

/// Flags that take a value, with their canonical long form.
const VALUE_FLAGS: &[(&str, &str)] = &[("sep", "--sep")];

/// Boolean flags, with their canonical long form.
const BOOL_FLAGS: &[(&str, &str)] = &[
    ("v", "--verbose"),
    ("verbose", "--verbose"),
    ("tree", "--tree"),
    ("h", "--help"),
    ("help", "--help"),
];

/// Normalises `args` (program name first) for clap.
pub fn normalize_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut normalized: Vec<String> = args.next().into_iter().collect();

    while let Some(arg) = args.next() {
        if arg == "--" {
            normalized.push(arg);
            normalized.extend(args);
            return normalized;
        }

        let Some(flag) = arg.strip_prefix("--").or_else(|| arg.strip_prefix('-')) else {
            normalized.push("--".to_string());
            normalized.push(arg);
            normalized.extend(args);
            return normalized;
        };
        if flag.is_empty() {
            // A lone "-" is positional.
            normalized.push("--".to_string());
            normalized.push(arg);
            normalized.extend(args);
            return normalized;
        }

        let (name, inline_value) = match flag.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (flag, None),
        };

        if let Some((_, long)) = VALUE_FLAGS.iter().find(|(n, _)| *n == name) {
            match inline_value.map(str::to_string).or_else(|| args.next()) {
                Some(value) => normalized.push(format!("{}={}", long, value)),
                None => normalized.push(long.to_string()),
            }
        } else if let Some((_, long)) = BOOL_FLAGS.iter().find(|(n, _)| *n == name) {
            match inline_value.map(parse_bool) {
                None | Some(Some(true)) => normalized.push(long.to_string()),
                // An explicit false overrides any earlier occurrence.
                Some(Some(false)) => normalized.retain(|a| a != long),
                // Let clap reject the malformed value.
                Some(None) => {
                    normalized.push(format!("{}={}", long, inline_value.unwrap_or_default()))
                }
            }
        } else {
            normalized.push(format!("--{}", flag));
        }
    }

    normalized
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}
