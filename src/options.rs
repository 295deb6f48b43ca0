//! Builder option parsing and merging.
//!
//! Everything on the command line after the target selector is an option
//! override for the target being run. Overrides use the conventional loose
//! flag grammar: `--key value`, `--key=value`, bare `--key` for `true`, and
//! `--no-key` for `false`. Values that look like booleans or numbers are
//! coerced so that overrides compare equal to the JSON values they override.
//!
//! Option objects are merged shallowly, in the order
//! target options -> configuration overlay -> CLI overrides,
//! with later objects winning per key.

use serde_json::{Map, Value};

/// Parse raw override arguments into a JSON object.
///
/// Parsing never fails: tokens that are not flags and were not consumed as a
/// flag value are ignored. Repeated keys collect their values into an array.
///
/// # Examples
///
/// ```text
/// let overrides = parse_overrides(&["--watch", "--port", "8080", "--no-progress"]);
/// assert_eq!(overrides["watch"], true);
/// assert_eq!(overrides["port"], 8080);
/// assert_eq!(overrides["progress"], false);
/// ```
pub fn parse_overrides(args: &[String]) -> Map<String, Value> {
    let mut overrides = Map::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];
        let Some(flag) = strip_flag_prefix(arg) else {
            // Not a flag and not consumed as a value: ignore.
            i += 1;
            continue;
        };

        if flag.is_empty() {
            // A bare `--` separator carries no key.
            i += 1;
            continue;
        }

        if let Some((key, value)) = flag.split_once('=') {
            insert(&mut overrides, key, coerce(value));
        } else if let Some(key) = flag.strip_prefix("no-") {
            insert(&mut overrides, key, Value::Bool(false));
        } else if let Some(next) = args.get(i + 1)
            && !is_flag(next)
        {
            insert(&mut overrides, flag, coerce(next));
            i += 1;
        } else {
            insert(&mut overrides, flag, Value::Bool(true));
        }

        i += 1;
    }

    overrides
}

/// Shallow-merge `overlay` onto `base`, overlay values winning per key.
pub fn merge(base: &Map<String, Value>, overlay: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = base.clone();
    for (key, value) in overlay {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

fn strip_flag_prefix(arg: &str) -> Option<&str> {
    arg.strip_prefix("--")
        .or_else(|| if is_flag(arg) { arg.strip_prefix('-') } else { None })
}

/// A token counts as a flag if it starts with `-` and is not a negative number.
fn is_flag(arg: &str) -> bool {
    arg.starts_with('-') && arg.parse::<f64>().is_err()
}

/// Insert a value, collecting repeated keys into an array.
fn insert(overrides: &mut Map<String, Value>, key: &str, value: Value) {
    match overrides.get_mut(key) {
        Some(Value::Array(values)) => values.push(value),
        Some(existing) => {
            let previous = existing.take();
            *existing = Value::Array(vec![previous, value]);
        }
        None => {
            overrides.insert(key.to_string(), value);
        }
    }
}

/// Coerce a raw string value into the closest JSON type.
fn coerce(value: &str) -> Value {
    match value {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(n) = value.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Ok(n) = value.parse::<f64>()
        && let Some(n) = serde_json::Number::from_f64(n)
    {
        return Value::Number(n);
    }
    Value::String(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_key_equals_value() {
        let overrides = parse_overrides(&args(&["--output=dist"]));
        assert_eq!(overrides["output"], "dist");
    }

    #[test]
    fn parse_key_space_value() {
        let overrides = parse_overrides(&args(&["--output", "dist"]));
        assert_eq!(overrides["output"], "dist");
    }

    #[test]
    fn parse_bare_flag_is_true() {
        let overrides = parse_overrides(&args(&["--watch"]));
        assert_eq!(overrides["watch"], true);
    }

    #[test]
    fn parse_flag_before_another_flag_is_true() {
        let overrides = parse_overrides(&args(&["--watch", "--output", "dist"]));
        assert_eq!(overrides["watch"], true);
        assert_eq!(overrides["output"], "dist");
    }

    #[test]
    fn parse_no_prefix_is_false() {
        let overrides = parse_overrides(&args(&["--no-progress"]));
        assert_eq!(overrides["progress"], false);
    }

    #[test]
    fn parse_coerces_booleans_and_numbers() {
        let overrides = parse_overrides(&args(&[
            "--optimize", "true", "--port", "8080", "--ratio", "0.5",
        ]));
        assert_eq!(overrides["optimize"], true);
        assert_eq!(overrides["port"], 8080);
        assert_eq!(overrides["ratio"], 0.5);
    }

    #[test]
    fn parse_negative_number_is_a_value_not_a_flag() {
        let overrides = parse_overrides(&args(&["--offset", "-5"]));
        assert_eq!(overrides["offset"], -5);
    }

    #[test]
    fn parse_repeated_key_collects_array() {
        let overrides = parse_overrides(&args(&["--define", "a", "--define", "b"]));
        assert_eq!(overrides["define"], json!(["a", "b"]));

        let overrides = parse_overrides(&args(&["--define", "a", "--define", "b", "--define", "c"]));
        assert_eq!(overrides["define"], json!(["a", "b", "c"]));
    }

    #[test]
    fn parse_ignores_stray_positionals() {
        let overrides = parse_overrides(&args(&["stray", "--watch"]));
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides["watch"], true);
    }

    #[test]
    fn parse_single_dash_flag() {
        let overrides = parse_overrides(&args(&["-v"]));
        assert_eq!(overrides["v"], true);
    }

    #[test]
    fn parse_empty_args() {
        let overrides = parse_overrides(&[]);
        assert!(overrides.is_empty());
    }

    #[test]
    fn merge_overlay_wins() {
        let base = json!({"output": "dist", "watch": false})
            .as_object()
            .cloned()
            .unwrap();
        let overlay = json!({"watch": true}).as_object().cloned().unwrap();

        let merged = merge(&base, &overlay);
        assert_eq!(merged["output"], "dist");
        assert_eq!(merged["watch"], true);
    }

    #[test]
    fn merge_is_shallow() {
        let base = json!({"env": {"A": "1", "B": "2"}})
            .as_object()
            .cloned()
            .unwrap();
        let overlay = json!({"env": {"C": "3"}}).as_object().cloned().unwrap();

        // Nested objects are replaced wholesale, not merged.
        let merged = merge(&base, &overlay);
        assert_eq!(merged["env"], json!({"C": "3"}));
    }

    #[test]
    fn merge_empty_overlay_is_identity() {
        let base = json!({"output": "dist"}).as_object().cloned().unwrap();
        let merged = merge(&base, &Map::new());
        assert_eq!(merged, base);
    }
}
