//! Common utilities shared across CLI commands.

use std::fmt::Display;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use stitchkit::Color;

/// Take the value following a flag, advancing the cursor.
pub fn take_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("{flag} needs a value"))
}

/// Parse a flag's value, naming the flag on failure.
pub fn parse_value<T>(flag: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .parse()
        .map_err(|e| anyhow!("{e}"))
        .with_context(|| format!("invalid value for {flag}: {value:?}"))
}

/// Parse `#rrggbb` / `#rgb` (the `#` is optional).
pub fn parse_color(value: &str) -> Result<Color> {
    match Color::from_hex(value) {
        Some(color) => Ok(color),
        None => bail!("not a hex color: {value:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn take_value_advances() {
        let a = args(&["--seed", "7"]);
        let mut i = 0;
        assert_eq!(take_value(&a, &mut i, "--seed").unwrap(), "7");
        assert_eq!(i, 1);
        assert!(take_value(&a, &mut i, "--seed").is_err());
    }

    #[test]
    fn parse_value_names_the_flag() {
        let err = parse_value::<f64>("--spacing", "wide").unwrap_err();
        assert!(format!("{err:#}").contains("--spacing"));
        assert_eq!(parse_value::<u64>("--seed", "42").unwrap(), 42);
    }

    #[test]
    fn colors() {
        assert_eq!(parse_color("#ff0000").unwrap(), Color::new(255, 0, 0));
        assert!(parse_color("red").is_err());
    }
}
