use std::{env::VarError, str::FromStr, fmt::Display};

use anyhow::{Result, bail};


/// Get the env var `name`, or `fallbackvalue` if it isn't set. Error
/// if it isn't set and there's no fallback, or it isn't unicode.
pub fn getenv_or(name: &str, fallbackvalue: Option<&str>) -> Result<String> {
    match std::env::var(name) {
        Ok(s) => Ok(s),
        Err(e) => match e {
            VarError::NotPresent =>
                match fallbackvalue {
                    Some(v) => Ok(v.to_string()),
                    None => bail!("{name:?} env var is missing and \
                                   no default provided"),
                },
            VarError::NotUnicode(_) => bail!("{name:?} env var is not unicode"),
        }
    }
}

/// Get the env var `name` if it is set. An empty value counts as
/// set.
pub fn getenv(name: &str) -> Result<Option<String>> {
    match std::env::var(name) {
        Ok(s) => Ok(Some(s)),
        Err(e) => match e {
            VarError::NotPresent => Ok(None),
            VarError::NotUnicode(_) => bail!("{name:?} env var is not unicode"),
        }
    }
}

/// Like getenv, parsing the value if there is one.
pub fn getenv_parse<T>(name: &str) -> Result<Option<T>>
where T: FromStr,
      T::Err: Display
{
    match getenv(name)? {
        Some(s) => match s.trim().parse() {
            Ok(v) => Ok(Some(v)),
            Err(e) => bail!("{name:?} env var: can't parse {s:?}: {e}"),
        },
        None => Ok(None)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own variable names, tests run in parallel.

    #[test]
    fn t_getenv() {
        std::env::remove_var("PAGEBIND_T_GETENV");
        assert_eq!(getenv("PAGEBIND_T_GETENV").unwrap(), None);
        assert_eq!(getenv_or("PAGEBIND_T_GETENV", Some("x")).unwrap(), "x");
        assert!(getenv_or("PAGEBIND_T_GETENV", None).is_err());
        std::env::set_var("PAGEBIND_T_GETENV", "");
        assert_eq!(getenv("PAGEBIND_T_GETENV").unwrap(), Some("".into()));
        assert_eq!(getenv_or("PAGEBIND_T_GETENV", Some("x")).unwrap(), "");
    }

    #[test]
    fn t_getenv_parse() {
        std::env::remove_var("PAGEBIND_T_PARSE");
        assert_eq!(getenv_parse::<u64>("PAGEBIND_T_PARSE").unwrap(), None);
        std::env::set_var("PAGEBIND_T_PARSE", " 12 ");
        assert_eq!(getenv_parse::<u64>("PAGEBIND_T_PARSE").unwrap(), Some(12));
        std::env::set_var("PAGEBIND_T_PARSE", "twelve");
        let e = getenv_parse::<u64>("PAGEBIND_T_PARSE").unwrap_err();
        assert!(e.to_string().contains("PAGEBIND_T_PARSE"));
    }
}
