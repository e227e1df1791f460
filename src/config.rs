//! Settings from the environment. Command line flags in the binary
//! override these.

use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use kstring::KString;

use crate::form::PLACEHOLDER_MESSAGE;
use crate::source::DEFAULT_RESOURCE;
use crate::util::{getenv, getenv_or, getenv_parse};

pub const DEFAULT_TEMPLATE: &str = "index.html";
pub const DEFAULT_LISTEN: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub template: PathBuf,
    /// A path (relative ones are relative to the template's
    /// directory) or an http(s) URL.
    pub content: String,
    pub listen: String,
    pub static_dir: Option<PathBuf>,
    pub form_message: KString,
    pub fetch_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            template: DEFAULT_TEMPLATE.into(),
            content: DEFAULT_RESOURCE.into(),
            listen: DEFAULT_LISTEN.into(),
            static_dir: None,
            form_message: KString::from_static(PLACEHOLDER_MESSAGE),
            fetch_timeout: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Config> {
        Ok(Config {
            template: getenv_or("PAGEBIND_TEMPLATE", Some(DEFAULT_TEMPLATE))?.into(),
            content: getenv_or("PAGEBIND_CONTENT", Some(DEFAULT_RESOURCE))?,
            listen: getenv_or("PAGEBIND_LISTEN", Some(DEFAULT_LISTEN))?,
            static_dir: getenv("PAGEBIND_STATIC_DIR")?.map(PathBuf::from),
            form_message: match getenv("PAGEBIND_FORM_MESSAGE")? {
                Some(s) => KString::from_string(s),
                None => KString::from_static(PLACEHOLDER_MESSAGE),
            },
            fetch_timeout: getenv_parse::<u64>("PAGEBIND_FETCH_TIMEOUT_SECS")?
                .map(Duration::from_secs),
        })
    }

    /// The directory relative content paths are resolved against.
    pub fn template_dir(&self) -> PathBuf {
        match self.template.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_from_env() {
        // The only test touching these variables.
        for name in ["PAGEBIND_TEMPLATE", "PAGEBIND_CONTENT", "PAGEBIND_LISTEN",
                     "PAGEBIND_STATIC_DIR", "PAGEBIND_FORM_MESSAGE",
                     "PAGEBIND_FETCH_TIMEOUT_SECS"] {
            std::env::remove_var(name);
        }
        assert_eq!(Config::from_env().unwrap(), Config::default());

        std::env::set_var("PAGEBIND_TEMPLATE", "site/index.html");
        std::env::set_var("PAGEBIND_CONTENT", "https://cafe.example/content.json");
        std::env::set_var("PAGEBIND_STATIC_DIR", "site");
        std::env::set_var("PAGEBIND_FORM_MESSAGE", "Danke!");
        std::env::set_var("PAGEBIND_FETCH_TIMEOUT_SECS", "5");
        let config = Config::from_env().unwrap();
        assert_eq!(config.template_dir(), PathBuf::from("site"));
        assert_eq!(config.content, "https://cafe.example/content.json");
        assert_eq!(config.listen, DEFAULT_LISTEN);
        assert_eq!(config.static_dir, Some(PathBuf::from("site")));
        assert_eq!(config.form_message.as_str(), "Danke!");
        assert_eq!(config.fetch_timeout, Some(Duration::from_secs(5)));

        std::env::set_var("PAGEBIND_FETCH_TIMEOUT_SECS", "soon");
        assert!(Config::from_env().is_err());
        for name in ["PAGEBIND_TEMPLATE", "PAGEBIND_CONTENT", "PAGEBIND_STATIC_DIR",
                     "PAGEBIND_FORM_MESSAGE", "PAGEBIND_FETCH_TIMEOUT_SECS"] {
            std::env::remove_var(name);
        }
    }

    #[test]
    fn t_template_dir() {
        assert_eq!(Config::default().template_dir(), PathBuf::from("."));
    }
}
