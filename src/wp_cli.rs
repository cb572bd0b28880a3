use std::borrow::Cow;
use std::fmt;

use csv::{ReaderBuilder, Trim};

use crate::config::WordpressConfig;

pub const API_KEY_CONSTANT: &str = "GF_SIREN_API_KEY";
pub const SETTINGS_OPTION: &str = "gf_siren_settings";
pub const PLUGIN_SLUG: &str = "gravity_forms_siren_autocomplete";
pub const COMPANION_PLUGIN_SLUG: &str = "gravityforms";

/// A WP-CLI invocation kept as separate arguments until it is rendered for
/// the remote shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WpCommand {
    args: Vec<String>,
}

impl WpCommand {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// `wp config get` prints a wp-config.php constant bare, and those
    /// constants are keys and passwords.
    pub fn prints_secret(&self) -> bool {
        matches!(self.args.as_slice(), [group, action, ..] if group == "config" && action == "get")
    }

    /// Builds the shell line executed on the remote host. Every argument is
    /// escaped on its own, so JSON payloads travel as one word.
    pub fn render(&self, wordpress: &WordpressConfig) -> String {
        let mut words: Vec<String> = Vec::with_capacity(self.args.len() + 3);
        words.push(escape_word(&wordpress.wp_binary));
        if let Some(path) = wordpress.path.as_deref().filter(|value| !value.trim().is_empty()) {
            words.push(escape_word(&format!("--path={path}")));
        }
        if wordpress.allow_root {
            words.push("--allow-root".to_string());
        }
        words.extend(self.args.iter().map(|arg| escape_word(arg)));
        words.join(" ")
    }
}

impl fmt::Display for WpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wp {}", self.args.join(" "))
    }
}

fn escape_word(value: &str) -> String {
    shell_escape::unix::escape(Cow::Borrowed(value)).into_owned()
}

pub fn config_get_api_key() -> WpCommand {
    WpCommand::new(["config", "get", API_KEY_CONSTANT])
}

pub fn option_get_settings() -> WpCommand {
    WpCommand::new(["option", "get", SETTINGS_OPTION, "--format=json"])
}

pub fn option_update_settings(json: &str) -> WpCommand {
    WpCommand::new(["option", "update", SETTINGS_OPTION, json, "--format=json"])
}

pub fn plugin_list() -> WpCommand {
    WpCommand::new(["plugin", "list", "--field=name,status", "--format=csv"])
}

pub fn plugin_is_active(slug: &str) -> WpCommand {
    WpCommand::new(["plugin", "is-active", slug])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginRow {
    pub name: String,
    pub status: String,
}

impl PluginRow {
    pub fn is_active(&self) -> bool {
        matches!(self.status.as_str(), "active" | "active-network")
    }
}

/// Parses `wp plugin list --format=csv` output into one row per plugin.
pub fn parse_plugin_list(text: &str) -> Result<Vec<PluginRow>, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let name = record.get(0).unwrap_or_default();
        let status = record.get(1).unwrap_or_default();

        if index == 0 && name.eq_ignore_ascii_case("name") && status.eq_ignore_ascii_case("status") {
            continue;
        }
        if name.is_empty() {
            continue;
        }

        rows.push(PluginRow {
            name: name.to_string(),
            status: status.to_lowercase(),
        });
    }
    Ok(rows)
}

pub fn find_plugin<'a>(rows: &'a [PluginRow], slug: &str) -> Option<&'a PluginRow> {
    rows.iter().find(|row| row.name == slug)
}
