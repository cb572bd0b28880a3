use std::io::{self, Write};

use crate::error::InstallerError;
use crate::executor::RemoteExecutor;
use crate::form_mapping::{
    merge_form_mapping, read_settings, stored_mapping, FormFieldMapping, SettingsRead,
    TARGET_FORM_ID,
};
use crate::report::{heavy_rule, light_rule, show_summary, InstallationReport};
use crate::wp_cli::{
    config_get_api_key, find_plugin, option_get_settings, option_update_settings,
    parse_plugin_list, plugin_is_active, plugin_list, API_KEY_CONSTANT, COMPANION_PLUGIN_SLUG,
    PLUGIN_SLUG,
};

pub const API_KEY_PREVIEW_CHARS: usize = 20;

#[derive(Debug, Clone, Copy, Default)]
pub struct InstallOptions {
    /// Skip the settings write and print the payload instead.
    pub dry_run: bool,
    /// Read the settings back after writing them.
    pub verify: bool,
}

pub struct Installer<E> {
    executor: E,
    options: InstallOptions,
}

impl<E: RemoteExecutor> Installer<E> {
    pub fn new(executor: E, options: InstallOptions) -> Self {
        Self { executor, options }
    }

    /// Runs every step and returns the process exit code. Errors recorded in
    /// the report do not change the exit code; only a failure to connect or
    /// to write output does.
    pub fn run(&mut self, out: &mut dyn Write) -> i32 {
        match self.try_run(out) {
            Ok(report) => {
                tracing::info!(
                    errors = report.errors.len(),
                    warnings = report.warnings.len(),
                    "installation finished"
                );
                0
            }
            Err(error) => {
                tracing::error!(%error, "installation aborted");
                let _ = writeln!(out, "\n\nUnexpected error: {error}");
                1
            }
        }
    }

    pub fn try_run(&mut self, out: &mut dyn Write) -> Result<InstallationReport, InstallerError> {
        writeln!(out, "{}", heavy_rule())?;
        writeln!(out, "GRAVITY FORMS SIREN AUTOCOMPLETE INSTALLATION")?;
        writeln!(out, "{}", heavy_rule())?;
        writeln!(out)?;

        writeln!(out, "Connecting to the server...")?;
        self.executor.connect()?;
        writeln!(out)?;

        let mut report = InstallationReport::default();
        check_api_key(&mut self.executor, out, &mut report)?;
        install_form_mapping(&mut self.executor, out, &mut report, self.options)?;
        check_plugin_status(&mut self.executor, out, &mut report)?;
        show_summary(&report, out)?;

        Ok(report)
    }
}

/// First [`API_KEY_PREVIEW_CHARS`] characters followed by `...`.
pub fn masked_preview(value: &str) -> String {
    let mut preview: String = value.chars().take(API_KEY_PREVIEW_CHARS).collect();
    preview.push_str("...");
    preview
}

fn section(out: &mut dyn Write, title: &str) -> io::Result<()> {
    writeln!(out, "{title}")?;
    writeln!(out, "{}", light_rule())
}

pub fn check_api_key(
    executor: &mut dyn RemoteExecutor,
    out: &mut dyn Write,
    report: &mut InstallationReport,
) -> io::Result<()> {
    section(out, "Checking the API key...")?;

    let result = executor.execute(&config_get_api_key());
    let value = result.output.trim();

    if result.success && !value.is_empty() {
        writeln!(out, "API key configured: {}", masked_preview(value))?;
    } else {
        report.error(format!("API key {API_KEY_CONSTANT} not found in wp-config.php"));
        writeln!(out, "API key not found!")?;
        writeln!(out, "Add this line to wp-config.php:")?;
        writeln!(out, "   define( '{API_KEY_CONSTANT}', 'your_api_key' );")?;
    }

    writeln!(out)
}

pub fn install_form_mapping(
    executor: &mut dyn RemoteExecutor,
    out: &mut dyn Write,
    report: &mut InstallationReport,
    options: InstallOptions,
) -> io::Result<()> {
    section(out, &format!("Installing the mapping for form ID {TARGET_FORM_ID}..."))?;

    let mapping = FormFieldMapping::form_one();

    let settings = match read_settings(&executor.execute(&option_get_settings())) {
        SettingsRead::Loaded(settings) => settings,
        SettingsRead::Absent => {
            tracing::info!("no existing settings, starting from an empty object");
            Default::default()
        }
        SettingsRead::Unreadable(detail) => {
            tracing::warn!(%detail, "existing settings are not a JSON object");
            writeln!(
                out,
                "Existing settings could not be parsed ({detail}); starting from empty settings."
            )?;
            Default::default()
        }
    };

    let payload = merge_form_mapping(settings, TARGET_FORM_ID, &mapping)
        .and_then(|merged| serde_json::to_string(&merged));
    let payload = match payload {
        Ok(payload) => payload,
        Err(error) => {
            report.error(format!("Form mapping install failed: could not encode settings: {error}"));
            writeln!(out, "Error: {error}")?;
            return writeln!(out);
        }
    };

    if options.dry_run {
        writeln!(out, "Dry run: settings not written. Payload:")?;
        writeln!(out, "{payload}")?;
        return writeln!(out);
    }

    let result = executor.execute(&option_update_settings(&payload));
    if !result.success {
        report.error(format!("Form mapping install failed: {}", result.error));
        writeln!(out, "Error: {}", result.error)?;
        return writeln!(out);
    }

    writeln!(out, "Mapping for form ID {TARGET_FORM_ID} installed successfully!")?;
    writeln!(out)?;
    writeln!(out, "Mapping recap:")?;
    for line in mapping.recap_lines() {
        writeln!(out, "   - {line}")?;
    }

    if options.verify {
        verify_form_mapping(executor, out, report, &mapping)?;
    }

    writeln!(out)
}

fn verify_form_mapping(
    executor: &mut dyn RemoteExecutor,
    out: &mut dyn Write,
    report: &mut InstallationReport,
    expected: &FormFieldMapping,
) -> io::Result<()> {
    let problem = match read_settings(&executor.execute(&option_get_settings())) {
        SettingsRead::Loaded(settings) => match stored_mapping(&settings, TARGET_FORM_ID) {
            Some(stored) if &stored == expected => None,
            Some(_) => Some("stored entry differs from the installed mapping".to_string()),
            None => Some(format!("no entry for form {TARGET_FORM_ID}")),
        },
        SettingsRead::Absent => Some("settings could not be read back".to_string()),
        SettingsRead::Unreadable(detail) => Some(format!("settings could not be parsed: {detail}")),
    };

    match problem {
        None => writeln!(out, "Verified: stored mapping matches."),
        Some(detail) => {
            report.error(format!("Form mapping verification failed: {detail}"));
            writeln!(out, "Verification failed: {detail}")
        }
    }
}

pub fn check_plugin_status(
    executor: &mut dyn RemoteExecutor,
    out: &mut dyn Write,
    report: &mut InstallationReport,
) -> io::Result<()> {
    section(out, "Checking the plugin...")?;

    let listing = executor.execute(&plugin_list());
    let rows = if listing.success {
        parse_plugin_list(&listing.output).map_err(|error| error.to_string())
    } else {
        Err(listing.error)
    };

    match rows {
        Ok(rows) => match find_plugin(&rows, PLUGIN_SLUG) {
            Some(row) if row.is_active() => writeln!(out, "Plugin active")?,
            Some(row) => {
                report.warn(format!("Plugin {PLUGIN_SLUG} is installed but not active"));
                writeln!(out, "Plugin installed but not active (status: {})", row.status)?;
                writeln!(out, "Activate it with: wp plugin activate {PLUGIN_SLUG}")?;
            }
            None => {
                report.error(format!("Plugin {PLUGIN_SLUG} not found"));
                writeln!(out, "Plugin not found in the plugin list")?;
            }
        },
        Err(error) => {
            report.error(format!("Unable to list plugins: {error}"));
            writeln!(out, "Could not list plugins: {error}")?;
        }
    }

    let companion = executor.execute(&plugin_is_active(COMPANION_PLUGIN_SLUG));
    if companion.success {
        writeln!(out, "Gravity Forms active")?;
    } else {
        report.error("Gravity Forms is not active");
        writeln!(out, "Gravity Forms is not active!")?;
    }

    writeln!(out)
}
