use std::io::{self, Write};

pub const RULE_WIDTH: usize = 80;

/// Errors and warnings collected over one run, in the order they happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl InstallationReport {
    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(%message, "recorded error");
        self.errors.push(message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(%message, "recorded warning");
        self.warnings.push(message);
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

pub fn heavy_rule() -> String {
    "=".repeat(RULE_WIDTH)
}

pub fn light_rule() -> String {
    "-".repeat(RULE_WIDTH)
}

/// Prints the closing summary. Reads the report only.
pub fn show_summary(report: &InstallationReport, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", heavy_rule())?;
    writeln!(out, "SUMMARY")?;
    writeln!(out, "{}", heavy_rule())?;

    if !report.errors.is_empty() {
        writeln!(out)?;
        writeln!(out, "ERRORS:")?;
        for error in &report.errors {
            writeln!(out, "   - {error}")?;
        }
    }

    if !report.warnings.is_empty() {
        writeln!(out)?;
        writeln!(out, "WARNINGS:")?;
        for warning in &report.warnings {
            writeln!(out, "   - {warning}")?;
        }
    }

    if report.is_clean() {
        writeln!(out)?;
        writeln!(out, "Installation successful!")?;
        writeln!(out)?;
        writeln!(out, "Next steps:")?;
        writeln!(out, "   1. Open the form on your site")?;
        writeln!(out, "   2. Try the 'Verify SIRET' button")?;
        writeln!(out, "   3. Check that the company fields fill in automatically")?;
    }

    writeln!(out)?;
    writeln!(out, "{}", heavy_rule())?;
    Ok(())
}
