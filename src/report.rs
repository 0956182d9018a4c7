// Result presentation.
// The ResultSink seam and the plain-text console report.

use std::io::{self, Write};

use crate::analyze::{AnalysisResult, Summary};
use crate::error::Result;
use crate::export::ExportOutcome;
use crate::github::User;

/// Everything a sink needs to present one analysis run.
pub struct Report<'a> {
    pub summary: &'a Summary,
    pub analysis: &'a AnalysisResult<'a>,
}

/// Receives analysis results for display.
pub trait ResultSink {
    fn present(&mut self, report: &Report<'_>) -> Result<()>;

    /// Called once per attempted export file.
    fn exported(&mut self, _outcome: &ExportOutcome) -> Result<()> {
        Ok(())
    }
}

/// Plain-text report written to any `Write`, stdout by default.
pub struct ConsoleSink<W: Write> {
    out: W,
    max_display: usize,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout(max_display: usize) -> Self {
        Self::new(io::stdout(), max_display)
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W, max_display: usize) -> Self {
        Self { out, max_display }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn header(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "\n{}", "=".repeat(60))?;
        writeln!(self.out, " {}", text)?;
        writeln!(self.out, "{}", "=".repeat(60))
    }

    fn section(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "\n{}", "-".repeat(40))?;
        writeln!(self.out, " {}", text)?;
        writeln!(self.out, "{}", "-".repeat(40))
    }

    fn user_list(&mut self, users: &[&User]) -> io::Result<()> {
        if users.is_empty() {
            return writeln!(self.out, "  None");
        }

        for (i, user) in users.iter().take(self.max_display).enumerate() {
            writeln!(self.out, "  {}. {} ({})", i + 1, user.login, user.profile_url())?;
        }
        if users.len() > self.max_display {
            writeln!(
                self.out,
                "\n  ... and {} more not shown",
                users.len() - self.max_display
            )?;
        }
        Ok(())
    }

    fn render(&mut self, report: &Report<'_>) -> io::Result<()> {
        let summary = report.summary;
        let stats = &summary.stats;

        self.header(&format!(
            "GITHUB FOLLOWER ANALYSIS FOR: {} ({})",
            summary.username,
            summary.name.as_deref().unwrap_or("Unknown")
        ))?;

        writeln!(self.out, "\nAccount Stats:")?;
        writeln!(self.out, "  Followers:     {}", stats.total_followers)?;
        writeln!(self.out, "  Following:     {}", stats.total_following)?;
        writeln!(
            self.out,
            "  Follow Ratio:  {} (followers/following)",
            fixed(stats.follow_ratio, 2)
        )?;
        writeln!(
            self.out,
            "  Join Date:     {}",
            summary
                .join_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "unknown".to_string())
        )?;
        if let Some(days) = summary.account_age_days {
            writeln!(self.out, "  Account Age:   {} days", days)?;
        }
        writeln!(self.out, "  Public Repos:  {}", summary.public_repos)?;

        writeln!(self.out, "\nFollow Analysis:")?;
        writeln!(
            self.out,
            "  Mutual Follows:          {} ({})",
            stats.mutual_count,
            percent(stats.mutual_percentage)
        )?;
        writeln!(
            self.out,
            "  Not Following You Back:  {} ({})",
            stats.not_following_back_count,
            percent(stats.not_following_back_percentage)
        )?;
        writeln!(
            self.out,
            "  You're Not Following:    {} ({})",
            stats.not_followed_back_count,
            percent(stats.not_followed_back_percentage)
        )?;

        let analysis = report.analysis;
        self.section(&format!(
            "USERS NOT FOLLOWING YOU BACK ({} users)",
            analysis.not_following_back.len()
        ))?;
        self.user_list(&analysis.not_following_back)?;

        self.section(&format!(
            "FOLLOWERS YOU'RE NOT FOLLOWING BACK ({} users)",
            analysis.not_followed_back.len()
        ))?;
        self.user_list(&analysis.not_followed_back)
    }
}

impl<W: Write> ResultSink for ConsoleSink<W> {
    fn present(&mut self, report: &Report<'_>) -> Result<()> {
        self.render(report)?;
        self.out.flush()?;
        Ok(())
    }

    fn exported(&mut self, outcome: &ExportOutcome) -> Result<()> {
        match &outcome.result {
            Ok(artifact) => writeln!(
                self.out,
                "Exported {} to: {}",
                outcome.label,
                artifact.path.display()
            )?,
            Err(e) => writeln!(self.out, "Failed to export {}: {}", outcome.label, e)?,
        }
        Ok(())
    }
}

fn fixed(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => "n/a".to_string(),
    }
}

fn percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}%", v),
        None => "n/a".to_string(),
    }
}
