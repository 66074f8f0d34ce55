//! Assessment report and its JSON / plain-text renderings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

use crate::config::defaults::TOP_THEMES;
use crate::config::PaceConfig;
use crate::types::{format_amount, BenefitEstimate, PaceResult, ProposedAction, RankedWaste};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Report I/O error ({}): {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Report serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Output format of an exported report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Json,
    Text,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "txt" => Ok(Self::Text),
            other => Err(format!("unknown report format '{other}' (expected json or text)")),
        }
    }
}

/// Everything the client deck used to show, as plain data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub generated_at: DateTime<Utc>,
    pub profile: Option<String>,
    pub profile_label: Option<String>,
    pub currency: String,
    /// Sum of the per-waste benefit estimates (business case)
    pub total_estimated_benefit: f64,
    pub pace: PaceResult,
    /// Highest ranked wastes, at most six
    pub top_themes: Vec<RankedWaste>,
    /// Badge progress, tracked / required capped at 1.0
    pub badge_progress: f64,
    pub actions: Vec<ProposedAction>,
    /// Sum of the (boosted) benefit of every proposed action
    pub total_action_potential: f64,
}

impl AssessmentReport {
    pub fn new(
        config: &PaceConfig,
        profile: Option<&str>,
        benefits: &BenefitEstimate,
        pace: PaceResult,
        actions: Vec<ProposedAction>,
    ) -> Self {
        let top_themes = pace.top(TOP_THEMES).to_vec();
        let badge_progress = pace.badge.progress();
        let total_action_potential = actions.iter().map(|a| a.est_annual_benefit).sum();

        Self {
            generated_at: Utc::now(),
            profile: profile.map(str::to_string),
            profile_label: profile
                .and_then(|key| config.profile(key))
                .map(|p| p.label.clone()),
            currency: config.currency().to_string(),
            total_estimated_benefit: benefits.total(),
            pace,
            top_themes,
            badge_progress,
            actions,
            total_action_potential,
        }
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Plain-text action plan.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "KAFAA PACE ASSESSMENT")?;
        writeln!(out, "Generated: {}", self.generated_at.format("%Y-%m-%d %H:%M UTC"))?;
        match (&self.profile, &self.profile_label) {
            (Some(key), Some(label)) => writeln!(out, "Profile:   {label} ({key})")?,
            (Some(key), None) => writeln!(out, "Profile:   {key}")?,
            _ => writeln!(out, "Profile:   none")?,
        }
        writeln!(
            out,
            "Business case: {}",
            format_amount(self.total_estimated_benefit, &self.currency)
        )?;
        writeln!(out)?;

        writeln!(out, "TOP THEMES (PACE)")?;
        if self.top_themes.is_empty() {
            writeln!(out, "  No wastes assessed")?;
        }
        for (i, theme) in self.top_themes.iter().enumerate() {
            let edge = self.pace.edge.get(&theme.waste).copied().unwrap_or(1.0);
            writeln!(
                out,
                "  {:>2}. {:<15} score {:>6.2}  edge {:.2}",
                i + 1,
                theme.waste.label(),
                theme.score,
                edge
            )?;
        }
        writeln!(out)?;

        let badge = &self.pace.badge;
        writeln!(
            out,
            "KPI badge: {}/{} objectives tracked ({:.0}%){}",
            badge.tracked,
            badge.required,
            self.badge_progress * 100.0,
            if badge.enabled { ", enabled" } else { "" }
        )?;
        writeln!(out)?;

        writeln!(out, "ACTION PLAN")?;
        if self.actions.is_empty() {
            writeln!(out, "  No countermeasures proposed")?;
        } else {
            writeln!(
                out,
                "  {:>3}  {:<6} {:<24} {:<15} {:<40} {:<7} {:<8} {:>16}",
                "#", "When", "Stage", "Waste", "Action", "Effort", "Impact", "Est. benefit"
            )?;
            for action in &self.actions {
                writeln!(
                    out,
                    "  {:>3}  {:<6} {:<24} {:<15} {:<40} {:<7} {:<8} {:>16}",
                    action.rank,
                    action.priority.to_string(),
                    action.stage,
                    action.waste.label(),
                    action.action,
                    action.effort.to_string(),
                    action.impact_pct_range.to_string(),
                    action.est_annual_benefit_fmt
                )?;
                if !action.kpi.is_empty() {
                    writeln!(out, "       KPI: {}", action.kpi)?;
                }
                if !action.preconditions.is_empty() {
                    writeln!(out, "       Pre: {}", action.preconditions)?;
                }
            }
        }
        writeln!(out)?;
        writeln!(
            out,
            "Total action potential: {}",
            format_amount(self.total_action_potential, &self.currency)
        )
    }

    pub fn render(&self, format: ReportFormat) -> Result<String, ExportError> {
        match format {
            ReportFormat::Json => self.to_json(),
            ReportFormat::Text => Ok(self.to_text()),
        }
    }

    /// Render and write the report to a file.
    pub fn export(&self, path: &Path, format: ReportFormat) -> Result<(), ExportError> {
        let contents = self.render(format)?;
        std::fs::write(path, contents).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), actions = self.actions.len(), "Report exported");
        Ok(())
    }
}
