use plancore::export::ExportFormat;
use plancore::telemetry::MetricsSnapshot;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub format: ExportFormat,
    pub result: Result<PathBuf, String>,
}

/// Text rendition of the preview step, printed at the end of a session.
#[derive(Debug, Clone, Default)]
pub struct SessionReport {
    pub original: Vec<String>,
    pub analysis: Vec<String>,
    pub plan: Vec<String>,
    pub exports: Vec<ExportOutcome>,
    pub metrics: Option<MetricsSnapshot>,
}

impl SessionReport {
    pub fn failed_exports(&self) -> usize {
        self.exports
            .iter()
            .filter(|outcome| outcome.result.is_err())
            .count()
    }
}

fn section(f: &mut fmt::Formatter<'_>, title: &str, lines: &[String]) -> fmt::Result {
    writeln!(f, "== {} ==", title)?;
    for line in lines {
        writeln!(f, "  {}", line)?;
    }
    Ok(())
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        section(f, "Original Plot", &self.original)?;
        section(f, "CV Analysis", &self.analysis)?;
        section(f, "Final Plan", &self.plan)?;
        if !self.exports.is_empty() {
            writeln!(f, "== Downloads ==")?;
            for outcome in &self.exports {
                match &outcome.result {
                    Ok(path) => writeln!(f, "  {} -> {}", outcome.format, path.display())?,
                    Err(err) => writeln!(f, "  {} failed: {}", outcome.format, err)?,
                }
            }
        }
        if let Some(metrics) = &self.metrics {
            writeln!(f, "Backend: {}", metrics)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_renders_sections_and_downloads() {
        let report = SessionReport {
            original: vec!["Plot dimensions: 640 × 480 pixels".into()],
            analysis: vec!["Rooms Detected: 3".into()],
            plan: vec!["Vastu Score: 82/100".into()],
            exports: vec![
                ExportOutcome {
                    format: ExportFormat::Pdf,
                    result: Ok(PathBuf::from("out/floorplan.pdf")),
                },
                ExportOutcome {
                    format: ExportFormat::Dxf,
                    result: Err("Failed to download DXF file".into()),
                },
            ],
            metrics: None,
        };

        let text = report.to_string();
        assert!(text.contains("== Final Plan ==\n  Vastu Score: 82/100\n"));
        assert!(text.contains("  PDF -> out/floorplan.pdf\n"));
        assert!(text.contains("  DXF failed: Failed to download DXF file\n"));
        assert_eq!(report.failed_exports(), 1);
    }
}
