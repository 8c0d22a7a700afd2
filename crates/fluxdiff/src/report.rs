//! Markdown rendering of diff results.

use fluxdiff_core::DiffResult;

/// Minimal Markdown document builder
#[derive(Debug, Default)]
pub struct Markdown {
    doc: String,
}

impl Markdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn h1(&mut self, header: &str) -> &mut Self {
        self.doc.push_str(&format!("# {}\n\n", header));
        self
    }

    pub fn h2(&mut self, header: &str) -> &mut Self {
        self.doc.push_str(&format!("## {}\n\n", header));
        self
    }

    pub fn paragraph(&mut self, text: &str) -> &mut Self {
        self.doc.push_str(&format!("{}\n\n", text));
        self
    }

    pub fn diff_block(&mut self, diff: &str) -> &mut Self {
        self.doc
            .push_str(&format!("```diff\n{}\n```\n\n", diff.trim_end_matches('\n')));
        self
    }

    pub fn as_str(&self) -> &str {
        &self.doc
    }
}

/// Render results as a Markdown report, one section per release
pub fn render_markdown(results: &[DiffResult]) -> String {
    let mut md = Markdown::new();
    md.h1("HelmRelease diff");

    if results.is_empty() {
        md.paragraph("No changed HelmReleases with a previous version.");
        return md.as_str().to_string();
    }

    for result in results {
        let new = &result.new_manifest;
        let old = &result.old_manifest;

        md.h2(&new.path.display().to_string());
        md.paragraph(&format!(
            "Chart `{}/{}`: {} -> {}",
            new.chart_ref,
            new.chart_name,
            display_version(&old.chart_version),
            display_version(&new.chart_version)
        ));

        if result.has_changes() {
            md.diff_block(&result.diff);
        } else {
            md.paragraph("No changes in rendered output.");
        }
    }

    md.as_str().to_string()
}

fn display_version(version: &str) -> &str {
    if version.is_empty() {
        "latest"
    } else {
        version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluxdiff_core::ReleaseManifest;
    use std::path::PathBuf;

    fn manifest(path: &str, version: &str) -> ReleaseManifest {
        ReleaseManifest {
            path: PathBuf::from(path),
            name: "podinfo".into(),
            namespace: None,
            chart_ref: "podinfo".into(),
            chart_name: "podinfo".into(),
            chart_version: version.into(),
            values: None,
        }
    }

    #[test]
    fn test_markdown_builder() {
        let mut md = Markdown::new();
        md.h1("Title").h2("Section").diff_block("-a\n+b\n");
        assert_eq!(md.as_str(), "# Title\n\n## Section\n\n```diff\n-a\n+b\n```\n\n");
    }

    #[test]
    fn test_empty_report() {
        let report = render_markdown(&[]);
        assert!(report.starts_with("# HelmRelease diff\n\n"));
        assert!(report.contains("No changed HelmReleases"));
    }

    #[test]
    fn test_report_sections() {
        let results = vec![
            DiffResult {
                new_manifest: manifest("apps/podinfo.yaml", "1.1.0"),
                old_manifest: manifest("ft_previous_revision-x/apps/podinfo.yaml", "1.0.0"),
                diff: "-version: 1.0.0\n+version: 1.1.0\n".into(),
            },
            DiffResult {
                new_manifest: manifest("apps/other.yaml", "2.0.0"),
                old_manifest: manifest("ft_previous_revision-x/apps/other.yaml", "2.0.0"),
                diff: String::new(),
            },
        ];

        let report = render_markdown(&results);

        assert!(report.contains("## apps/podinfo.yaml\n\nChart `podinfo/podinfo`: 1.0.0 -> 1.1.0"));
        assert!(report.contains("```diff\n-version: 1.0.0\n+version: 1.1.0\n```"));
        assert!(report.contains("## apps/other.yaml"));
        assert!(report.contains("No changes in rendered output."));
    }

    #[test]
    fn test_unpinned_version_shown_as_latest() {
        let results = vec![DiffResult {
            new_manifest: manifest("apps/podinfo.yaml", ""),
            old_manifest: manifest("ft_previous_revision-x/apps/podinfo.yaml", "1.0.0"),
            diff: "-version: 1.0.0\n+version: 1.2.0\n".into(),
        }];

        let report = render_markdown(&results);
        assert!(report.contains("Chart `podinfo/podinfo`: 1.0.0 -> latest"));
    }
}
