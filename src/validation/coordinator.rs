use futures::{StreamExt, stream};
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::constants::messages;
use crate::core::error::Result;
use crate::core::types::{Category, ClassifiedLink, LinkStatus};
use crate::discovery::{Finder, LinkFinder, classify_record, discover_files, project_root};
use crate::reporting::logging;
use crate::reporting::report::{Report, ReportEntry};
use crate::ui::progress::ProgressReporter;
use crate::validation::prober::{HttpTransport, ProbeOutcome, Prober, ReqwestTransport};
use crate::validation::resolver::resolve_internal;

/// Runs one full check over a directory tree and is the only writer of the
/// resulting `Report`.
pub struct LinkChecker<T> {
    config: Config,
    transport: Arc<T>,
    cancel: CancellationToken,
    finder: Finder,
}

impl LinkChecker<ReqwestTransport> {
    /// Checker backed by a real HTTP client built from `config`
    pub fn with_reqwest(config: Config, cancel: CancellationToken) -> Result<Self> {
        let transport = ReqwestTransport::from_config(&config)?;
        Ok(Self::new(config, Arc::new(transport), cancel))
    }
}

impl<T: HttpTransport> LinkChecker<T> {
    pub fn new(config: Config, transport: Arc<T>, cancel: CancellationToken) -> Self {
        Self {
            config,
            transport,
            cancel,
            finder: Finder::default(),
        }
    }

    pub async fn check(
        &self,
        root: &Path,
        mut progress: Option<&mut ProgressReporter>,
    ) -> Result<Report> {
        let started = Instant::now();
        let exclude = self.config.compile_exclude_patterns()?;
        let discovery = discover_files(root, &self.config.file_extensions())?;
        let project_root = project_root(root);
        logging::log_file_info(discovery.files.len(), &discovery.files);

        let mut report = Report {
            errors: discovery.errors,
            files_scanned: discovery.files.len(),
            ..Report::default()
        };

        if let Some(prog) = progress.as_deref_mut() {
            prog.start_file_processing(discovery.files.len());
        }
        let scan = self
            .finder
            .find_links(&discovery.files, progress.as_deref());
        if let Some(prog) = progress.as_deref() {
            prog.finish_file_processing();
        }

        report.errors.extend(scan.errors);
        report.links_found = scan.links.len();

        let mut external: Vec<ClassifiedLink> = Vec::new();
        for record in scan.links {
            let link = classify_record(record);
            let target = link.record.target.as_str();

            if target.is_empty() {
                report.push(ReportEntry::new(
                    link,
                    LinkStatus::Warning,
                    messages::EMPTY_TARGET,
                ));
                continue;
            }
            if exclude.iter().any(|re| re.is_match(target)) {
                report.push(ReportEntry::new(
                    link,
                    LinkStatus::Skipped,
                    messages::EXCLUDED,
                ));
                continue;
            }

            match link.category {
                Category::Skip => {
                    let detail = if target.starts_with('#') {
                        messages::SKIPPED_FRAGMENT
                    } else {
                        messages::SKIPPED_SCHEME
                    };
                    report.push(ReportEntry::new(link, LinkStatus::Skipped, detail));
                }
                Category::Internal => {
                    let resolution =
                        resolve_internal(target, &link.record.source_file, &project_root);
                    let entry = if resolution.exists {
                        ReportEntry::new(link, LinkStatus::Valid, messages::INTERNAL_FOUND)
                    } else {
                        ReportEntry::new(link, LinkStatus::Broken, messages::INTERNAL_MISSING)
                    };
                    report.push(entry);
                }
                Category::External => external.push(link),
            }
        }

        let unique = unique_targets(&external);
        report.unique_external_urls = unique.len();
        logging::log_link_discovery(report.links_found, unique.len());

        let outcomes = self.probe_all(unique, progress.as_deref_mut()).await;

        for link in external {
            let entry = match outcomes.get(&link.record.target) {
                Some(outcome) if outcome.cancelled => {
                    ReportEntry::new(link, LinkStatus::Warning, outcome.detail.clone())
                }
                Some(outcome) if outcome.ok => {
                    ReportEntry::new(link, LinkStatus::Valid, outcome.detail.clone())
                }
                Some(outcome) => {
                    ReportEntry::new(link, LinkStatus::Broken, outcome.detail.clone())
                }
                None => ReportEntry::new(link, LinkStatus::Warning, messages::CANCELLED),
            };
            report.push(entry);
        }

        report.cancelled = self.cancel.is_cancelled();
        report.sort();

        logging::log_run_complete(
            report.entries.len(),
            report.counts().broken,
            started.elapsed().as_millis(),
        );
        Ok(report)
    }

    /// Probe every unique URL under the shared gate. Outcomes come back through
    /// the stream into this single loop.
    async fn probe_all(
        &self,
        urls: Vec<String>,
        mut progress: Option<&mut ProgressReporter>,
    ) -> FxHashMap<String, ProbeOutcome> {
        let total = urls.len();
        if let Some(prog) = progress.as_deref_mut() {
            prog.start_probing(total);
        }

        let max_concurrent = self.config.max_concurrent().max(1);
        let prober = Prober::new(
            self.transport.clone(),
            max_concurrent,
            self.config.max_retries(),
            self.cancel.clone(),
        );

        let mut results = stream::iter(urls)
            .map(|url| {
                let prober = &prober;
                async move { prober.probe(&url).await }
            })
            .buffer_unordered(max_concurrent);

        let mut outcomes = FxHashMap::with_capacity_and_hasher(total, Default::default());
        let mut ok_count = 0;
        while let Some(outcome) = results.next().await {
            logging::log_probe_result(&outcome.url, outcome.ok, &outcome.detail, outcome.attempts);
            if outcome.ok {
                ok_count += 1;
            }
            outcomes.insert(outcome.url.clone(), outcome);
            if let Some(prog) = progress.as_deref() {
                prog.update_probe_progress(outcomes.len());
            }
        }

        if let Some(prog) = progress.as_deref() {
            prog.finish_probing(ok_count, total);
        }
        outcomes
    }
}

/// External targets deduplicated by literal string, in first-seen order
fn unique_targets(links: &[ClassifiedLink]) -> Vec<String> {
    let mut seen = FxHashSet::with_capacity_and_hasher(links.len(), Default::default());
    links
        .iter()
        .filter(|link| seen.insert(link.record.target.as_str()))
        .map(|link| link.record.target.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use crate::validation::prober::{ProbeMethod, TransportError};
    use async_trait::async_trait;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    /// Answers 404 for URLs containing "missing", 200 otherwise, and counts
    /// calls per URL
    #[derive(Default)]
    struct FakeTransport {
        calls: Mutex<FxHashMap<String, usize>>,
    }

    impl FakeTransport {
        fn calls_for(&self, url: &str) -> usize {
            self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
        }

        fn total_calls(&self) -> usize {
            self.calls.lock().unwrap().values().sum()
        }
    }

    #[async_trait]
    impl HttpTransport for FakeTransport {
        async fn request(
            &self,
            _method: ProbeMethod,
            url: &str,
        ) -> std::result::Result<u16, TransportError> {
            *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;
            if url.contains("missing") {
                Ok(404)
            } else {
                Ok(200)
            }
        }
    }

    fn checker(config: Config) -> (LinkChecker<FakeTransport>, Arc<FakeTransport>) {
        let transport = Arc::new(FakeTransport::default());
        let checker = LinkChecker::new(config, transport.clone(), CancellationToken::new());
        (checker, transport)
    }

    fn tree(files: &[(&str, &str)]) -> std::result::Result<TempDir, Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        for (name, content) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, content)?;
        }
        Ok(dir)
    }

    fn entry_for<'a>(report: &'a Report, target: &str) -> &'a ReportEntry {
        report
            .entries
            .iter()
            .find(|e| e.link.record.target == target)
            .unwrap()
    }

    #[tokio::test]
    async fn test_check__internal_md_inference() -> TestResult {
        let dir = tree(&[
            ("prompts/a.md", "[b](b)\n[c](c)\n"),
            ("prompts/b.md", "# B\n"),
        ])?;
        let (checker, _) = checker(Config::default());

        let report = checker.check(dir.path(), None).await?;

        assert_eq!(entry_for(&report, "b").status, LinkStatus::Valid);
        assert_eq!(entry_for(&report, "c").status, LinkStatus::Broken);
        assert_eq!(entry_for(&report, "c").detail, "Internal path not found");
        assert!(report.has_broken());
        Ok(())
    }

    #[tokio::test]
    async fn test_check__link_titles_do_not_break_targets() -> TestResult {
        let dir = tree(&[
            (
                "doc.md",
                "[g](guide.md \"Guide\")\n\
                 [w](https://en.wikipedia.org/wiki/Rust_(programming_language) 'Rust')\n\
                 [r][site]\n\n\
                 [site]: https://example.org \"Site\"\n",
            ),
            ("guide.md", "# Guide\n"),
        ])?;
        let (checker, transport) = checker(Config::default());

        let report = checker.check(dir.path(), None).await?;

        assert!(!report.has_broken());
        assert_eq!(entry_for(&report, "guide.md").status, LinkStatus::Valid);
        assert_eq!(
            transport.calls_for("https://en.wikipedia.org/wiki/Rust_(programming_language)"),
            1
        );
        assert_eq!(transport.calls_for("https://example.org"), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_check__skipped_links_never_probed() -> TestResult {
        let dir = tree(&[(
            "doc.md",
            "[m](mailto:a@b.com) [t](tel:+1) [j](javascript:void(0)) [s](#section)\n",
        )])?;
        let (checker, transport) = checker(Config::default());

        let report = checker.check(dir.path(), None).await?;

        assert_eq!(report.entries.len(), 4);
        assert!(report.entries.iter().all(|e| e.status == LinkStatus::Skipped));
        assert_eq!(entry_for(&report, "#section").detail, "Fragment link");
        assert_eq!(entry_for(&report, "mailto:a@b.com").detail, "Skipped URL type");
        assert_eq!(transport.total_calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_check__dedup_probes_once_and_fans_out() -> TestResult {
        let dir = tree(&[
            ("one.md", "[x](https://shared.test/page)\n"),
            ("two.md", "\n\n<a href=\"https://shared.test/page\">again</a>\n"),
        ])?;
        let (checker, transport) = checker(Config::default());

        let report = checker.check(dir.path(), None).await?;

        assert_eq!(transport.calls_for("https://shared.test/page"), 1);
        assert_eq!(report.unique_external_urls, 1);
        assert_eq!(report.entries.len(), 2);
        assert!(report.entries.iter().all(|e| e.status == LinkStatus::Valid));
        assert!(report.entries.iter().all(|e| e.detail == "OK (200)"));
        Ok(())
    }

    #[tokio::test]
    async fn test_check__external_404_is_broken() -> TestResult {
        let dir = tree(&[("doc.md", "[gone](https://site.test/missing)\n")])?;
        let (checker, _) = checker(Config::default());

        let report = checker.check(dir.path(), None).await?;

        let entry = entry_for(&report, "https://site.test/missing");
        assert_eq!(entry.status, LinkStatus::Broken);
        assert_eq!(entry.detail, "HTTP 404");
        assert_eq!(entry.link.category, Category::External);
        Ok(())
    }

    #[tokio::test]
    async fn test_check__idempotent() -> TestResult {
        let dir = tree(&[
            ("a.md", "[b](b.md) [gone](nope.md) [w](https://w.test/)\n"),
            ("b.md", "[a](a) [m](mailto:x@y.z)\n"),
            ("sub/c.md", "[up](../a.md) ![img](https://w.test/missing.png)\n"),
        ])?;
        let (checker, _) = checker(Config::default());

        let first = checker.check(dir.path(), None).await?;
        let second = checker.check(dir.path(), None).await?;

        assert_eq!(first, second);
        assert_eq!(first.links_found, 7);
        Ok(())
    }

    #[tokio::test]
    async fn test_check__exclude_pattern_and_empty_target() -> TestResult {
        let dir = tree(&[(
            "doc.md",
            "[local](http://localhost:8080/x) [empty]() [ok](https://ok.test/)\n",
        )])?;
        let config = Config {
            exclude_patterns: Some(vec!["localhost".to_string()]),
            ..Config::default()
        };
        let (checker, transport) = checker(config);

        let report = checker.check(dir.path(), None).await?;

        let excluded = entry_for(&report, "http://localhost:8080/x");
        assert_eq!(excluded.status, LinkStatus::Skipped);
        assert_eq!(excluded.detail, "Excluded by pattern");
        assert_eq!(entry_for(&report, "").status, LinkStatus::Warning);
        assert_eq!(transport.calls_for("http://localhost:8080/x"), 0);
        assert_eq!(transport.calls_for("https://ok.test/"), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_check__unreadable_file_is_run_error() -> TestResult {
        let dir = tree(&[("good.md", "[x](good.md)\n")])?;
        fs::write(dir.path().join("bad.md"), [0xffu8, 0xfe, 0x00])?;
        let (checker, _) = checker(Config::default());

        let report = checker.check(dir.path(), None).await?;

        assert_eq!(report.files_scanned, 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.entries.len(), 1);
        assert!(!report.has_broken());
        Ok(())
    }

    #[tokio::test]
    async fn test_check__cancelled_run_marks_external_as_warning() -> TestResult {
        let dir = tree(&[("doc.md", "[w](https://w.test/) [b](doc.md)\n")])?;
        let transport = Arc::new(FakeTransport::default());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let checker = LinkChecker::new(Config::default(), transport.clone(), cancel);

        let report = checker.check(dir.path(), None).await?;

        assert!(report.cancelled);
        assert!(!report.is_clean());
        let external = entry_for(&report, "https://w.test/");
        assert_eq!(external.status, LinkStatus::Warning);
        assert_eq!(external.detail, "Not checked: run cancelled");
        assert_eq!(entry_for(&report, "doc.md").status, LinkStatus::Valid);
        assert_eq!(transport.total_calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_check__missing_root_is_error() {
        let (checker, _) = checker(Config::default());
        let result = checker.check(Path::new("/no/such/root"), None).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_check__single_file_root_and_site_absolute() -> TestResult {
        let dir = tree(&[
            ("README.md", "[guide](/docs/guide)\n"),
            ("docs/guide.md", "# Guide\n"),
        ])?;
        let (checker, _) = checker(Config::default());

        let report = checker.check(&dir.path().join("README.md"), None).await?;

        assert_eq!(report.files_scanned, 1);
        assert_eq!(entry_for(&report, "/docs/guide").status, LinkStatus::Valid);
        Ok(())
    }

    #[test]
    fn test_unique_targets__first_seen_order() {
        use crate::core::types::{LinkKind, LinkRecord};
        let link = |t: &str| {
            ClassifiedLink::new(
                LinkRecord::new("a.md", 1, LinkKind::MarkdownInline, "", t).unwrap(),
                Category::External,
            )
        };
        let links = vec![link("https://b.test"), link("https://a.test"), link("https://b.test")];

        assert_eq!(
            unique_targets(&links),
            vec!["https://b.test".to_string(), "https://a.test".to_string()]
        );
    }
}
