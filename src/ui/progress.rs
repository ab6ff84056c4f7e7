use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

const FILE_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}";
const PROBE_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.yellow/red}] {pos}/{len} URLs {msg}";

pub struct ProgressReporter {
    multi_progress: Arc<MultiProgress>,
    file_progress: Option<ProgressBar>,
    probe_progress: Option<ProgressBar>,
    enabled: bool,
}

impl ProgressReporter {
    pub fn new(enabled: bool) -> Self {
        Self {
            multi_progress: Arc::new(MultiProgress::new()),
            file_progress: None,
            probe_progress: None,
            enabled,
        }
    }

    pub fn start_file_processing(&mut self, total_files: usize) {
        if !self.enabled {
            return;
        }

        let pb = self
            .multi_progress
            .add(ProgressBar::new(total_files as u64));
        if let Ok(style) = ProgressStyle::default_bar().template(FILE_TEMPLATE) {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message("Extracting links");
        self.file_progress = Some(pb);
    }

    pub fn update_file_progress(&self, current: usize) {
        if let Some(ref pb) = self.file_progress {
            pb.set_position(current as u64);
        }
    }

    pub fn finish_file_processing(&self) {
        if let Some(ref pb) = self.file_progress {
            pb.finish_with_message("✓ File scanning complete");
        }
    }

    pub fn start_probing(&mut self, total_urls: usize) {
        if !self.enabled {
            return;
        }

        let pb = self.multi_progress.add(ProgressBar::new(total_urls as u64));
        if let Ok(style) = ProgressStyle::default_bar().template(PROBE_TEMPLATE) {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message("Checking external links");
        pb.enable_steady_tick(Duration::from_millis(120));
        self.probe_progress = Some(pb);
    }

    pub fn update_probe_progress(&self, current: usize) {
        if let Some(ref pb) = self.probe_progress {
            pb.set_position(current as u64);
        }
    }

    pub fn finish_probing(&self, ok_count: usize, total_count: usize) {
        if let Some(ref pb) = self.probe_progress {
            let message = if ok_count == total_count {
                "✓ All external links reachable".to_string()
            } else {
                format!("✓ Probing complete ({ok_count}/{total_count} reachable)")
            };
            pb.finish_with_message(message);
        }
    }

    pub fn finish_and_clear(&self) {
        if self.enabled {
            self.multi_progress.clear().unwrap_or(());
        }
    }

    pub fn log_warning(&self, message: &str) {
        if self.enabled {
            self.multi_progress
                .println(format!("⚠ {message}"))
                .unwrap_or(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_reporter_creates_no_bars() {
        let mut reporter = ProgressReporter::new(false);
        reporter.start_file_processing(10);
        reporter.start_probing(5);

        assert!(!reporter.enabled);
        assert!(reporter.file_progress.is_none());
        assert!(reporter.probe_progress.is_none());

        // All updates are no-ops when disabled
        reporter.update_file_progress(3);
        reporter.update_probe_progress(2);
        reporter.finish_probing(2, 5);
        reporter.finish_and_clear();
    }

    #[test]
    fn test_enabled_reporter_tracks_positions() {
        let mut reporter = ProgressReporter::new(true);
        reporter.start_file_processing(4);
        reporter.update_file_progress(2);
        assert_eq!(reporter.file_progress.as_ref().map(|pb| pb.position()), Some(2));

        reporter.start_probing(3);
        reporter.update_probe_progress(3);
        assert_eq!(reporter.probe_progress.as_ref().map(|pb| pb.position()), Some(3));

        reporter.finish_file_processing();
        reporter.finish_probing(3, 3);
        reporter.finish_and_clear();
    }

    #[test]
    fn test_bar_messages_are_rendered_by_templates() {
        let mut reporter = ProgressReporter::new(true);
        reporter.start_file_processing(1);
        reporter.start_probing(4);
        let file_bar = reporter.file_progress.clone().unwrap();
        let probe_bar = reporter.probe_progress.clone().unwrap();
        assert_eq!(file_bar.message(), "Extracting links");
        assert_eq!(probe_bar.message(), "Checking external links");

        reporter.finish_file_processing();
        reporter.finish_probing(3, 4);
        assert_eq!(file_bar.message(), "✓ File scanning complete");
        assert_eq!(probe_bar.message(), "✓ Probing complete (3/4 reachable)");
        reporter.finish_and_clear();
    }

    #[test]
    fn test_templates_include_message_placeholder() {
        for template in [FILE_TEMPLATE, PROBE_TEMPLATE] {
            assert!(template.contains("{msg}"));
            assert!(ProgressStyle::default_bar().template(template).is_ok());
        }
    }
}
