//! Output formatting utilities

use crate::application::RunReport;
use crate::domain::RetagPolicy;

/// Format the end-of-run summary
pub fn format_summary(report: &RunReport) -> String {
    if report.found == 0 {
        return String::new();
    }

    if report.print_urls {
        return format!("\nPrinted {} media URL(s).\n", report.printed);
    }

    let mut output = format!(
        "\nDone. Downloaded {} file(s) to: {}\n",
        report.downloaded,
        report.output_root.display()
    );
    if report.failed > 0 || report.unresolved > 0 {
        output.push_str(&format!(
            "Skipped {} record(s) without media, {} failed download(s).\n",
            report.unresolved, report.failed
        ));
    }
    if report.retag != RetagPolicy::Skip {
        output.push_str(&format!(
            "ID3 tagging - updated: {}, overwritten: {}, skipped: {}\n",
            report.tagged.updated, report.tagged.overwritten, report.tagged.skipped
        ));
    }
    output
}
