use crate::model::VerificationReport;

/// Render a deterministic markdown report from a verification result.
pub fn render_report(report: &VerificationReport, max_examples: usize) -> String {
    let mut lines = Vec::new();

    lines.push("# Shipyard Verification Report".to_string());
    lines.push(String::new());
    lines.push("## Stores".to_string());
    lines.push(format!("- expected: {}", report.expected_location));
    lines.push(format!("- actual: {}", report.actual_location));
    lines.push(String::new());

    lines.push("## Kinds".to_string());
    lines.push("| kind | expected | actual | compared | matched | mismatched | missing | extra |".to_string());
    lines.push("| --- | --- | --- | --- | --- | --- | --- | --- |".to_string());
    for kind in &report.kinds {
        lines.push(format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} |",
            kind.kind,
            kind.expected_rows,
            kind.actual_rows,
            kind.compared,
            kind.matched,
            kind.failures.len(),
            kind.missing.len(),
            kind.extra.len()
        ));
    }
    lines.push(String::new());

    let failures: Vec<_> = report
        .kinds
        .iter()
        .flat_map(|kind| kind.failures.iter())
        .collect();
    if !failures.is_empty() {
        lines.push("## Mismatches".to_string());
        for failure in failures.iter().take(max_examples) {
            lines.push("```".to_string());
            lines.push(failure.to_string());
            lines.push("```".to_string());
        }
        if failures.len() > max_examples {
            lines.push(format!("- ... {} more", failures.len() - max_examples));
        }
        lines.push(String::new());
    }

    let one_sided: Vec<String> = report
        .kinds
        .iter()
        .flat_map(|kind| {
            let missing = kind
                .missing
                .iter()
                .map(move |identity| format!("- {} {identity}: missing", kind.kind));
            let extra = kind
                .extra
                .iter()
                .map(move |identity| format!("- {} {identity}: unexpected", kind.kind));
            missing.chain(extra)
        })
        .collect();
    if !one_sided.is_empty() {
        lines.push("## Unpaired entities".to_string());
        lines.extend(one_sided);
        lines.push(String::new());
    }

    lines.push("## Result".to_string());
    if report.is_clean() {
        lines.push("- stores match".to_string());
    } else {
        lines.push(format!("- {} problem(s) found", report.problem_count()));
    }
    lines.join("\n")
}
