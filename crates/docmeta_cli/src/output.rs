use colored::*;
use docmeta_core::MetadataErrors;
use docmeta_scanner::DuplicateReport;
use serde_json::json;

pub fn print_findings(title: &str, errors: &MetadataErrors, format: &str) {
    match format {
        "json" => print_json_findings(errors),
        _ => print_text_findings(title, errors),
    }
}

fn banner(title: &str) {
    println!("\n{}", "═".repeat(60));
    println!("  {}", title.bold());
    println!("{}", "═".repeat(60));
}

fn print_text_findings(title: &str, errors: &MetadataErrors) {
    if !errors.is_empty() {
        println!("\n{}", "Errors:".red().bold());
        for (i, error) in errors.iter().enumerate() {
            println!("  {}. {}", i + 1, error.to_string().red());
        }
    }

    banner(title);
    if errors.is_empty() {
        println!(
            "\n{} {}",
            "✓".green().bold(),
            "Validation PASSED".green().bold()
        );
    } else {
        println!(
            "\n{} {}",
            "✗".red().bold(),
            "Validation FAILED".red().bold()
        );
    }

    println!("\n{}", "Summary:".bold());
    println!("  Total errors: {}", errors.len());
    println!("{}", "═".repeat(60));
}

fn print_json_findings(errors: &MetadataErrors) {
    let output = json!({
        "passed": errors.is_empty(),
        "errors": errors
            .iter()
            .map(|e| json!({
                "file": e.file(),
                "message": e.to_string(),
                "details": e,
            }))
            .collect::<Vec<_>>(),
        "summary": {
            "error_count": errors.len(),
        }
    });

    println!(
        "{}",
        serde_json::to_string_pretty(&output).unwrap_or_default()
    );
}

pub fn print_duplicate_report(report: &DuplicateReport, files_scanned: usize, format: &str) {
    match format {
        "json" => {
            let output = json!({
                "passed": report.is_empty(),
                "files_scanned": files_scanned,
                "duplicates": report.duplicates,
                "summary": {
                    "duplicate_count": report.len(),
                }
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&output).unwrap_or_default()
            );
        }
        _ => {
            banner("SNIPPET TAG REPORT");
            println!("\n  Files scanned: {}\n", files_scanned);
            if report.is_empty() {
                println!("{} {}", "✓".green().bold(), report.to_string().trim_end().green());
            } else {
                print!("{}", report.to_string().yellow());
            }
            println!("{}", "═".repeat(60));
        }
    }
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}
