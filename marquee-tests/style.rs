//! Style Enforcement Tests
//!
//! Enforces critical patterns that cannot be easily caught by clippy alone.
//! Production code must not accumulate `#[allow(dead_code)]` attributes;
//! unused functionality should be removed or wired in, not silenced.
//!
//! Test files are exempt since scaffolding may be legitimately unused while
//! a suite grows.

use std::fs;
use std::path::{Path, PathBuf};

/// A dead code allowance violation found in production code
#[derive(Debug)]
struct DeadCodeViolation {
    file_path: String,
    line_number: usize,
    context: String,
}

/// Checker for dead code allowance violations in production code
struct DeadCodeChecker {
    violations: Vec<DeadCodeViolation>,
    files_checked: usize,
}

impl DeadCodeChecker {
    fn new() -> Self {
        Self {
            violations: Vec::new(),
            files_checked: 0,
        }
    }

    /// Production source roots relative to this test crate
    fn production_roots() -> Vec<PathBuf> {
        ["marquee-core", "marquee-web", "marquee-cli"]
            .iter()
            .map(|krate| Path::new("..").join(krate).join("src"))
            .collect()
    }

    fn find_rust_files(dir: &Path, files: &mut Vec<PathBuf>, depth: usize) -> std::io::Result<()> {
        // Prevent runaway recursion through symlink cycles
        if depth > 10 {
            return Ok(());
        }

        if dir.is_dir() {
            for entry in fs::read_dir(dir)? {
                let entry = entry?;
                let path = entry.path();

                if let Some(name) = path.file_name()
                    && (name.to_string_lossy().starts_with('.') || name == "target")
                {
                    continue;
                }

                if path.is_dir() {
                    Self::find_rust_files(&path, files, depth + 1)?;
                } else if path.extension().map(|s| s == "rs").unwrap_or(false) {
                    files.push(path);
                }
            }
        }
        Ok(())
    }

    /// Check if a file path represents test code
    fn is_test_file(path: &Path) -> bool {
        let path_str = path.to_string_lossy().to_lowercase();

        path_str.contains("/tests/")
            || path_str.contains("test_")
            || path_str.contains("_test")
            || path_str.ends_with("tests.rs")
            || path_str.contains("fixtures")
    }

    fn check_file(&mut self, path: &Path) -> std::io::Result<()> {
        if Self::is_test_file(path) {
            return Ok(());
        }

        let content = fs::read_to_string(path)?;
        self.files_checked += 1;

        for (line_number, line) in content.lines().enumerate() {
            let trimmed = line.trim();

            if trimmed.contains("#[allow(") && trimmed.contains("dead_code") {
                self.violations.push(DeadCodeViolation {
                    file_path: path.to_string_lossy().to_string(),
                    line_number: line_number + 1,
                    context: line.to_string(),
                });
            }
        }

        Ok(())
    }

    fn check_workspace(&mut self) -> std::io::Result<()> {
        let mut files = Vec::new();
        for root in Self::production_roots() {
            Self::find_rust_files(&root, &mut files, 0)?;
        }

        for file in files {
            self.check_file(&file)?;
        }

        Ok(())
    }

    /// Report violations and return whether the check passed
    fn report_violations(&self) -> bool {
        if self.violations.is_empty() {
            println!(
                "Dead code enforcement: {} files checked, no violations found",
                self.files_checked
            );
            return true;
        }

        println!("Dead code enforcement violations found:");
        for violation in &self.violations {
            println!("{}:{}", violation.file_path, violation.line_number);
            println!("  {}", violation.context.trim());
        }
        println!(
            "Found {} violation(s) in {} file(s) checked",
            self.violations.len(),
            self.files_checked
        );

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_test_file() {
        assert!(DeadCodeChecker::is_test_file(Path::new(
            "marquee-core/src/store/test_fixtures.rs"
        )));
        assert!(DeadCodeChecker::is_test_file(Path::new(
            "marquee-tests/integration_tests.rs"
        )));

        assert!(!DeadCodeChecker::is_test_file(Path::new(
            "marquee-core/src/lib.rs"
        )));
        assert!(!DeadCodeChecker::is_test_file(Path::new(
            "marquee-web/src/server.rs"
        )));
    }

    #[test]
    fn test_dead_code_detection() {
        let mut checker = DeadCodeChecker::new();

        let sample = "\
struct Kept;

#[allow(dead_code)]
struct Unused;

#[allow(clippy::module_name_repetitions, dead_code)]
fn never_called() {}
";

        for (line_number, line) in sample.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.contains("#[allow(") && trimmed.contains("dead_code") {
                checker.violations.push(DeadCodeViolation {
                    file_path: "sample.rs".to_string(),
                    line_number: line_number + 1,
                    context: line.to_string(),
                });
            }
        }

        assert_eq!(checker.violations.len(), 2);
        assert_eq!(checker.violations[0].line_number, 3);
        assert_eq!(checker.violations[1].line_number, 6);
    }

    #[test]
    fn dead_code_enforcement() {
        let mut checker = DeadCodeChecker::new();

        checker.check_workspace().expect("Failed to check workspace");

        assert!(
            checker.report_violations(),
            "Dead code allowance violations found in production code - see output above"
        );
    }
}
