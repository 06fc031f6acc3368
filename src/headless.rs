//! Non-interactive mode: print the preview, then apply it.

use anyhow::{Result, bail};
use std::io::Write;
use std::path::PathBuf;

use crate::rename_engine::{BatchSummary, Preview, RenameEngine};

/// Everything the headless run needs from the command line.
#[derive(Debug, Clone, Default)]
pub struct HeadlessRequest {
    pub paths: Vec<PathBuf>,
    pub pattern: String,
    pub replacement: String,
    /// Apply even though the preview has warnings.
    pub assume_yes: bool,
}

pub fn print_preview<W: Write>(out: &mut W, preview: &Preview) -> Result<()> {
    for item in &preview.items {
        let marker = if item.is_dir { "/" } else { "" };
        if item.original_name == item.new_name && !item.status.is_warning() {
            writeln!(out, "  {}{marker} (unchanged)", item.original_name)?;
        } else {
            writeln!(
                out,
                "  {}{marker} -> {}{marker} [{}]",
                item.original_name, item.new_name, item.status
            )?;
        }
    }
    Ok(())
}

/// Preview `request` against a fresh engine and execute it.
pub fn run<W: Write>(request: &HeadlessRequest, out: &mut W) -> Result<BatchSummary> {
    let mut engine = RenameEngine::new();
    engine.set_files(&request.paths);
    if engine.is_empty() {
        bail!("none of the given paths exist");
    }

    let preview = engine.preview(&request.pattern, &request.replacement)?;
    writeln!(out, "Preview ({} item(s)):", preview.items.len())?;
    print_preview(out, &preview)?;

    if preview.has_warning && !request.assume_yes {
        let warnings = preview
            .items
            .iter()
            .filter(|i| i.status.is_warning())
            .count();
        bail!("preview has {warnings} conflict/duplicate warning(s); re-run with --yes to apply the rest");
    }

    let summary = engine.execute(&preview.items)?;
    writeln!(out, "{summary}")?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn refuses_warnings_without_confirmation() {
        let dir = TempDir::new().unwrap();
        for name in ["a.txt", "b.txt", "x.txt"] {
            fs::write(dir.path().join(name), name).unwrap();
        }
        let request = HeadlessRequest {
            paths: vec![dir.path().join("a.txt"), dir.path().join("b.txt")],
            pattern: "a".into(),
            replacement: "x".into(),
            assume_yes: false,
        };

        let mut out = Vec::new();
        let err = run(&request, &mut out).unwrap_err();
        assert!(err.to_string().contains("--yes"));
        assert!(dir.path().join("a.txt").exists());
        assert!(String::from_utf8(out).unwrap().contains("a.txt -> x.txt [conflict]"));
    }

    #[test]
    fn applies_clean_preview() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("IMG 01.jpg"), "").unwrap();
        let request = HeadlessRequest {
            paths: vec![dir.path().join("IMG 01.jpg")],
            pattern: " ".into(),
            replacement: "_".into(),
            assume_yes: false,
        };

        let mut out = Vec::new();
        let summary = run(&request, &mut out).unwrap();
        assert_eq!(summary.renamed, 1);
        assert!(dir.path().join("IMG_01.jpg").exists());
    }
}
