//! Per-stage output files for a batch run.
//!
//! Each file is truncated when the writer is opened and then receives exactly
//! one line per processed query.

use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use flightq_factdb::Answer;
use flightq_nlp::Analysis;

pub const STAGE_FILES: [&str; 6] = [
    "tokens.txt",
    "dependencies.txt",
    "grammatical.txt",
    "logical.txt",
    "procedural.txt",
    "answers.txt",
];

/// `[a, b, c]`
pub fn render_list<T: Display>(items: &[T]) -> String {
    let inner: Vec<String> = items.iter().map(ToString::to_string).collect();
    format!("[{}]", inner.join(", "))
}

pub struct ArtifactWriter {
    files: Vec<BufWriter<File>>,
}

impl ArtifactWriter {
    pub fn create(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
        let files = STAGE_FILES
            .iter()
            .map(|name| {
                let path = dir.join(name);
                File::create(&path)
                    .map(BufWriter::new)
                    .with_context(|| format!("failed to create {}", path.display()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { files })
    }

    pub fn append(&mut self, analysis: &Analysis, answer: &Answer) -> Result<()> {
        let lines = [
            render_list(&analysis.tokens),
            render_list(&analysis.dependencies),
            render_list(&analysis.grammatical),
            analysis.logical.to_string(),
            analysis.procedural.to_string(),
            answer.to_string(),
        ];
        for (file, (line, name)) in self.files.iter_mut().zip(lines.iter().zip(STAGE_FILES)) {
            writeln!(file, "{line}").with_context(|| format!("failed to write {name}"))?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        for (file, name) in self.files.iter_mut().zip(STAGE_FILES) {
            file.flush().with_context(|| format!("failed to flush {name}"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flightq_nlp::QueryProcessor;

    #[test]
    fn writes_one_line_per_stage() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let analysis = QueryProcessor::default().process("Máy bay nào đến thành phố Huế lúc 13:30HR ?");

        let mut writer = ArtifactWriter::create(dir.path())?;
        writer.append(&analysis, &Answer::Planes(vec!["VJ1".into()]))?;
        writer.append(&analysis, &Answer::NoResults)?;
        writer.finish()?;

        let tokens = fs::read_to_string(dir.path().join("tokens.txt"))?;
        assert_eq!(
            tokens.lines().next(),
            Some("[Máy bay, nào, đến, thành phố, Huế, lúc, 13:30HR, ?]")
        );
        let answers = fs::read_to_string(dir.path().join("answers.txt"))?;
        assert_eq!(answers, "VJ1\nNo results found\n");

        // Re-opening truncates.
        ArtifactWriter::create(dir.path())?.finish()?;
        assert_eq!(fs::read_to_string(dir.path().join("answers.txt"))?, "");
        Ok(())
    }
}
