//! CSV report writing: one file per artifact kind, stable column order.

use std::{fs, path::Path};

use anyhow::Context;
use log::debug;

use crate::{artifacts::corpus::Corpus, record::Record};

/// Writes one `<slug>.csv` per corpus kind into `output_dir`. A kind with no
/// records still gets its header row, so the report set is the same shape on
/// every run.
pub fn write_reports(records: &[Record], corpus: &Corpus, output_dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("cannot create output folder {}", output_dir.display()))?;

    for artifact in corpus.iter() {
        let path = output_dir.join(format!("{}.csv", artifact.kind.slug()));
        let mut writer = csv::WriterBuilder::new()
            .from_path(&path)
            .with_context(|| format!("cannot create report {}", path.display()))?;

        writer.write_record(artifact.kind.headers())?;

        let mut rows = 0usize;
        for record in records.iter().filter(|r| r.kind == artifact.kind) {
            writer.write_record(record.csv_row())?;
            rows += 1;
        }
        writer.flush()?;

        debug!("wrote {} rows to {}", rows, path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::record::{ArtifactKind, Classification};

    use super::*;

    #[test]
    fn writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![Record {
            offset: 128,
            kind: ArtifactKind::BrowserActivity,
            classification: Classification::Complete,
            values: vec![("data", String::from("http://x.onion"))],
        }];

        write_reports(&records, &Corpus::new(), dir.path()).unwrap();

        let activity = fs::read_to_string(dir.path().join("activity.csv")).unwrap();
        let mut lines = activity.lines();
        assert_eq!(lines.next(), Some("Offset,Type,Extracted Data"));
        assert_eq!(
            lines.next(),
            Some("128,Potential Browser Activity,http://x.onion")
        );

        // empty kinds still get their header
        let socks = fs::read_to_string(dir.path().join("socks.csv")).unwrap();
        assert_eq!(socks.lines().count(), 1);
    }
}
