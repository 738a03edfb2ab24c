use crate::domain::model::Artifact;
use crate::utils::error::Result;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

/// Packs rendered artifacts into one ZIP archive held in memory.
pub fn bundle(artifacts: &[Artifact]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    for artifact in artifacts {
        zip.start_file::<_, ()>(artifact.file_name.as_str(), FileOptions::default())?;
        zip.write_all(&artifact.content)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_bundle_round_trips_contents() {
        let artifacts = vec![
            Artifact {
                file_name: "years.csv".to_string(),
                content: b"2020,55000".to_vec(),
            },
            Artifact {
                file_name: "statistics.json".to_string(),
                content: b"{}".to_vec(),
            },
        ];

        let data = bundle(&artifacts).unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(data)).unwrap();

        assert_eq!(archive.len(), 2);
        let mut content = String::new();
        archive
            .by_name("years.csv")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "2020,55000");
    }
}
