use crate::model::StudentRecord;
use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use uuid::Uuid;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MANIFEST_ENTRY: &str = "manifest.json";
const RECORDS_ENTRY: &str = "records.json";
pub const BUNDLE_FORMAT_V1: &str = "attendd-records-v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Manifest {
    format: String,
    version: u32,
    app_version: String,
    bundle_id: String,
    exported_at: String,
    record_count: usize,
    sha256: String,
}

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub bundle_format: String,
    pub bundle_id: String,
    pub record_count: usize,
    pub sha256: String,
}

#[derive(Debug, Clone)]
pub struct ImportedBundle {
    pub bundle_format: String,
    pub bundle_id: String,
    pub records: Vec<StudentRecord>,
}

/// Ids must be positive and fit a SQLite integer.
fn valid_id(id: u64) -> bool {
    id > 0 && i64::try_from(id).is_ok()
}

fn validate_record(record: &StudentRecord) -> anyhow::Result<()> {
    if !valid_id(record.id) {
        return Err(anyhow!("student id {} is out of range", record.id));
    }
    if !valid_id(record.student_id) {
        return Err(anyhow!(
            "student {} has out-of-range studentId {}",
            record.id,
            record.student_id
        ));
    }
    for entry in &record.subjects {
        if entry.sname.trim().is_empty() {
            return Err(anyhow!("student {} has an unnamed subject", record.id));
        }
        if let Some(date) = entry.date.as_deref() {
            NaiveDate::parse_from_str(date, "%Y-%m-%d").with_context(|| {
                format!("student {} has invalid date {:?}", record.id, date)
            })?;
        }
    }
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

pub fn export_records_bundle(
    records: &[StudentRecord],
    out_path: &Path,
) -> anyhow::Result<ExportSummary> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }

    let records_json =
        serde_json::to_vec_pretty(records).context("failed to serialize records")?;
    let manifest = Manifest {
        format: BUNDLE_FORMAT_V1.to_string(),
        version: 1,
        app_version: env!("CARGO_PKG_VERSION").to_string(),
        bundle_id: Uuid::new_v4().to_string(),
        exported_at: chrono::Utc::now().to_rfc3339(),
        record_count: records.len(),
        sha256: sha256_hex(&records_json),
    };

    let out_file = File::create(out_path).with_context(|| {
        format!(
            "failed to create output file {}",
            out_path.to_string_lossy()
        )
    })?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;

    zip.start_file(RECORDS_ENTRY, opts)
        .context("failed to start records entry")?;
    zip.write_all(&records_json)
        .context("failed to write records entry")?;

    zip.finish().context("failed to finalize zip bundle")?;

    Ok(ExportSummary {
        bundle_format: manifest.format,
        bundle_id: manifest.bundle_id,
        record_count: manifest.record_count,
        sha256: manifest.sha256,
    })
}

/// Read and verify a bundle. Nothing is applied to a store here; callers
/// replace their contents only after this returns `Ok`.
pub fn import_records_bundle(in_path: &Path) -> anyhow::Result<ImportedBundle> {
    let in_file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.to_string_lossy()))?;
    let mut archive = ZipArchive::new(in_file).context("invalid zip archive")?;

    let mut manifest_text = String::new();
    archive
        .by_name(MANIFEST_ENTRY)
        .context("bundle missing manifest.json")?
        .read_to_string(&mut manifest_text)
        .context("failed to read manifest.json")?;
    let manifest: Manifest =
        serde_json::from_str(&manifest_text).context("manifest.json is invalid")?;
    if manifest.format != BUNDLE_FORMAT_V1 {
        return Err(anyhow!("unsupported bundle format: {}", manifest.format));
    }

    let mut records_bytes = Vec::new();
    archive
        .by_name(RECORDS_ENTRY)
        .context("bundle missing records.json")?
        .read_to_end(&mut records_bytes)
        .context("failed to read records.json")?;

    let actual = sha256_hex(&records_bytes);
    if actual != manifest.sha256 {
        return Err(anyhow!(
            "records.json checksum mismatch: manifest {}, actual {}",
            manifest.sha256,
            actual
        ));
    }

    let records: Vec<StudentRecord> =
        serde_json::from_slice(&records_bytes).context("records.json is invalid")?;
    if records.len() != manifest.record_count {
        return Err(anyhow!(
            "record count mismatch: manifest {}, bundle {}",
            manifest.record_count,
            records.len()
        ));
    }
    let mut ids = HashSet::new();
    if let Some(dup) = records.iter().find(|r| !ids.insert(r.id)) {
        return Err(anyhow!("bundle contains duplicate student id {}", dup.id));
    }
    for record in &records {
        validate_record(record)?;
    }

    Ok(ImportedBundle {
        bundle_format: manifest.format,
        bundle_id: manifest.bundle_id,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::seed_records;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(prefix: &str) -> PathBuf {
        let p = std::env::temp_dir().join(format!(
            "{}-{}",
            prefix,
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock")
                .as_nanos()
        ));
        std::fs::create_dir_all(&p).expect("create temp dir");
        p
    }

    #[test]
    fn zip_export_and_import_roundtrip() {
        let out_dir = temp_dir("attendd-backup-out");
        let bundle_path = out_dir.join("records.attendd.zip");

        let export = export_records_bundle(&seed_records(), &bundle_path).expect("export");
        assert_eq!(export.bundle_format, BUNDLE_FORMAT_V1);
        assert_eq!(export.record_count, 2);
        assert_eq!(export.sha256.len(), 64);

        let f = File::open(&bundle_path).expect("open bundle");
        let mut archive = ZipArchive::new(f).expect("open zip archive");
        let mut manifest = String::new();
        archive
            .by_name(MANIFEST_ENTRY)
            .expect("manifest entry")
            .read_to_string(&mut manifest)
            .expect("read manifest");
        assert!(manifest.contains(BUNDLE_FORMAT_V1));
        assert!(manifest.contains(&export.bundle_id));

        let imported = import_records_bundle(&bundle_path).expect("import");
        assert_eq!(imported.bundle_id, export.bundle_id);
        assert_eq!(imported.records, seed_records());

        let _ = std::fs::remove_dir_all(out_dir);
    }

    #[test]
    fn tampered_records_are_rejected() {
        let out_dir = temp_dir("attendd-backup-tamper");
        let good = out_dir.join("good.zip");
        let bad = out_dir.join("bad.zip");
        export_records_bundle(&seed_records(), &good).expect("export");

        let mut manifest = String::new();
        ZipArchive::new(File::open(&good).expect("open"))
            .expect("zip")
            .by_name(MANIFEST_ENTRY)
            .expect("manifest")
            .read_to_string(&mut manifest)
            .expect("read");

        let mut other = seed_records();
        other[0].name = "Mallory".to_string();
        let mut zip = ZipWriter::new(File::create(&bad).expect("create"));
        let opts = FileOptions::default();
        zip.start_file(MANIFEST_ENTRY, opts).expect("start");
        zip.write_all(manifest.as_bytes()).expect("write");
        zip.start_file(RECORDS_ENTRY, opts).expect("start");
        zip.write_all(&serde_json::to_vec_pretty(&other).expect("json"))
            .expect("write");
        zip.finish().expect("finish");

        let err = import_records_bundle(&bad).expect_err("checksum mismatch");
        assert!(err.to_string().contains("checksum mismatch"));

        let _ = std::fs::remove_dir_all(out_dir);
    }

    fn write_checksummed(path: &Path, records: &serde_json::Value) {
        let records_json = serde_json::to_vec_pretty(records).expect("json");
        let manifest = Manifest {
            format: BUNDLE_FORMAT_V1.to_string(),
            version: 1,
            app_version: "0.0.0".to_string(),
            bundle_id: Uuid::new_v4().to_string(),
            exported_at: chrono::Utc::now().to_rfc3339(),
            record_count: records.as_array().map(|a| a.len()).unwrap_or(0),
            sha256: sha256_hex(&records_json),
        };
        let mut zip = ZipWriter::new(File::create(path).expect("create"));
        let opts = FileOptions::default();
        zip.start_file(MANIFEST_ENTRY, opts).expect("start");
        zip.write_all(&serde_json::to_vec(&manifest).expect("manifest"))
            .expect("write");
        zip.start_file(RECORDS_ENTRY, opts).expect("start");
        zip.write_all(&records_json).expect("write");
        zip.finish().expect("finish");
    }

    #[test]
    fn out_of_range_ids_and_bad_dates_are_rejected() {
        let out_dir = temp_dir("attendd-backup-ranges");
        let cases = [
            (serde_json::json!([{ "id": 0, "name": "Zero", "studentId": 1 }]), "out of range"),
            (
                serde_json::json!([{ "id": u64::MAX, "name": "Max", "studentId": 1 }]),
                "out of range",
            ),
            (
                serde_json::json!([{ "id": 5, "name": "NoNumber", "studentId": 0 }]),
                "studentId",
            ),
            (
                serde_json::json!([{
                    "id": 5,
                    "name": "Dated",
                    "studentId": 9,
                    "subjects": [{ "sname": "Math", "status": "present", "date": "05/03/2025" }]
                }]),
                "invalid date",
            ),
        ];
        for (i, (records, needle)) in cases.iter().enumerate() {
            let path = out_dir.join(format!("case-{}.zip", i));
            write_checksummed(&path, records);
            let err = import_records_bundle(&path).expect_err("rejected");
            assert!(
                format!("{err:#}").contains(needle),
                "case {}: {:#}",
                i,
                err
            );
        }

        let edge = out_dir.join("edge.zip");
        write_checksummed(
            &edge,
            &serde_json::json!([{ "id": i64::MAX, "name": "Edge", "studentId": 1 }]),
        );
        let imported = import_records_bundle(&edge).expect("largest sql id accepted");
        assert_eq!(imported.records[0].id, i64::MAX as u64);

        let _ = std::fs::remove_dir_all(out_dir);
    }

    #[test]
    fn non_zip_input_is_rejected() {
        let out_dir = temp_dir("attendd-backup-notzip");
        let p = out_dir.join("plain.json");
        std::fs::write(&p, b"[]").expect("write");
        assert!(import_records_bundle(&p).is_err());
        let _ = std::fs::remove_dir_all(out_dir);
    }
}
