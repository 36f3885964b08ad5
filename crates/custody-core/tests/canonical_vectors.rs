//! # Canonical Record Test Vectors
//!
//! Fixed records with their expected canonical strings and SHA-256 digests.
//! Manifest producers and verifiers must agree on these byte for byte; if
//! any vector changes, every previously sealed manifest stops verifying.

use custody_core::canonical::split_fields;
use custody_core::{sha256_hex, CanonicalRecord, ManifestRecord};

fn copy_record() -> ManifestRecord {
    ManifestRecord {
        timestamp_utc: Some("2024-03-01T12:00:00Z".to_string()),
        source_provider: Some("onedrive".to_string()),
        operation: Some("copy".to_string()),
        source_path: Some("/evidence/in/a|b\\c.pdf".to_string()),
        destination_path: Some("/evidence/out/a.pdf".to_string()),
        bytes: Some(1024),
        source_digest_hex: Some(
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08".to_string(),
        ),
        destination_digest_hex: Some(
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08".to_string(),
        ),
        verify_size: Some(true),
        verify_digest: Some(true),
        verify_structure: Some(true),
        verify_ok: Some(true),
        attempts: Some(1),
        retried: Some(false),
        quarantine_path: None,
        original_path: Some("/evidence/in/a|b\\c.pdf".to_string()),
        ..ManifestRecord::default()
    }
}

fn quarantine_record() -> ManifestRecord {
    ManifestRecord {
        timestamp_utc: Some("2024-03-01T12:00:05Z".to_string()),
        source_provider: Some("onedrive".to_string()),
        operation: Some("quarantine".to_string()),
        source_path: Some("/evidence/in/notes\r\n.txt".to_string()),
        destination_path: None,
        bytes: Some(0),
        source_digest_hex: None,
        destination_digest_hex: None,
        verify_size: Some(false),
        verify_digest: Some(false),
        verify_structure: Some(false),
        verify_ok: Some(false),
        attempts: Some(3),
        retried: Some(true),
        quarantine_path: Some("/evidence/quarantine/notes.txt".to_string()),
        original_path: Some("/evidence/in/notes\r\n.txt".to_string()),
        ..ManifestRecord::default()
    }
}

// ---------------------------------------------------------------------------
// Vector 1: copy with pipe and backslash in the path
// ---------------------------------------------------------------------------

#[test]
fn test_vector_copy_record() {
    let cb = CanonicalRecord::new(&copy_record());
    assert_eq!(
        cb.as_str(),
        "timestampUtc=2024-03-01T12:00:00Z|sourceProvider=onedrive|operation=copy|\
         sourcePath=/evidence/in/a\\|b\\\\c.pdf|destinationPath=/evidence/out/a.pdf|\
         bytes=1024|\
         sourceDigestHex=9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08|\
         destinationDigestHex=9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08|\
         verifySize=true|verifyDigest=true|verifyStructure=true|verifyOk=true|attempts=1|\
         retried=false|quarantinePath=|originalPath=/evidence/in/a\\|b\\\\c.pdf"
    );
    assert_eq!(
        sha256_hex(&cb),
        "78e7de7f76f42916c94c5137aff6d90935398b67f4389f18ebba81efd41a07af"
    );
}

// ---------------------------------------------------------------------------
// Vector 2: quarantine with CR/LF in the path and null fields
// ---------------------------------------------------------------------------

#[test]
fn test_vector_quarantine_record() {
    let cb = CanonicalRecord::new(&quarantine_record());
    assert_eq!(
        cb.as_str(),
        "timestampUtc=2024-03-01T12:00:05Z|sourceProvider=onedrive|operation=quarantine|\
         sourcePath=/evidence/in/notes\\r\\n.txt|destinationPath=|bytes=0|sourceDigestHex=|\
         destinationDigestHex=|verifySize=false|verifyDigest=false|verifyStructure=false|\
         verifyOk=false|attempts=3|retried=true|quarantinePath=/evidence/quarantine/notes.txt|\
         originalPath=/evidence/in/notes\\r\\n.txt"
    );
    assert_eq!(
        sha256_hex(&cb),
        "911c32777ac6424e51ce7a229b2a928f5ddb759e9c96fb16d77398b837418669"
    );
}

// ---------------------------------------------------------------------------
// Escaped characters never shift a neighbouring field
// ---------------------------------------------------------------------------

#[test]
fn test_escaped_path_keeps_neighbours_in_place() {
    let fields = split_fields(CanonicalRecord::new(&copy_record()).as_str()).unwrap();
    assert_eq!(fields[2], ("operation", "copy".to_string()));
    assert_eq!(fields[3], ("sourcePath", "/evidence/in/a|b\\c.pdf".to_string()));
    assert_eq!(
        fields[4],
        ("destinationPath", "/evidence/out/a.pdf".to_string())
    );
}

#[test]
fn test_stored_json_round_trip_preserves_canonical_form() {
    let record = quarantine_record();
    let json = serde_json::to_vec(&record).unwrap();
    let back: ManifestRecord = serde_json::from_slice(&json).unwrap();
    assert_eq!(CanonicalRecord::new(&record), CanonicalRecord::new(&back));
}
