//! # End-to-End Manifest Verification
//!
//! Runs the verifier against `fixtures/signed_manifest.json`: a two-record
//! manifest sealed under the raw key `test-manifest-key` with key ID
//! `prod-1`. Each test mutates a copy of it and checks the exact set of
//! failures reported.

use std::io::Write;

use proptest::prelude::*;

use custody_core::{ManifestEnvelope, ManifestRecord};
use custody_crypto::chain::EMPTY_MASTER_DIGEST_HEX;
use custody_crypto::KeyMaterial;
use custody_verify::{
    seal_records, verify_manifest, Failure, FailureKind, ManifestVerifier, SealOptions,
    VerificationReport, VerifyOptions,
};

const SIGNED_MANIFEST: &str = include_str!("fixtures/signed_manifest.json");
const KEY: &str = "test-manifest-key";

fn fixture() -> ManifestEnvelope {
    ManifestEnvelope::from_json(SIGNED_MANIFEST.as_bytes()).unwrap()
}

fn options() -> VerifyOptions {
    VerifyOptions {
        expected_key_id: Some("prod-1".to_string()),
        require_signed: true,
        key: Some(KeyMaterial::Raw(KEY.to_string())),
        workers: 1,
    }
}

fn verify(envelope: &ManifestEnvelope) -> VerificationReport {
    verify_manifest(envelope, options()).unwrap()
}

fn records_mut(envelope: &mut ManifestEnvelope) -> &mut Vec<ManifestRecord> {
    envelope.records.as_mut().unwrap()
}

// ---------------------------------------------------------------------------
// Baseline
// ---------------------------------------------------------------------------

#[test]
fn signed_two_record_manifest_passes() {
    let report = verify(&fixture());
    assert!(report.pass, "{}", report.render_text());
    assert!(report.failures.is_empty());
    assert_eq!(report.record_count, 2);
    assert!(report.signed);
}

#[test]
fn fixture_header_matches_known_digests() {
    let envelope = fixture();
    let header = envelope.header.as_ref().unwrap();
    assert_eq!(
        header.master_digest.as_deref(),
        Some("88e6a4a0390e2417846a683fc14ad493190d0aaa333e4a9346a069a9dbd8ec4c")
    );
    assert_eq!(
        header.master_keyed_digest.as_deref(),
        Some("a56836a0808b21721c6e16f8e0a2e4c46a7907ebc50644c3177b2f6e2d7609f3")
    );
}

#[test]
fn base64_key_verifies_the_same_manifest() {
    // base64("test-manifest-key")
    let report = verify_manifest(
        &fixture(),
        VerifyOptions {
            key: Some(KeyMaterial::Base64("dGVzdC1tYW5pZmVzdC1rZXk=".to_string())),
            ..options()
        },
    )
    .unwrap();
    assert!(report.pass, "{}", report.render_text());
}

#[test]
fn uppercase_stored_digests_still_match() {
    let mut envelope = fixture();
    for record in records_mut(&mut envelope) {
        record.record_canonical_digest = record
            .record_canonical_digest
            .as_ref()
            .map(|d| d.to_uppercase());
    }
    assert!(verify(&envelope).pass);
}

#[test]
fn parallel_verification_matches_sequential() {
    let envelope = fixture();
    let sequential = verify(&envelope);
    let parallel = verify_manifest(
        &envelope,
        VerifyOptions {
            workers: 4,
            ..options()
        },
    )
    .unwrap();
    assert_eq!(sequential, parallel);
}

// ---------------------------------------------------------------------------
// Tampering
// ---------------------------------------------------------------------------

#[test]
fn tampered_record_is_the_only_failing_record() {
    let mut envelope = fixture();
    records_mut(&mut envelope)[1].bytes = Some(1);

    let report = verify(&envelope);
    assert!(!report.pass);
    assert_eq!(report.failing_records(), vec![1]);
    assert_eq!(report.count(FailureKind::RecordCanonicalMismatch), 1);
    assert_eq!(report.count(FailureKind::RecordDigestMismatch), 1);
    assert_eq!(report.count(FailureKind::RecordKeyedDigestMismatch), 1);
    assert_eq!(report.count(FailureKind::MasterDigestMismatch), 1);
    assert_eq!(report.count(FailureKind::MasterKeyedDigestMismatch), 1);
    assert_eq!(report.failure_count, 5);
}

#[test]
fn forged_keyed_digest_is_reported_without_the_real_value() {
    let mut envelope = fixture();
    let forged = "00".repeat(32);
    records_mut(&mut envelope)[0].record_keyed_digest = Some(forged.clone());

    let report = verify(&envelope);
    assert_eq!(
        report.failures,
        vec![Failure::RecordKeyedDigestMismatch {
            index: 0,
            stored: forged,
        }]
    );
    let text = report.render_text();
    assert!(!text.contains("b064c37cbeef8fff05975bba642c7b1da41fada1f09bdf03f7868f78665e9c53"));
}

#[test]
fn wrong_key_fails_every_keyed_check() {
    let report = verify_manifest(
        &fixture(),
        VerifyOptions {
            key: Some(KeyMaterial::Raw("wrong-key".to_string())),
            ..options()
        },
    )
    .unwrap();
    assert_eq!(report.count(FailureKind::RecordKeyedDigestMismatch), 2);
    assert_eq!(report.count(FailureKind::MasterKeyedDigestMismatch), 1);
    assert!(!report.has(FailureKind::RecordDigestMismatch));
    assert!(!report.has(FailureKind::MasterDigestMismatch));
}

#[test]
fn swapped_records_fail_only_the_aggregates() {
    let mut envelope = fixture();
    records_mut(&mut envelope).swap(0, 1);

    let report = verify(&envelope);
    assert_eq!(report.failure_count, 2, "{}", report.render_text());
    assert!(report.has(FailureKind::MasterDigestMismatch));
    assert!(report.has(FailureKind::MasterKeyedDigestMismatch));
    assert!(report.failing_records().is_empty());
}

#[test]
fn deleted_record_fails_the_aggregates() {
    let mut envelope = fixture();
    records_mut(&mut envelope).pop();
    let report = verify(&envelope);
    assert_eq!(report.failure_count, 2);
    assert_eq!(report.record_count, 1);
}

#[test]
fn duplicated_record_fails_the_aggregates() {
    let mut envelope = fixture();
    let first = records_mut(&mut envelope)[0].clone();
    records_mut(&mut envelope).push(first);
    let report = verify(&envelope);
    assert_eq!(report.failure_count, 2);
    assert!(report.has(FailureKind::MasterDigestMismatch));
}

#[test]
fn stripped_keyed_digests_are_missing() {
    let mut envelope = fixture();
    for record in records_mut(&mut envelope) {
        record.record_keyed_digest = None;
    }
    envelope.header.as_mut().unwrap().master_keyed_digest = Some(" ".to_string());

    let report = verify(&envelope);
    assert_eq!(report.count(FailureKind::RecordKeyedDigestMissing), 2);
    assert_eq!(report.count(FailureKind::MasterKeyedDigestMissing), 1);
    // The remaining keyed digests chain to a different aggregate, but with the
    // aggregate missing there is nothing to compare it against.
    assert!(!report.has(FailureKind::MasterKeyedDigestMismatch));
}

// ---------------------------------------------------------------------------
// Header policy
// ---------------------------------------------------------------------------

#[test]
fn unsigned_manifest_rejected_exactly_once() {
    let sealed = seal_records(
        fixture().records.unwrap(),
        &SealOptions {
            key: None,
            key_id: Some("prod-1".to_string()),
            workers: 1,
        },
    )
    .unwrap();

    let report = verify(&sealed);
    assert_eq!(report.failures, vec![Failure::UnsignedRejected]);
}

#[test]
fn unsigned_manifest_passes_when_not_required() {
    let sealed = seal_records(fixture().records.unwrap(), &SealOptions::default()).unwrap();
    let report = verify_manifest(
        &sealed,
        VerifyOptions {
            require_signed: false,
            ..options()
        },
    )
    .unwrap();
    assert!(report.pass);
}

#[test]
fn key_id_prod_2_mismatches_prod_1() {
    let report = verify_manifest(
        &fixture(),
        VerifyOptions {
            expected_key_id: Some("prod-2".to_string()),
            ..options()
        },
    )
    .unwrap();
    assert_eq!(
        report.failures,
        vec![Failure::KeyIdMismatch {
            expected: "prod-2".to_string(),
            found: "prod-1".to_string(),
        }]
    );
}

#[test]
fn key_id_blank_on_either_side_never_mismatches() {
    let report = verify_manifest(
        &fixture(),
        VerifyOptions {
            expected_key_id: Some(String::new()),
            ..options()
        },
    )
    .unwrap();
    assert!(report.pass);

    let mut envelope = fixture();
    envelope.header.as_mut().unwrap().key_id = None;
    assert!(verify(&envelope).pass);
}

#[test]
fn missing_key_still_runs_unkeyed_checks() {
    let mut envelope = fixture();
    records_mut(&mut envelope)[0].operation = Some("move".to_string());

    let report = verify_manifest(
        &envelope,
        VerifyOptions {
            key: None,
            ..options()
        },
    )
    .unwrap();
    assert_eq!(report.failures[0].kind(), FailureKind::MissingKey);
    assert!(report.has(FailureKind::RecordDigestMismatch));
    assert!(report.has(FailureKind::MasterDigestMismatch));
    assert!(!report.has(FailureKind::RecordKeyedDigestMismatch));
    assert!(!report.has(FailureKind::MasterKeyedDigestMismatch));
}

#[test]
fn unsupported_algorithm_stops_the_run() {
    let mut envelope = fixture();
    envelope.header.as_mut().unwrap().algorithm = Some("HMAC-SHA512".to_string());
    records_mut(&mut envelope)[0].bytes = Some(0);

    let report = verify(&envelope);
    assert_eq!(report.failure_count, 1);
    assert!(report.has(FailureKind::UnsupportedAlgorithm));
}

// ---------------------------------------------------------------------------
// Empty and malformed manifests
// ---------------------------------------------------------------------------

#[test]
fn empty_signed_manifest_uses_empty_string_digests() {
    let json = format!(
        r#"{{"header":{{"algorithm":"HMAC-SHA256","signed":true,
            "masterDigest":"{EMPTY_MASTER_DIGEST_HEX}",
            "masterKeyedDigest":"37d95c3e31e7837ad82ef40369b6a0c0e1ebe324e71c39e6e1f7023b2191f0e0"}},
            "records":[]}}"#
    );
    let report = ManifestVerifier::new(options())
        .verify_json(json.as_bytes())
        .unwrap();
    assert!(report.pass, "{}", report.render_text());
    assert_eq!(report.record_count, 0);
}

#[test]
fn missing_sections_are_structural_errors() {
    let verifier = ManifestVerifier::new(options());
    let err = verifier.verify_json(br#"{"records":[]}"#).unwrap_err();
    assert!(err.is_structural());
    let err = verifier
        .verify_json(br#"{"header":{"algorithm":"HMAC-SHA256"}}"#)
        .unwrap_err();
    assert!(err.is_structural());
    let err = verifier.verify_json(br#"{"header":null,"records":null}"#).unwrap_err();
    assert!(err.to_string().contains("no header"));
}

#[test]
fn invalid_json_is_not_structural() {
    let err = ManifestVerifier::new(options())
        .verify_json(b"{not json")
        .unwrap_err();
    assert!(!err.is_structural());
}

#[test]
fn verify_path_reads_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SIGNED_MANIFEST.as_bytes()).unwrap();

    let verifier = ManifestVerifier::new(options());
    assert!(verifier.verify_path(file.path()).unwrap().pass);

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.json");
    let err = verifier.verify_path(&missing).unwrap_err();
    assert!(err.to_string().contains("absent.json"));
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn arb_record() -> impl Strategy<Value = ManifestRecord> {
    (
        proptest::option::of("[a-z|\\\\\r\n/]{0,24}"),
        proptest::option::of(any::<i64>()),
        proptest::option::of(any::<bool>()),
    )
        .prop_map(|(path, bytes, ok)| ManifestRecord {
            operation: Some("copy".to_string()),
            source_path: path,
            bytes,
            verify_ok: ok,
            ..ManifestRecord::default()
        })
}

proptest! {
    #[test]
    fn sealed_manifests_always_verify(records in proptest::collection::vec(arb_record(), 0..8)) {
        let sealed = seal_records(records, &SealOptions {
            key: Some(KeyMaterial::Raw(KEY.to_string())),
            key_id: Some("prod-1".to_string()),
            workers: 3,
        }).unwrap();
        let report = verify(&sealed);
        prop_assert!(report.pass, "{}", report.render_text());
    }

    #[test]
    fn any_semantic_change_fails_only_that_record(
        records in proptest::collection::vec(arb_record(), 1..6),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut sealed = seal_records(records, &SealOptions {
            key: Some(KeyMaterial::Raw(KEY.to_string())),
            key_id: None,
            workers: 1,
        }).unwrap();
        let list = sealed.records.as_mut().unwrap();
        let index = pick.index(list.len());
        list[index].destination_path = Some(match &list[index].destination_path {
            Some(p) => format!("{p}x"),
            None => "x".to_string(),
        });

        let report = verify(&sealed);
        prop_assert_eq!(report.failing_records(), vec![index]);
        prop_assert!(report.has(FailureKind::MasterDigestMismatch));
        prop_assert!(report.has(FailureKind::MasterKeyedDigestMismatch));
    }
}
