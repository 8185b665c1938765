//! 인증서 필드 추출기 -- DER(바이너리 ASN.1) X.509
//!
//! [`CertificateExtractor`] trait은 파일 한 건의 원시 바이트를
//! [`CertificateRecord`]로 변환하는 인터페이스입니다.
//! 서명, 체인, 폐기 여부는 검증하지 않고 메타데이터만 읽습니다.
//!
//! # 추출 규칙
//!
//! - **full_name**: subject의 `CN`, `SN`, `GN`, `givenName`, `surname` 순서로
//!   존재하는 값만 공백으로 이어 붙인 뒤 양 끝 공백을 제거합니다.
//!   `SN`/`surname`과 `GN`/`givenName`은 같은 속성 타입을 가리키므로
//!   성과 이름은 두 번씩 나타납니다.
//! - **not_before / not_after**: 원본 UTCTime/GeneralizedTime 바이트를
//!   `YYYYMMDDHHMMSSZ` (UTC)로 정규화한 뒤 파싱합니다. UTCTime의 두 자리 연도는
//!   RFC 5280에 따라 50 이상이면 19xx, 미만이면 20xx입니다. 1970년 이전 값도 허용합니다.
//! - **serial_number**: 대문자 16진수, 선행 0 없음, `0x` 접두어 없음

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use der::asn1::{Any, AnyRef, BitStringRef, ObjectIdentifier};
use der::{Reader, SliceReader, Tag, Tagged};
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};

use certpost_core::types::CertificateRecord;

use crate::error::ExtractionError;

/// commonName (2.5.4.3)
const OID_COMMON_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");
/// surname (2.5.4.4)
const OID_SURNAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.4");
/// givenName (2.5.4.42)
const OID_GIVEN_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.42");

/// full_name 구성 순서 (짧은 이름, OID)
const SUBJECT_NAME_FIELDS: [(&str, ObjectIdentifier); 5] = [
    ("CN", OID_COMMON_NAME),
    ("SN", OID_SURNAME),
    ("GN", OID_GIVEN_NAME),
    ("givenName", OID_GIVEN_NAME),
    ("surname", OID_SURNAME),
];

/// 유효기간 문자열 형식
pub const VALIDITY_TIME_FORMAT: &str = "%Y%m%d%H%M%SZ";

/// 인증서 필드 추출기 trait
///
/// 구현은 부작용이 없어야 하며, 예상 가능한 모든 실패를
/// [`ExtractionError`]로 반환해야 합니다.
pub trait CertificateExtractor: Send + Sync {
    /// 이 추출기가 처리하는 인코딩 이름
    fn format_name(&self) -> &str;

    /// 원시 바이트를 파싱하여 인증서 레코드를 반환합니다.
    ///
    /// # Arguments
    ///
    /// - `raw`: 파일 한 건의 전체 내용
    /// - `source_path`: 원본 파일 경로 (레코드에 그대로 기록)
    fn extract(&self, raw: &[u8], source_path: &str)
    -> Result<CertificateRecord, ExtractionError>;
}

/// DER 인코딩 X.509 인증서 추출기
#[derive(Debug, Clone, Copy, Default)]
pub struct DerCertificateExtractor;

impl CertificateExtractor for DerCertificateExtractor {
    fn format_name(&self) -> &str {
        "der"
    }

    fn extract(
        &self,
        raw: &[u8],
        source_path: &str,
    ) -> Result<CertificateRecord, ExtractionError> {
        let cert = decode_certificate(raw).map_err(|e| ExtractionError::Decode(e.to_string()))?;

        let not_before = parse_validity(cert.not_before, "not_before")?;
        let not_after = parse_validity(cert.not_after, "not_after")?;

        Ok(CertificateRecord {
            full_name: format_subject_name(&cert.subject),
            not_before,
            not_after,
            serial_number: format_serial_hex(cert.serial_number.as_bytes()),
            source_path: source_path.to_owned(),
        })
    }
}

/// 추출에 필요한 필드만 남긴 인증서 구조
///
/// 유효기간은 디코딩하지 않은 원시 값으로 보관합니다.
struct CertificateFields<'a> {
    serial_number: SerialNumber,
    subject: Name,
    not_before: AnyRef<'a>,
    not_after: AnyRef<'a>,
}

/// `Certificate ::= SEQUENCE { tbsCertificate, signatureAlgorithm, signatureValue }`
fn decode_certificate(raw: &[u8]) -> der::Result<CertificateFields<'_>> {
    let mut reader = SliceReader::new(raw)?;
    let fields = reader.sequence(|cert| {
        let fields = cert.sequence(|tbs| decode_tbs_certificate(tbs))?;
        cert.decode::<AlgorithmIdentifierOwned>()?;
        cert.decode::<BitStringRef<'_>>()?;
        Ok(fields)
    })?;
    reader.finish(fields)
}

/// TBSCertificate 본문을 읽습니다. 확장 필드는 건너뜁니다.
fn decode_tbs_certificate<'a, R: Reader<'a>>(tbs: &mut R) -> der::Result<CertificateFields<'a>> {
    // [0] EXPLICIT version
    if tbs.peek_tag()?.is_context_specific() {
        tbs.tlv_bytes()?;
    }
    let serial_number: SerialNumber = tbs.decode()?;
    tbs.decode::<AlgorithmIdentifierOwned>()?;
    tbs.decode::<Name>()?;
    let (not_before, not_after) = tbs.sequence(|validity| {
        let not_before: AnyRef<'a> = validity.decode()?;
        let not_after: AnyRef<'a> = validity.decode()?;
        Ok((not_before, not_after))
    })?;
    let subject: Name = tbs.decode()?;
    tbs.decode::<SubjectPublicKeyInfoOwned>()?;
    // issuerUniqueID, subjectUniqueID, extensions
    while !tbs.is_finished() {
        tbs.tlv_bytes()?;
    }

    Ok(CertificateFields {
        serial_number,
        subject,
        not_before,
        not_after,
    })
}

/// subject 이름 필드를 고정 순서로 이어 붙입니다.
///
/// 인증서에 없는 필드는 빈 값으로 채우지 않고 건너뜁니다.
pub fn format_subject_name(subject: &Name) -> String {
    let parts: Vec<String> = SUBJECT_NAME_FIELDS
        .iter()
        .filter_map(|(_, oid)| find_attribute(subject, oid))
        .collect();

    parts.join(" ").trim().to_owned()
}

/// subject에서 주어진 OID의 첫 번째 값을 찾습니다.
fn find_attribute(subject: &Name, oid: &ObjectIdentifier) -> Option<String> {
    subject
        .0
        .iter()
        .flat_map(|rdn| rdn.0.iter())
        .find(|atv| atv.oid == *oid)
        .and_then(|atv| attribute_text(&atv.value))
}

/// DirectoryString 계열 값을 문자열로 변환합니다.
fn attribute_text(value: &Any) -> Option<String> {
    let bytes = value.value();
    match value.tag() {
        Tag::Utf8String | Tag::PrintableString | Tag::Ia5String | Tag::VisibleString => {
            std::str::from_utf8(bytes).ok().map(str::to_owned)
        }
        // T.61은 Latin-1로 근사
        Tag::TeletexString => Some(bytes.iter().map(|&b| char::from(b)).collect()),
        Tag::BmpString => {
            if bytes.len() % 2 != 0 {
                return None;
            }
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16(&units).ok()
        }
        _ => None,
    }
}

/// 유효기간 원시 값을 파싱합니다.
fn parse_validity(time: AnyRef<'_>, field: &'static str) -> Result<DateTime<Utc>, ExtractionError> {
    let invalid = |value: String, reason: String| ExtractionError::Timestamp {
        field,
        value,
        reason,
    };

    let text = std::str::from_utf8(time.value())
        .map_err(|e| invalid(hex::encode_upper(time.value()), e.to_string()))?;

    let normalized = match time.tag() {
        Tag::UtcTime => expand_utc_time(text),
        Tag::GeneralizedTime => text.to_owned(),
        other => {
            return Err(invalid(
                text.to_owned(),
                format!("unexpected time tag {other:?}"),
            ));
        }
    };

    parse_generalized_time(&normalized).map_err(|e| invalid(text.to_owned(), e.to_string()))
}

/// UTCTime `YYMMDDHHMMSSZ`에 세기를 붙입니다 (RFC 5280: 50-99 -> 19xx, 00-49 -> 20xx).
///
/// 연도 자리가 숫자가 아니면 그대로 반환하여 이후 파싱에서 실패하게 합니다.
pub fn expand_utc_time(value: &str) -> String {
    match value.get(..2).and_then(|yy| yy.parse::<u8>().ok()) {
        Some(yy) if value.as_bytes()[..2].iter().all(u8::is_ascii_digit) => {
            let century = if yy >= 50 { "19" } else { "20" };
            format!("{century}{value}")
        }
        _ => value.to_owned(),
    }
}

/// `YYYYMMDDHHMMSSZ` 형식(UTC, 소수 초 없음)의 시각을 파싱합니다.
///
/// ```
/// use certpost_scanner::extractor::parse_generalized_time;
///
/// let ts = parse_generalized_time("20240101000000Z").unwrap();
/// assert_eq!(ts.to_rfc3339(), "2024-01-01T00:00:00+00:00");
/// ```
pub fn parse_generalized_time(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, VALIDITY_TIME_FORMAT).map(|naive| naive.and_utc())
}

/// 일련번호 바이트(big-endian)를 대문자 16진수로 변환합니다.
///
/// 선행 0은 제거하며 값이 0이면 `"0"`을 반환합니다.
pub fn format_serial_hex(bytes: &[u8]) -> String {
    let hex = hex::encode_upper(bytes);
    let trimmed = hex.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// 파일 전체를 읽습니다 (동기 I/O).
///
/// `tokio::task::spawn_blocking` 내에서 호출되어야 합니다.
/// 버퍼 크기는 I/O 효율에만 영향을 줍니다.
pub fn read_file(path: &Path, buffer_size: usize) -> Result<Vec<u8>, ExtractionError> {
    let file = File::open(path).map_err(|e| ExtractionError::Read(e.to_string()))?;
    let mut reader = BufReader::with_capacity(buffer_size.max(1), file);
    let mut raw = Vec::new();
    reader
        .read_to_end(&mut raw)
        .map_err(|e| ExtractionError::Read(e.to_string()))?;
    Ok(raw)
}
