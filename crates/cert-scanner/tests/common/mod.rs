//! 통합 테스트 공용 헬퍼 -- rcgen으로 인증서 픽스처 생성

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair, SerialNumber};

/// CN과 일련번호를 가진 자체 서명 DER 인증서를 생성합니다.
pub fn der_certificate(common_name: &str, serial: &[u8]) -> Vec<u8> {
    let mut params = CertificateParams::default();
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, common_name);
    params.distinguished_name = dn;
    params.not_before = rcgen::date_time_ymd(2024, 1, 1);
    params.not_after = rcgen::date_time_ymd(2027, 12, 31);
    params.serial_number = Some(SerialNumber::from_slice(serial));

    let key_pair = KeyPair::generate().expect("key generation should succeed");
    params
        .self_signed(&key_pair)
        .expect("self-signing should succeed")
        .der()
        .to_vec()
}

/// 유효한 인증서 파일을 기록하고 경로를 반환합니다.
pub fn write_cert(dir: &Path, name: &str, common_name: &str, serial: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("should create parent dir");
    }
    std::fs::write(&path, der_certificate(common_name, serial)).expect("should write cert");
    path
}

/// 앞부분만 남긴 손상된 인증서 파일을 기록합니다.
pub fn write_truncated(dir: &Path, name: &str) -> PathBuf {
    let der = der_certificate("Truncated", &[0x01]);
    let path = dir.join(name);
    std::fs::write(&path, &der[..der.len() / 2]).expect("should write truncated cert");
    path
}

/// 인증서가 아닌 내용을 가진 파일을 기록합니다.
pub fn write_garbage(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"not a certificate").expect("should write garbage");
    path
}
