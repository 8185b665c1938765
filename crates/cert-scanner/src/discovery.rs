//! 인증서 파일 탐색기
//!
//! 루트 디렉토리부터 재귀적으로(깊이 제한 없음) 내려가며 확장자가 일치하는
//! 파일을 모읍니다. 누적 개수가 `max_files`에 도달하면 그 자리에서 탐색을
//! 멈추고 남은 디렉토리는 방문하지 않습니다.
//!
//! 디렉토리 하나의 목록 조회가 끝날 때마다 `Scanning` 진행 이벤트를 보냅니다.
//! 이벤트는 참고용이며 sink가 닫혀 있어도 탐색은 계속됩니다.
//!
//! 심볼릭 링크 디렉토리는 따라가지 않습니다. 루트 아래의 읽을 수 없는
//! 하위 디렉토리는 경고를 남기고 건너뜁니다.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use certpost_core::error::DiscoveryError;
use certpost_core::metrics as m;
use certpost_core::pipeline::ProgressSink;
use certpost_core::types::ProgressEvent;

use crate::config::ScannerConfig;
use crate::error::ScannerError;

/// 인증서 파일 탐색기
#[derive(Debug, Clone)]
pub struct FileDiscoverer {
    /// 최대 탐색 파일 수
    max_files: usize,
    /// 정규화된 확장자 목록 (소문자, 점 없음)
    extensions: Vec<String>,
}

impl FileDiscoverer {
    /// 스캐너 설정으로 탐색기를 생성합니다.
    pub fn new(config: &ScannerConfig) -> Self {
        Self {
            max_files: config.max_files,
            extensions: config.normalized_extensions(),
        }
    }

    /// 최대 탐색 파일 수를 반환합니다.
    pub fn max_files(&self) -> usize {
        self.max_files
    }

    /// 주어진 경로의 확장자가 대상 확장자인지 확인합니다 (대소문자 무시).
    pub fn matches(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let ext = ext.to_lowercase();
        self.extensions.iter().any(|known| *known == ext)
    }

    /// 루트 디렉토리 아래의 인증서 파일을 찾습니다 (동기 I/O).
    ///
    /// `tokio::task::spawn_blocking` 내에서 호출되어야 합니다.
    /// 결과는 절대 경로이며 길이는 `max_files` 이하입니다.
    /// 일치하는 파일이 없으면 빈 목록을 반환합니다.
    ///
    /// # Errors
    ///
    /// 루트가 없거나, 디렉토리가 아니거나, 읽을 수 없으면
    /// [`ScannerError::Discovery`]를 반환합니다.
    pub fn discover(
        &self,
        root: &Path,
        sink: &dyn ProgressSink,
    ) -> Result<Vec<PathBuf>, ScannerError> {
        let root = check_root(root)?;

        let mut found: Vec<PathBuf> = Vec::new();
        let mut pending = vec![root.clone()];

        while let Some(dir) = pending.pop() {
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) if dir == root => {
                    return Err(DiscoveryError::Unreadable {
                        path: root.display().to_string(),
                        reason: e.to_string(),
                    }
                    .into());
                }
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "failed to read directory, skipping");
                    continue;
                }
            };

            let mut subdirs = Vec::new();
            let mut files = Vec::new();

            for entry in entries {
                let entry = match entry {
                    Ok(e) => e,
                    Err(e) => {
                        warn!(dir = %dir.display(), error = %e, "failed to read directory entry");
                        continue;
                    }
                };

                let path = entry.path();
                let file_type = match entry.file_type() {
                    Ok(t) => t,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "failed to read file type");
                        continue;
                    }
                };

                if file_type.is_dir() {
                    subdirs.push(path);
                } else if self.matches(&path) && is_regular_file(&path, file_type) {
                    files.push(path);
                }
            }

            files.sort();
            subdirs.sort();

            let room = self.max_files.saturating_sub(found.len());
            let added = files.len().min(room);
            found.extend(files.into_iter().take(room));

            metrics::counter!(m::SCANNER_DIRECTORIES_SCANNED_TOTAL).increment(1);
            metrics::counter!(m::SCANNER_FILES_DISCOVERED_TOTAL).increment(added as u64);

            if sink.is_active() {
                sink.notify(ProgressEvent::scanning(
                    dir.display().to_string(),
                    found.len(),
                ));
            }

            if found.len() >= self.max_files {
                debug!(
                    max_files = self.max_files,
                    remaining_dirs = pending.len() + subdirs.len(),
                    "file cap reached, stopping discovery"
                );
                break;
            }

            // 정렬 순서대로 먼저 방문하도록 역순으로 쌓음
            pending.extend(subdirs.into_iter().rev());
        }

        debug!(root = %root.display(), files = found.len(), "discovery finished");
        Ok(found)
    }
}

/// 루트 경로를 검사하고 절대 경로로 변환합니다.
fn check_root(root: &Path) -> Result<PathBuf, DiscoveryError> {
    let display = root.display().to_string();

    let metadata = fs::metadata(root).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DiscoveryError::RootNotFound {
                path: display.clone(),
            }
        } else {
            DiscoveryError::Unreadable {
                path: display.clone(),
                reason: e.to_string(),
            }
        }
    })?;

    if !metadata.is_dir() {
        return Err(DiscoveryError::NotADirectory { path: display });
    }

    std::path::absolute(root).map_err(|e| DiscoveryError::Unreadable {
        path: display,
        reason: e.to_string(),
    })
}

/// 일반 파일이거나 일반 파일을 가리키는 심볼릭 링크인지 확인합니다.
fn is_regular_file(path: &Path, file_type: fs::FileType) -> bool {
    if file_type.is_file() {
        return true;
    }
    file_type.is_symlink() && fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}
