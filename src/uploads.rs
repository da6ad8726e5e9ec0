//! 项目文件：上传过滤（扩展名白名单 + 大小上限）与文件列表
//!
//! 只记录元数据，不读取文件内容；被拒绝的文件静默丢弃。

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::PennyError;

/// 待上传文件的元数据
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileDescriptor {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
        }
    }

    /// 从磁盘元数据构建（大小取自 metadata，MIME 按扩展名推断）
    pub fn from_path(path: &Path) -> Result<Self, PennyError> {
        let meta = std::fs::metadata(path).map_err(|e| PennyError::FileMetadata {
            path: path.display().to_string(),
            source: e,
        })?;
        if !meta.is_file() {
            return Err(PennyError::FileMetadata {
                path: path.display().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
            });
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self::new(name, meta.len(), mime_type))
    }

    /// 最后一个 `.` 之后的部分，小写并带点；无点时把整个文件名当扩展名（与浏览器端一致）
    pub fn extension(&self) -> String {
        let ext = self.name.rsplit('.').next().unwrap_or_default();
        format!(".{}", ext.to_lowercase())
    }
}

/// 拒绝原因（仅用于日志，不向用户展示）
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UploadRejection {
    UnsupportedType(String),
    TooLarge { size: u64, max: u64 },
}

/// 上传策略
#[derive(Clone, Debug)]
pub struct UploadPolicy {
    /// 小写、带点，如 ".pdf"
    pub accepted_file_types: Vec<String>,
    pub max_file_size_bytes: u64,
}

impl UploadPolicy {
    pub fn new<I, S>(accepted: I, max_file_size_bytes: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            accepted_file_types: accepted
                .into_iter()
                .map(|ext| normalize_extension(ext.as_ref()))
                .collect(),
            max_file_size_bytes,
        }
    }

    pub fn check(&self, file: &FileDescriptor) -> Result<(), UploadRejection> {
        let ext = file.extension();
        if !self.accepted_file_types.iter().any(|a| *a == ext) {
            return Err(UploadRejection::UnsupportedType(ext));
        }
        if file.size > self.max_file_size_bytes {
            return Err(UploadRejection::TooLarge {
                size: file.size,
                max: self.max_file_size_bytes,
            });
        }
        Ok(())
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new([".pdf", ".docx", ".txt", ".xlsx"], 10 * 1024 * 1024)
    }
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Uploading,
    Processing,
    Ready,
    Error,
}

/// 已接收的项目文件
#[derive(Clone, Debug, Serialize)]
pub struct ProjectFile {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
    pub uploaded_by: Option<String>,
    pub status: FileStatus,
}

/// 会话内的项目文件列表
#[derive(Clone, Debug, Default)]
pub struct ProjectFiles {
    policy: UploadPolicy,
    uploader: Option<String>,
    files: Vec<ProjectFile>,
}

impl ProjectFiles {
    pub fn new(policy: UploadPolicy, uploader: Option<String>) -> Self {
        Self {
            policy,
            uploader,
            files: Vec::new(),
        }
    }

    /// 过滤并追加；返回本次接收的数量
    pub fn upload(&mut self, batch: Vec<FileDescriptor>) -> usize {
        let mut accepted = 0;
        for file in batch {
            match self.policy.check(&file) {
                Ok(()) => {
                    self.files.push(ProjectFile {
                        id: format!("file-{}", uuid::Uuid::new_v4()),
                        name: file.name,
                        size: file.size,
                        mime_type: file.mime_type,
                        uploaded_at: Utc::now(),
                        uploaded_by: self.uploader.clone(),
                        status: FileStatus::Ready,
                    });
                    accepted += 1;
                }
                Err(reason) => {
                    tracing::debug!(file = %file.name, ?reason, "upload dropped");
                }
            }
        }
        accepted
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.files.len();
        self.files.retain(|f| f.id != id);
        self.files.len() != before
    }

    pub fn files(&self) -> &[ProjectFile] {
        &self.files
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: u64 = 1024 * 1024;

    #[test]
    fn test_exe_rejected() {
        let policy = UploadPolicy::default();
        let file = FileDescriptor::new("report.exe", 1024, "application/octet-stream");
        assert_eq!(
            policy.check(&file),
            Err(UploadRejection::UnsupportedType(".exe".into()))
        );
    }

    #[test]
    fn test_pdf_within_limit_accepted_as_ready() {
        let mut files = ProjectFiles::new(UploadPolicy::default(), Some("Jonathan".into()));
        let n = files.upload(vec![FileDescriptor::new("report.pdf", 5 * MB, "application/pdf")]);
        assert_eq!(n, 1);
        assert_eq!(files.len(), 1);
        let f = &files.files()[0];
        assert_eq!(f.status, FileStatus::Ready);
        assert_eq!(f.name, "report.pdf");
        assert_eq!(f.uploaded_by.as_deref(), Some("Jonathan"));
    }

    #[test]
    fn test_size_limit_inclusive() {
        let policy = UploadPolicy::default();
        assert!(policy.check(&FileDescriptor::new("a.txt", 10 * MB, "text/plain")).is_ok());
        assert!(matches!(
            policy.check(&FileDescriptor::new("a.txt", 10 * MB + 1, "text/plain")),
            Err(UploadRejection::TooLarge { .. })
        ));
    }

    #[test]
    fn test_extension_case_insensitive() {
        let policy = UploadPolicy::new(["PDF", ".Docx"], MB);
        assert!(policy.check(&FileDescriptor::new("Brief.PDF", 10, "application/pdf")).is_ok());
        assert!(policy.check(&FileDescriptor::new("notes.docx", 10, "")).is_ok());
        assert!(policy.check(&FileDescriptor::new("noext", 10, "")).is_err());
    }

    #[test]
    fn test_mixed_batch_drops_rejected_silently() {
        let mut files = ProjectFiles::new(UploadPolicy::default(), None);
        let n = files.upload(vec![
            FileDescriptor::new("a.pdf", MB, "application/pdf"),
            FileDescriptor::new("b.exe", MB, ""),
            FileDescriptor::new("c.xlsx", 20 * MB, ""),
        ]);
        assert_eq!(n, 1);
        assert_eq!(files.files()[0].name, "a.pdf");
    }

    #[test]
    fn test_remove() {
        let mut files = ProjectFiles::new(UploadPolicy::default(), None);
        files.upload(vec![FileDescriptor::new("a.txt", 1, "text/plain")]);
        let id = files.files()[0].id.clone();
        assert!(!files.remove("file-missing"));
        assert!(files.remove(&id));
        assert!(files.is_empty());
    }

    #[test]
    fn test_from_path_reads_metadata_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Call_Notes.txt");
        std::fs::write(&path, b"hello world").unwrap();
        let desc = FileDescriptor::from_path(&path).unwrap();
        assert_eq!(desc.name, "Call_Notes.txt");
        assert_eq!(desc.size, 11);
        assert_eq!(desc.mime_type, "text/plain");

        assert!(FileDescriptor::from_path(&dir.path().join("missing.pdf")).is_err());
        assert!(FileDescriptor::from_path(dir.path()).is_err());
    }
}
