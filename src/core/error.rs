//! 错误类型
//!
//! 空输入、等待中重复提交、被拒绝的上传都不是错误（见 SubmitOutcome / UploadRejection）；
//! 这里只收录配置、终端、文件元数据与通道等外围故障。

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PennyError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    #[error("Cannot read file metadata for {path}: {source}")]
    FileMetadata {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 编排任务已退出，命令无人接收
    #[error("Assistant channel closed")]
    ChannelClosed,
}
