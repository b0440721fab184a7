use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// MTurk API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 模板渲染错误
    #[error("模板错误: {0}")]
    Template(#[from] TemplateError),
    /// 资格记录错误
    #[error("资格错误: {0}")]
    Qualification(#[from] QualificationError),
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({action}): {source}")]
    RequestFailed {
        action: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// API 返回错误响应
    #[error("API返回错误响应 ({action}): status={status}, type={error_type:?}, message={message:?}")]
    BadResponse {
        action: String,
        status: u16,
        error_type: Option<String>,
        message: Option<String>,
    },
    /// 响应缺少必要字段
    #[error("API响应缺少字段 ({action}): {field}")]
    MissingField { action: String, field: String },
    /// 请求参数无法转换为 API 参数
    #[error("API请求参数无效 ({action}): {source}")]
    InvalidRequest {
        action: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// JSON 文件解析失败
    #[error("JSON解析失败 ({path}): {source}")]
    JsonParseFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 工作区缺少 default_args.json
    #[error("{path} 不存在!")]
    MissingDefaultArgs { path: String },
    /// 缺少必要配置项
    #[error("缺少配置项: {key}")]
    MissingSetting { key: String },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 共享配置格式错误
    #[error("共享配置格式错误 ({path}): {reason}")]
    InvalidSharedConfig { path: String, reason: String },
    /// 信封模板缺少占位符
    #[error("信封模板缺少 {{0}} 占位符")]
    InvalidEnvelope,
    /// 未知命令
    #[error("未知命令: {command}")]
    UnknownCommand { command: String },
}

/// 模板渲染错误
#[derive(Debug, Error)]
pub enum TemplateError {
    /// 模板解析失败
    #[error("模板解析失败 ({path}): {source}")]
    ParseFailed {
        path: String,
        #[source]
        source: minijinja::Error,
    },
    /// 渲染失败（包括未定义变量）
    #[error("渲染 {source_path} 失败: {source}")]
    RenderFailed {
        source_path: String,
        #[source]
        source: minijinja::Error,
    },
    /// 源记录不是 JSON 对象
    #[error("源记录不是 JSON 对象: {path}")]
    NotAnObject { path: String },
}

/// 资格记录错误
#[derive(Debug, Error)]
pub enum QualificationError {
    /// 资格记录中找不到对应名称
    #[error("找不到资格 {name} 的记录 ({path})")]
    UnknownName { name: String, path: String },
    /// 资格尚未创建，没有远程 ID
    #[error("资格 {name} 尚未创建 ({path})")]
    NotCreated { name: String, path: String },
    /// 资格元数据缺少评分表
    #[error("资格 {name} 缺少 Scoring 评分表")]
    MissingScoring { name: String },
    /// 分数位数与评分表键数不一致
    #[error("资格 {name} 的分数 {score} 无法补齐为 {width} 位")]
    ScoreWidthMismatch {
        name: String,
        score: i64,
        width: usize,
    },
    /// 评分表中找不到对应片段
    #[error("资格 {name} 的评分表缺少位置 {position} 的数字 {digit}")]
    MissingFragment {
        name: String,
        position: String,
        digit: char,
    },
    /// 评分表格式错误
    #[error("资格 {name} 的评分表格式错误: {reason}")]
    InvalidScoring { name: String, reason: String },
}

// ========== 从常见错误类型转换 ==========

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建API请求失败错误
    pub fn api_request_failed(
        action: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Api(ApiError::RequestFailed {
            action: action.into(),
            source: Box::new(source),
        })
    }

    /// 创建API响应缺少字段错误
    pub fn api_missing_field(action: impl Into<String>, field: impl Into<String>) -> Self {
        AppError::Api(ApiError::MissingField {
            action: action.into(),
            field: field.into(),
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建缺少配置项错误
    pub fn missing_setting(key: impl Into<String>) -> Self {
        AppError::Config(ConfigError::MissingSetting { key: key.into() })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
