//! 题目信封
//!
//! 渲染后的正文被包进固定的 XML 外壳，`{0}` 是正文的位置

use crate::error::{AppError, AppResult, ConfigError};

/// 默认的 HTMLQuestion 信封
pub const HTML_QUESTION_ENVELOPE: &str = "<HTMLQuestion xmlns=\"http://mechanicalturk.amazonaws.com/AWSMechanicalTurkDataSchemas/2011-11-11/HTMLQuestion.xsd\"><HTMLContent><![CDATA[{0}]]></HTMLContent><FrameHeight>2000</FrameHeight></HTMLQuestion>";

const PLACEHOLDER: &str = "{0}";

/// 信封：正文前后的固定文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    prefix: String,
    suffix: String,
}

impl Envelope {
    /// 从格式字符串构造
    ///
    /// 规则与 Python `str.format` 一致：`{{` / `}}` 表示字面的 `{` / `}`，
    /// 正文占位符 `{0}`（或 `{}`）必须恰好出现一次
    pub fn parse(format: &str) -> AppResult<Self> {
        let mut segments = vec![String::new()];
        let mut chars = format.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    push_char(&mut segments, '{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    push_char(&mut segments, '}');
                }
                '{' => {
                    let mut field = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(ch) => field.push(ch),
                            None => return Err(AppError::Config(ConfigError::InvalidEnvelope)),
                        }
                    }
                    if !matches!(field.as_str(), "0" | "") {
                        return Err(AppError::Config(ConfigError::InvalidEnvelope));
                    }
                    segments.push(String::new());
                }
                '}' => return Err(AppError::Config(ConfigError::InvalidEnvelope)),
                other => push_char(&mut segments, other),
            }
        }

        match <[String; 2]>::try_from(segments) {
            Ok([prefix, suffix]) => Ok(Self { prefix, suffix }),
            Err(_) => Err(AppError::Config(ConfigError::InvalidEnvelope)),
        }
    }

    /// 包装正文
    pub fn wrap(&self, body: &str) -> String {
        let mut artifact = String::with_capacity(self.prefix.len() + body.len() + self.suffix.len());
        artifact.push_str(&self.prefix);
        artifact.push_str(body);
        artifact.push_str(&self.suffix);
        artifact
    }

    /// 取回正文；外壳不匹配时返回 None
    pub fn extract_body<'a>(&self, artifact: &'a str) -> Option<&'a str> {
        artifact
            .strip_prefix(self.prefix.as_str())?
            .strip_suffix(self.suffix.as_str())
    }
}

fn push_char(segments: &mut [String], c: char) {
    if let Some(current) = segments.last_mut() {
        current.push(c);
    }
}

impl Default for Envelope {
    fn default() -> Self {
        // 常量中包含且仅包含一个占位符
        let (prefix, suffix) = HTML_QUESTION_ENVELOPE
            .split_once(PLACEHOLDER)
            .unwrap_or((HTML_QUESTION_ENVELOPE, ""));
        Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        }
    }
}
