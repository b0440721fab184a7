//! 题目渲染服务 - 业务能力层
//!
//! 模板 + 源记录 + 公共字段 → 信封包装后的题目文件

use std::path::{Path, PathBuf};

use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use serde_json::{Map, Value as JsonValue};
use tracing::info;

use crate::config::WorkspaceArgs;
use crate::error::{AppError, AppResult, TemplateError};
use crate::models::loaders::{file_stem, list_files_with_suffix, read_json, read_text};
use crate::models::{Envelope, SharedConfig};
use crate::services::ActivityLog;

/// 题目渲染服务
pub struct QuestionRenderer {
    template_path: PathBuf,
    config_path: PathBuf,
    src_folder: PathBuf,
    xml_folder: PathBuf,
    envelope: Envelope,
    log: ActivityLog,
}

impl QuestionRenderer {
    pub fn new(args: &WorkspaceArgs, log: ActivityLog) -> AppResult<Self> {
        Ok(Self {
            template_path: args.template_path.clone(),
            config_path: args.config_path.clone(),
            src_folder: args.src_folder_path.clone(),
            xml_folder: args.xml_folder_path.clone(),
            envelope: Envelope::parse(&args.xml)?,
            log,
        })
    }

    /// 不做额外处理地渲染全部源记录
    pub fn render_all(&self) -> AppResult<Vec<PathBuf>> {
        self.render(|fields| fields)
    }

    /// 渲染全部源记录
    ///
    /// # 参数
    /// - `transform`: 覆盖公共字段之后、渲染之前对字段的处理
    ///
    /// # 返回
    /// 返回写出的题目文件路径
    pub fn render<F>(&self, transform: F) -> AppResult<Vec<PathBuf>>
    where
        F: Fn(Map<String, JsonValue>) -> Map<String, JsonValue>,
    {
        let source = read_text(&self.template_path)?;
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        let template = env.template_from_str(&source).map_err(|e| {
            AppError::Template(TemplateError::ParseFailed {
                path: self.template_path.display().to_string(),
                source: e,
            })
        })?;

        let commons = SharedConfig::load(&self.config_path)?.commons;
        let mut written = Vec::new();

        for src_path in list_files_with_suffix(&self.src_folder, ".json")? {
            let mut fields = load_record(&src_path)?;
            for (key, value) in &commons {
                fields.insert(key.clone(), value.clone());
            }
            let fields = transform(fields);

            let body = template.render(&fields).map_err(|e| {
                AppError::Template(TemplateError::RenderFailed {
                    source_path: src_path.display().to_string(),
                    source: e,
                })
            })?;

            let dst_path = self
                .xml_folder
                .join(format!("{}.xml", file_stem(&src_path)));
            std::fs::write(&dst_path, self.envelope.wrap(&body))
                .map_err(|e| AppError::file_write_failed(dst_path.display().to_string(), e))?;

            self.log.record(&format!(
                "Created question {} from {}",
                dst_path.display(),
                src_path.display()
            ))?;
            written.push(dst_path);
        }

        info!("✓ 共渲染 {} 道题目", written.len());
        Ok(written)
    }
}

fn load_record(path: &Path) -> AppResult<Map<String, JsonValue>> {
    match read_json::<JsonValue>(path)? {
        JsonValue::Object(fields) => Ok(fields),
        _ => Err(AppError::Template(TemplateError::NotAnObject {
            path: path.display().to_string(),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Workspace;
    use serde_json::json;

    fn renderer(ws: &Workspace) -> QuestionRenderer {
        let log = ActivityLog::new(ws.args.logs_path.clone(), false);
        QuestionRenderer::new(&ws.args, log).unwrap()
    }

    #[test]
    fn test_render_merges_commons_into_envelope() {
        let ws = Workspace::new();
        ws.write_json(
            "config.json",
            &json!({"arguments": {"Title": "t"}, "commons": {"lang": "en"}}),
        );
        ws.write("template.html", "{{prompt}}-{{lang}}");
        ws.write_json("src/q1.json", &json!({"prompt": "hi"}));

        let renderer = renderer(&ws);
        let written = renderer.render_all().unwrap();

        assert_eq!(written, vec![ws.root().join("xml/q1.xml")]);
        let artifact = std::fs::read_to_string(&written[0]).unwrap();
        assert_eq!(artifact, Envelope::default().wrap("hi-en"));
        assert_eq!(Envelope::default().extract_body(&artifact), Some("hi-en"));

        let log = std::fs::read_to_string(&ws.args.logs_path).unwrap();
        assert_eq!(log.matches("Created question").count(), 1);
    }

    #[test]
    fn test_commons_override_record_fields() {
        let ws = Workspace::new();
        ws.write_json(
            "config.json",
            &json!({"arguments": {}, "commons": {"lang": "en"}}),
        );
        ws.write("template.html", "{{lang}}");
        ws.write_json("src/q1.json", &json!({"lang": "pt"}));

        renderer(&ws).render_all().unwrap();

        let artifact = std::fs::read_to_string(ws.root().join("xml/q1.xml")).unwrap();
        assert_eq!(Envelope::default().extract_body(&artifact), Some("en"));
    }

    #[test]
    fn test_transform_applies_before_rendering() {
        let ws = Workspace::new();
        ws.write("template.html", "{{prompt}}!");
        ws.write_json("src/a.json", &json!({"prompt": "hi"}));
        ws.write_json("src/b.json", &json!({"prompt": "yo"}));

        let written = renderer(&ws)
            .render(|mut fields| {
                let upper = fields["prompt"].as_str().unwrap_or_default().to_uppercase();
                fields.insert("prompt".to_string(), json!(upper));
                fields
            })
            .unwrap();

        assert_eq!(written.len(), 2);
        let body = std::fs::read_to_string(ws.root().join("xml/b.xml")).unwrap();
        assert!(body.contains("YO!"));
    }

    #[test]
    fn test_missing_variable_is_hard_error() {
        let ws = Workspace::new();
        ws.write("template.html", "{{prompt}} {{missing}}");
        ws.write_json("src/q1.json", &json!({"prompt": "hi"}));

        let err = renderer(&ws).render_all().unwrap_err();

        assert!(matches!(
            err,
            AppError::Template(TemplateError::RenderFailed { .. })
        ));
        assert!(!ws.root().join("xml/q1.xml").exists());
    }

    #[test]
    fn test_html_is_not_escaped() {
        let ws = Workspace::new();
        ws.write("template.html", "<div>{{prompt}}</div>");
        ws.write_json("src/q1.json", &json!({"prompt": "<b>x</b>"}));

        renderer(&ws).render_all().unwrap();

        let artifact = std::fs::read_to_string(ws.root().join("xml/q1.xml")).unwrap();
        assert!(artifact.contains("<div><b>x</b></div>"));
    }
}
