//! 配置加载器实现
//!
//! 从文件或字符串读取检测配置，支持JSON/TOML格式和环境变量替换，
//! 输出规范化的JSON文本供校验器与执行器各自解析

use crate::error::ConfigError;
use regex::Regex;
use serde_json::Value;
use std::path::Path;

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON格式
    Json,
    /// TOML格式
    Toml,
}

impl ConfigFormat {
    /// 根据文件扩展名判断格式，未知扩展名按JSON处理
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Json,
        }
    }
}

/// 检测配置加载器
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// 是否启用环境变量替换
    enable_env_substitution: bool,
}

impl ConfigLoader {
    /// 创建新的配置加载器
    ///
    /// # 参数
    /// * `enable_env_substitution` - 是否启用环境变量替换
    pub fn new(enable_env_substitution: bool) -> Self {
        Self {
            enable_env_substitution,
        }
    }

    /// 替换字符串中的环境变量
    ///
    /// # 参数
    /// * `content` - 要处理的字符串
    ///
    /// # 返回
    /// * `Result<String, ConfigError>` - 替换后的字符串或错误
    fn substitute_env_vars(&self, content: &str) -> Result<String, ConfigError> {
        if !self.enable_env_substitution {
            return Ok(content.to_string());
        }

        // 匹配 ${VAR_NAME} 格式的环境变量
        let env_var_regex = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
            .map_err(|e| ConfigError::ParseError(format!("正则表达式错误: {}", e)))?;

        let mut missing = None;
        let result = env_var_regex.replace_all(content, |captures: &regex::Captures| {
            let var_name = &captures[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    missing.get_or_insert_with(|| var_name.to_string());
                    String::new()
                }
            }
        });

        if let Some(var) = missing {
            return Err(ConfigError::EnvVarError { var });
        }

        Ok(result.into_owned())
    }

    /// 从文件加载配置
    ///
    /// # 参数
    /// * `path` - 配置文件路径，格式由扩展名决定
    ///
    /// # 返回
    /// * `Result<String, ConfigError>` - 规范化的JSON配置文本
    pub async fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<String, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config = self.load_from_string(&content, ConfigFormat::from_path(path))?;

        log::info!("成功加载配置文件: {}", path.display());

        Ok(config)
    }

    /// 从字符串加载配置
    ///
    /// 先按格式解析，再只在字符串值中替换环境变量，
    /// 变量值中的引号或反斜杠不会改变配置结构
    ///
    /// # 参数
    /// * `content` - 配置内容
    /// * `format` - 配置格式
    ///
    /// # 返回
    /// * `Result<String, ConfigError>` - 规范化的JSON配置文本
    pub fn load_from_string(
        &self,
        content: &str,
        format: ConfigFormat,
    ) -> Result<String, ConfigError> {
        let mut value: Value = match format {
            ConfigFormat::Json => serde_json::from_str(content)
                .map_err(|e| ConfigError::ParseError(format!("JSON解析失败: {}", e)))?,
            ConfigFormat::Toml => toml::from_str(content)
                .map_err(|e| ConfigError::ParseError(format!("TOML解析失败: {}", e)))?,
        };

        if !value.is_object() {
            return Err(ConfigError::ParseError("配置必须是一个对象".to_string()));
        }

        self.substitute_in_value(&mut value)?;

        log::debug!("成功解析配置字符串");

        serde_json::to_string(&value).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 递归替换所有字符串值中的环境变量，键名保持不变
    fn substitute_in_value(&self, value: &mut Value) -> Result<(), ConfigError> {
        match value {
            Value::String(text) => {
                *text = self.substitute_env_vars(text)?;
            }
            Value::Array(items) => {
                for item in items {
                    self.substitute_in_value(item)?;
                }
            }
            Value::Object(fields) => {
                for field in fields.values_mut() {
                    self.substitute_in_value(field)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CheckConfig;
    use serial_test::serial;
    use std::env;
    use std::io::Write;

    const TEST_CONFIG_TOML: &str = r#"
url = "https://example.com/health"
verb = "POST"
expected_output = "ok"
match_type = "substringMatch"
body = "name=test"
content_type = "x-www-form-urlencoded"
"#;

    #[test]
    fn test_toml_normalized_to_json() {
        let loader = ConfigLoader::new(false);
        let json = loader
            .load_from_string(TEST_CONFIG_TOML, ConfigFormat::Toml)
            .unwrap();

        let config = CheckConfig::decode(&json).unwrap();
        assert_eq!(config.url, "https://example.com/health");
        assert_eq!(config.verb.as_str(), "POST");
        assert_eq!(config.body, "name=test");
    }

    #[test]
    fn test_json_passthrough() {
        let loader = ConfigLoader::new(false);
        let json = loader
            .load_from_string(
                r#"{"url": "http://a", "expected_output": "200"}"#,
                ConfigFormat::Json,
            )
            .unwrap();
        assert!(CheckConfig::decode(&json).is_ok());
    }

    #[test]
    fn test_non_object_rejected() {
        let loader = ConfigLoader::new(false);
        let result = loader.load_from_string("[1, 2]", ConfigFormat::Json);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let loader = ConfigLoader::new(false);
        let result = loader.load_from_string("url = ", ConfigFormat::Toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    #[serial]
    fn test_env_var_substitution() {
        env::set_var("HTTP_CHECK_TEST_TOKEN", "secret-123");

        let loader = ConfigLoader::new(true);
        let json = loader
            .load_from_string(
                r#"{"url": "http://a", "expected_output": "ok", "body": "token=${HTTP_CHECK_TEST_TOKEN}"}"#,
                ConfigFormat::Json,
            )
            .unwrap();

        let config = CheckConfig::decode(&json).unwrap();
        assert_eq!(config.body, "token=secret-123");

        env::remove_var("HTTP_CHECK_TEST_TOKEN");
    }

    #[test]
    #[serial]
    fn test_env_var_value_with_quotes_and_backslashes() {
        env::set_var("HTTP_CHECK_TEST_SECRET", r#"pa"ss\word"#);
        env::set_var(
            "HTTP_CHECK_TEST_CRAFTED",
            r#"x", "insecure": true, "y": ""#,
        );

        let loader = ConfigLoader::new(true);
        let json = loader
            .load_from_string(
                r#"{"url": "http://a", "expected_output": "200", "body": "${HTTP_CHECK_TEST_SECRET}"}"#,
                ConfigFormat::Json,
            )
            .unwrap();
        let config = CheckConfig::decode(&json).unwrap();
        assert_eq!(config.body, r#"pa"ss\word"#);

        let content = "url = \"http://a\"\nexpected_output = \"200\"\nbody = \"${HTTP_CHECK_TEST_CRAFTED}\"\n";
        let json = loader.load_from_string(content, ConfigFormat::Toml).unwrap();
        let config = CheckConfig::decode(&json).unwrap();
        assert!(!config.insecure);
        assert_eq!(config.body, r#"x", "insecure": true, "y": ""#);

        env::remove_var("HTTP_CHECK_TEST_SECRET");
        env::remove_var("HTTP_CHECK_TEST_CRAFTED");
    }

    #[test]
    #[serial]
    fn test_env_var_substitution_missing_var() {
        env::remove_var("HTTP_CHECK_MISSING_VAR");

        let loader = ConfigLoader::new(true);
        let result = loader.load_from_string(
            r#"{"url": "${HTTP_CHECK_MISSING_VAR}"}"#,
            ConfigFormat::Json,
        );

        match result {
            Err(ConfigError::EnvVarError { var }) => assert_eq!(var, "HTTP_CHECK_MISSING_VAR"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_substitute_env_vars_disabled() {
        let loader = ConfigLoader::new(false);
        let content = "test ${VAR} content";
        let result = loader.substitute_env_vars(content).unwrap();
        assert_eq!(result, content);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("check.toml")),
            ConfigFormat::Toml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("check.TOML")),
            ConfigFormat::Toml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("check.json")),
            ConfigFormat::Json
        );
        assert_eq!(ConfigFormat::from_path(Path::new("check")), ConfigFormat::Json);
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(TEST_CONFIG_TOML.as_bytes()).unwrap();

        let loader = ConfigLoader::new(false);
        let json = loader.load_from_file(file.path()).await.unwrap();
        assert!(CheckConfig::decode(&json).is_ok());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let loader = ConfigLoader::new(false);
        let result = loader.load_from_file("/nonexistent/check.json").await;
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }
}
