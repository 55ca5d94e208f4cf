//! 响应匹配
//!
//! 按匹配策略检查HTTP响应，响应在本模块内被消费并在任何返回路径上释放

use crate::config::{parse_status_code, MatchType};
use crate::error::{body_preview, CheckError, MatchError, NetworkError, Result};
use regex::bytes::Regex;
use reqwest::Response;
use tracing::debug;

/// 按匹配策略验证响应
///
/// # 参数
/// * `match_type` - 匹配策略
/// * `expected` - 期望输出
/// * `response` - HTTP响应，函数返回时被释放
///
/// # 返回
/// * `Result<()>` - 匹配成功返回 `Ok(())`
pub async fn verify(match_type: MatchType, expected: &str, response: Response) -> Result<()> {
    match match_type {
        MatchType::StatusCode => {
            let expected_code = parse_status_code_lenient(expected)?;
            let actual = response.status().as_u16();
            match_status(expected_code, actual)
        }
        MatchType::SubstringMatch => {
            let body = read_body(response).await?;
            match_substring(expected, &body)
        }
        MatchType::ExactMatch => {
            let body = read_body(response).await?;
            match_exact(expected, &body)
        }
        MatchType::RegexMatch => {
            let pattern = compile_pattern(expected)?;
            let body = read_body(response).await?;
            match_regex(&pattern, &body)
        }
    }
}

/// 读取完整响应体
async fn read_body(response: Response) -> Result<Vec<u8>> {
    let body = response.bytes().await.map_err(NetworkError::Body)?;
    Ok(body.to_vec())
}

/// 执行阶段只要求期望值是整数，范围由校验器负责
fn parse_status_code_lenient(expected: &str) -> Result<u16> {
    match parse_status_code(expected) {
        Ok(code) => Ok(code),
        Err(CheckError::Range(code)) => Ok(u16::try_from(code).unwrap_or(u16::MAX)),
        Err(e) => Err(e),
    }
}

fn match_status(expected: u16, actual: u16) -> Result<()> {
    if expected != actual {
        return Err(MatchError::StatusCode { expected, actual }.into());
    }
    debug!("状态码匹配: {}", actual);
    Ok(())
}

fn match_substring(expected: &str, body: &[u8]) -> Result<()> {
    if !contains_bytes(body, expected.as_bytes()) {
        return Err(MatchError::SubstringNotFound {
            expected: expected.to_string(),
            body_preview: body_preview(body),
        }
        .into());
    }
    debug!("响应体包含期望内容");
    Ok(())
}

/// 在原始字节上查找子串，非UTF-8字节不做替换
fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}

fn match_exact(expected: &str, body: &[u8]) -> Result<()> {
    if body != expected.as_bytes() {
        return Err(MatchError::ExactMismatch {
            expected: expected.to_string(),
            body_preview: body_preview(body),
        }
        .into());
    }
    debug!("响应体与期望内容一致");
    Ok(())
}

fn compile_pattern(expected: &str) -> Result<Regex> {
    Regex::new(expected).map_err(|source| CheckError::Pattern {
        pattern: expected.to_string(),
        source,
    })
}

fn match_regex(pattern: &Regex, body: &[u8]) -> Result<()> {
    if !pattern.is_match(body) {
        return Err(MatchError::RegexNoMatch {
            pattern: pattern.as_str().to_string(),
            body_preview: body_preview(body),
        }
        .into());
    }
    debug!("正则表达式匹配成功: {}", pattern.as_str());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_status() {
        assert!(match_status(200, 200).is_ok());
        assert!(matches!(
            match_status(200, 404),
            Err(CheckError::Match(MatchError::StatusCode {
                expected: 200,
                actual: 404
            }))
        ));
    }

    #[test]
    fn test_lenient_status_parse() {
        assert_eq!(parse_status_code_lenient("404").unwrap(), 404);
        assert_eq!(parse_status_code_lenient("700").unwrap(), 700);
        assert!(matches!(
            parse_status_code_lenient("abc"),
            Err(CheckError::Parse { .. })
        ));
    }

    #[test]
    fn test_match_substring() {
        assert!(match_substring("hello", b"hello world").is_ok());
        assert!(match_substring("o w", b"hello world").is_ok());
        assert!(matches!(
            match_substring("goodbye", b"hello world"),
            Err(CheckError::Match(MatchError::SubstringNotFound { .. }))
        ));
    }

    #[test]
    fn test_match_substring_on_raw_bytes() {
        // 无效字节不会被当作替换字符
        assert!(matches!(
            match_substring("\u{FFFD}", &[0xff, b'a']),
            Err(CheckError::Match(MatchError::SubstringNotFound { .. }))
        ));
        assert!(match_substring("a", &[0xff, b'a']).is_ok());
        assert!(match_substring("", b"").is_ok());
        assert!(match_substring("健康", "服务健康".as_bytes()).is_ok());
    }

    #[test]
    fn test_match_exact_is_byte_for_byte() {
        assert!(match_exact("hello world", b"hello world").is_ok());
        assert!(match_exact("hello world", b"hello world\n").is_err());
        assert!(match_exact("hello world ", b"hello world").is_err());
        assert!(match_exact("Hello world", b"hello world").is_err());
    }

    #[test]
    fn test_match_regex() {
        let pattern = compile_pattern("^hello").unwrap();
        assert!(match_regex(&pattern, b"hello world").is_ok());
        assert!(matches!(
            match_regex(&pattern, b"say hello"),
            Err(CheckError::Match(MatchError::RegexNoMatch { .. }))
        ));

        // 非UTF-8响应体同样可以匹配
        let pattern = compile_pattern(r"v\d+").unwrap();
        assert!(match_regex(&pattern, b"\xff\xfe v42").is_ok());
    }

    #[test]
    fn test_compile_pattern_error() {
        assert!(matches!(
            compile_pattern("(unclosed"),
            Err(CheckError::Pattern { .. })
        ));
    }
}
