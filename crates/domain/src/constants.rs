//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! client.

// Persisted credential
pub const TOKEN_KEY: &str = "smartcalendar_token";
pub const KEYCHAIN_SERVICE: &str = "SmartCal.auth";

// Envelope codes
pub const CODE_OK: i64 = 0;
pub const CODE_TOKEN_MISSING: i64 = 40101;
pub const CODE_TOKEN_INVALID: i64 = 40102;
pub const CODE_FORBIDDEN: i64 = 40301;
pub const AUTH_FAILURE_CODES: [i64; 3] = [CODE_TOKEN_MISSING, CODE_TOKEN_INVALID, CODE_FORBIDDEN];

// Transport
pub const DEFAULT_API_BASE: &str = "http://localhost:8080/api";
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_HTTP_MAX_ATTEMPTS: usize = 3;

// Assistant
pub const CONFIRM_PHRASE: &str = "确认";
pub const AI_SERVICE_FALLBACK: &str = "AI 服务异常";

// Voice capture
pub const SPEECH_POLL_INTERVAL_MS: u64 = 1000;
pub const SPEECH_MAX_POLLS: u32 = 20;
pub const SPEECH_SAMPLE_RATE: u32 = 16_000;
pub const SPEECH_FALLBACK: &str = "语音识别异常";
pub const SPEECH_TIMEOUT_MESSAGE: &str = "语音识别超时，请重试";
pub const RECORDING_EMPTY_MESSAGE: &str = "录音为空，请重试";
pub const RECORDING_UNSUPPORTED_MESSAGE: &str = "当前设备不支持录音";
pub const RECORDING_OPEN_FAILED_MESSAGE: &str = "无法开启录音";

/// Returns true for envelope codes that invalidate the current session.
pub fn is_auth_failure_code(code: i64) -> bool {
    AUTH_FAILURE_CODES.contains(&code)
}
