use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SendCodeRequest {
    pub email: Option<String>,
}

/// Submitted code: accepted as a JSON number or a numeric string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CodeField {
    Number(i64),
    Text(String),
}

impl CodeField {
    pub fn as_code(&self) -> Option<u32> {
        match self {
            CodeField::Number(n) => u32::try_from(*n).ok(),
            CodeField::Text(s) => s.trim().parse::<u32>().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VerifyCodeRequest {
    pub email: Option<String>,
    pub code: Option<CodeField>,
}
