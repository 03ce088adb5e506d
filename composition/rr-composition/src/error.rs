use std::error::Error;
use std::fmt;

/// メッセージのみのエラー（CLI 層での中断理由）
#[derive(Debug)]
pub struct SimpleError(String);

impl fmt::Display for SimpleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for SimpleError {}

pub type Result<T> = std::result::Result<T, Box<dyn Error + Send + Sync>>;

pub fn err(msg: impl Into<String>) -> Box<dyn Error + Send + Sync> {
    Box::new(SimpleError(msg.into()))
}
