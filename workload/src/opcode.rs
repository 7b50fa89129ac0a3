use std::{fmt, str::FromStr};

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    Get,
    Put,
}

impl OpCode {
    /// The spelling used in profile and workload documents.
    pub fn as_str(self) -> &'static str {
        match self {
            OpCode::Get => "get",
            OpCode::Put => "put",
        }
    }
}

impl FromStr for OpCode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "get" => Ok(OpCode::Get),
            "put" => Ok(OpCode::Put),
            other => Err(ParseError::UnexpectedOpcode(other.to_string())),
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpCode::Get => write!(f, "Get"),
            OpCode::Put => write!(f, "Put"),
        }
    }
}
