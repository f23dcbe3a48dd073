use nft_core::{BundleError, IndexError, LookupError, ModuleError, SymbolError, DIR_ENV};
use serde_json::{json, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandStatus {
    Ok,
    UserError,
    Failure,
}

impl CommandStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::UserError => 1,
            Self::Failure => 2,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::UserError => "user-error",
            Self::Failure => "error",
        }
    }
}

/// Result of one command: a summary, machine-readable details, and the
/// plain lines printed on success (paths, generated source).
#[derive(Clone, Debug)]
pub struct ExecutionOutcome {
    pub status: CommandStatus,
    pub message: String,
    pub details: Value,
    pub lines: Vec<String>,
}

impl ExecutionOutcome {
    pub fn success(message: impl Into<String>, details: Value, lines: Vec<String>) -> Self {
        Self {
            status: CommandStatus::Ok,
            message: message.into(),
            details,
            lines,
        }
    }

    pub fn user_error(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::UserError,
            message: message.into(),
            details,
            lines: Vec::new(),
        }
    }

    pub fn failure(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::Failure,
            message: message.into(),
            details,
            lines: Vec::new(),
        }
    }

    pub fn hint(&self) -> Option<&str> {
        self.details.get("hint").and_then(Value::as_str)
    }

    pub fn to_json(&self) -> Value {
        json!({
            "status": self.status.as_str(),
            "message": self.message,
            "details": self.details,
        })
    }
}

impl From<IndexError> for ExecutionOutcome {
    fn from(err: IndexError) -> Self {
        let mut details = json!({ "reason": err.reason() });
        let hint = match &err {
            IndexError::UnsupportedPlatform(_) => {
                Some("Pass --platform linux|darwin|any or set NFT_PLATFORM.".to_string())
            }
            IndexError::NoExecutables { .. } => Some(
                "Check the fixtures were built for this platform, or pass --platform any."
                    .to_string(),
            ),
            IndexError::MissingConfig { .. } => Some(format!("Pass --dir or set {DIR_ENV}.")),
            IndexError::ReadDir { .. } | IndexError::Metadata(_) => None,
        };
        if let Value::Object(map) = &mut details {
            if let Some(hint) = hint {
                map.insert("hint".into(), json!(hint));
            }
            if let IndexError::Metadata(inner) = &err {
                map.insert("path".into(), json!(inner.path().display().to_string()));
            }
        }
        let message = error_chain(&err);
        if err.is_user_error() {
            Self::user_error(message, details)
        } else {
            Self::failure(message, details)
        }
    }
}

impl From<LookupError> for ExecutionOutcome {
    fn from(err: LookupError) -> Self {
        let LookupError::NotFound { kind, base_name } = &err;
        let details = json!({
            "reason": err.reason(),
            "kind": kind.as_str(),
            "base_name": base_name,
            "hint": "Run `nft list` to see the recorded test names.",
        });
        Self::user_error(err.to_string(), details)
    }
}

impl From<SymbolError> for ExecutionOutcome {
    fn from(err: SymbolError) -> Self {
        let mut details = json!({ "reason": err.reason() });
        if let (Value::Object(map), SymbolError::NotFound { path, symbol }) = (&mut details, &err) {
            map.insert("symbol".into(), json!(symbol));
            map.insert("path".into(), json!(path.display().to_string()));
            map.insert(
                "hint".into(),
                json!("Run `nft symbols <NAME>` to see the symbols the executable defines."),
            );
        }
        if err.is_user_error() {
            Self::user_error(err.to_string(), details)
        } else {
            Self::failure(error_chain(&err), details)
        }
    }
}

impl From<ModuleError> for ExecutionOutcome {
    fn from(err: ModuleError) -> Self {
        match err {
            ModuleError::Lookup(err) => err.into(),
            ModuleError::Symbols(err) => err.into(),
        }
    }
}

impl From<BundleError> for ExecutionOutcome {
    fn from(err: BundleError) -> Self {
        let details = json!({ "reason": err.reason() });
        Self::failure(error_chain(&err), details)
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}
