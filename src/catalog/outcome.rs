use serde_json::Value;

/// Result of a recommend or propose call.
///
/// The site answers either with a JSON body carrying `result`/`code`, or
/// with a bare status and a body that is not such an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    Structured { result: String, code: Option<String> },
    StatusOnly { status: u16 },
}

/// Which half of the success contract accepted a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessSignal {
    StructuredBody,
    BareStatus,
}

impl SuccessSignal {
    pub fn as_str(self) -> &'static str {
        match self {
            SuccessSignal::StructuredBody => "structured_body",
            SuccessSignal::BareStatus => "bare_status",
        }
    }
}

const RECOMMEND_OK_STATUSES: &[u16] = &[200, 204];
const PROPOSE_OK_STATUSES: &[u16] = &[200, 201];

impl ActionResult {
    /// Classify an HTTP response.
    pub fn from_response(status: u16, body: &str) -> Self {
        let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) else {
            return ActionResult::StatusOnly { status };
        };
        let Some(Value::String(result)) = map.get("result") else {
            return ActionResult::StatusOnly { status };
        };

        let code = map.get("code").and_then(|code| match code {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
        ActionResult::Structured {
            result: result.clone(),
            code,
        }
    }

    /// Success signal for a recommend call, if any.
    pub fn recommend_signal(&self) -> Option<SuccessSignal> {
        self.signal(RECOMMEND_OK_STATUSES)
    }

    /// Success signal for a propose call, if any.
    pub fn propose_signal(&self) -> Option<SuccessSignal> {
        self.signal(PROPOSE_OK_STATUSES)
    }

    pub fn is_recommend_success(&self) -> bool {
        self.recommend_signal().is_some()
    }

    pub fn is_propose_success(&self) -> bool {
        self.propose_signal().is_some()
    }

    fn signal(&self, ok_statuses: &[u16]) -> Option<SuccessSignal> {
        match self {
            ActionResult::Structured { result, code } => {
                let code_ok = code.as_deref().is_none_or(|c| c == "000");
                (result == "success" && code_ok).then_some(SuccessSignal::StructuredBody)
            }
            ActionResult::StatusOnly { status } => ok_statuses
                .contains(status)
                .then_some(SuccessSignal::BareStatus),
        }
    }
}
