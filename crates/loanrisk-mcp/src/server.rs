use std::io::{self, BufRead, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;

use loanrisk_core::{assess_probability, ApplicantInput, AssessmentError, RiskAssessment};
use loanrisk_engine::{applicant_metrics, RiskAssessor};
use loanrisk_model::ClassifierProvider;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

use crate::config::{build_classifier_from_env, sanitize_sensitive};
use crate::protocol::{
    JsonRpcRequest, JsonRpcResponse, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND,
    PARSE_ERROR,
};

const DEFAULT_MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Largest request body accepted on either transport.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

pub struct RiskServer {
    /// `Err` carries the reason no classifier is available.
    assessor: Result<RiskAssessor, String>,
    runtime: Runtime,
}

#[derive(Debug, Deserialize)]
struct ToolsCallParams {
    name: String,
    arguments: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RiskScoreInput {
    probability: f64,
}

impl RiskServer {
    pub fn from_env() -> io::Result<Self> {
        let classifier = build_classifier_from_env();
        match &classifier {
            Ok(provider) => info!(classifier = provider.name(), "classifier ready"),
            Err(reason) => warn!(%reason, "risk_assess disabled"),
        }
        Self::with_classifier(classifier)
    }

    pub fn with_classifier(
        classifier: Result<Arc<dyn ClassifierProvider>, String>,
    ) -> io::Result<Self> {
        Ok(Self {
            assessor: classifier.map(RiskAssessor::new),
            runtime: Runtime::new()?,
        })
    }

    pub fn classifier_name(&self) -> Option<&'static str> {
        self.assessor.as_ref().ok().map(RiskAssessor::classifier_name)
    }

    pub fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                request.id.unwrap_or(Value::Null),
                INVALID_REQUEST,
                "invalid jsonrpc version",
            ));
        }

        let Some(id) = request.id else {
            // Notifications get no reply.
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => {
                let protocol_version = request
                    .params
                    .get("protocolVersion")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_MCP_PROTOCOL_VERSION);
                JsonRpcResponse::success(
                    id,
                    json!({
                        "protocolVersion": protocol_version,
                        "serverInfo": {"name": "loanrisk-mcp", "version": env!("CARGO_PKG_VERSION")},
                        "capabilities": {
                            "tools": {
                                "listChanged": false
                            }
                        }
                    }),
                )
            }
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, tools_list_result()),
            "tools/call" => self.handle_tools_call(id, request.params),
            _ => JsonRpcResponse::error(id, METHOD_NOT_FOUND, "method not found"),
        };

        Some(response)
    }

    fn handle_tools_call(&self, id: Value, params: Value) -> JsonRpcResponse {
        let parsed: ToolsCallParams = match serde_json::from_value(params) {
            Ok(v) => v,
            Err(err) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("invalid params: {err}"));
            }
        };

        debug!(tool = %parsed.name, "tools/call");
        match parsed.name.as_str() {
            "risk_assess" => self.exec_risk_assess(id, parsed.arguments),
            "risk_metrics" => exec_risk_metrics(id, parsed.arguments),
            "risk_score" => exec_risk_score(id, parsed.arguments),
            _ => JsonRpcResponse::error(id, METHOD_NOT_FOUND, "unknown tool"),
        }
    }

    fn exec_risk_assess(&self, id: Value, arguments: Option<Value>) -> JsonRpcResponse {
        let input: ApplicantInput = match parse_args(arguments) {
            Ok(v) => v,
            Err(resp) => return resp.with_id(id),
        };

        let assessor = match &self.assessor {
            Ok(assessor) => assessor,
            Err(reason) => {
                return assessment_failure(id, &AssessmentError::ModelUnavailable(reason.clone()));
            }
        };

        match self.runtime.block_on(assessor.assess_input(input)) {
            Ok(report) => {
                let summary = assessment_summary(&report.assessment);
                match to_structured(&report) {
                    Ok(structured) => JsonRpcResponse::tool_output(id, summary, structured),
                    Err(resp) => resp.with_id(id),
                }
            }
            Err(err) => assessment_failure(id, &err),
        }
    }

    pub fn serve_stdio(&self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut reader = io::BufReader::new(stdin.lock());
        let mut stdout = io::stdout();
        let mut line = String::new();

        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }

            let trimmed = line.trim_end_matches(['\r', '\n']).trim_start();
            if trimmed.is_empty() {
                continue;
            }

            let (payload, frame) = if is_stdio_header_line(trimmed) {
                let content_length = match read_stdio_content_length(&mut reader, trimmed) {
                    Ok(v) => v,
                    Err(err) => {
                        let response = JsonRpcResponse::error(
                            Value::Null,
                            PARSE_ERROR,
                            format!("invalid stdio frame: {err}"),
                        );
                        write_stdio_response(&mut stdout, &response, StdioFrame::LineDelimited)?;
                        continue;
                    }
                };

                let mut body = vec![0_u8; content_length];
                if let Err(err) = reader.read_exact(&mut body) {
                    let response = JsonRpcResponse::error(
                        Value::Null,
                        PARSE_ERROR,
                        format!("invalid stdio frame body: {err}"),
                    );
                    write_stdio_response(&mut stdout, &response, StdioFrame::ContentLength)?;
                    continue;
                }
                (body, StdioFrame::ContentLength)
            } else {
                (trimmed.as_bytes().to_vec(), StdioFrame::LineDelimited)
            };

            let request: JsonRpcRequest = match serde_json::from_slice(&payload) {
                Ok(v) => v,
                Err(err) => {
                    let response =
                        JsonRpcResponse::error(Value::Null, PARSE_ERROR, format!("parse error: {err}"));
                    write_stdio_response(&mut stdout, &response, frame)?;
                    continue;
                }
            };

            if let Some(response) = self.handle_request(request) {
                write_stdio_response(&mut stdout, &response, frame)?;
            }
        }

        Ok(())
    }

    pub fn serve_http(&self, addr: &str) -> io::Result<()> {
        let listener = TcpListener::bind(addr)?;
        let local = listener.local_addr()?;
        info!(addr = %local, "loanrisk-mcp http listening");
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Err(err) = self.handle_http_connection(stream) {
                        warn!(error = %err, "http request error");
                    }
                }
                Err(err) => warn!(error = %err, "http accept error"),
            }
        }
        Ok(())
    }

    fn handle_http_connection(&self, mut stream: TcpStream) -> io::Result<()> {
        let response = match read_http_request(&stream)? {
            None => return Ok(()),
            Some(HttpIncoming::Request(req)) => self.dispatch_http_request(&req),
            Some(HttpIncoming::TooLarge(content_length)) => {
                warn!(content_length, limit = MAX_BODY_BYTES, "http body rejected");
                HttpResponse::json(
                    413,
                    &json!({"error":"payload_too_large","limit": MAX_BODY_BYTES}),
                )
            }
        };
        write_http_response(&mut stream, &response)
    }

    fn dispatch_http_request(&self, req: &HttpRequest) -> HttpResponse {
        match (req.method.as_str(), req.path.as_str()) {
            ("GET", "/health") => HttpResponse::json(
                200,
                &json!({"status": "ok", "classifier": self.classifier_name()}),
            ),
            ("POST", "/mcp") => {
                let rpc: JsonRpcRequest = match serde_json::from_slice(&req.body) {
                    Ok(v) => v,
                    Err(err) => {
                        return HttpResponse::json(
                            400,
                            &json!({"jsonrpc":"2.0","id": Value::Null, "error":{"code": PARSE_ERROR, "message": format!("parse error: {err}")}}),
                        )
                    }
                };
                match self.handle_request(rpc) {
                    Some(v) => match serde_json::to_value(v) {
                        Ok(payload) => HttpResponse::json(200, &payload),
                        Err(_) => HttpResponse::json(
                            500,
                            &json!({"error":"internal_error","message":"failed to serialize rpc response"}),
                        ),
                    },
                    None => HttpResponse::empty(202),
                }
            }
            (_, "/health" | "/mcp") => {
                HttpResponse::json(405, &json!({"error":"method_not_allowed"}))
            }
            _ => HttpResponse::json(404, &json!({"error":"not_found"})),
        }
    }
}

fn exec_risk_metrics(id: Value, arguments: Option<Value>) -> JsonRpcResponse {
    let input: ApplicantInput = match parse_args(arguments) {
        Ok(v) => v,
        Err(resp) => return resp.with_id(id),
    };

    let metrics = match input.into_profile().and_then(|p| applicant_metrics(&p)) {
        Ok(v) => v,
        Err(err) => return assessment_failure(id, &err),
    };

    let summary = format!(
        "loan_to_income={:.2}, emi_to_income={:.1}%, monthly_income={:.0}",
        metrics.features.loan_to_income_ratio,
        metrics.features.emi_to_income_ratio,
        metrics.features.monthly_income
    );
    match to_structured(&metrics) {
        Ok(structured) => JsonRpcResponse::tool_output(id, summary, structured),
        Err(resp) => resp.with_id(id),
    }
}

fn exec_risk_score(id: Value, arguments: Option<Value>) -> JsonRpcResponse {
    let input: RiskScoreInput = match parse_args(arguments) {
        Ok(v) => v,
        Err(resp) => return resp.with_id(id),
    };

    match assess_probability(input.probability) {
        Ok(assessment) => match to_structured(&assessment) {
            Ok(structured) => {
                JsonRpcResponse::tool_output(id, assessment_summary(&assessment), structured)
            }
            Err(resp) => resp.with_id(id),
        },
        Err(err) => assessment_failure(id, &err),
    }
}

fn assessment_summary(assessment: &RiskAssessment) -> String {
    format!(
        "probability={:.2}%, credit_score={}, rating={} ({} risk)",
        assessment.probability * 100.0,
        assessment.credit_score,
        assessment.grade,
        assessment.band
    )
}

fn assessment_failure(id: Value, err: &AssessmentError) -> JsonRpcResponse {
    let detail = match err {
        AssessmentError::InvalidInput { field, .. } => json!({"field": field}),
        AssessmentError::ModelUnavailable(_) | AssessmentError::InvalidFeatureVector(_) => {
            Value::Null
        }
    };
    JsonRpcResponse::tool_failure(id, err.code(), sanitize_sensitive(&err.to_string()), detail)
}

fn to_structured<T: Serialize>(value: &T) -> Result<Value, JsonRpcResponse> {
    serde_json::to_value(value).map_err(|err| {
        JsonRpcResponse::error(
            Value::Null,
            INVALID_PARAMS,
            format!("failed to serialize tool output: {err}"),
        )
    })
}

fn parse_args<T: for<'de> Deserialize<'de>>(
    arguments: Option<Value>,
) -> Result<T, JsonRpcResponse> {
    let Some(args) = arguments else {
        return Err(JsonRpcResponse::error(
            Value::Null,
            INVALID_PARAMS,
            "missing tool arguments",
        ));
    };

    serde_json::from_value(args).map_err(|err| {
        JsonRpcResponse::error(
            Value::Null,
            INVALID_PARAMS,
            format!("invalid tool arguments: {err}"),
        )
    })
}

fn applicant_schema() -> Value {
    json!({
        "type": "object",
        "required": [
            "age", "annual_income", "residence_type", "loan_amount", "loan_tenure_months",
            "loan_purpose", "loan_type", "avg_days_past_due", "delinquency_ratio",
            "credit_utilization_ratio", "num_open_accounts"
        ],
        "properties": {
            "age": {"type": "integer", "minimum": 18, "maximum": 100},
            "annual_income": {"type": "number", "minimum": 0},
            "residence_type": {"type": "string", "enum": ["Owned", "Rented", "Mortgage"]},
            "loan_amount": {"type": "number", "minimum": 0},
            "loan_tenure_months": {"type": "integer", "minimum": 1, "maximum": 360},
            "loan_purpose": {"type": "string", "enum": ["Education", "Home", "Auto", "Personal"]},
            "loan_type": {"type": "string", "enum": ["Unsecured", "Secured"]},
            "avg_days_past_due": {"type": "number", "minimum": 0},
            "delinquency_ratio": {"type": "number", "minimum": 0, "maximum": 100},
            "credit_utilization_ratio": {"type": "number", "minimum": 0, "maximum": 100},
            "num_open_accounts": {"type": "integer", "minimum": 0, "maximum": 10}
        }
    })
}

fn tools_list_result() -> Value {
    json!({
        "tools": [
            {
                "name": "risk_assess",
                "description": "Estimate default probability for an applicant and map it to a credit score (300-850), risk band and letter grade.",
                "inputSchema": applicant_schema()
            },
            {
                "name": "risk_metrics",
                "description": "Derive loan-to-income, EMI burden and the five-factor risk profile without invoking the classifier.",
                "inputSchema": applicant_schema()
            },
            {
                "name": "risk_score",
                "description": "Map a default probability in [0, 1] to credit score, risk band and letter grade.",
                "inputSchema": {
                    "type": "object",
                    "required": ["probability"],
                    "properties": {
                        "probability": {"type": "number", "minimum": 0, "maximum": 1}
                    }
                }
            }
        ]
    })
}

#[derive(Debug, Clone, Copy)]
enum StdioFrame {
    LineDelimited,
    ContentLength,
}

fn write_stdio_response(
    stdout: &mut io::Stdout,
    response: &JsonRpcResponse,
    frame: StdioFrame,
) -> io::Result<()> {
    match frame {
        StdioFrame::LineDelimited => {
            let serialized = serde_json::to_string(response)?;
            writeln!(stdout, "{serialized}")?;
        }
        StdioFrame::ContentLength => {
            let serialized = serde_json::to_vec(response)?;
            write!(stdout, "Content-Length: {}\r\n\r\n", serialized.len())?;
            stdout.write_all(&serialized)?;
        }
    }
    stdout.flush()
}

fn is_stdio_header_line(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    lower.starts_with("content-length:") || lower.starts_with("content-type:")
}

fn read_stdio_content_length<R: BufRead>(reader: &mut R, first_line: &str) -> io::Result<usize> {
    let mut content_length = parse_content_length(first_line);
    let mut header_line = String::new();
    loop {
        header_line.clear();
        if reader.read_line(&mut header_line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "unexpected eof while reading frame headers",
            ));
        }
        let trimmed = header_line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            break;
        }
        if let Some(v) = parse_content_length(trimmed) {
            content_length = Some(v);
        }
    }
    let content_length = content_length.ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidData, "missing content-length header")
    })?;
    if content_length > MAX_BODY_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("content-length {content_length} exceeds {MAX_BODY_BYTES} bytes"),
        ));
    }
    Ok(content_length)
}

fn parse_content_length(line: &str) -> Option<usize> {
    let (name, value) = line.split_once(':')?;
    if !name.trim().eq_ignore_ascii_case("content-length") {
        return None;
    }
    value.trim().parse::<usize>().ok()
}

enum HttpIncoming {
    Request(HttpRequest),
    /// Declared body length above [`MAX_BODY_BYTES`]; the body is left unread.
    TooLarge(usize),
}

#[derive(Debug)]
struct HttpRequest {
    method: String,
    path: String,
    body: Vec<u8>,
}

struct HttpResponse {
    status: u16,
    body: Vec<u8>,
}

impl HttpResponse {
    fn json(status: u16, value: &Value) -> Self {
        let body = serde_json::to_vec(value).unwrap_or_else(|_| b"{}".to_vec());
        Self { status, body }
    }

    const fn empty(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
        }
    }
}

fn read_http_request(stream: &TcpStream) -> io::Result<Option<HttpIncoming>> {
    let mut reader = io::BufReader::new(stream.try_clone()?);
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let first = line.trim_end_matches(['\r', '\n']);
    if first.is_empty() {
        return Ok(None);
    }

    let mut parts = first.split_whitespace();
    let Some(method) = parts.next() else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "invalid http request line (missing method)",
        ));
    };
    let Some(path_with_query) = parts.next() else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "invalid http request line (missing path)",
        ));
    };
    let path = path_with_query
        .split_once('?')
        .map_or(path_with_query, |(p, _)| p)
        .to_string();

    let mut content_length = 0usize;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header)? == 0 {
            break;
        }
        let header = header.trim_end_matches(['\r', '\n']);
        if header.is_empty() {
            break;
        }
        if let Some(v) = parse_content_length(header) {
            content_length = v;
        }
    }

    if content_length > MAX_BODY_BYTES {
        return Ok(Some(HttpIncoming::TooLarge(content_length)));
    }

    let mut body = vec![0_u8; content_length];
    if content_length > 0 {
        reader.read_exact(&mut body)?;
    }
    Ok(Some(HttpIncoming::Request(HttpRequest {
        method: method.to_string(),
        path,
        body,
    })))
}

fn write_http_response(stream: &mut TcpStream, response: &HttpResponse) -> io::Result<()> {
    let headers = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.status,
        http_reason_phrase(response.status),
        response.body.len()
    );
    stream.write_all(headers.as_bytes())?;
    stream.write_all(&response.body)?;
    stream.flush()
}

const fn http_reason_phrase(status: u16) -> &'static str {
    match status {
        202 => "Accepted",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        _ => "OK",
    }
}
