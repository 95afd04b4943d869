use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

fn reserve_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("reserve addr");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    addr.to_string()
}

fn wait_for_http(addr: &str) {
    for _ in 0..80 {
        if TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(25));
    }
    panic!("http server not ready on {addr}");
}

fn send_http(addr: &str, method: &str, path: &str, body: &str) -> String {
    let request = format!(
        "{method} {path} HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    send_raw(addr, &request)
}

fn send_raw(addr: &str, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).expect("connect http");
    stream.write_all(request.as_bytes()).expect("write request");
    stream.flush().expect("flush");
    let mut buf = String::new();
    stream.read_to_string(&mut buf).expect("read response");
    buf
}

fn response_body(response: &str) -> &str {
    response.split("\r\n\r\n").nth(1).unwrap_or("")
}

#[test]
fn http_health_and_risk_tools_work() {
    let model = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("data")
        .join("models")
        .join("reference-logistic.json");
    let addr = reserve_addr();

    let mut child = Command::new(env!("CARGO_BIN_EXE_loanriskd"))
        .env("LOANRISK_TRANSPORT", "http")
        .env("LOANRISK_HTTP_ADDR", &addr)
        .env("LOANRISK_MODEL_FILE", &model)
        .env_remove("LOANRISK_CLASSIFIER")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn loanriskd");

    wait_for_http(&addr);

    let health = send_http(&addr, "GET", "/health", "");
    assert!(health.starts_with("HTTP/1.1 200"));
    let body = response_body(&health);
    assert!(body.contains("\"status\":\"ok\""));
    assert!(body.contains("\"classifier\":\"logistic\""));

    let init_body = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#;
    let init = send_http(&addr, "POST", "/mcp", init_body);
    assert!(init.starts_with("HTTP/1.1 200"));
    assert!(response_body(&init).contains("\"loanrisk-mcp\""));

    let score_body = r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"risk_score","arguments":{"probability":0.03}}}"#;
    let score = send_http(&addr, "POST", "/mcp", score_body);
    assert!(score.starts_with("HTTP/1.1 200"));
    let body = response_body(&score);
    assert!(body.contains("\"credit_score\":760"));
    assert!(body.contains("\"band\":\"Low\""));

    let garbage = send_http(&addr, "POST", "/mcp", "{not json");
    assert!(garbage.starts_with("HTTP/1.1 400"));

    let missing = send_http(&addr, "GET", "/nope", "");
    assert!(missing.starts_with("HTTP/1.1 404"));

    let oversized = send_raw(
        &addr,
        &format!(
            "POST /mcp HTTP/1.1\r\nHost: {addr}\r\nContent-Length: 18446744073709551615\r\nConnection: close\r\n\r\n"
        ),
    );
    assert!(oversized.starts_with("HTTP/1.1 413"));
    assert!(response_body(&oversized).contains("payload_too_large"));

    let health = send_http(&addr, "GET", "/health", "");
    assert!(health.starts_with("HTTP/1.1 200"));

    let _ = child.kill();
    let _ = child.wait();
}
