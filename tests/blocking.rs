//! Synchronous entry points against a thread-backed server.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread;

use http1_client::{blocking, RequestOptions};

fn serve_once(response: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        let (socket, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(socket);
        let mut line = String::new();
        let mut length = 0;
        while reader.read_line(&mut line).unwrap() > 0 {
            if line == "\r\n" {
                break;
            }
            if let Some(value) = line.strip_prefix("Content-Length: ") {
                length = value.trim().parse().unwrap();
            }
            line.clear();
        }
        let mut body = vec![0; length];
        reader.read_exact(&mut body).unwrap();
        let mut socket = reader.into_inner();
        socket.write_all(response.as_bytes()).unwrap();
    });
    format!("http://{addr}/")
}

#[test]
fn blocking_get() {
    let url = serve_once("HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok");
    let resp = blocking::get(&url, RequestOptions::new()).unwrap();
    assert_eq!(resp.status_code(), 200);
    assert_eq!(resp.text(), "ok");
}

#[test]
fn blocking_put_reports_status() {
    let url = serve_once("HTTP/1.1 409 Conflict\r\nContent-Length: 0\r\n\r\n");
    let resp = blocking::put(&url, RequestOptions::new().data("payload")).unwrap();
    assert_eq!(resp.status_code(), 409);
    assert_eq!(resp.reason(), "Conflict");
    assert!(!resp.is_success());
}
