use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::{SmtpConnection, SmtpError};
use crate::connection::ConnectionDescriptor;

/// Serves one session: writes the banner, then for each step reads a line,
/// checks its prefix and writes the canned reply. Returns received lines.
fn fake_server(
    banner: &'static str,
    steps: Vec<(&'static str, &'static str)>,
) -> (u16, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    let handle = thread::spawn(move || {
        let (socket, _) = listener.accept().expect("accept");
        let mut writer = socket.try_clone().expect("clone");
        let mut reader = BufReader::new(socket);
        writer.write_all(banner.as_bytes()).expect("banner");
        let mut received = Vec::new();
        for (prefix, reply) in steps {
            let mut line = String::new();
            if reader.read_line(&mut line).expect("read") == 0 {
                break;
            }
            let line = line.trim_end().to_string();
            assert!(line.starts_with(prefix), "expected {prefix}, got {line}");
            received.push(line);
            writer.write_all(reply.as_bytes()).expect("reply");
        }
        received
    });
    (port, handle)
}

fn descriptor(port: u16, username: &str, password: &str) -> ConnectionDescriptor {
    let mut descriptor = ConnectionDescriptor::new("127.0.0.1", port, username, password);
    descriptor.timeout = Some(Duration::from_secs(5));
    descriptor
}

#[test]
fn opens_plain_session_and_authenticates() {
    let (port, server) = fake_server(
        "220 mail.test ESMTP\r\n",
        vec![
            ("EHLO", "250-mail.test\r\n250-SIZE 1000\r\n250 AUTH PLAIN LOGIN\r\n"),
            ("AUTH PLAIN", "235 2.7.0 ok\r\n"),
            ("QUIT", "221 bye\r\n"),
        ],
    );

    let mut conn = SmtpConnection::open(&descriptor(port, "alice", "s3cret"), "client.test")
        .expect("session opens");
    assert!(!conn.is_encrypted());
    conn.quit().expect("quit");

    let received = server.join().expect("server thread");
    assert_eq!(received[0], "EHLO client.test");
    // base64("\0alice\0s3cret")
    assert_eq!(received[1], "AUTH PLAIN AGFsaWNlAHMzY3JldA==");
    assert!(conn.transcript.iter().any(|line| line.contains("AUTH PLAIN ***")));
    assert!(!conn.transcript.iter().any(|line| line.contains("AGFsaWNl")));
}

#[test]
fn skips_auth_without_username() {
    let (port, server) = fake_server(
        "220 mail.test\r\n",
        vec![("EHLO", "250 mail.test\r\n"), ("QUIT", "221 bye\r\n")],
    );

    let mut conn = SmtpConnection::open(&descriptor(port, "", ""), "client.test")
        .expect("session opens");
    conn.quit().expect("quit");

    let received = server.join().expect("server thread");
    assert_eq!(received, vec!["EHLO client.test", "QUIT"]);
}

#[test]
fn starttls_must_be_advertised() {
    let (port, server) = fake_server(
        "220 mail.test\r\n",
        vec![("EHLO", "250 mail.test\r\n"), ("QUIT", "221 bye\r\n")],
    );
    let mut descriptor = descriptor(port, "", "");
    descriptor.use_tls = true;

    let err = SmtpConnection::open(&descriptor, "client.test")
        .err()
        .expect("STARTTLS missing");
    assert!(matches!(err, SmtpError::StartTlsUnavailable { .. }));
    server.join().expect("server thread");
}

#[test]
fn rejected_auth_is_an_error() {
    let (port, server) = fake_server(
        "220 mail.test\r\n",
        vec![
            ("EHLO", "250 AUTH PLAIN\r\n"),
            ("AUTH PLAIN", "535 5.7.8 bad credentials\r\n"),
            ("QUIT", "221 bye\r\n"),
        ],
    );

    let err = SmtpConnection::open(&descriptor(port, "alice", "wrong"), "client.test")
        .err()
        .expect("auth rejected");
    assert!(matches!(err, SmtpError::AuthRejected { code: 535, .. }));
    server.join().expect("server thread");
}

#[test]
fn negative_banner_is_an_error() {
    let (port, server) = fake_server("554 no service\r\n", vec![]);

    let err = SmtpConnection::open(&descriptor(port, "", ""), "client.test")
        .err()
        .expect("banner rejected");
    assert!(matches!(err, SmtpError::UnexpectedReply { code: 554, .. }));
    server.join().expect("server thread");
}
