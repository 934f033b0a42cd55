use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use native_tls::{HandshakeError, TlsConnector, TlsStream};

use super::error::SmtpError;

#[derive(Debug, Clone)]
pub struct SmtpReply {
    pub code: u16,
    pub lines: Vec<String>,
}

impl SmtpReply {
    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }

    pub fn has_capability(&self, cap: &str) -> bool {
        self.lines.iter().any(|line| {
            line.split_whitespace()
                .next()
                .map(|token| token.eq_ignore_ascii_case(cap))
                .unwrap_or(false)
        })
    }

    pub fn text(&self) -> String {
        self.lines.join(" ")
    }
}

#[derive(Debug)]
enum StreamState {
    Plain(TcpStream),
    Tls(TlsStream<TcpStream>),
    Invalid,
}

#[derive(Debug)]
pub(crate) struct SmtpStream {
    state: StreamState,
    buffer: Vec<u8>,
}

impl SmtpStream {
    pub(crate) fn connect_any(
        host: &str,
        addresses: &[SocketAddr],
        timeout: Option<Duration>,
    ) -> Result<Self, SmtpError> {
        let mut last_err = None;
        for addr in addresses {
            match Self::connect(addr, timeout) {
                Ok(stream) => return Ok(stream),
                Err(err) => last_err = Some(SmtpError::connect(host, err)),
            }
        }
        Err(last_err.unwrap_or(SmtpError::NoAddress {
            endpoint: host.to_string(),
        }))
    }

    fn connect(addr: &SocketAddr, timeout: Option<Duration>) -> io::Result<Self> {
        let stream = match timeout {
            Some(timeout) => TcpStream::connect_timeout(addr, timeout)?,
            None => TcpStream::connect(addr)?,
        };
        stream.set_read_timeout(timeout)?;
        stream.set_write_timeout(timeout)?;
        Ok(Self {
            state: StreamState::Plain(stream),
            buffer: Vec::new(),
        })
    }

    pub(crate) fn is_tls(&self) -> bool {
        matches!(self.state, StreamState::Tls(_))
    }

    pub(crate) fn upgrade_tls(
        &mut self,
        domain: &str,
        connector: &TlsConnector,
    ) -> Result<(), SmtpError> {
        let state = std::mem::replace(&mut self.state, StreamState::Invalid);
        let plain = match state {
            StreamState::Plain(stream) => stream,
            StreamState::Tls(stream) => {
                self.state = StreamState::Tls(stream);
                return Ok(());
            }
            StreamState::Invalid => {
                return Err(SmtpError::Protocol("invalid stream state".into()));
            }
        };

        // Deadlines set on the socket carry over into the TLS stream.
        let tls = complete_handshake(connector, domain, plain)?;
        self.buffer.clear();
        self.state = StreamState::Tls(tls);
        Ok(())
    }

    pub(crate) fn send_command(&mut self, command: &str) -> Result<(), SmtpError> {
        let mut data = command.as_bytes().to_vec();
        data.extend_from_slice(b"\r\n");
        let result = match &mut self.state {
            StreamState::Plain(stream) => stream.write_all(&data).and_then(|_| stream.flush()),
            StreamState::Tls(stream) => stream.write_all(&data).and_then(|_| stream.flush()),
            StreamState::Invalid => {
                return Err(SmtpError::Protocol("invalid stream state".into()));
            }
        };
        result.map_err(SmtpError::io)
    }

    pub(crate) fn read_reply(&mut self) -> Result<SmtpReply, SmtpError> {
        let mut lines = Vec::new();
        let mut code: Option<u16> = None;
        loop {
            let line = self.read_line()?;
            if line.len() < 3 {
                return Err(SmtpError::Protocol(format!("invalid reply: {line}")));
            }
            let parsed_code = line
                .get(..3)
                .and_then(|digits| digits.parse::<u16>().ok())
                .ok_or_else(|| SmtpError::Protocol(format!("invalid code in line: {line}")))?;
            match code {
                Some(existing) if existing != parsed_code => {
                    return Err(SmtpError::Protocol(format!(
                        "inconsistent reply codes: {existing} vs {parsed_code}"
                    )));
                }
                Some(_) => {}
                None => code = Some(parsed_code),
            }
            let is_last = line.as_bytes().get(3) != Some(&b'-');
            lines.push(line.get(4..).unwrap_or_default().to_string());
            if is_last {
                break;
            }
        }
        Ok(SmtpReply {
            code: code.unwrap_or(0),
            lines,
        })
    }

    fn read_line(&mut self) -> Result<String, SmtpError> {
        loop {
            if let Some(pos) = self.buffer.iter().position(|byte| *byte == b'\n') {
                let mut line = self.buffer.drain(..=pos).collect::<Vec<_>>();
                if line.ends_with(b"\r\n") {
                    line.truncate(line.len() - 2);
                } else {
                    line.truncate(line.len() - 1);
                }
                return String::from_utf8(line)
                    .map_err(|err| SmtpError::Protocol(format!("utf8 error: {err}")));
            }

            let mut buf = [0u8; 512];
            let read = match &mut self.state {
                StreamState::Plain(stream) => stream.read(&mut buf),
                StreamState::Tls(stream) => stream.read(&mut buf),
                StreamState::Invalid => {
                    return Err(SmtpError::Protocol("invalid stream state".into()));
                }
            };
            let read = read.map_err(SmtpError::io)?;
            if read == 0 {
                return Err(SmtpError::io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed",
                )));
            }
            self.buffer.extend_from_slice(&buf[..read]);
        }
    }
}

fn complete_handshake(
    connector: &TlsConnector,
    domain: &str,
    stream: TcpStream,
) -> Result<TlsStream<TcpStream>, SmtpError> {
    match connector.connect(domain, stream) {
        Ok(tls) => Ok(tls),
        Err(HandshakeError::Failure(err)) => Err(SmtpError::tls(err)),
        Err(HandshakeError::WouldBlock(mut mid)) => loop {
            match mid.handshake() {
                Ok(tls) => break Ok(tls),
                Err(HandshakeError::Failure(err)) => break Err(SmtpError::tls(err)),
                Err(HandshakeError::WouldBlock(next)) => mid = next,
            }
        },
    }
}
