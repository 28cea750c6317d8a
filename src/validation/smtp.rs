use std::io;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufStream};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::config::ValidatorConfig;
use crate::models::EmailAddress;

/// Faults observed while talking to a remote mail server. These stay
/// internal to the validation layer; the pipeline collapses them into the
/// per-stage result taxonomy.
#[derive(Debug, Error)]
pub enum SmtpError {
    #[error("connection to {host}:{port} failed: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("timed out waiting for {0}")]
    Timeout(&'static str),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("connection closed by server")]
    Closed,
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("unexpected reply code {0}")]
    UnexpectedReply(u16),
}

/// A parsed SMTP reply: the three-digit code plus the text of every line of
/// a (possibly multiline) response.
#[derive(Debug, Clone)]
pub struct SmtpReply {
    pub code: u16,
    pub lines: Vec<String>,
}

impl SmtpReply {
    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }

    pub fn is_permanent_failure(&self) -> bool {
        (500..600).contains(&self.code)
    }
}

/// One TCP connection to one mail server, alive for the duration of a
/// single probe. The socket is released when the session drops, so every
/// exit path, including timeouts mid-read, tears the connection down.
pub struct SmtpSession {
    stream: BufStream<TcpStream>,
    io_timeout: Duration,
}

impl SmtpSession {
    /// Connects to `host:port` under `connect_timeout`. Reads and writes on
    /// the established session are each bounded by `io_timeout`.
    pub async fn connect(
        host: &str,
        port: u16,
        connect_timeout: Duration,
        io_timeout: Duration,
    ) -> Result<Self, SmtpError> {
        let stream = timeout(connect_timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| SmtpError::Timeout("connect"))?
            .map_err(|source| SmtpError::Connect {
                host: host.to_string(),
                port,
                source,
            })?;

        Ok(Self {
            stream: BufStream::new(stream),
            io_timeout,
        })
    }

    /// Reads one full (possibly multiline) reply. Lines of a multiline
    /// reply carry the code followed by `-`; the final line uses a space.
    pub async fn read_reply(&mut self) -> Result<SmtpReply, SmtpError> {
        let mut lines = Vec::new();
        let mut code: Option<u16> = None;

        loop {
            let line = self.read_line().await?;
            // `get` rejects short lines and multibyte garbage straddling the
            // code boundary; the server's output is untrusted.
            let Some(code_str) = line.get(..3) else {
                return Err(SmtpError::Protocol(format!("invalid reply line: {line:?}")));
            };
            let parsed: u16 = code_str
                .parse()
                .map_err(|_| SmtpError::Protocol(format!("invalid reply code in: {line:?}")))?;
            match code {
                Some(existing) if existing != parsed => {
                    return Err(SmtpError::Protocol(format!(
                        "inconsistent reply codes: {existing} vs {parsed}"
                    )));
                }
                Some(_) => {}
                None => code = Some(parsed),
            }

            let is_last = line.as_bytes().get(3) != Some(&b'-');
            lines.push(line.get(4..).unwrap_or("").to_string());
            if is_last {
                break;
            }
        }

        Ok(SmtpReply {
            code: code.unwrap_or(0),
            lines,
        })
    }

    /// Sends one command line and reads the server's reply.
    pub async fn command(&mut self, line: &str) -> Result<SmtpReply, SmtpError> {
        let io_timeout = self.io_timeout;
        let write = async {
            self.stream.write_all(line.as_bytes()).await?;
            self.stream.write_all(b"\r\n").await?;
            self.stream.flush().await
        };
        timeout(io_timeout, write)
            .await
            .map_err(|_| SmtpError::Timeout("write"))??;
        self.read_reply().await
    }

    /// Best-effort QUIT. Consumes the session; errors are ignored because
    /// the socket is being dropped either way.
    pub async fn quit(mut self) {
        let io_timeout = self.io_timeout;
        let farewell = async {
            self.stream.write_all(b"QUIT\r\n").await?;
            self.stream.flush().await
        };
        if timeout(io_timeout, farewell).await.is_ok() {
            let _ = self.read_reply().await;
        }
    }

    async fn read_line(&mut self) -> Result<String, SmtpError> {
        let mut line = String::new();
        let read = timeout(self.io_timeout, self.stream.read_line(&mut line))
            .await
            .map_err(|_| SmtpError::Timeout("read"))??;
        if read == 0 {
            return Err(SmtpError::Closed);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(line)
    }
}

/// Checks that the domain runs a reachable SMTP server: connect, read the
/// greeting banner, require a 2xx code, QUIT.
pub async fn probe_server(domain: &str, config: &ValidatorConfig) -> Result<(), SmtpError> {
    let mut session = SmtpSession::connect(
        domain,
        config.smtp_port,
        config.connect_timeout,
        config.io_timeout,
    )
    .await?;

    let banner = session.read_reply().await?;
    if !banner.is_positive_completion() {
        session.quit().await;
        return Err(SmtpError::UnexpectedReply(banner.code));
    }

    session.quit().await;
    Ok(())
}

/// Three-way verdict of the mailbox probe. `Indeterminate` carries a
/// human-readable reason (greylisting code, timeout, dropped connection).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailboxVerdict {
    Exists,
    NotFound,
    Indeterminate(String),
}

/// Probes mailbox existence over a fresh session: banner, HELO,
/// `MAIL FROM:<>`, `RCPT TO:<address>`, QUIT.
///
/// Only the RCPT reply is classified: 2xx means the mailbox exists, 5xx
/// means it does not, and everything else (4xx greylisting, timeouts,
/// dropped connections, protocol errors) is `Indeterminate`. Many servers
/// greylist or accept every recipient, so an inconclusive probe must not
/// be reported as either extreme.
pub async fn probe_mailbox(address: &EmailAddress, config: &ValidatorConfig) -> MailboxVerdict {
    match probe_mailbox_inner(address, config).await {
        Ok(verdict) => verdict,
        Err(err) => {
            log::debug!("mailbox probe for {} inconclusive: {err}", address.raw);
            MailboxVerdict::Indeterminate(err.to_string())
        }
    }
}

async fn probe_mailbox_inner(
    address: &EmailAddress,
    config: &ValidatorConfig,
) -> Result<MailboxVerdict, SmtpError> {
    let mut session = SmtpSession::connect(
        &address.domain,
        config.smtp_port,
        config.connect_timeout,
        config.io_timeout,
    )
    .await?;

    let banner = session.read_reply().await?;
    if !banner.is_positive_completion() {
        session.quit().await;
        return Ok(MailboxVerdict::Indeterminate(format!(
            "greeting rejected with code {}",
            banner.code
        )));
    }

    let helo = session
        .command(&format!("HELO {}", config.helo_domain))
        .await?;
    if !helo.is_positive_completion() {
        session.quit().await;
        return Ok(MailboxVerdict::Indeterminate(format!(
            "HELO rejected with code {}",
            helo.code
        )));
    }

    let mail = session.command("MAIL FROM:<>").await?;
    if !mail.is_positive_completion() {
        session.quit().await;
        return Ok(MailboxVerdict::Indeterminate(format!(
            "MAIL FROM rejected with code {}",
            mail.code
        )));
    }

    let rcpt = session
        .command(&format!("RCPT TO:<{}>", address.raw))
        .await?;
    let verdict = if rcpt.is_positive_completion() {
        MailboxVerdict::Exists
    } else if rcpt.is_permanent_failure() {
        MailboxVerdict::NotFound
    } else {
        MailboxVerdict::Indeterminate(format!("RCPT answered with code {}", rcpt.code))
    };

    session.quit().await;
    Ok(verdict)
}

/// Scripted SMTP server for tests. Each accepted connection replays the
/// same script: the first entry is sent as the banner, then one entry per
/// received command line. An empty script accepts the connection and never
/// sends anything.
#[cfg(test)]
pub mod testing {
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufStream};
    use tokio::net::TcpListener;

    pub async fn spawn_stub(script: &[&str]) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let script: Vec<String> = script.iter().map(|s| s.to_string()).collect();

        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let script = script.clone();
                tokio::spawn(async move {
                    let mut stream = BufStream::new(stream);
                    let mut replies = script.into_iter();

                    match replies.next() {
                        Some(banner) => {
                            let _ = stream.write_all(banner.as_bytes()).await;
                            let _ = stream.write_all(b"\r\n").await;
                            let _ = stream.flush().await;
                        }
                        None => {
                            // Silent server: hold the connection open so the
                            // client's read timeout is what ends the probe.
                            tokio::time::sleep(std::time::Duration::from_secs(30)).await;
                            return;
                        }
                    }

                    let mut line = String::new();
                    for reply in replies {
                        line.clear();
                        match stream.read_line(&mut line).await {
                            Ok(0) | Err(_) => return,
                            Ok(_) => {}
                        }
                        let _ = stream.write_all(reply.as_bytes()).await;
                        let _ = stream.write_all(b"\r\n").await;
                        let _ = stream.flush().await;
                    }

                    // Drain the trailing QUIT, if any, before closing.
                    line.clear();
                    let _ = stream.read_line(&mut line).await;
                });
            }
        });

        port
    }
}

#[cfg(test)]
mod tests {
    use super::testing::spawn_stub;
    use super::*;
    use std::time::Instant;

    fn test_config(port: u16) -> ValidatorConfig {
        ValidatorConfig {
            smtp_port: port,
            connect_timeout: Duration::from_millis(500),
            io_timeout: Duration::from_millis(500),
            ..ValidatorConfig::default()
        }
    }

    fn test_address() -> EmailAddress {
        EmailAddress::parse("user@127.0.0.1").unwrap()
    }

    #[tokio::test]
    async fn probe_server_accepts_2xx_banner() {
        let port = spawn_stub(&["220 mail.test ESMTP", "221 bye"]).await;
        let result = probe_server("127.0.0.1", &test_config(port)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn probe_server_rejects_5xx_banner() {
        let port = spawn_stub(&["554 no service for you", "221 bye"]).await;
        let err = probe_server("127.0.0.1", &test_config(port)).await.unwrap_err();
        assert!(matches!(err, SmtpError::UnexpectedReply(554)));
    }

    #[tokio::test]
    async fn probe_server_fails_on_refused_connection() {
        // Bind then drop the listener so the port is closed.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = probe_server("127.0.0.1", &test_config(port)).await.unwrap_err();
        assert!(matches!(err, SmtpError::Connect { .. }));
    }

    #[tokio::test]
    async fn probe_server_times_out_on_silent_server() {
        let port = spawn_stub(&[]).await;
        let started = Instant::now();
        let err = probe_server("127.0.0.1", &test_config(port)).await.unwrap_err();
        assert!(matches!(err, SmtpError::Timeout(_)));
        // The probe must respect the configured 500ms read deadline rather
        // than blocking until the remote end says something.
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn multibyte_garbage_in_banner_is_a_protocol_error() {
        // The Euro sign occupies bytes 2..5, so a naive byte slice of the
        // reply code would land inside it.
        let port = spawn_stub(&["22€ mangled banner"]).await;
        let err = probe_server("127.0.0.1", &test_config(port)).await.unwrap_err();
        assert!(matches!(err, SmtpError::Protocol(_)));
    }

    #[tokio::test]
    async fn reply_parsing_handles_multiline() {
        let port = spawn_stub(&["220-mail.test greets you\r\n220-PIPELINING\r\n220 ok"]).await;
        let config = test_config(port);
        let mut session = SmtpSession::connect(
            "127.0.0.1",
            config.smtp_port,
            config.connect_timeout,
            config.io_timeout,
        )
        .await
        .unwrap();
        let reply = session.read_reply().await.unwrap();
        assert_eq!(reply.code, 220);
        assert_eq!(reply.lines.len(), 3);
        assert_eq!(reply.lines[1], "PIPELINING");
    }

    #[tokio::test]
    async fn mailbox_accepted_rcpt_means_exists() {
        let port = spawn_stub(&[
            "220 mail.test ESMTP",
            "250 hello",
            "250 sender ok",
            "250 recipient ok",
            "221 bye",
        ])
        .await;
        let verdict = probe_mailbox(&test_address(), &test_config(port)).await;
        assert_eq!(verdict, MailboxVerdict::Exists);
    }

    #[tokio::test]
    async fn mailbox_550_means_not_found() {
        let port = spawn_stub(&[
            "220 mail.test ESMTP",
            "250 hello",
            "250 sender ok",
            "550 no such user here",
            "221 bye",
        ])
        .await;
        let verdict = probe_mailbox(&test_address(), &test_config(port)).await;
        assert_eq!(verdict, MailboxVerdict::NotFound);
    }

    #[tokio::test]
    async fn mailbox_4xx_is_indeterminate() {
        let port = spawn_stub(&[
            "220 mail.test ESMTP",
            "250 hello",
            "250 sender ok",
            "450 greylisted, try again later",
            "221 bye",
        ])
        .await;
        let verdict = probe_mailbox(&test_address(), &test_config(port)).await;
        assert!(matches!(verdict, MailboxVerdict::Indeterminate(_)));
        assert_ne!(verdict, MailboxVerdict::Exists);
        assert_ne!(verdict, MailboxVerdict::NotFound);
    }

    #[tokio::test]
    async fn mailbox_dropped_connection_is_indeterminate() {
        // Script ends after HELO, so the server closes mid-dialogue.
        let port = spawn_stub(&["220 mail.test ESMTP", "250 hello"]).await;
        let verdict = probe_mailbox(&test_address(), &test_config(port)).await;
        assert!(matches!(verdict, MailboxVerdict::Indeterminate(_)));
    }
}
