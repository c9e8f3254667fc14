// SPDX-License-Identifier: MIT

//! Results e-mail delivered over SMTP

use crate::adk::error::ResearcherError;
use crate::researcher::tools::storage::Published;
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::env;

const NOT_GENERATED: &str = "Not generated";

/// Links to the artifacts of one research run
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsEmail {
    pub to: String,
    pub topic: String,
    pub report: Option<Published>,
    pub podcast: Option<Published>,
}

impl ResultsEmail {
    pub fn subject(&self) -> String {
        format!("Your Research Results for: {}", self.topic)
    }

    pub fn plain_body(&self) -> String {
        let mut body = format!(
            "Hello,\n\nYour research on \"{}\" is complete.\n\nReport: {}\nPodcast: {}\n",
            self.topic,
            link_text(&self.report),
            link_text(&self.podcast)
        );
        if let Some(Published::Inline { content }) = &self.report {
            body.push_str("\n---\n\n");
            body.push_str(content);
            body.push('\n');
        }
        body
    }

    pub fn html_body(&self) -> String {
        let mut body = format!(
            "<p>Hello,</p><p>Your research on <strong>{}</strong> is complete.</p><ul><li>Report: {}</li><li>Podcast: {}</li></ul>",
            escape_html(&self.topic),
            link_html(&self.report),
            link_html(&self.podcast)
        );
        if let Some(Published::Inline { content }) = &self.report {
            body.push_str("<hr><pre>");
            body.push_str(&escape_html(content));
            body.push_str("</pre>");
        }
        body
    }
}

fn link_text(artifact: &Option<Published>) -> &str {
    match artifact {
        Some(Published::Inline { .. }) => "included below",
        Some(p) => p.location(),
        None => NOT_GENERATED,
    }
}

fn link_html(artifact: &Option<Published>) -> String {
    match artifact {
        Some(Published::SignedUrl { url }) => {
            let url = escape_html(url);
            format!("<a href=\"{}\">{}</a>", url, url)
        }
        Some(Published::LocalFile { path }) => escape_html(path),
        Some(Published::Inline { .. }) => "included below".to_string(),
        None => NOT_GENERATED.to_string(),
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Delivers results e-mails
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &ResultsEmail) -> Result<(), ResearcherError>;
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

impl SmtpConfig {
    /// Reads `SMTP_HOST`, `SMTP_USERNAME`, `SMTP_PASSWORD`, `SMTP_FROM` and optional `SMTP_PORT`
    pub fn from_env() -> Result<Self, ResearcherError> {
        let var = |name: &str| {
            env::var(name).map_err(|_| ResearcherError::config(format!("{} must be set", name)))
        };
        let port = match env::var("SMTP_PORT") {
            Ok(p) => p
                .parse()
                .map_err(|_| ResearcherError::config(format!("SMTP_PORT is invalid: {}", p)))?,
            Err(_) => 587,
        };
        Ok(Self {
            host: var("SMTP_HOST")?,
            port,
            username: var("SMTP_USERNAME")?,
            password: var("SMTP_PASSWORD")?,
            from: var("SMTP_FROM")?,
        })
    }
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Result<Self, ResearcherError> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| ResearcherError::Mail(format!("Invalid from address: {}", e)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| ResearcherError::Mail(format!("Failed to create transport: {}", e)))?
            .port(config.port)
            .credentials(Credentials::new(config.username, config.password))
            .build();

        Ok(Self { transport, from })
    }

    pub fn from_env() -> Result<Self, ResearcherError> {
        Self::new(SmtpConfig::from_env()?)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &ResultsEmail) -> Result<(), ResearcherError> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| ResearcherError::Mail(format!("Invalid recipient: {}", e)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject())
            .multipart(MultiPart::alternative_plain_html(
                email.plain_body(),
                email.html_body(),
            ))
            .map_err(|e| ResearcherError::Mail(format!("Failed to build message: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| ResearcherError::Mail(format!("Failed to send email: {}", e)))?;

        log::info!("Results e-mail sent to {}", email.to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(report: Option<Published>, podcast: Option<Published>) -> ResultsEmail {
        ResultsEmail {
            to: "reader@example.com".to_string(),
            topic: "Rust & WebAssembly".to_string(),
            report,
            podcast,
        }
    }

    #[test]
    fn test_subject() {
        assert_eq!(
            email(None, None).subject(),
            "Your Research Results for: Rust & WebAssembly"
        );
    }

    #[test]
    fn test_missing_artifacts_are_not_generated() {
        let body = email(None, None).plain_body();
        assert!(body.contains("Report: Not generated"));
        assert!(body.contains("Podcast: Not generated"));
    }

    #[test]
    fn test_links_in_both_bodies() {
        let mail = email(
            Some(Published::SignedUrl {
                url: "https://signed.example/r?a=1&b=2".to_string(),
            }),
            Some(Published::LocalFile {
                path: "./research_podcast_x.wav".to_string(),
            }),
        );
        assert!(mail
            .plain_body()
            .contains("Report: https://signed.example/r?a=1&b=2"));
        assert!(mail
            .plain_body()
            .contains("Podcast: ./research_podcast_x.wav"));

        let html = mail.html_body();
        assert!(html.contains("<a href=\"https://signed.example/r?a=1&amp;b=2\">"));
        assert!(html.contains("Rust &amp; WebAssembly"));
    }

    #[test]
    fn test_inline_report_is_appended() {
        let mail = email(
            Some(Published::Inline {
                content: "# Research Report: <Rust>".to_string(),
            }),
            None,
        );
        assert!(mail.plain_body().contains("Report: included below"));
        assert!(mail.plain_body().ends_with("# Research Report: <Rust>\n"));
        assert!(mail.html_body().contains("&lt;Rust&gt;"));
    }
}
