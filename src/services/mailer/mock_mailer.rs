use crate::services::mailer::{MailError, Mailer};
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// A mock mailer that records sent emails for testing purposes.
#[derive(Debug, Default)]
#[allow(dead_code)]
pub struct MockMailer {
    pub sent_emails: Mutex<Vec<RecordedEmail>>,
    pub fail_send: bool,
}

#[allow(dead_code)]
impl MockMailer {
    pub fn failing() -> Self {
        Self {
            fail_send: true,
            ..Default::default()
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent_emails.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send_email_generic(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), MailError> {
        if self.fail_send {
            return Err(MailError::Other("mock failure".into()));
        }
        self.sent_emails.lock().unwrap().push(RecordedEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: html_body.to_string(),
        });
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
