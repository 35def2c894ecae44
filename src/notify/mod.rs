//! 订阅通知
//!
//! 文章发布后为每个订阅者渲染一封邮件并逐个发送。发送在独立任务中进行，
//! 单个收件人失败只记录日志，不影响其他收件人，也不影响发布请求本身。

mod smtp;

use std::sync::Arc;

use tera::Context;

use crate::{
    error::Result,
    storage::{Post, Project, Subscriber},
    view::Templates,
};

pub use self::smtp::SmtpMailer;

/// 邮件发送通道
pub trait MailTransport: Send + Sync + 'static {
    fn send(
        &self,
        to: &str,
        subject: &str,
        html: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// 一个收件人
#[derive(Debug, Clone)]
pub struct Recipient {
    pub email: String,
    pub unsubscribe_token: String,
}

/// 一次发布通知所需的全部数据，与请求内的事务无关
#[derive(Debug, Clone)]
pub struct Announcement {
    pub project_name: String,
    pub project_slug: String,
    pub accent_color: String,
    pub post_title: String,
    pub post_slug: String,
    pub body_html: String,
    pub category_label: &'static str,
    pub recipients: Vec<Recipient>,
}

impl Announcement {
    pub fn new(project: &Project, post: &Post, subscribers: Vec<Subscriber>) -> Self {
        Self {
            project_name: project.name.clone(),
            project_slug: project.slug.clone(),
            accent_color: project.accent_color.clone(),
            post_title: post.title.clone(),
            post_slug: post.slug.clone(),
            body_html: post.body_html.clone(),
            category_label: post.category().label(),
            recipients: subscribers
                .into_iter()
                .map(|s| Recipient {
                    email: s.email,
                    unsubscribe_token: s.unsubscribe_token,
                })
                .collect(),
        }
    }

    pub fn subject(&self) -> String {
        format!("New update: {} - {}", self.post_title, self.project_name)
    }

    /// 渲染某个收件人的邮件正文，包含其专属的退订链接
    pub fn render(&self, templates: &Templates, base_url: &str, recipient: &Recipient) -> Result<String> {
        let initial = self
            .project_name
            .chars()
            .next()
            .map(|c| c.to_uppercase().to_string())
            .unwrap_or_default();

        let mut context = Context::new();
        context.insert("project_name", &self.project_name);
        context.insert("initial", &initial);
        context.insert("accent_color", &self.accent_color);
        context.insert("category_label", self.category_label);
        context.insert("post_title", &self.post_title);
        context.insert("body_html", &self.body_html);
        context.insert(
            "post_url",
            &format!("{base_url}/changelog/{}/{}", self.project_slug, self.post_slug),
        );
        context.insert(
            "unsubscribe_url",
            &format!("{base_url}/unsubscribe/{}", recipient.unsubscribe_token),
        );
        templates.render("email/notification.html", &context)
    }
}

/// 向所有收件人发送通知，返回成功发送的数量
///
/// 未配置发送通道时直接返回 0。
pub async fn notify<T: MailTransport>(
    transport: Option<&T>,
    templates: &Templates,
    base_url: &str,
    announcement: &Announcement,
) -> usize {
    let total = announcement.recipients.len();
    let Some(transport) = transport else {
        tracing::warn!(
            recipients = total,
            "smtp not configured, skipping notifications"
        );
        return 0;
    };

    let subject = announcement.subject();
    let mut sent = 0;
    for recipient in &announcement.recipients {
        let result = match announcement.render(templates, base_url, recipient) {
            Ok(html) => transport.send(&recipient.email, &subject, &html).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => sent += 1,
            Err(e) => tracing::warn!(%e, to = %recipient.email, "failed to send notification"),
        }
    }

    tracing::info!(
        post = %announcement.post_slug,
        "sent {sent}/{total} notification emails"
    );
    sent
}

/// 在后台任务中发送通知
#[derive(Clone)]
pub struct Notifier {
    transport: Option<Arc<SmtpMailer>>,
    templates: Templates,
    base_url: Arc<str>,
}

impl Notifier {
    pub fn new(transport: Option<SmtpMailer>, templates: Templates, base_url: &str) -> Self {
        Self {
            transport: transport.map(Arc::new),
            templates,
            base_url: Arc::from(base_url),
        }
    }

    /// 派发通知，不等待发送结果
    ///
    /// 须在发布所在的事务提交之后调用。
    pub fn dispatch(&self, announcement: Announcement) {
        let this = self.clone();
        tokio::spawn(async move {
            notify(
                this.transport.as_deref(),
                &this.templates,
                &this.base_url,
                &announcement,
            )
            .await;
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::error::Error;

    /// 记录收件人，拒绝以 `fail` 开头的地址
    #[derive(Default)]
    struct FakeTransport {
        sent: Mutex<Vec<(String, String, String)>>,
    }

    impl MailTransport for FakeTransport {
        async fn send(&self, to: &str, subject: &str, html: &str) -> Result<()> {
            if to.starts_with("fail") {
                return Err(Error::Config("mailbox unavailable".to_string()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), subject.to_string(), html.to_string()));
            Ok(())
        }
    }

    fn announcement(emails: &[&str]) -> Announcement {
        Announcement {
            project_name: "acme".to_string(),
            project_slug: "acme".to_string(),
            accent_color: "#6366f1".to_string(),
            post_title: "Dark mode".to_string(),
            post_slug: "dark-mode".to_string(),
            body_html: "<p>Now <strong>dark</strong></p>".to_string(),
            category_label: "New Feature",
            recipients: emails
                .iter()
                .enumerate()
                .map(|(i, email)| Recipient {
                    email: email.to_string(),
                    unsubscribe_token: format!("token{i}"),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_notify_counts_successes() {
        let templates = Templates::new().unwrap();
        let transport = FakeTransport::default();
        let a = announcement(&["a@x.com", "fail@x.com", "b@x.com"]);

        let sent = notify(Some(&transport), &templates, "https://cp.test", &a).await;
        assert_eq!(sent, 2, "失败的收件人不应中断发送");

        let mails = transport.sent.lock().unwrap();
        assert_eq!(mails[0].0, "a@x.com");
        assert_eq!(mails[0].1, "New update: Dark mode - acme");
        assert!(mails[0].2.contains("https://cp.test/unsubscribe/token0"));
        assert!(mails[1].2.contains("https://cp.test/unsubscribe/token2"));
        assert!(mails[1].2.contains("https://cp.test/changelog/acme/dark-mode"));
        assert!(mails[1].2.contains("<strong>dark</strong>"), "正文 HTML 不应被转义");
        assert!(!mails[0].2.contains("&#x2F;"), "链接中的 `/` 不应被转义");
    }

    #[tokio::test]
    async fn test_notify_without_transport() {
        let templates = Templates::new().unwrap();
        let sent = notify::<FakeTransport>(None, &templates, "", &announcement(&["a@x.com"])).await;
        assert_eq!(sent, 0);
    }

    #[test]
    fn test_announcement_from_entities() {
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            name: "Acme".to_string(),
            slug: "acme".to_string(),
            description: None,
            website_url: None,
            accent_color: "#112233".to_string(),
            owner_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        };
        let post = Post {
            id: Uuid::new_v4(),
            project_id: project.id,
            title: "Fixed login".to_string(),
            slug: "fixed-login".to_string(),
            body_markdown: "x".to_string(),
            body_html: "<p>x</p>".to_string(),
            category: "bugfix".to_string(),
            is_published: true,
            published_at: Some(now),
            view_count: 0,
            created_at: now,
            updated_at: now,
        };
        let subscriber = Subscriber {
            id: Uuid::new_v4(),
            project_id: project.id,
            email: "a@x.com".to_string(),
            unsubscribe_token: "t".to_string(),
            created_at: now,
        };

        let a = Announcement::new(&project, &post, vec![subscriber]);
        assert_eq!(a.category_label, "Bug Fix");
        assert_eq!(a.subject(), "New update: Fixed login - Acme");
        assert_eq!(a.recipients[0].unsubscribe_token, "t");
    }
}
