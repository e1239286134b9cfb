//! Collections used by the admin panel and typed shapes for the main ones.
//!
//! The record store does not enforce this namespace; it is the set of names
//! the site uses by convention. Every typed shape keeps fields it does not
//! know about in `extra`, so records written by other consumers survive a
//! round-trip unchanged.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::record::Record;
use crate::types::{CollectionName, IdKind, RecordId};

/// The collection names in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownCollection {
    BlogPosts,
    Pages,
    Services,
    NewsletterSubscribers,
    NewsletterCampaigns,
    NewsletterTemplates,
    SiteSettings,
    SmtpSettings,
    Faqs,
    SectionContent,
    SocialMedia,
    SeoSettings,
    LiveChat,
}

impl KnownCollection {
    pub const ALL: [KnownCollection; 13] = [
        KnownCollection::BlogPosts,
        KnownCollection::Pages,
        KnownCollection::Services,
        KnownCollection::NewsletterSubscribers,
        KnownCollection::NewsletterCampaigns,
        KnownCollection::NewsletterTemplates,
        KnownCollection::SiteSettings,
        KnownCollection::SmtpSettings,
        KnownCollection::Faqs,
        KnownCollection::SectionContent,
        KnownCollection::SocialMedia,
        KnownCollection::SeoSettings,
        KnownCollection::LiveChat,
    ];

    /// The storage name of this collection.
    pub const fn as_str(self) -> &'static str {
        match self {
            KnownCollection::BlogPosts => "blogPosts",
            KnownCollection::Pages => "pages",
            KnownCollection::Services => "services",
            KnownCollection::NewsletterSubscribers => "newsletter-subscribers",
            KnownCollection::NewsletterCampaigns => "newsletter-campaigns",
            KnownCollection::NewsletterTemplates => "newsletter-templates",
            KnownCollection::SiteSettings => "siteSettings",
            KnownCollection::SmtpSettings => "smtpSettings",
            KnownCollection::Faqs => "faqs",
            KnownCollection::SectionContent => "sectionContent",
            KnownCollection::SocialMedia => "socialMedia",
            KnownCollection::SeoSettings => "seoSettings",
            KnownCollection::LiveChat => "liveChat",
        }
    }

    pub fn name(self) -> CollectionName {
        self.into()
    }
}

impl fmt::Display for KnownCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for KnownCollection {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl FromStr for KnownCollection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KnownCollection::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidCollectionName {
                name: s.to_string(),
                reason: "not a known collection",
            })
    }
}

impl From<KnownCollection> for CollectionName {
    fn from(collection: KnownCollection) -> Self {
        CollectionName::from_known(collection.as_str())
    }
}

/// Implement [`Record`] for a struct with an `id: Option<RecordId>` field.
macro_rules! impl_record {
    ($ty:ty, $kind:expr) => {
        impl_record!($ty, $kind, |_r: &$ty| None);
    };
    ($ty:ty, $kind:expr, $order:expr) => {
        impl Record for $ty {
            const ID_KIND: IdKind = $kind;

            fn id(&self) -> Option<RecordId> {
                self.id.clone()
            }

            fn set_id(&mut self, id: RecordId) {
                self.id = Some(id);
            }

            fn order_key(&self) -> Option<i64> {
                let order: fn(&$ty) -> Option<i64> = $order;
                order(self)
            }
        }
    };
}

/// An entry of the `faqs` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Faq {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub question: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Faq {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<RecordId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }
}

impl_record!(Faq, IdKind::Numeric, |r: &Faq| r.order);

/// Publication status shared by posts and pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

/// An entry of the `blogPosts` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: PublishStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl_record!(BlogPost, IdKind::Numeric);

/// An entry of the `pages` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub status: PublishStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl_record!(Page, IdKind::Numeric);

/// An entry of the `services` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl_record!(Service, IdKind::Numeric, |r: &Service| r.order);

/// Subscription state of a newsletter subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriberStatus {
    #[default]
    Active,
    Unsubscribed,
    Bounced,
}

/// An entry of the `newsletter-subscribers` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterSubscriber {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub status: SubscriberStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscribed_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewsletterSubscriber {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }
}

impl_record!(NewsletterSubscriber, IdKind::Text);

/// The single record of the `siteSettings` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub site_name: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl_record!(SiteSettings, IdKind::Numeric);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_known_collection_names_roundtrip() {
        for collection in KnownCollection::ALL {
            let parsed: KnownCollection = collection.as_str().parse().unwrap();
            assert_eq!(parsed, collection);
            assert_eq!(collection.name().as_str(), collection.as_str());
        }
        assert!("blog-posts".parse::<KnownCollection>().is_err());
    }

    #[test]
    fn test_faq_keeps_unknown_fields() {
        let raw = json!({"id": 1, "question": "Q", "answer": "A", "category": "pricing"});
        let faq: Faq = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(faq.extra.get("category"), Some(&json!("pricing")));
        assert_eq!(serde_json::to_value(&faq).unwrap(), raw);
    }

    #[test]
    fn test_blog_post_camel_case() {
        let post: BlogPost = serde_json::from_value(json!({
            "id": 3,
            "title": "Launch",
            "slug": "launch",
            "publishedAt": "2024-01-01",
            "status": "published"
        }))
        .unwrap();
        assert_eq!(post.published_at.as_deref(), Some("2024-01-01"));
        assert_eq!(post.status, PublishStatus::Published);
        assert!(post.extra.is_empty());
    }

    #[test]
    fn test_record_impls() {
        let mut faq = Faq::new("Q", "A").with_order(2);
        assert_eq!(faq.id(), None);
        faq.set_id(RecordId::Num(4));
        assert_eq!(faq.id(), Some(RecordId::Num(4)));
        assert_eq!(faq.order_key(), Some(2));

        assert_eq!(NewsletterSubscriber::ID_KIND, IdKind::Text);
        assert_eq!(BlogPost::default().order_key(), None);
    }
}
