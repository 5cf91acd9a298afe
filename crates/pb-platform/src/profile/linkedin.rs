//! LinkedIn profile lookup (v2 API projections)

use async_trait::async_trait;
use pb_common::Secret;
use serde_json::Value;

use super::{get_json, ExternalProfile, IdentityProvider, ProfileError, ProfileProvider};

/// `elements[0].handle~.emailAddress`; `~` is escaped as `~0` in JSON pointers
const EMAIL_POINTER: &str = "/elements/0/handle~0/emailAddress";

/// `profilePicture.displayImage~.elements[0].identifiers[0].identifier`
const IMAGE_POINTER: &str = "/profilePicture/displayImage~0/elements/0/identifiers/0/identifier";

pub struct LinkedInProfileProvider {
    http: reqwest::Client,
    api_url: String,
}

impl LinkedInProfileProvider {
    pub fn new(http: reqwest::Client, api_url: &str) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }
}

fn string_at(doc: &Value, pointer: &str, field: &'static str) -> Result<String, ProfileError> {
    doc.pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(ProfileError::MissingField {
            provider: IdentityProvider::LinkedIn,
            field,
        })
}

#[async_trait]
impl ProfileProvider for LinkedInProfileProvider {
    fn provider(&self) -> IdentityProvider {
        IdentityProvider::LinkedIn
    }

    #[tracing::instrument(skip_all, name = "linkedin_profile")]
    async fn fetch_profile(&self, token: &Secret) -> Result<ExternalProfile, ProfileError> {
        let provider = self.provider();

        let email_request = self
            .http
            .get(format!("{}/v2/emailAddress", self.api_url))
            .query(&[("q", "members"), ("projection", "(elements*(handle~))")]);
        let profile_request = self
            .http
            .get(format!("{}/v2/me", self.api_url))
            .query(&[("projection", "(profilePicture(displayImage~:playableStreams))")]);

        let (email_doc, profile_doc) = tokio::try_join!(
            get_json::<Value>(provider, email_request, token),
            get_json::<Value>(provider, profile_request, token),
        )?;

        Ok(ExternalProfile {
            email: string_at(&email_doc, EMAIL_POINTER, "emailAddress")?,
            profile_image: string_at(&profile_doc, IMAGE_POINTER, "profilePicture")?,
        })
    }
}
