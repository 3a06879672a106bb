//! Credential authority backed by the AWS IAM SDK

use async_trait::async_trait;
use aws_sdk_iam::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_iam::primitives::DateTime as SmithyDateTime;
use aws_sdk_iam::types::{
    ServiceSpecificCredential as SdkCredential, ServiceSpecificCredentialMetadata, StatusType,
};
use aws_sdk_iam::Client;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

use super::traits::{
    CredentialAuthority, CredentialMetadata, CredentialStatus, IamError,
    ServiceSpecificCredential,
};

/// IAM client with a deadline on every call
#[derive(Debug, Clone)]
pub struct SdkCredentialAuthority {
    client: Client,
    timeout: Duration,
}

impl SdkCredentialAuthority {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn from_conf(config: &aws_config::SdkConfig, timeout: Duration) -> Self {
        Self::new(Client::new(config), timeout)
    }

    async fn call<T, F>(&self, operation: &'static str, fut: F) -> Result<T, IamError>
    where
        F: Future<Output = Result<T, IamError>>,
    {
        debug!(operation, "IAM call");
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| IamError::Timeout {
                operation,
                after: self.timeout,
            })?
    }
}

fn classify<E>(err: SdkError<E>) -> IamError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let message = DisplayErrorContext(&err).to_string();
    match err.code() {
        Some("NoSuchEntity") => IamError::NoSuchEntity(message),
        Some("LimitExceeded") => IamError::LimitExceeded(message),
        Some("NotSupportedService") => IamError::ServiceNotSupported(message),
        Some("InvalidInput") => IamError::InvalidInput(message),
        _ => IamError::Service(message),
    }
}

// Some credential members moved between required and optional across IAM
// model revisions; accept either shape.
fn text<'a>(value: impl Into<Option<&'a str>>) -> String {
    value.into().unwrap_or_default().to_string()
}

fn date<'a>(value: impl Into<Option<&'a SmithyDateTime>>) -> DateTime<Utc> {
    value
        .into()
        .and_then(|d| DateTime::<Utc>::from_timestamp(d.secs(), d.subsec_nanos()))
        .unwrap_or_else(Utc::now)
}

fn status<'a>(value: impl Into<Option<&'a StatusType>>) -> CredentialStatus {
    value
        .into()
        .map(|s| CredentialStatus::from(s.as_str()))
        .unwrap_or_else(|| CredentialStatus::Unknown(String::new()))
}

fn metadata_from(m: &ServiceSpecificCredentialMetadata) -> CredentialMetadata {
    CredentialMetadata {
        service_specific_credential_id: text(m.service_specific_credential_id()),
        service_user_name: text(m.service_user_name()),
        service_name: text(m.service_name()),
        user_name: text(m.user_name()),
        status: status(m.status()),
        create_date: date(m.create_date()),
    }
}

fn credential_from(c: &SdkCredential) -> ServiceSpecificCredential {
    ServiceSpecificCredential {
        metadata: CredentialMetadata {
            service_specific_credential_id: text(c.service_specific_credential_id()),
            service_user_name: text(c.service_user_name()),
            service_name: text(c.service_name()),
            user_name: text(c.user_name()),
            status: status(c.status()),
            create_date: date(c.create_date()),
        },
        service_password: text(c.service_password()),
    }
}

fn status_type(status: &CredentialStatus) -> Result<StatusType, IamError> {
    match status {
        CredentialStatus::Active => Ok(StatusType::Active),
        CredentialStatus::Inactive => Ok(StatusType::Inactive),
        CredentialStatus::Unknown(s) => Err(IamError::InvalidInput(format!("invalid status {}", s))),
    }
}

#[async_trait]
impl CredentialAuthority for SdkCredentialAuthority {
    async fn create_service_specific_credential(
        &self,
        user_name: &str,
        service_name: &str,
    ) -> Result<ServiceSpecificCredential, IamError> {
        self.call("CreateServiceSpecificCredential", async {
            let output = self
                .client
                .create_service_specific_credential()
                .user_name(user_name)
                .service_name(service_name)
                .send()
                .await
                .map_err(classify)?;

            output
                .service_specific_credential()
                .map(credential_from)
                .ok_or(IamError::MissingCredentialInResponse)
        })
        .await
    }

    async fn list_service_specific_credentials(
        &self,
        user_name: &str,
        service_name: Option<&str>,
    ) -> Result<Vec<CredentialMetadata>, IamError> {
        self.call("ListServiceSpecificCredentials", async {
            let output = self
                .client
                .list_service_specific_credentials()
                .user_name(user_name)
                .set_service_name(service_name.map(str::to_string))
                .send()
                .await
                .map_err(classify)?;

            Ok(output
                .service_specific_credentials()
                .iter()
                .map(metadata_from)
                .collect())
        })
        .await
    }

    async fn delete_service_specific_credential(
        &self,
        user_name: &str,
        credential_id: &str,
    ) -> Result<(), IamError> {
        self.call("DeleteServiceSpecificCredential", async {
            self.client
                .delete_service_specific_credential()
                .user_name(user_name)
                .service_specific_credential_id(credential_id)
                .send()
                .await
                .map_err(classify)?;
            Ok(())
        })
        .await
    }

    async fn reset_service_specific_credential(
        &self,
        user_name: &str,
        credential_id: &str,
    ) -> Result<ServiceSpecificCredential, IamError> {
        self.call("ResetServiceSpecificCredential", async {
            let output = self
                .client
                .reset_service_specific_credential()
                .user_name(user_name)
                .service_specific_credential_id(credential_id)
                .send()
                .await
                .map_err(classify)?;

            output
                .service_specific_credential()
                .map(credential_from)
                .ok_or(IamError::MissingCredentialInResponse)
        })
        .await
    }

    async fn update_service_specific_credential(
        &self,
        user_name: &str,
        credential_id: &str,
        status: CredentialStatus,
    ) -> Result<(), IamError> {
        let status = status_type(&status)?;

        self.call("UpdateServiceSpecificCredential", async {
            self.client
                .update_service_specific_credential()
                .user_name(user_name)
                .service_specific_credential_id(credential_id)
                .status(status)
                .send()
                .await
                .map_err(classify)?;
            Ok(())
        })
        .await
    }
}
