use std::time::Duration;
use async_trait::async_trait;
use log::{info, warn};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use crate::config::SupabaseConfig;
use crate::error::{AppError, Result};
use crate::job::{Job, NewJob};

const JOBS: &str = "jobs";

/// Where finished jobs are recorded and listed from
#[async_trait]
pub trait JobStore: Send + Sync {
    /// All jobs, newest first
    async fn list_jobs(&self) -> Result<Vec<Job>>;

    async fn insert_job(&self, job: &NewJob) -> Result<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthSession {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: AuthUser,
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

/// Supabase error bodies differ between the REST and auth endpoints
#[derive(Deserialize)]
struct SupabaseErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Supabase client. Build one at startup and share it by `Arc`.
pub struct SupabaseClient {
    http: Client,
    config: SupabaseConfig,
    session: RwLock<Option<AuthSession>>,
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig, timeout: Duration) -> Result<Self> {
        info!("Setting up Supabase client for {}", config.url);
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            config,
            session: RwLock::new(None),
        })
    }

    /// Sign in with email and password; later requests run as that user
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession> {
        let response = self
            .http
            .post(format!("{}/auth/v1/token", self.config.url))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.config.key)
            .json(&PasswordGrant { email, password })
            .send()
            .await?;

        if !response.status().is_success() {
            let message = error_message(response).await;
            warn!("Sign-in failed for {}: {}", email, message);
            return Err(AppError::Auth(message));
        }

        let session: AuthSession = response.json().await?;
        info!("Signed in as {}", session.user.id);
        *self.session.write().await = Some(session.clone());

        Ok(session)
    }

    pub async fn sign_out(&self) {
        *self.session.write().await = None;
    }

    pub async fn is_signed_in(&self) -> bool {
        self.session.read().await.is_some()
    }

    async fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let bearer = match self.session.read().await.as_ref() {
            Some(session) => session.access_token.clone(),
            None => self.config.key.clone(),
        };
        builder
            .header("apikey", &self.config.key)
            .bearer_auth(bearer)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.url, table)
    }
}

async fn error_message(response: Response) -> String {
    let status = response.status();
    let message = raw_error_message(response).await;
    if message.is_empty() { format!("HTTP {}", status) } else { message }
}

/// Message from the error body as sent; empty when the body carries none
async fn raw_error_message(response: Response) -> String {
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<SupabaseErrorBody>(&body) {
        Ok(SupabaseErrorBody { message: Some(m), .. })
        | Ok(SupabaseErrorBody { error_description: Some(m), .. })
        | Ok(SupabaseErrorBody { msg: Some(m), .. }) => m,
        _ => body,
    }
}

#[async_trait]
impl JobStore for SupabaseClient {
    async fn list_jobs(&self) -> Result<Vec<Job>> {
        let request = self
            .http
            .get(self.table_url(JOBS))
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        let response = self.authorized(request).await.send().await?;

        if !response.status().is_success() {
            return Err(AppError::Store(raw_error_message(response).await));
        }

        let jobs: Vec<Job> = response.json().await?;
        info!("Loaded {} jobs", jobs.len());
        Ok(jobs)
    }

    async fn insert_job(&self, job: &NewJob) -> Result<()> {
        let request = self
            .http
            .post(self.table_url(JOBS))
            .header("Prefer", "return=minimal")
            .json(job);
        let response = self.authorized(request).await.send().await?;

        if !response.status().is_success() {
            let message = error_message(response).await;
            warn!("Failed to save job {}: {}", job.id, message);
            return Err(AppError::Store(message));
        }

        info!("Saved job {}", job.id);
        Ok(())
    }
}
