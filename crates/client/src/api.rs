use std::time::Duration;

use api_types::{
    ErrorBody, MessageResponse,
    alert::Alert,
    analytics::{ChartData, Summary},
    auth::{AuthResponse, Login, Register},
    budget::{Budget, BudgetCreated, BudgetNew, BudgetUpdate},
    category::{CategoriesResponse, Category, CategoryCreated, CategoryNew, CategoryUpdate},
    expense::{Expense, ExpenseCreated, ExpenseNew, ExpenseUpdate},
    report::{ExportFormat, ExportedReport, ReportSummary},
};
use engine::{Period, QueryFilter};
use reqwest::{RequestBuilder, Response, StatusCode, Url, header};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{
    error::{ClientError, Result},
    session::SessionContext,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Gateway to the service REST API.
///
/// `base_url` includes the API prefix, e.g. `http://127.0.0.1:8001/api`.
/// Every call except login/register sends the session's bearer token; a
/// `401` on such a call logs the session out.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    session: SessionContext,
}

impl ApiClient {
    pub fn new(base_url: &str, session: SessionContext) -> Result<Self> {
        Url::parse(base_url).map_err(|err| ClientError::BaseUrl(err.to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            session,
        })
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sends `req`, attaching the bearer token when `authed`.
    async fn send(&self, req: RequestBuilder, authed: bool) -> Result<Response> {
        let token = if authed {
            let Some(token) = self.session.token().await else {
                return Err(ClientError::Unauthorized("Not logged in".to_string()));
            };
            Some(token)
        } else {
            None
        };

        let req = match &token {
            Some(token) => req.bearer_auth(token),
            None => req,
        };

        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let message = match resp.json::<ErrorBody>().await {
            Ok(body) => body.detail,
            Err(_) => "Request failed".to_string(),
        };

        if status == StatusCode::UNAUTHORIZED {
            if let Some(token) = token
                && self.session.invalidate(&token).await
            {
                tracing::warn!("credential rejected ({message}), session cleared");
            }
            return Err(ClientError::Unauthorized(message));
        }

        tracing::debug!("request failed with {status}: {message}");
        Err(ClientError::Api { status, message })
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
        resp.json::<T>()
            .await
            .map_err(|err| ClientError::Decode(err.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T> {
        let req = self.http.get(self.url(path)).query(query);
        Self::decode(self.send(req, true).await?).await
    }

    async fn post_json<TReq: Serialize + ?Sized, TResp: DeserializeOwned>(
        &self,
        path: &str,
        body: &TReq,
        authed: bool,
    ) -> Result<TResp> {
        let req = self.http.post(self.url(path)).json(body);
        Self::decode(self.send(req, authed).await?).await
    }

    async fn put_json<TReq: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&TReq>,
    ) -> Result<MessageResponse> {
        let mut req = self.http.put(self.url(path));
        if let Some(body) = body {
            req = req.json(body);
        }
        Self::decode(self.send(req, true).await?).await
    }

    async fn delete(&self, path: &str) -> Result<MessageResponse> {
        let req = self.http.delete(self.url(path));
        Self::decode(self.send(req, true).await?).await
    }

    // ============= Auth =============

    pub async fn login(&self, payload: &Login) -> Result<AuthResponse> {
        self.post_json("/auth/login", payload, false).await
    }

    pub async fn register(&self, payload: &Register) -> Result<AuthResponse> {
        self.post_json("/auth/register", payload, false).await
    }

    // ============= Expenses =============

    /// Lists transactions, newest first. Only `category`, `kind`,
    /// `start_date` and `end_date` of the filter apply here.
    pub async fn expenses(&self, filter: &QueryFilter) -> Result<Vec<Expense>> {
        let filter = QueryFilter {
            period: None,
            ..filter.clone()
        };
        self.get_json("/expenses", &filter.to_query()).await
    }

    pub async fn create_expense(&self, payload: &ExpenseNew) -> Result<Expense> {
        let created: ExpenseCreated = self.post_json("/expenses", payload, true).await?;
        Ok(created.expense)
    }

    pub async fn update_expense(&self, id: Uuid, payload: &ExpenseUpdate) -> Result<()> {
        self.put_json(&format!("/expenses/{id}"), Some(payload))
            .await
            .map(|_| ())
    }

    pub async fn delete_expense(&self, id: Uuid) -> Result<()> {
        self.delete(&format!("/expenses/{id}")).await.map(|_| ())
    }

    // ============= Categories =============

    pub async fn categories(&self) -> Result<CategoriesResponse> {
        self.get_json("/categories", &[]).await
    }

    pub async fn create_category(&self, payload: &CategoryNew) -> Result<Category> {
        let created: CategoryCreated = self.post_json("/categories", payload, true).await?;
        Ok(created.category)
    }

    pub async fn update_category(&self, id: Uuid, payload: &CategoryUpdate) -> Result<()> {
        self.put_json(&format!("/categories/{id}"), Some(payload))
            .await
            .map(|_| ())
    }

    // ============= Budgets =============

    pub async fn budgets(&self) -> Result<Vec<Budget>> {
        self.get_json("/budgets", &[]).await
    }

    pub async fn create_budget(&self, payload: &BudgetNew) -> Result<Budget> {
        let created: BudgetCreated = self.post_json("/budgets", payload, true).await?;
        Ok(created.budget)
    }

    pub async fn update_budget(&self, id: Uuid, payload: &BudgetUpdate) -> Result<()> {
        self.put_json(&format!("/budgets/{id}"), Some(payload))
            .await
            .map(|_| ())
    }

    pub async fn delete_budget(&self, id: Uuid) -> Result<()> {
        self.delete(&format!("/budgets/{id}")).await.map(|_| ())
    }

    // ============= Alerts =============

    pub async fn alerts(&self) -> Result<Vec<Alert>> {
        self.get_json("/budgets/alerts", &[]).await
    }

    pub async fn mark_alert_read(&self, id: Uuid) -> Result<()> {
        self.put_json::<()>(&format!("/budgets/alerts/{id}/read"), None)
            .await
            .map(|_| ())
    }

    // ============= Analytics & reports =============

    pub async fn summary(&self, period: Period) -> Result<Summary> {
        self.get_json(
            "/analytics/summary",
            &QueryFilter::for_period(period).to_query(),
        )
        .await
    }

    pub async fn charts(&self, period: Period) -> Result<ChartData> {
        self.get_json(
            "/analytics/charts",
            &QueryFilter::for_period(period).to_query(),
        )
        .await
    }

    pub async fn report_summary(&self, period: Period) -> Result<ReportSummary> {
        self.get_json(
            "/reports/summary",
            &QueryFilter::for_period(period).to_query(),
        )
        .await
    }

    /// Downloads a report export. The payload is returned untouched.
    pub async fn export_report(&self, format: ExportFormat, period: Period) -> Result<ExportedReport> {
        let mut query = vec![("format", format.as_str().to_string())];
        query.extend(QueryFilter::for_period(period).to_query());

        let req = self.http.get(self.url("/reports/export")).query(&query);
        let resp = self.send(req, true).await?;

        let headers = resp.headers();
        let filename = headers
            .get(header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| format!("expense_report.{}", format.extension()));
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let bytes = resp.bytes().await?.to_vec();
        Ok(ExportedReport {
            filename,
            content_type,
            bytes,
        })
    }
}

/// Extracts a bare file name from a `Content-Disposition` value.
///
/// Directory components are stripped so the name is safe to join onto an
/// output directory.
fn filename_from_disposition(value: &str) -> Option<String> {
    let raw = value
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))?;
    let raw = raw.trim().trim_matches('"');
    let name = raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim();
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}
