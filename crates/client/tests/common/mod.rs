#![allow(dead_code)]

//! In-process stand-in for the tracker service, served by axum on an
//! ephemeral port.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
    time::Duration,
};

use api_types::{
    ErrorBody, MessageResponse,
    alert::{Alert, AlertType},
    analytics::Summary,
    auth::{AuthResponse, Login, Register, User},
    budget::{Budget, BudgetCreated, BudgetNew},
    category::{CategoriesResponse, Category, CategoryCreated, CategoryNew},
    expense::{Expense, ExpenseCreated, ExpenseNew},
};
use axum::{
    Json, Router,
    extract::{Path, RawQuery, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use chrono::{NaiveDate, Utc};
use client::{ApiClient, SessionContext};
use uuid::Uuid;

pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "secret";

type Auth = Option<TypedHeader<Authorization<Bearer>>>;
type Reply<T> = Result<Json<T>, (StatusCode, Json<ErrorBody>)>;

#[derive(Debug, Default)]
pub struct MockData {
    pub users: HashMap<String, (String, User)>,
    pub tokens: HashMap<String, String>,
    pub expenses: Vec<Expense>,
    pub budgets: Vec<Budget>,
    pub alerts: Vec<Alert>,
    pub custom_categories: Vec<Category>,
    /// Raw query strings received by `GET /expenses`.
    pub expense_queries: Vec<String>,
    pub alert_fetches: usize,
    pub fail_alerts: bool,
    /// Per-fetch delays for `GET /budgets/alerts`, applied after the list
    /// is read so a delayed response carries the data of its arrival time.
    pub alert_delays: VecDeque<Duration>,
    /// Raw query strings received by the analytics and report endpoints.
    pub period_queries: Vec<String>,
    issued: usize,
}

pub type SharedState = Arc<Mutex<MockData>>;

pub struct MockServer {
    pub base_url: String,
    pub state: SharedState,
}

impl MockServer {
    pub async fn spawn() -> Self {
        let mut data = MockData::default();
        data.users.insert(
            USERNAME.to_string(),
            (
                PASSWORD.to_string(),
                User {
                    id: Uuid::new_v4(),
                    username: USERNAME.to_string(),
                    email: Some("alice@example.com".to_string()),
                },
            ),
        );
        let state: SharedState = Arc::new(Mutex::new(data));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().nest("/api", router()).with_state(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}/api"),
            state,
        }
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.base_url, SessionContext::in_memory()).unwrap()
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut MockData) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    /// Drops every issued token, as a server-side session expiry would.
    pub fn revoke_all(&self) {
        self.with(|data| data.tokens.clear());
    }

    pub fn push_alert(&self, alert_type: AlertType, percentage: f64, is_read: bool) -> Uuid {
        let id = Uuid::new_v4();
        self.with(|data| {
            data.alerts.push(Alert {
                id,
                budget_id: None,
                alert_type,
                message: format!("Budget at {percentage:.1}%"),
                percentage,
                is_read,
                created_at: Utc::now().naive_utc(),
            });
        });
        id
    }
}

fn router() -> Router<SharedState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/expenses", get(list_expenses).post(create_expense))
        .route("/expenses/{id}", put(update_expense).delete(delete_expense))
        .route("/categories", get(categories).post(create_category))
        .route("/categories/{id}", put(update_category))
        .route("/budgets", get(list_budgets).post(create_budget))
        .route("/budgets/alerts", get(list_alerts))
        .route("/budgets/alerts/{id}/read", put(mark_read))
        .route("/budgets/{id}", put(update_budget).delete(delete_budget))
        .route("/analytics/summary", get(summary))
        .route("/analytics/charts", get(charts))
        .route("/reports/summary", get(report_summary))
        .route("/reports/export", get(export))
}

fn error(status: StatusCode, detail: &str) -> (StatusCode, Json<ErrorBody>) {
    (
        status,
        Json(ErrorBody {
            detail: detail.to_string(),
        }),
    )
}

fn authorize(data: &MockData, auth: Auth) -> Result<String, (StatusCode, Json<ErrorBody>)> {
    let Some(TypedHeader(Authorization(bearer))) = auth else {
        return Err(error(StatusCode::UNAUTHORIZED, "Not authenticated"));
    };
    data.tokens
        .get(bearer.token())
        .cloned()
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Invalid or expired token"))
}

fn issue_token(data: &mut MockData, username: &str) -> String {
    data.issued += 1;
    let token = format!("token-{}", data.issued);
    data.tokens.insert(token.clone(), username.to_string());
    token
}

fn message(text: &str) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: text.to_string(),
    })
}

async fn login(State(state): State<SharedState>, Json(payload): Json<Login>) -> Reply<AuthResponse> {
    let mut data = state.lock().unwrap();
    let user = match data.users.get(&payload.username) {
        Some((password, user)) if *password == payload.password => user.clone(),
        _ => return Err(error(StatusCode::UNAUTHORIZED, "Invalid credentials")),
    };
    let token = issue_token(&mut data, &user.username);
    Ok(Json(AuthResponse { token, user }))
}

async fn register(
    State(state): State<SharedState>,
    Json(payload): Json<Register>,
) -> Reply<AuthResponse> {
    let mut data = state.lock().unwrap();
    if data.users.contains_key(&payload.username) {
        return Err(error(StatusCode::BAD_REQUEST, "Username already exists"));
    }
    let user = User {
        id: Uuid::new_v4(),
        username: payload.username.clone(),
        email: payload.email,
    };
    data.users
        .insert(payload.username, (payload.password, user.clone()));
    let token = issue_token(&mut data, &user.username);
    Ok(Json(AuthResponse { token, user }))
}

async fn list_expenses(
    auth: Auth,
    State(state): State<SharedState>,
    RawQuery(query): RawQuery,
) -> Reply<Vec<Expense>> {
    let mut data = state.lock().unwrap();
    authorize(&data, auth)?;
    data.expense_queries.push(query.unwrap_or_default());
    let mut expenses = data.expenses.clone();
    expenses.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(Json(expenses))
}

async fn create_expense(
    auth: Auth,
    State(state): State<SharedState>,
    Json(payload): Json<ExpenseNew>,
) -> Reply<ExpenseCreated> {
    let mut data = state.lock().unwrap();
    authorize(&data, auth)?;
    let expense = Expense {
        id: Uuid::new_v4(),
        title: payload.title,
        amount: payload.amount,
        category: payload.category,
        kind: payload.kind,
        description: payload.description,
        date: payload
            .date
            .unwrap_or_else(|| Utc::now().date_naive()),
        created_at: Some(Utc::now().naive_utc()),
    };
    data.expenses.push(expense.clone());
    Ok(Json(ExpenseCreated {
        message: "Transaction created successfully".to_string(),
        expense,
    }))
}

async fn update_expense(
    auth: Auth,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<serde_json::Value>,
) -> Reply<MessageResponse> {
    let mut data = state.lock().unwrap();
    authorize(&data, auth)?;
    let Some(expense) = data.expenses.iter_mut().find(|e| e.id == id) else {
        return Err(error(StatusCode::NOT_FOUND, "Expense not found"));
    };
    if let Some(title) = payload.get("title").and_then(|v| v.as_str()) {
        expense.title = title.to_string();
    }
    if let Some(amount) = payload.get("amount").and_then(|v| v.as_f64()) {
        expense.amount = amount;
    }
    Ok(message("Expense updated successfully"))
}

async fn delete_expense(
    auth: Auth,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Reply<MessageResponse> {
    let mut data = state.lock().unwrap();
    authorize(&data, auth)?;
    let before = data.expenses.len();
    data.expenses.retain(|e| e.id != id);
    if data.expenses.len() == before {
        return Err(error(StatusCode::NOT_FOUND, "Expense not found"));
    }
    Ok(message("Expense deleted successfully"))
}

async fn categories(auth: Auth, State(state): State<SharedState>) -> Reply<CategoriesResponse> {
    let data = state.lock().unwrap();
    authorize(&data, auth)?;
    let predefined: Vec<Category> = ["Food", "Transport", "Salary"]
        .into_iter()
        .map(|name| Category {
            id: None,
            name: name.to_string(),
            icon: "📦".to_string(),
            goal: None,
            is_custom: false,
        })
        .collect();
    let custom = data.custom_categories.clone();
    let all = predefined.iter().chain(custom.iter()).cloned().collect();
    Ok(Json(CategoriesResponse {
        predefined,
        custom,
        all,
    }))
}

async fn create_category(
    auth: Auth,
    State(state): State<SharedState>,
    Json(payload): Json<CategoryNew>,
) -> Reply<CategoryCreated> {
    let mut data = state.lock().unwrap();
    authorize(&data, auth)?;
    let taken = ["Food", "Transport", "Salary"].contains(&payload.name.as_str())
        || data.custom_categories.iter().any(|c| c.name == payload.name);
    if taken {
        return Err(error(StatusCode::BAD_REQUEST, "Category already exists"));
    }
    let category = Category {
        id: Some(Uuid::new_v4()),
        name: payload.name,
        icon: payload.icon.unwrap_or_else(|| "📦".to_string()),
        goal: payload.goal,
        is_custom: true,
    };
    data.custom_categories.push(category.clone());
    Ok(Json(CategoryCreated {
        message: "Category created successfully".to_string(),
        category,
    }))
}

async fn update_category(
    auth: Auth,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<serde_json::Value>,
) -> Reply<MessageResponse> {
    let mut data = state.lock().unwrap();
    authorize(&data, auth)?;
    let Some(category) = data
        .custom_categories
        .iter_mut()
        .find(|c| c.id == Some(id))
    else {
        return Err(error(StatusCode::NOT_FOUND, "Category not found"));
    };
    if let Some(name) = payload.get("name").and_then(|v| v.as_str()) {
        category.name = name.to_string();
    }
    if let Some(goal) = payload.get("goal").and_then(|v| v.as_f64()) {
        category.goal = Some(goal);
    }
    Ok(message("Category updated successfully"))
}

async fn list_budgets(auth: Auth, State(state): State<SharedState>) -> Reply<Vec<Budget>> {
    let data = state.lock().unwrap();
    authorize(&data, auth)?;
    Ok(Json(data.budgets.clone()))
}

async fn create_budget(
    auth: Auth,
    State(state): State<SharedState>,
    Json(payload): Json<BudgetNew>,
) -> Reply<BudgetCreated> {
    let mut data = state.lock().unwrap();
    authorize(&data, auth)?;
    let budget = Budget {
        id: Uuid::new_v4(),
        category: payload.category,
        limit_amount: payload.limit_amount,
        current_spent: 0.0,
        period: payload.period,
        start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        is_active: true,
        created_at: Some(Utc::now().naive_utc()),
    };
    data.budgets.push(budget.clone());
    Ok(Json(BudgetCreated {
        message: "Budget created successfully".to_string(),
        budget,
    }))
}

async fn update_budget(
    auth: Auth,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<serde_json::Value>,
) -> Reply<MessageResponse> {
    let mut data = state.lock().unwrap();
    authorize(&data, auth)?;
    let Some(budget) = data.budgets.iter_mut().find(|b| b.id == id) else {
        return Err(error(StatusCode::NOT_FOUND, "Budget not found"));
    };
    if let Some(limit) = payload.get("limit_amount").and_then(|v| v.as_f64()) {
        budget.limit_amount = limit;
    }
    if let Some(active) = payload.get("is_active").and_then(|v| v.as_bool()) {
        budget.is_active = active;
    }
    Ok(message("Budget updated successfully"))
}

async fn delete_budget(
    auth: Auth,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Reply<MessageResponse> {
    let mut data = state.lock().unwrap();
    authorize(&data, auth)?;
    let before = data.budgets.len();
    data.budgets.retain(|b| b.id != id);
    if data.budgets.len() == before {
        return Err(error(StatusCode::NOT_FOUND, "Budget not found"));
    }
    Ok(message("Budget deleted successfully"))
}

async fn list_alerts(auth: Auth, State(state): State<SharedState>) -> Reply<Vec<Alert>> {
    let (alerts, delay) = {
        let mut data = state.lock().unwrap();
        authorize(&data, auth)?;
        data.alert_fetches += 1;
        if data.fail_alerts {
            return Err(error(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable"));
        }
        let mut alerts = data.alerts.clone();
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        (alerts, data.alert_delays.pop_front())
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    Ok(Json(alerts))
}

async fn mark_read(
    auth: Auth,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Reply<MessageResponse> {
    let mut data = state.lock().unwrap();
    authorize(&data, auth)?;
    let Some(alert) = data.alerts.iter_mut().find(|a| a.id == id) else {
        return Err(error(StatusCode::NOT_FOUND, "Alert not found"));
    };
    alert.is_read = true;
    Ok(message("Alert marked as read"))
}

async fn summary(auth: Auth, State(state): State<SharedState>) -> Reply<Summary> {
    let data = state.lock().unwrap();
    authorize(&data, auth)?;
    let mut summary = Summary {
        total_expenses: 0.0,
        total_income: 0.0,
        balance: 0.0,
        category_breakdown: Default::default(),
        transaction_count: data.expenses.len() as u64,
        period: "month".to_string(),
        start_date: None,
        end_date: None,
    };
    for expense in &data.expenses {
        match expense.kind {
            api_types::expense::TransactionType::Expense => {
                summary.total_expenses += expense.amount;
                *summary
                    .category_breakdown
                    .entry(expense.category.clone())
                    .or_default() += expense.amount;
            }
            api_types::expense::TransactionType::Income => summary.total_income += expense.amount,
        }
    }
    summary.balance = summary.total_income - summary.total_expenses;
    Ok(Json(summary))
}

async fn charts(
    auth: Auth,
    State(state): State<SharedState>,
    RawQuery(query): RawQuery,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorBody>)> {
    let mut data = state.lock().unwrap();
    authorize(&data, auth)?;
    data.period_queries.push(query.unwrap_or_default());
    Ok(Json(serde_json::json!({
        "pie_chart": {
            "expenses": { "labels": ["Food", "Transport"], "data": [42.5, 12.0] },
            "income": { "labels": ["Salary"], "data": [1000.0] }
        },
        "bar_chart": {
            "labels": ["2024-03-04", "2024-03-05", "2024-03-06"],
            "expenses": [12.5, 0.0, 42.0],
            "income": [0.0, 1000.0, 0.0]
        },
        "period": "week",
        "start_date": "2024-03-04",
        "end_date": "2024-03-10"
    })))
}

async fn report_summary(
    auth: Auth,
    State(state): State<SharedState>,
    RawQuery(query): RawQuery,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorBody>)> {
    let mut data = state.lock().unwrap();
    authorize(&data, auth)?;
    data.period_queries.push(query.unwrap_or_default());
    Ok(Json(serde_json::json!({
        "report_period": "2024-03-01 to 2024-03-31",
        "summary": {
            "total_income": 1000.0,
            "total_expenses": 54.5,
            "net_balance": 945.5,
            "total_transactions": 3
        },
        "category_breakdown": {
            "Food": { "expenses": 42.5, "income": 0.0, "transactions": 2 },
            "Salary": { "expense": 0.0, "income": 1000.0, "transactions": 1 },
            "Transport": { "expense": 12.0, "income": 0.0, "transactions": 1 }
        },
        "top_expense_categories": [["Food", 42.5], ["Transport", 12.0]],
        "transactions": [],
        "generated_at": "2024-03-31T18:45:12.345678"
    })))
}

async fn export(
    auth: Auth,
    State(state): State<SharedState>,
    RawQuery(query): RawQuery,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let data = state.lock().unwrap();
    authorize(&data, auth)?;
    let json = query.unwrap_or_default().contains("format=json");
    let (content_type, filename, body) = if json {
        (
            "application/json",
            "expense_report_2024-03-01_to_2024-03-31.json",
            r#"{"transactions":[]}"#.to_string(),
        )
    } else {
        (
            "text/csv",
            "expense_report_2024-03-01_to_2024-03-31.csv",
            "Date,Title,Category,Type,Amount,Description\n".to_string(),
        )
    };
    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        body,
    ))
}
