//! Intake form, submission and confirmation

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use chrono::Utc;

use super::html::page;
use crate::error::ApiResult;
use crate::submission::SubmissionForm;
use crate::AppState;

const FORM_BODY: &str = r#"
    <h1>Household Income &amp; Expense Survey</h1>
    <p>Tell us about your monthly household budget. Leave an expense blank if it does not apply.</p>

    <form action="/submit" method="post">
        <label for="age">Age</label>
        <input type="number" id="age" name="age" min="0" step="1" required>

        <label for="gender">Gender</label>
        <select id="gender" name="gender" required>
            <option value="Male">Male</option>
            <option value="Female">Female</option>
            <option value="Other">Other</option>
        </select>

        <label for="total_income">Total income ($)</label>
        <input type="number" id="total_income" name="total_income" min="0" step="0.01" required>

        <h2>Expenses</h2>
        <label for="utilities">Utilities ($)</label>
        <input type="number" id="utilities" name="utilities" min="0" step="0.01">

        <label for="entertainment">Entertainment ($)</label>
        <input type="number" id="entertainment" name="entertainment" min="0" step="0.01">

        <label for="school_fees">School fees ($)</label>
        <input type="number" id="school_fees" name="school_fees" min="0" step="0.01">

        <label for="shopping">Shopping ($)</label>
        <input type="number" id="shopping" name="shopping" min="0" step="0.01">

        <label for="healthcare">Healthcare ($)</label>
        <input type="number" id="healthcare" name="healthcare" min="0" step="0.01">

        <p><button type="submit" class="button">Submit</button></p>
    </form>

    <p><a href="/analysis">View Data Analysis</a></p>
"#;

const SUCCESS_BODY: &str = r#"
    <div style="text-align: center; padding: 50px;">
        <h2>Thank You!</h2>
        <p>Your response has been recorded.</p>
        <a href="/" class="button">Submit another response</a>
        <a href="/export" class="button">Export data to CSV</a>
        <a href="/analysis" class="button">View Data Analysis</a>
    </div>
"#;

/// GET /
pub async fn serve_form() -> Html<String> {
    Html(page("Household Survey", FORM_BODY))
}

/// POST /submit
///
/// Parses the form, stores the response and redirects to the confirmation page.
pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<SubmissionForm>,
) -> ApiResult<Response> {
    let response = form.parse(Utc::now())?;
    state.store.save(&response).await?;

    Ok((StatusCode::FOUND, [(header::LOCATION, "/success")]).into_response())
}

/// GET /success
pub async fn success_page() -> Html<String> {
    Html(page("Thank You", SUCCESS_BODY))
}
