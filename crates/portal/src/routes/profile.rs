//! Profile-completion page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{NaiveDate, Utc};
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use account_portal_core::{GENDER_OPTIONS, ProfileDetails, ProfileInput, ValidationErrors};

use crate::filters;
use crate::middleware::SignedIn;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// One entry of the gender select.
pub struct GenderOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Profile-completion page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile_completion.html")]
pub struct ProfileCompletionTemplate {
    pub email: String,
    pub input: ProfileInput,
    pub errors: ValidationErrors,
    pub error: Option<String>,
    pub gender_options: Vec<GenderOption>,
    pub min_date_of_birth: NaiveDate,
    pub max_date_of_birth: NaiveDate,
}

impl ProfileCompletionTemplate {
    /// The form for `email`, filled from `input`.
    #[must_use]
    pub fn new(email: String, input: ProfileInput, today: NaiveDate) -> Self {
        let gender_options = GENDER_OPTIONS
            .iter()
            .map(|&(value, label)| GenderOption {
                value,
                label,
                selected: input.gender == value,
            })
            .collect();

        Self {
            email,
            input,
            errors: ValidationErrors::new(),
            error: None,
            gender_options,
            min_date_of_birth: ProfileDetails::earliest_date_of_birth(),
            max_date_of_birth: today,
        }
    }
}

/// Display the profile-completion form.
///
/// GET /profile-completion
pub async fn profile_page(user: SignedIn) -> impl IntoResponse {
    ProfileCompletionTemplate::new(user.email, ProfileInput::default(), today())
}

/// Handle profile form submission.
///
/// POST /profile-completion
#[instrument(skip_all)]
pub async fn submit_profile(
    State(state): State<AppState>,
    session: Session,
    user: SignedIn,
    Form(input): Form<ProfileInput>,
) -> Response {
    let today = today();

    let details = match input.validate(today) {
        Ok(details) => details,
        Err(errors) => {
            let page = ProfileCompletionTemplate {
                errors,
                ..ProfileCompletionTemplate::new(user.email, input, today)
            };
            return (StatusCode::UNPROCESSABLE_ENTITY, page).into_response();
        }
    };

    let saved = AuthService::new(&state, &session)
        .save_profile(user.session.as_ref(), &details)
        .await;
    if let Err(e) = saved {
        warn!(error = %e, "Profile save failed");
        let page = ProfileCompletionTemplate {
            error: Some(e.message()),
            ..ProfileCompletionTemplate::new(user.email, input, today)
        };
        return page.into_response();
    }

    info!("Profile completed");
    Redirect::to("/dashboard").into_response()
}

/// Upper bound for the date of birth, as the server's UTC date.
fn today() -> NaiveDate {
    Utc::now().date_naive()
}
