use axum::{
    extract::{FromRef, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            LoginEcho, LoginForm, ProfileData, ProfileForm, ProfileUpdate, RegistrationForm,
            SessionResponse,
        },
        guards::{clear_session_cookie, session_cookie, Guest, PageUser},
        repo::{self, NewUser, UserPatch},
        session::SessionKeys,
    },
    error::AppError,
    outcome::{Envelope, FormOutcome},
    recipes,
    state::AppState,
    validation::{normalize_email, validate_profile, validate_registration, FieldErrors},
};

#[instrument(skip(state, form))]
pub async fn register(
    State(state): State<AppState>,
    _guest: Guest,
    Json(mut form): Json<RegistrationForm>,
) -> Result<FormOutcome<repo::PublicUser, RegistrationForm>, AppError> {
    form.username = form.username.trim().to_string();
    form.email = normalize_email(&form.email);

    let errors = validate_registration(&form);
    if !errors.is_empty() {
        warn!(error_count = errors.len(), "registration rejected");
        return Ok(FormOutcome::rejected(form.redacted(), errors));
    }

    let new_user = NewUser {
        username: form.username.clone(),
        email: form.email.clone(),
        password: form.password.clone(),
    };
    match repo::create(&state.db, &new_user).await {
        Ok(user) => {
            info!(user_id = %user.id, username = %user.username, "user registered");
            Ok(FormOutcome::Created(user))
        }
        Err(AppError::Conflict { field }) => {
            warn!(field, "registration conflict");
            Ok(FormOutcome::rejected(
                form.redacted(),
                FieldErrors::single(field, AppError::conflict_message(field)),
            ))
        }
        Err(e) => Err(e),
    }
}

#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    _guest: Guest,
    Json(form): Json<LoginForm>,
) -> Result<Response, AppError> {
    let email = normalize_email(&form.email);

    if email.is_empty() || form.password.is_empty() {
        let outcome: FormOutcome<SessionResponse, LoginEcho> = FormOutcome::rejected(
            LoginEcho { email },
            FieldErrors::single("general", "Please provide both email and password"),
        );
        return Ok(outcome.into_response());
    }

    let Some(user) = repo::authenticate(&state.db, &email, &form.password).await? else {
        warn!(email = %email, "login rejected");
        let outcome: FormOutcome<SessionResponse, LoginEcho> =
            FormOutcome::Denied("Invalid email or password");
        return Ok(outcome.into_response());
    };

    let keys = SessionKeys::from_ref(&state);
    let token = keys.sign(user.id)?;
    info!(user_id = %user.id, username = %user.username, "user logged in");

    let cookie = session_cookie(&token, keys.ttl);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Envelope::success(SessionResponse { token, user }),
    )
        .into_response())
}

#[instrument]
pub async fn logout() -> Response {
    ([(header::SET_COOKIE, clear_session_cookie())], Redirect::to("/")).into_response()
}

#[instrument(skip(state))]
pub async fn profile(
    State(state): State<AppState>,
    PageUser(user_id): PageUser,
) -> Result<Json<Envelope<ProfileData>>, AppError> {
    let user = repo::find_by_id(&state.db, user_id)
        .await?
        .ok_or(AppError::NotFound("User not found"))?;
    let recipes = recipes::repo::list_by_owner(&state.db, user_id).await?;
    Ok(Envelope::success(ProfileData { user, recipes }))
}

#[instrument(skip(state, form))]
pub async fn edit_profile(
    State(state): State<AppState>,
    PageUser(user_id): PageUser,
    Json(mut form): Json<ProfileForm>,
) -> Result<FormOutcome<ProfileUpdate, ProfileForm>, AppError> {
    if let Some(username) = &form.username {
        form.username = Some(username.trim().to_string());
    }
    if let Some(email) = &form.email {
        form.email = Some(normalize_email(email));
    }

    let errors = validate_profile(&form);
    if !errors.is_empty() {
        return Ok(FormOutcome::rejected(form, errors));
    }

    let patch = UserPatch {
        username: form.username.clone(),
        email: form.email.clone(),
        profile_image: form.profile_image.clone(),
    };
    match repo::update(&state.db, user_id, &patch).await {
        Ok(true) => {
            info!(user_id = %user_id, "profile updated");
            let user = repo::find_by_id(&state.db, user_id).await?;
            Ok(FormOutcome::Success(ProfileUpdate { updated: true, user }))
        }
        Ok(false) => Ok(FormOutcome::Success(ProfileUpdate {
            updated: false,
            user: None,
        })),
        Err(AppError::Conflict { field }) => {
            warn!(user_id = %user_id, field, "profile update conflict");
            Ok(FormOutcome::rejected(
                form,
                FieldErrors::single(field, AppError::conflict_message(field)),
            ))
        }
        Err(e) => Err(e),
    }
}
