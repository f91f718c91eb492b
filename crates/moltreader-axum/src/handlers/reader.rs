//! Reader handlers - page loading, per-segment audio and session state.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, header};
use axum::response::{IntoResponse, Response};
use moltreader_core::{SessionKey, StoredSession, Voice, VoiceAssigner};
use moltreader_voice::ProgressUpdate;
use serde::{Deserialize, Serialize};

use super::{AUTHOR_HEADER, SESSION_HEADER, VOICE_HEADER, session_key};
use crate::error::HttpError;
use crate::state::AppState;

const SESSION_NOT_FOUND: &str = "Session not found";

/// Load request body.
#[derive(Debug, Deserialize)]
pub struct LoadRequest {
    #[serde(default)]
    pub url: String,
}

/// One readable segment as shown in the client's list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDto {
    pub index: usize,
    pub author: String,
    pub text: String,
    pub voice_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadResponse {
    pub success: bool,
    pub session_key: String,
    pub item_count: usize,
    pub items: Vec<ItemDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentResponse {
    pub index: usize,
    pub total: usize,
    pub progress_text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetResponse {
    pub success: bool,
    pub session_key: String,
}

fn session_header(key: &SessionKey) -> Result<[(HeaderName, HeaderValue); 1], HttpError> {
    let value = HeaderValue::from_str(key.as_str())
        .map_err(|e| HttpError::Internal(format!("invalid session key: {e}")))?;
    Ok([(HeaderName::from_static(SESSION_HEADER), value)])
}

/// Header value for free text; falls back when the text is not representable.
fn text_header(text: &str) -> HeaderValue {
    HeaderValue::from_str(text).unwrap_or_else(|_| HeaderValue::from_static("unknown"))
}

/// Load a page into the caller's session.
///
/// Voice assignment starts over on every load; speakers are assigned in
/// reading order so the returned list shows each speaker's voice.
pub async fn load(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoadRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let segments = state.loader.load(req.url.trim()).await?;
    let key = session_key(&headers).unwrap_or_else(SessionKey::generate);

    let mut assigner = VoiceAssigner::new(state.voices.clone());
    let items: Vec<ItemDto> = segments
        .iter()
        .enumerate()
        .map(|(index, segment)| ItemDto {
            index,
            author: segment.speaker.clone(),
            text: segment.text.clone(),
            voice_name: assigner.assign(&segment.speaker).name,
        })
        .collect();

    tracing::info!(
        session = %key,
        items = items.len(),
        speakers = assigner.assignments().len(),
        "Loaded page"
    );

    state
        .sessions
        .put(
            &key,
            StoredSession {
                segments,
                assignments: assigner.into_assignments(),
                current_index: 0,
            },
        )
        .await?;

    let response = LoadResponse {
        success: true,
        session_key: key.to_string(),
        item_count: items.len(),
        items,
    };
    Ok((session_header(&key)?, Json(response)))
}

/// Synthesize one segment of the caller's session as MPEG audio.
pub async fn audio(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(index): Path<usize>,
) -> Result<Response, HttpError> {
    let not_found = || HttpError::NotFound(SESSION_NOT_FOUND.to_string());
    let key = session_key(&headers).ok_or_else(not_found)?;
    let mut session = state.sessions.get(&key).await?.ok_or_else(not_found)?;

    let segment = session
        .segments
        .get(index)
        .cloned()
        .ok_or_else(|| HttpError::NotFound("Invalid index".to_string()))?;

    let mut assigner = VoiceAssigner::from_assignments(
        state.voices.clone(),
        std::mem::take(&mut session.assignments),
    );
    let voice = assigner.assign(&segment.speaker);

    tracing::debug!(session = %key, index, voice = %voice.id, "Synthesizing segment");
    let audio = state
        .engine
        .synthesize(&segment.utterance(), &voice.id)
        .await?;

    session.assignments = assigner.into_assignments();
    session.current_index = index;
    state.sessions.put(&key, session).await?;

    let disposition = format!("inline; filename=\"audio_{index}.mp3\"");
    let response_headers = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static(state.engine.mime_type()),
        ),
        (header::CONTENT_DISPOSITION, text_header(&disposition)),
        (HeaderName::from_static(AUTHOR_HEADER), text_header(&segment.speaker)),
        (HeaderName::from_static(VOICE_HEADER), text_header(&voice.name)),
    ];
    Ok((response_headers, audio).into_response())
}

/// Position of the most recently requested segment.
pub async fn current(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CurrentResponse>, HttpError> {
    let not_found = || HttpError::NotFound(SESSION_NOT_FOUND.to_string());
    let key = session_key(&headers).ok_or_else(not_found)?;
    let session = state.sessions.get(&key).await?.ok_or_else(not_found)?;

    let total = session.segments.len();
    let index = session.current_index;
    let progress_text = session
        .segments
        .get(index)
        .map(|segment| {
            let voice = session
                .assignments
                .get(&segment.speaker)
                .cloned()
                .unwrap_or_else(|| Voice::new("", "unassigned"));
            ProgressUpdate {
                index,
                total,
                speaker: segment.speaker.clone(),
                voice,
            }
            .to_string()
        })
        .unwrap_or_default();

    Ok(Json(CurrentResponse {
        index,
        total,
        progress_text,
    }))
}

/// Forget the caller's session and hand out a fresh key.
pub async fn reset(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HttpError> {
    if let Some(old) = session_key(&headers) {
        let removed = state.sessions.delete(&old).await?;
        tracing::debug!(session = %old, removed, "Reset session");
    }

    let key = SessionKey::generate();
    let response = ResetResponse {
        success: true,
        session_key: key.to_string(),
    };
    Ok((session_header(&key)?, Json(response)))
}

/// The configured voice pool.
pub async fn voices(State(state): State<AppState>) -> Json<Vec<Voice>> {
    Json(state.voices.voices().to_vec())
}
