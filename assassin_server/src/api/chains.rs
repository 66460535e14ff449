//! Chain generation and delivery handlers.
//!
//! Every generation endpoint runs the same pipeline:
//! roster upload → validation → chain generation → optional mail delivery →
//! response, where the chain is either revealed to the host or withheld.
//!
//! # Examples
//!
//! Generate, mail every player and keep the chain secret:
//! ```bash
//! curl -X POST http://localhost:5001/api/v1/chains \
//!   -F file=@players.csv -F host_email=host@example.com
//! ```
//!
//! Generate only and return the chain for record-keeping:
//! ```bash
//! curl -X POST http://localhost:5001/api/v1/chains \
//!   -F file=@players.csv -F host_email=host@example.com \
//!   -F notify=false -F reveal=full
//! ```

use super::{AppState, error::ApiError, request_id::RequestId};
use crate::{logging, metrics};
use assassin::{
    chain::{Chain, ChainGenerator},
    mail::{DeliveryReport, MailError, is_valid_address},
    roster::parse_roster,
};
use axum::{
    Json,
    extract::{Multipart, State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Instant;

/// Placed in the response instead of the chain when it stays secret
pub const SECRET_PLACEHOLDER: &str = "its a secret";

/// Whether the generated chain is returned to the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevealMode {
    #[default]
    Secret,
    Full,
}

impl FromStr for RevealMode {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "secret" => Ok(RevealMode::Secret),
            "full" => Ok(RevealMode::Full),
            other => Err(ApiError::bad_request(format!(
                "Invalid reveal mode {other:?}, expected \"secret\" or \"full\""
            ))),
        }
    }
}

/// Field naming of a revealed chain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChainFormat {
    /// `target_name`
    #[default]
    Current,
    /// `target`, as read by the first web client
    Legacy,
}

/// What the pipeline does after generating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    pub notify: bool,
    pub reveal: RevealMode,
    pub format: ChainFormat,
}

impl PipelineOptions {
    /// Mail everybody, keep the chain secret
    pub const GAME: Self = Self {
        notify: true,
        reveal: RevealMode::Secret,
        format: ChainFormat::Legacy,
    };

    /// Mail nobody, return the chain
    pub const CHAIN_ONLY: Self = Self {
        notify: false,
        reveal: RevealMode::Full,
        format: ChainFormat::Legacy,
    };
}

/// Chain as shown to the caller
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ChainView {
    Hidden(&'static str),
    Revealed(Chain),
    Legacy(BTreeMap<String, LegacyTargetInfo>),
}

impl ChainView {
    fn new(chain: Chain, reveal: RevealMode, format: ChainFormat) -> Self {
        match (reveal, format) {
            (RevealMode::Secret, _) => ChainView::Hidden(SECRET_PLACEHOLDER),
            (RevealMode::Full, ChainFormat::Current) => ChainView::Revealed(chain),
            (RevealMode::Full, ChainFormat::Legacy) => ChainView::Legacy(
                chain
                    .into_iter()
                    .map(|(player, info)| {
                        let legacy = LegacyTargetInfo {
                            target: info.target_name,
                            target_email: info.target_email,
                            player_email: info.player_email,
                        };
                        (player, legacy)
                    })
                    .collect(),
            ),
        }
    }
}

/// Chain entry with the `target` key of the legacy routes
#[derive(Debug, Serialize)]
pub struct LegacyTargetInfo {
    pub target: String,
    pub target_email: String,
    pub player_email: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub message: String,
    pub players: usize,
    pub chain: ChainView,
}

#[derive(Debug, Deserialize)]
pub struct DeliverRequest {
    pub chain: Chain,
    pub host_email: String,
}

#[derive(Debug, Serialize)]
pub struct DeliverResponse {
    pub message: String,
    pub players_notified: usize,
    pub host_notified: bool,
}

#[derive(Debug)]
struct RosterUpload {
    file_name: String,
    bytes: Vec<u8>,
}

#[derive(Debug, Default)]
struct GenerateForm {
    file: Option<RosterUpload>,
    host_email: Option<String>,
    reveal: Option<RevealMode>,
    notify: Option<bool>,
    seed: Option<u64>,
}

/// Generate a chain with caller-chosen delivery and reveal mode.
///
/// # Form Fields
///
/// - `file`: CSV roster with `name` and `email` columns (required)
/// - `host_email`: Host address (required)
/// - `notify`: Mail every player their target (default `true`)
/// - `reveal`: `secret` (default) or `full`
/// - `seed`: Reproduce a previous chain
///
/// # Response
///
/// ```json
/// {"message": "Game generated successfully and emails sent", "players": 3, "chain": "its a secret"}
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing field, wrong file type, invalid roster
/// - `502 Bad Gateway`: A target message could not be sent
pub async fn create_chain(
    State(state): State<AppState>,
    request_id: RequestId,
    multipart: Multipart,
) -> Result<Json<GenerateResponse>, ApiError> {
    let form = read_generate_form(multipart).await?;
    let options = PipelineOptions {
        notify: form.notify.unwrap_or(true),
        reveal: form.reveal.unwrap_or_default(),
        format: ChainFormat::Current,
    };
    run_pipeline(&state, &request_id, form, options).await.map(Json)
}

/// Legacy `/generate`: mail everybody, keep the chain secret.
pub async fn generate_game(
    State(state): State<AppState>,
    request_id: RequestId,
    multipart: Multipart,
) -> Result<Json<GenerateResponse>, ApiError> {
    let form = read_generate_form(multipart).await?;
    run_pipeline(&state, &request_id, form, PipelineOptions::GAME)
        .await
        .map(Json)
}

/// Legacy `/generate-chain`: return the chain without mailing anyone.
///
/// Entries carry `target` instead of `target_name`.
pub async fn generate_chain_only(
    State(state): State<AppState>,
    request_id: RequestId,
    multipart: Multipart,
) -> Result<Json<GenerateResponse>, ApiError> {
    let form = read_generate_form(multipart).await?;
    run_pipeline(&state, &request_id, form, PipelineOptions::CHAIN_ONLY)
        .await
        .map(Json)
}

/// Mail the players of a chain the host generated earlier.
///
/// # Request Body
///
/// ```json
/// {
///   "chain": {"Ana": {"target_name": "Ben", "target_email": "ben@x.io", "player_email": "ana@x.io"}, ...},
///   "host_email": "host@example.com"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing data, or the chain is not a single cycle
/// - `502 Bad Gateway`: A target message could not be sent
pub async fn deliver_chain(
    State(state): State<AppState>,
    request_id: RequestId,
    payload: Result<Json<DeliverRequest>, JsonRejection>,
) -> Result<Json<DeliverResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        tracing::debug!(request_id = %request_id.as_str(), "Rejected delivery body: {}", e);
        ApiError::bad_request("Missing required data")
    })?;

    if !is_valid_address(&request.host_email) {
        return Err(ApiError::bad_request("Invalid host email"));
    }
    request.chain.validate()?;
    if let Some((player, _)) = request
        .chain
        .iter()
        .find(|(_, info)| !is_valid_address(&info.player_email))
    {
        return Err(ApiError::bad_request(format!("Invalid email for {player}")));
    }

    let report = deliver(&state, &request_id, &request.chain, &request.host_email).await?;

    Ok(Json(DeliverResponse {
        message: "Emails sent successfully".to_string(),
        players_notified: report.players_notified,
        host_notified: report.host_notified,
    }))
}

async fn read_generate_form(mut multipart: Multipart) -> Result<GenerateForm, ApiError> {
    let mut form = GenerateForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?.to_vec();
                form.file = Some(RosterUpload { file_name, bytes });
            }
            "host_email" => form.host_email = Some(field.text().await?.trim().to_string()),
            "reveal" => form.reveal = Some(field.text().await?.parse()?),
            "notify" => form.notify = Some(parse_flag(&field.text().await?)?),
            "seed" => {
                let raw = field.text().await?;
                let seed = raw
                    .trim()
                    .parse()
                    .map_err(|_| ApiError::bad_request(format!("Invalid seed {raw:?}")))?;
                form.seed = Some(seed);
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn run_pipeline(
    state: &AppState,
    request_id: &RequestId,
    form: GenerateForm,
    options: PipelineOptions,
) -> Result<GenerateResponse, ApiError> {
    let file = form
        .file
        .ok_or_else(|| ApiError::bad_request("No file uploaded"))?;
    let host_email = form
        .host_email
        .filter(|email| !email.is_empty())
        .ok_or_else(|| ApiError::bad_request("Host email is required"))?;

    if file.file_name.is_empty() {
        return Err(ApiError::bad_request("No selected file"));
    }
    if !file.file_name.to_ascii_lowercase().ends_with(".csv") {
        return Err(ApiError::bad_request("Invalid file type"));
    }
    if options.notify && !is_valid_address(&host_email) {
        return Err(ApiError::bad_request("Invalid host email"));
    }

    let players = parse_roster(&file.bytes)?;

    let mut generator = match form.seed {
        Some(seed) => ChainGenerator::seeded(seed),
        None => ChainGenerator::from_os_rng(),
    };
    let chain = generator.generate(&players)?.to_chain();
    let player_count = chain.len();

    metrics::chains_generated_total(player_count);
    tracing::info!(
        request_id = %request_id.as_str(),
        players = player_count,
        notify = options.notify,
        reveal = ?options.reveal,
        "Chain generated"
    );

    let message = if options.notify {
        deliver(state, request_id, &chain, &host_email).await?;
        "Game generated successfully and emails sent"
    } else {
        "Chain generated successfully"
    };

    let chain = ChainView::new(chain, options.reveal, options.format);

    Ok(GenerateResponse {
        message: message.to_string(),
        players: player_count,
        chain,
    })
}

async fn deliver(
    state: &AppState,
    request_id: &RequestId,
    chain: &Chain,
    host_email: &str,
) -> Result<DeliveryReport, ApiError> {
    let started = Instant::now();

    match state.notifier.deliver(chain, host_email).await {
        Ok(report) => {
            metrics::target_emails_total(report.players_notified, true);
            logging::log_performance(
                "target_mail_batch",
                started.elapsed().as_millis() as u64,
                Some(&format!("{} players", report.players_notified)),
            );
            Ok(report)
        }
        Err(e) => {
            if let MailError::Delivery { sent, .. } = &e {
                metrics::target_emails_total(*sent, true);
            }
            metrics::target_emails_total(1, false);
            logging::log_delivery_failure(request_id.as_str(), chain.len(), &e.client_message());
            Err(e.into())
        }
    }
}

/// Parse a boolean form flag
fn parse_flag(raw: &str) -> Result<bool, ApiError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ApiError::bad_request(format!("Invalid flag {other:?}"))),
    }
}
