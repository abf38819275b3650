//! The `tutorforge draft` command: prints the stored draft, attempt count,
//! and last error for a (user, problem) pair.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use tutorforge_core::model::Session;

use crate::context::AppContext;

#[derive(Serialize)]
struct DraftResponse {
    draft_code: Option<String>,
    attempt: u32,
    last_error: Option<String>,
}

pub async fn execute(user_id: String, problem_id: String, config_path: Option<PathBuf>) -> Result<()> {
    let ctx = AppContext::load(config_path.as_deref())?;
    let session_key = Session::session_key(&user_id, &problem_id);
    let session = ctx.sessions.get(&session_key).await;

    let response = DraftResponse {
        draft_code: session.draft_code,
        attempt: session.attempt,
        last_error: session.last_error.map(|e| e.to_string()),
    };
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
