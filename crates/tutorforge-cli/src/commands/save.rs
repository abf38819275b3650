//! The `tutorforge save` command: persists a draft without executing it
//! (I3 — no submission writes `draft_code`, only this command does).

use std::path::PathBuf;

use anyhow::{Context, Result};

use tutorforge_core::model::Session;

use crate::context::AppContext;

pub async fn execute(
    user_id: String,
    problem_id: String,
    file: PathBuf,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let ctx = AppContext::load(config_path.as_deref())?;
    let code = std::fs::read_to_string(&file)
        .with_context(|| format!("failed to read source file: {}", file.display()))?;

    let session_key = Session::session_key(&user_id, &problem_id);
    ctx.sessions.save_draft(&session_key, code).await?;

    println!("{}", serde_json::json!({"status": "SAVED", "message": "draft persisted"}));
    Ok(())
}
