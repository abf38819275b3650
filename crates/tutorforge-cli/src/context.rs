//! Shared startup wiring for every subcommand: loads configuration, the
//! problem catalog, the knowledge base, and the session store, and
//! constructs the container runner and oracle client they all share.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use tutorforge_core::catalog::ProblemCatalog;
use tutorforge_core::knowledge::KnowledgeBase;
use tutorforge_core::session::SessionStore;
use tutorforge_core::traits::{ContainerRunner, Oracle};
use tutorforge_providers::config::TutorforgeConfig;
use tutorforge_providers::HttpOracle;
use tutorforge_runner::container::{ContainerConfig, DockerContainerRunner};

pub struct AppContext {
    pub config: TutorforgeConfig,
    pub catalog: ProblemCatalog,
    pub knowledge: KnowledgeBase,
    pub sessions: SessionStore,
    pub runner: Arc<dyn ContainerRunner>,
    pub oracle: Arc<dyn Oracle>,
}

impl AppContext {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = tutorforge_providers::load_config(config_path)?;

        let catalog = ProblemCatalog::load(&config.data_dir.join("problems.json"))
            .context("failed to load problem catalog")?;
        let knowledge = KnowledgeBase::load_dir(&config.data_dir)
            .context("failed to load knowledge base")?;
        let sessions = SessionStore::load(config.data_dir.join("sessions.json"))
            .context("failed to load session store")?;

        let runner: Arc<dyn ContainerRunner> = Arc::new(DockerContainerRunner::new(ContainerConfig {
            image: config.sandbox_image.clone(),
            memory_limit_mb: config.memory_limit_mb,
            cpu_limit: config.cpu_limit,
            wall_clock_timeout: Duration::from_secs(config.wall_clock_timeout_secs),
        }));

        let oracle: Arc<dyn Oracle> = Arc::new(
            HttpOracle::new(
                config.llm_api_key.clone(),
                config.oracle_base_url.clone(),
                config.oracle_model.clone(),
            )
            .with_retries(config.max_retries, Duration::from_secs(config.retry_delay_secs)),
        );

        Ok(Self {
            config,
            catalog,
            knowledge,
            sessions,
            runner,
            oracle,
        })
    }

    pub fn workspace_root(&self) -> PathBuf {
        self.config.data_dir.join("workspaces")
    }
}
